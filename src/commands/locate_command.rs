//! `--locate`: resolve a project location to map coordinates

use clap::ArgMatches;

use crate::api::RasterOverlay;
use crate::commands::command_traits::Command;
use crate::config::AppConfig;
use crate::errors::{OverlayError, OverlayResult};
use crate::location::LocationQuery;
use crate::utils::logger::Logger;

pub struct LocateCommand<'a> {
    query: LocationQuery,
    config: AppConfig,
    logger: &'a Logger,
}

impl<'a> LocateCommand<'a> {
    pub fn new(args: &ArgMatches, config: AppConfig, logger: &'a Logger) -> OverlayResult<Self> {
        let field = |name: &str| -> OverlayResult<String> {
            args.get_one::<String>(name)
                .cloned()
                .ok_or_else(|| OverlayError::Config(format!("--locate needs --{}", name)))
        };

        let query = LocationQuery {
            country: field("country")?,
            state: field("state")?,
            city: field("city")?,
            project: field("project")?,
        };

        Ok(LocateCommand { query, config, logger })
    }
}

impl Command for LocateCommand<'_> {
    fn execute(&self) -> OverlayResult<()> {
        let response = RasterOverlay::new(&self.config).locate(&self.query);
        let json = serde_json::to_string_pretty(&response)?;

        self.logger.log(&json)
            .map_err(|e| OverlayError::io("writing run report", e))?;
        println!("{}", json);
        Ok(())
    }
}
