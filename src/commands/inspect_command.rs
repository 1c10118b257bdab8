//! `--inspect`: print the metadata response without decoding pixels

use clap::ArgMatches;
use log::info;
use std::path::PathBuf;

use crate::api::RasterOverlay;
use crate::commands::command_traits::Command;
use crate::config::AppConfig;
use crate::errors::{OverlayError, OverlayResult};
use crate::utils::logger::Logger;

pub struct InspectCommand<'a> {
    input_file: PathBuf,
    config: AppConfig,
    logger: &'a Logger,
}

impl<'a> InspectCommand<'a> {
    pub fn new(args: &ArgMatches, config: AppConfig, logger: &'a Logger) -> OverlayResult<Self> {
        let input_file = args.get_one::<String>("input")
            .map(PathBuf::from)
            .ok_or_else(|| OverlayError::Config("missing input file".to_string()))?;

        Ok(InspectCommand {
            input_file,
            config,
            logger,
        })
    }
}

impl Command for InspectCommand<'_> {
    fn execute(&self) -> OverlayResult<()> {
        info!("Inspecting {}", self.input_file.display());

        let metadata = RasterOverlay::new(&self.config).inspect(&self.input_file)?;
        let json = metadata.to_json()?;

        self.logger.log(&json)
            .map_err(|e| OverlayError::io("writing run report", e))?;
        println!("{}", json);
        Ok(())
    }
}
