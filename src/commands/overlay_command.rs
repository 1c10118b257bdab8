//! Default mode: ingest a raster and write its overlay artifacts

use clap::ArgMatches;
use log::info;
use std::path::PathBuf;

use crate::api::RasterOverlay;
use crate::commands::command_traits::Command;
use crate::config::AppConfig;
use crate::errors::{OverlayError, OverlayResult};
use crate::utils::logger::Logger;

/// Writes `<stem>.<ext>`, `<stem>.html` and `<stem>.json` for one raster
pub struct OverlayCommand<'a> {
    input_file: PathBuf,
    output_dir: PathBuf,
    opacity: Option<f64>,
    show_progress: bool,
    config: AppConfig,
    logger: &'a Logger,
}

impl<'a> OverlayCommand<'a> {
    pub fn new(args: &ArgMatches, config: AppConfig, logger: &'a Logger) -> OverlayResult<Self> {
        let input_file = args.get_one::<String>("input")
            .map(PathBuf::from)
            .ok_or_else(|| OverlayError::Config("missing input file".to_string()))?;
        let output_dir = args.get_one::<String>("output")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        let opacity = args.get_one::<f64>("opacity").copied();

        Ok(OverlayCommand {
            input_file,
            output_dir,
            opacity,
            show_progress: args.get_flag("progress"),
            config,
            logger,
        })
    }
}

impl Command for OverlayCommand<'_> {
    fn execute(&self) -> OverlayResult<()> {
        info!("Building overlay for {} into {}", self.input_file.display(), self.output_dir.display());

        let overlay = RasterOverlay::new(&self.config).with_progress(self.show_progress);
        let artifacts = overlay.process(&self.input_file, &self.output_dir, self.opacity)?;

        let report = serde_json::to_string_pretty(&artifacts)?;
        self.logger.log(&report)
            .map_err(|e| OverlayError::io("writing run report", e))?;

        println!("{}", artifacts.metadata.to_json()?);
        Ok(())
    }
}
