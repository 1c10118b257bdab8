//! CLI command implementations
//!
//! This module contains implementations of the commands supported by the
//! CLI application using the Command pattern.

pub mod command_traits;
pub mod overlay_command;
pub mod inspect_command;
pub mod locate_command;

pub use command_traits::{Command, CommandFactory};
pub use overlay_command::OverlayCommand;
pub use inspect_command::InspectCommand;
pub use locate_command::LocateCommand;

use clap::ArgMatches;
use std::path::Path;

use crate::config::AppConfig;
use crate::errors::OverlayResult;
use crate::utils::logger::Logger;

/// Factory for creating command instances based on CLI arguments
///
/// Loads the configuration once and hands each command its own copy.
pub struct OverlayCommandFactory;

impl OverlayCommandFactory {
    pub fn new() -> Self {
        OverlayCommandFactory
    }
}

impl Default for OverlayCommandFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> CommandFactory<'a> for OverlayCommandFactory {
    fn create_command(&self, args: &ArgMatches, logger: &'a Logger) -> OverlayResult<Box<dyn Command + 'a>> {
        let config = AppConfig::load(args.get_one::<String>("config").map(Path::new))?;

        if args.get_flag("locate") {
            Ok(Box::new(LocateCommand::new(args, config, logger)?))
        } else if args.get_flag("inspect") {
            Ok(Box::new(InspectCommand::new(args, config, logger)?))
        } else {
            Ok(Box::new(OverlayCommand::new(args, config, logger)?))
        }
    }
}
