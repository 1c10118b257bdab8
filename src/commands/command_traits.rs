//! Command pattern interfaces
//!
//! Each CLI mode is a [`Command`]; a [`CommandFactory`] picks one from the
//! parsed arguments.

use crate::errors::OverlayResult;
use crate::utils::logger::Logger;

/// Represents an executable command in the application
pub trait Command {
    /// Execute the command, printing its JSON response on stdout
    fn execute(&self) -> OverlayResult<()>;
}

/// Factory for creating commands from CLI arguments
pub trait CommandFactory<'a> {
    /// Create the command selected by `args`
    ///
    /// # Arguments
    /// * `args` - CLI argument matches from clap
    /// * `logger` - Report sink for the run
    fn create_command(&self, args: &clap::ArgMatches, logger: &'a Logger) -> OverlayResult<Box<dyn Command + 'a>>;
}
