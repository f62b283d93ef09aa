//! Command line interface
//!
//! clap handles the global options and picks the subcommand; the subcommand
//! options are validated by [`parse`] and the handler is run by [`Runner`].

pub mod args;
pub mod parse;
pub mod runner;
pub mod usage;

pub use args::{Cli, Command};
pub use parse::{CommandKind, NameArgs, RunArgs, UsageError, Violation};
pub use runner::Runner;
