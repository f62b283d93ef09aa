//! Command-line argument parsing
//!
//! clap routes the global options and the subcommand. The options of each
//! subcommand are handed over untouched and validated by [`crate::cli::parse`]
//! so that every problem can be reported at once.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::cli::parse::CommandKind;

#[derive(Parser, Debug)]
#[command(name = "k8analysis")]
#[command(about = "Build analysis images and dispatch analysis jobs to Kubernetes")]
#[command(disable_help_flag = true, disable_help_subcommand = true)]
pub struct Cli {
    /// Configuration file path
    #[arg(long = "config", env = "K8A_CONFIG", help = "Path to configuration file")]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(
        long = "verbose",
        short = 'v',
        conflicts_with = "quiet",
        help = "Enable verbose output"
    )]
    pub verbose: bool,

    /// Quiet mode
    #[arg(long = "quiet", short = 'q', help = "Only print results and errors")]
    pub quiet: bool,

    #[arg(long = "help", short = 'h', help = "Print detailed usage")]
    pub help: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Build a docker image from the repository
    #[command(disable_help_flag = true)]
    Build(RawArgs),

    /// Push a built image to the registry
    #[command(disable_help_flag = true)]
    Push(RawArgs),

    /// Submit an analysis job to the cluster
    #[command(disable_help_flag = true)]
    Run(RawArgs),

    /// Make a pushed image the default for new jobs
    #[command(name = "set_default", disable_help_flag = true)]
    SetDefault(RawArgs),

    /// Print the current default image
    #[command(disable_help_flag = true)]
    Version(RawArgs),
}

impl Command {
    pub fn kind(&self) -> CommandKind {
        match self {
            Command::Build(_) => CommandKind::Build,
            Command::Push(_) => CommandKind::Push,
            Command::Run(_) => CommandKind::Run,
            Command::SetDefault(_) => CommandKind::SetDefault,
            Command::Version(_) => CommandKind::Version,
        }
    }

    pub fn tokens(&self) -> &[String] {
        match self {
            Command::Build(raw)
            | Command::Push(raw)
            | Command::Run(raw)
            | Command::SetDefault(raw)
            | Command::Version(raw) => &raw.tokens,
        }
    }
}

/// Everything after the subcommand name
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct RawArgs {
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, num_args = 0..)]
    pub tokens: Vec<String>,
}
