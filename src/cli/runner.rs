//! Dispatch a parsed command line to its handler

use std::sync::Arc;

use tracing::debug;

use crate::cli::args::{Cli, Command};
use crate::cli::parse::{self, CommandKind, Parsed, UsageError, Violation};
use crate::cli::usage;
use crate::commands::{self, Context};
use crate::config::AppConfig;
use crate::error::Result;
use crate::output::OutputManager;
use crate::tools::{CommandRunner, ProcessRunner};

pub struct Runner {
    cli: Cli,
    output: OutputManager,
    runner: Arc<dyn CommandRunner>,
}

impl Runner {
    pub fn new(cli: Cli) -> Self {
        let output = OutputManager::from_flags(cli.quiet);
        Self {
            cli,
            output,
            runner: Arc::new(ProcessRunner),
        }
    }

    /// Replace the process runner used for docker, gcloud, kubectl and the
    /// dry-run validator
    pub fn with_command_runner(mut self, runner: Arc<dyn CommandRunner>) -> Self {
        self.runner = runner;
        self
    }

    pub fn output(&self) -> &OutputManager {
        &self.output
    }

    pub async fn run(&self) -> Result<()> {
        if self.cli.help {
            self.output.usage(&usage::detailed());
            return Ok(());
        }

        let Some(command) = &self.cli.command else {
            return Err(UsageError::new(CommandKind::Top, vec![Violation::NoCommand]).into());
        };
        let kind = command.kind();
        let tokens = command.tokens();

        // options are validated before configuration is read or any tool runs
        match command {
            Command::Build(_) | Command::Push(_) | Command::SetDefault(_) => {
                let Parsed::Args(args) = parse::parse_name_args(kind, tokens)? else {
                    return self.print_usage(kind);
                };
                let ctx = self.context()?;
                match kind {
                    CommandKind::Build => commands::build::execute(&ctx, &args).await?,
                    CommandKind::Push => commands::push::execute(&ctx, &args).await?,
                    _ => commands::set_default::execute(&ctx, &args).await?,
                };
            }
            Command::Run(_) => {
                let Parsed::Args(args) = parse::parse_run_args(tokens)? else {
                    return self.print_usage(kind);
                };
                let ctx = self.context()?;
                commands::run::execute(&ctx, &args).await?;
            }
            Command::Version(_) => {
                let Parsed::Args(()) = parse::parse_no_args(kind, tokens)? else {
                    return self.print_usage(kind);
                };
                let ctx = self.context()?;
                commands::version::execute(&ctx)?;
            }
        }
        Ok(())
    }

    fn print_usage(&self, kind: CommandKind) -> Result<()> {
        self.output.usage(&usage::for_command(kind));
        Ok(())
    }

    fn context(&self) -> Result<Context> {
        let config = AppConfig::load(self.cli.config.as_deref())?;
        debug!("Configuration: {:?}", config);
        Context::from_config(config, self.runner.clone(), self.output.clone())
    }
}
