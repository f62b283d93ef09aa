use std::process::ExitCode;

use clap::Parser;
use k8analysis::cli::{Cli, CommandKind, Runner, usage};
use k8analysis::error::handlers::ArgErrorHandler;
use k8analysis::{OutputManager, logging};
use tracing::error;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // unknown command or global option, so -v/-q were never read
            logging::init(false, false);
            error!("{}", ArgErrorHandler::summary(&err));
            OutputManager::default().usage_error(&usage::for_command(CommandKind::Top));
            return ExitCode::FAILURE;
        }
    };

    logging::init(cli.verbose, cli.quiet);

    let runner = Runner::new(cli);
    match runner.run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{}", err);
            if let Some(usage_error) = err.usage() {
                runner
                    .output()
                    .usage_error(&usage::for_command(usage_error.command));
            }
            ExitCode::FAILURE
        }
    }
}
