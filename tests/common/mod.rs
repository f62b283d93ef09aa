//! Scripted stand-in for docker, gcloud, kubectl and the dry-run validator

#![allow(dead_code)]

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use k8analysis::commands::Context;
use k8analysis::config::{AppConfig, DryRunMode};
use k8analysis::tools::{CommandRunner, ToolCommand, ToolOutput};
use k8analysis::{OutputManager, Result};

pub const DRY_RUN_PROGRAM: &str = "dry-run-check";

type Responder = Box<dyn Fn(&ToolCommand) -> ToolOutput + Send + Sync>;

/// Records every command and answers with a scripted outcome
pub struct FakeRunner {
    calls: Mutex<Vec<ToolCommand>>,
    responder: Responder,
}

impl FakeRunner {
    /// Every command succeeds
    pub fn succeeding() -> Arc<Self> {
        Self::with(|_| ok(""))
    }

    pub fn with<F>(responder: F) -> Arc<Self>
    where
        F: Fn(&ToolCommand) -> ToolOutput + Send + Sync + 'static,
    {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            responder: Box::new(responder),
        })
    }

    pub fn calls(&self) -> Vec<ToolCommand> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls rendered as `program arg arg ...`
    pub fn command_lines(&self) -> Vec<String> {
        self.calls()
            .iter()
            .map(|c| {
                std::iter::once(c.program.as_str())
                    .chain(c.args.iter().map(String::as_str))
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect()
    }

    pub fn programs(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.program).collect()
    }
}

#[async_trait]
impl CommandRunner for FakeRunner {
    async fn run(&self, command: &ToolCommand) -> Result<ToolOutput> {
        self.calls.lock().unwrap().push(command.clone());
        Ok((self.responder)(command))
    }
}

pub fn ok(stdout: &str) -> ToolOutput {
    ToolOutput {
        code: Some(0),
        stdout: stdout.to_string(),
        stderr: String::new(),
    }
}

pub fn failed(code: i32, stderr: &str) -> ToolOutput {
    ToolOutput {
        code: Some(code),
        stdout: String::new(),
        stderr: stderr.to_string(),
    }
}

/// `docker manifest inspect` invocation
pub fn is_manifest_inspect(command: &ToolCommand) -> bool {
    command.program == "docker" && command.args.first().map(String::as_str) == Some("manifest")
}

/// Configuration rooted in `repo_dir` with the external dry run pointed at
/// [`DRY_RUN_PROGRAM`]
pub fn test_config(repo_dir: &Path) -> AppConfig {
    let mut config = AppConfig::default();
    config.paths.repo_dir = repo_dir.to_path_buf();
    config.dry_run.mode = DryRunMode::External;
    config.dry_run.command = vec![DRY_RUN_PROGRAM.to_string()];
    config
}

pub fn context(config: AppConfig, runner: Arc<FakeRunner>) -> Context {
    Context::from_config(config, runner, OutputManager::new_quiet()).unwrap()
}
