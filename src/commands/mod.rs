//! Command handlers
//!
//! Each handler receives a [`Context`] holding the collaborators it may use.
//! The binary wires real implementations from the configuration; tests swap
//! in fakes.

pub mod build;
pub mod push;
pub mod run;
pub mod set_default;
pub mod version;

use std::sync::Arc;

use tracing::debug;

use crate::cluster::{ClusterClient, GkeCluster};
use crate::config::{AppConfig, DryRunMode, ProbeKind};
use crate::error::Result;
use crate::image::{DefaultImageStore, FileImageStore};
use crate::jobs::{DryRunValidator, ExternalDryRun, NativeDryRun};
use crate::output::OutputManager;
use crate::registry::{ContainerEngine, DockerCli, HttpRegistryProbe, RegistryProbe};
use crate::tools::CommandRunner;

pub use run::Submission;

pub struct Context {
    pub config: AppConfig,
    pub store: Box<dyn DefaultImageStore>,
    pub engine: Box<dyn ContainerEngine>,
    pub registry: Box<dyn RegistryProbe>,
    pub cluster: Box<dyn ClusterClient>,
    pub dry_run: Box<dyn DryRunValidator>,
    pub output: OutputManager,
}

impl Context {
    /// Wire the collaborators selected by `config`, all driving external
    /// programs through `runner`.
    pub fn from_config(
        config: AppConfig,
        runner: Arc<dyn CommandRunner>,
        output: OutputManager,
    ) -> Result<Self> {
        config.validate()?;

        let store = FileImageStore::new(config.default_image_path());
        let docker = DockerCli::new(&config.tools.docker, runner.clone());

        let registry: Box<dyn RegistryProbe> = match config.registry.probe {
            ProbeKind::Docker => Box::new(DockerCli::new(&config.tools.docker, runner.clone())),
            ProbeKind::Http => {
                let token = std::env::var(&config.registry.token_env)
                    .ok()
                    .filter(|t| !t.is_empty());
                debug!(
                    "HTTP registry probe, token from {}: {}",
                    config.registry.token_env,
                    if token.is_some() { "set" } else { "unset" }
                );
                Box::new(HttpRegistryProbe::new(
                    &config.registry.scheme,
                    config.registry.skip_tls,
                    token,
                )?)
            }
        };

        let dry_run: Box<dyn DryRunValidator> = match config.dry_run.mode {
            DryRunMode::External => Box::new(
                ExternalDryRun::new(config.dry_run.command.clone(), runner.clone())
                    .in_dir(&config.paths.repo_dir),
            ),
            DryRunMode::Native => Box::new(NativeDryRun),
        };

        let cluster = GkeCluster::new(&config.tools, config.cluster.clone(), runner);

        Ok(Self {
            store: Box::new(store),
            engine: Box::new(docker),
            registry,
            cluster: Box::new(cluster),
            dry_run,
            output,
            config,
        })
    }
}
