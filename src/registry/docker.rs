use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::error::handlers::ToolErrorHandler;
use crate::error::Result;
use crate::image::ImageRef;
use crate::registry::{ContainerEngine, RegistryProbe};
use crate::tools::{CommandRunner, ToolCommand};

/// The docker command-line client
pub struct DockerCli {
    program: String,
    runner: Arc<dyn CommandRunner>,
}

impl DockerCli {
    pub fn new(program: impl Into<String>, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            program: program.into(),
            runner,
        }
    }

    fn command(&self) -> ToolCommand {
        ToolCommand::new(&self.program)
    }
}

#[async_trait]
impl RegistryProbe for DockerCli {
    async fn exists(&self, image: &ImageRef) -> Result<bool> {
        let cmd = self
            .command()
            .args(["manifest", "inspect"])
            .arg(image.as_str())
            .captured();
        let output = self.runner.run(&cmd).await?;
        if output.success() {
            return Ok(true);
        }
        if ToolErrorHandler::is_missing_manifest(&output) {
            debug!("{} is not in the registry: {}", image, output.stderr.trim());
            return Ok(false);
        }
        Err(ToolErrorHandler::failed(&self.program, &output))
    }
}

#[async_trait]
impl ContainerEngine for DockerCli {
    async fn build(&self, image: &ImageRef, context_dir: &Path) -> Result<()> {
        info!("Building image {} from {}", image, context_dir.display());
        let cmd = self
            .command()
            .args(["build", "-t"])
            .arg(image.as_str())
            .arg(context_dir.to_string_lossy());
        let output = self.runner.run(&cmd).await?;
        if !output.success() {
            return Err(ToolErrorHandler::failed(&self.program, &output));
        }
        Ok(())
    }

    async fn push(&self, image: &ImageRef) -> Result<()> {
        info!("Pushing image {}", image);
        let cmd = self.command().arg("push").arg(image.as_str());
        let output = self.runner.run(&cmd).await?;
        if !output.success() {
            return Err(ToolErrorHandler::failed(&self.program, &output));
        }
        Ok(())
    }
}
