use std::sync::Arc;

use async_trait::async_trait;
use k8s_openapi::api::batch::v1::Job;
use tracing::info;

use crate::cluster::{ClusterClient, manifest};
use crate::config::{ClusterConfig, ToolsConfig};
use crate::error::Result;
use crate::error::handlers::ToolErrorHandler;
use crate::tools::{CommandRunner, ToolCommand};

/// A GKE cluster reached through `gcloud` and `kubectl`
pub struct GkeCluster {
    gcloud: String,
    kubectl: String,
    cluster: ClusterConfig,
    runner: Arc<dyn CommandRunner>,
}

impl GkeCluster {
    pub fn new(tools: &ToolsConfig, cluster: ClusterConfig, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            gcloud: tools.gcloud.clone(),
            kubectl: tools.kubectl.clone(),
            cluster,
            runner,
        }
    }
}

#[async_trait]
impl ClusterClient for GkeCluster {
    async fn refresh_credentials(&self) -> Result<()> {
        info!(
            "Fetching credentials for cluster {} ({}, project {})",
            self.cluster.name, self.cluster.region, self.cluster.project
        );
        let cmd = ToolCommand::new(&self.gcloud)
            .args(["container", "clusters", "get-credentials"])
            .arg(&self.cluster.name)
            .arg("--region")
            .arg(&self.cluster.region)
            .arg("--project")
            .arg(&self.cluster.project)
            .captured();

        let output = self.runner.run(&cmd).await?;
        if !output.success() {
            return Err(ToolErrorHandler::handle_credentials_error(
                &self.gcloud,
                &self.cluster.name,
                &output,
            ));
        }
        Ok(())
    }

    async fn submit(&self, job: &Job) -> Result<()> {
        let name = job.metadata.name.as_deref().unwrap_or_default();
        let body = manifest::to_json(job)?;

        let mut cmd = ToolCommand::new(&self.kubectl).args(["create", "-f", "-"]);
        if let Some(namespace) = &self.cluster.namespace {
            cmd = cmd.arg("--namespace").arg(namespace);
        }
        let cmd = cmd.with_stdin(body).captured();

        let output = self.runner.run(&cmd).await?;
        if !output.success() {
            return Err(ToolErrorHandler::handle_submit_error(&self.kubectl, name, &output));
        }
        let created = output.stdout.trim();
        if !created.is_empty() {
            info!("{}", created);
        }
        Ok(())
    }
}
