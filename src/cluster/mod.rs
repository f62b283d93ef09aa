//! Cluster access: credentials and job submission

pub mod gke;
pub mod manifest;
pub mod naming;

use async_trait::async_trait;
use k8s_openapi::api::batch::v1::Job;

use crate::error::Result;

pub use gke::GkeCluster;
pub use manifest::JobManifestBuilder;
pub use naming::KubeName;

#[async_trait]
pub trait ClusterClient: Send + Sync {
    /// Make sure the job submission tool talks to the right cluster
    async fn refresh_credentials(&self) -> Result<()>;

    /// Hand the job to the cluster scheduler
    async fn submit(&self, job: &Job) -> Result<()>;
}
