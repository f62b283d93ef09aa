//! Registry lookups and image build/push
//!
//! Image existence is answered either by the docker CLI or by the registry's
//! HTTP API; building and pushing always go through the docker CLI.

pub mod docker;
pub mod http;

use std::path::Path;

use async_trait::async_trait;

use crate::error::Result;
use crate::image::ImageRef;

pub use docker::DockerCli;
pub use http::HttpRegistryProbe;

/// Answers whether an image is already present in its remote registry
#[async_trait]
pub trait RegistryProbe: Send + Sync {
    async fn exists(&self, image: &ImageRef) -> Result<bool>;
}

/// Builds and pushes images
#[async_trait]
pub trait ContainerEngine: Send + Sync {
    async fn build(&self, image: &ImageRef, context_dir: &Path) -> Result<()>;

    async fn push(&self, image: &ImageRef) -> Result<()>;
}
