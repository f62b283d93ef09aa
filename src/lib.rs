//! k8analysis library
//!
//! Builds and publishes the analysis image, keeps track of the default image,
//! and dispatches analysis jobs to a Kubernetes cluster after checking their
//! arguments with a dry run.

pub mod cli;
pub mod cluster;
pub mod commands;
pub mod config;
pub mod error;
pub mod image;
pub mod jobs;
pub mod logging;
pub mod output;
pub mod registry;
pub mod tools;

pub use config::AppConfig;
pub use error::{K8aError, Result};
pub use output::OutputManager;
