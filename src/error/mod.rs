//! Error types for k8analysis
//!
//! Every failure is fatal: the entry point logs the error and exits with a
//! single generic failure code. The variants only exist so that messages and
//! usage output can be tailored to the kind of failure.

pub mod handlers;

use std::path::PathBuf;

use thiserror::Error;

use crate::cli::parse::UsageError;

pub type Result<T> = std::result::Result<T, K8aError>;

#[derive(Debug, Error)]
pub enum K8aError {
    /// Bad command line, detected before anything external is touched
    #[error(transparent)]
    Usage(#[from] UsageError),

    /// A value was present but malformed (image name, job name, ...)
    #[error("Validation error: {0}")]
    Validation(String),

    /// The registry or local state does not allow the requested operation
    #[error("{0}")]
    Precondition(String),

    /// No default image has been set yet
    #[error("No default image set at {}. Run 'set_default -n <image>' first", path.display())]
    NoDefaultImage { path: PathBuf },

    /// An external program could not be started or exited non-zero
    #[error("{program} failed ({status}){}", format_stderr(stderr))]
    Tool {
        program: String,
        status: String,
        stderr: String,
    },

    /// The dry run rejected the job arguments
    #[error("Dry run failed: {0}")]
    DryRun(String),

    #[error("Registry error: {0}")]
    Registry(String),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl K8aError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        K8aError::Io {
            path: path.into(),
            source,
        }
    }

    /// The usage error behind this failure, if any.
    pub fn usage(&self) -> Option<&UsageError> {
        match self {
            K8aError::Usage(usage) => Some(usage),
            _ => None,
        }
    }
}

fn format_stderr(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(": {}", trimmed)
    }
}
