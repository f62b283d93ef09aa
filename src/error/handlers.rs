//! Standardized translation of raw tool and HTTP failures into operator-facing errors

use reqwest::StatusCode;

use crate::error::K8aError;
use crate::tools::ToolOutput;

/// Turns non-zero exits of the wrapped command-line tools into errors
pub struct ToolErrorHandler;

impl ToolErrorHandler {
    /// Generic failure, surfacing the tool's stderr verbatim
    pub fn failed(program: &str, output: &ToolOutput) -> K8aError {
        K8aError::Tool {
            program: program.to_string(),
            status: output.status_string(),
            stderr: output.stderr.clone(),
        }
    }

    /// Whether a failed `docker manifest inspect` means the image is absent,
    /// as opposed to the registry being unreachable or refusing the lookup
    pub fn is_missing_manifest(output: &ToolOutput) -> bool {
        let stderr = output.stderr.to_lowercase();
        stderr.contains("no such manifest")
            || stderr.contains("manifest unknown")
            || stderr.contains("manifest_unknown")
    }

    /// Failure of `kubectl create` for a job submission
    pub fn handle_submit_error(program: &str, job_name: &str, output: &ToolOutput) -> K8aError {
        if output.stderr.contains("AlreadyExists") || output.stderr.contains("already exists") {
            return K8aError::Precondition(format!(
                "A job named '{}' already exists in the cluster. Delete it or pick another job name",
                job_name
            ));
        }
        if output.stderr.contains("Forbidden") {
            return K8aError::Authentication(format!(
                "Not allowed to create job '{}': {}",
                job_name,
                output.stderr.trim()
            ));
        }
        Self::failed(program, output)
    }

    /// Failure of the cluster credential refresh
    pub fn handle_credentials_error(program: &str, cluster: &str, output: &ToolOutput) -> K8aError {
        if output.stderr.contains("not currently have an active account")
            || output.stderr.contains("gcloud auth login")
        {
            return K8aError::Authentication(format!(
                "No active gcloud account while fetching credentials for cluster '{}'. Run 'gcloud auth login'",
                cluster
            ));
        }
        Self::failed(program, output)
    }
}

/// Maps registry API responses to errors
pub struct HttpErrorHandler;

impl HttpErrorHandler {
    pub fn handle_registry_error(status: StatusCode, image: &str) -> K8aError {
        match status.as_u16() {
            401 => K8aError::Authentication(format!(
                "Registry requires authentication to look up {}",
                image
            )),
            403 => K8aError::Authentication(format!(
                "Insufficient permissions to look up {}",
                image
            )),
            429 => K8aError::Registry(format!("Rate limited while looking up {}", image)),
            500 => K8aError::Registry(format!("Registry server error while looking up {}", image)),
            502 | 503 => K8aError::Registry(format!("Registry unavailable while looking up {}", image)),
            _ => K8aError::Registry(format!(
                "Lookup of {} failed (status {})",
                image, status
            )),
        }
    }
}

/// Condenses clap's multi-line reports into one log line
pub struct ArgErrorHandler;

impl ArgErrorHandler {
    /// The problem itself, without clap's usage line, tips and prefix
    pub fn summary(err: &clap::Error) -> String {
        err.to_string()
            .lines()
            .map(str::trim)
            .filter(|line| {
                !line.is_empty()
                    && !line.starts_with("Usage:")
                    && !line.starts_with("tip:")
                    && !line.starts_with("For more information")
            })
            .map(|line| line.strip_prefix("error: ").unwrap_or(line))
            .collect::<Vec<_>>()
            .join(" ")
    }
}
