//! Pre-submission checks of the job arguments

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::error::{K8aError, Result};
use crate::jobs::{JobArguments, JobType, grammar};
use crate::tools::{CommandRunner, ToolCommand};

/// A job found in the argument string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedJob {
    pub job_type: JobType,
    /// Parsed option values, empty when the validator does not report them
    pub options: Vec<(String, String)>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DryRunReport {
    pub jobs: Vec<DetectedJob>,
}

impl DryRunReport {
    pub fn job_types(&self) -> Vec<JobType> {
        self.jobs.iter().map(|job| job.job_type).collect()
    }
}

/// Validates job arguments locally before any cluster resources are used.
///
/// Validation is all-or-nothing: if any job in a chained argument string is
/// rejected, the whole run is rejected.
#[async_trait]
pub trait DryRunValidator: Send + Sync {
    async fn validate(&self, arguments: &JobArguments) -> Result<DryRunReport>;
}

/// Runs an external validator program with the job arguments appended;
/// exit status zero means the arguments are well formed.
pub struct ExternalDryRun {
    command: Vec<String>,
    working_dir: Option<PathBuf>,
    runner: Arc<dyn CommandRunner>,
}

impl ExternalDryRun {
    pub fn new(command: Vec<String>, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            command,
            working_dir: None,
            runner,
        }
    }

    /// Run the validator from `dir`, so relative program paths resolve there
    pub fn in_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }
}

#[async_trait]
impl DryRunValidator for ExternalDryRun {
    async fn validate(&self, arguments: &JobArguments) -> Result<DryRunReport> {
        let (program, leading) = self.command.split_first().ok_or_else(|| {
            K8aError::Configuration("dry run command is empty".to_string())
        })?;

        let mut cmd = ToolCommand::new(program)
            .args(leading.iter().cloned())
            .args(arguments.tokens())
            .captured();
        if let Some(dir) = &self.working_dir {
            cmd = cmd.in_dir(dir);
        }
        info!("Starting dry run: {}", cmd);
        let output = self.runner.run(&cmd).await?;
        if !output.stdout.trim().is_empty() {
            debug!("Dry run output:\n{}", output.stdout.trim_end());
        }

        if !output.success() {
            let detail = output.stderr.trim();
            return Err(K8aError::DryRun(if detail.is_empty() {
                format!("{} exited with {}", program, output.status_string())
            } else {
                detail.to_string()
            }));
        }

        let jobs = arguments
            .tokens()
            .filter_map(JobType::from_name)
            .map(|job_type| DetectedJob {
                job_type,
                options: Vec::new(),
            })
            .collect();
        Ok(DryRunReport { jobs })
    }
}

/// Checks the job grammars in-process
#[derive(Debug, Default, Clone)]
pub struct NativeDryRun;

impl NativeDryRun {
    pub fn check(arguments: &JobArguments) -> Result<DryRunReport> {
        let tokens: Vec<&str> = arguments.tokens().collect();
        let mut jobs = Vec::new();
        let mut errors = Vec::new();

        let mut i = 0;
        while i < tokens.len() {
            let job_type: JobType = tokens[i].parse().map_err(|e: K8aError| match e {
                K8aError::Validation(msg) => K8aError::DryRun(msg),
                other => other,
            })?;
            let start = i + 1;
            let mut end = start;
            while end < tokens.len() && JobType::from_name(tokens[end]).is_none() {
                end += 1;
            }
            info!("Detected job of type: {}", job_type);

            match grammar::parse_options(job_type, &tokens[start..end]) {
                Ok(values) => jobs.push(DetectedJob {
                    job_type,
                    options: values
                        .into_iter()
                        .map(|(name, value)| (name.to_string(), value))
                        .collect(),
                }),
                Err(error) => errors.push(format!("{}: {}", job_type, error)),
            }
            i = end;
        }

        if !errors.is_empty() {
            return Err(K8aError::DryRun(errors.join("; ")));
        }
        Ok(DryRunReport { jobs })
    }
}

#[async_trait]
impl DryRunValidator for NativeDryRun {
    async fn validate(&self, arguments: &JobArguments) -> Result<DryRunReport> {
        info!("Starting dry run for: {}", arguments);
        let report = Self::check(arguments)?;
        for job in &report.jobs {
            debug!("{} settings:", job.job_type);
            for (name, value) in &job.options {
                debug!("    {:<11} = {}", name, value);
            }
        }
        Ok(report)
    }
}
