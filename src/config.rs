//! Configuration module for cluster, tool and job settings

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{K8aError, Result};

pub const LOCAL_CONFIG_FILE: &str = "k8analysis.toml";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PathsConfig {
    /// Docker build context and base for relative paths
    pub repo_dir: PathBuf,
    pub default_image_file: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            repo_dir: PathBuf::from("."),
            default_image_file: PathBuf::from("default_image.txt"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ToolsConfig {
    pub docker: String,
    pub gcloud: String,
    pub kubectl: String,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            docker: "docker".to_string(),
            gcloud: "gcloud".to_string(),
            kubectl: "kubectl".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClusterConfig {
    pub name: String,
    pub region: String,
    pub project: String,
    pub namespace: Option<String>,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            name: "k8analysis-cluster".to_string(),
            region: "europe-west4".to_string(),
            project: "k8analysis".to_string(),
            namespace: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct JobConfig {
    pub container_name: String,
    pub backoff_limit: i32,
    pub cpu_request: String,
    pub memory_request: String,
    pub service_account: Option<String>,
    pub ttl_seconds_after_finished: Option<i32>,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            container_name: "k8analysis".to_string(),
            backoff_limit: 1,
            cpu_request: "15".to_string(),
            memory_request: "50Gi".to_string(),
            service_account: None,
            ttl_seconds_after_finished: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DryRunMode {
    /// Run the configured validator program
    #[default]
    External,
    /// Check the job grammars in-process
    Native,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DryRunConfig {
    pub mode: DryRunMode,
    /// Program and leading arguments; the job arguments are appended
    pub command: Vec<String>,
}

impl Default for DryRunConfig {
    fn default() -> Self {
        Self {
            mode: DryRunMode::External,
            command: vec!["python3".to_string(), "src/dry_run.py".to_string()],
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProbeKind {
    #[default]
    Docker,
    Http,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RegistryConfig {
    pub probe: ProbeKind,
    pub scheme: String,
    pub skip_tls: bool,
    /// Environment variable holding a bearer token for the HTTP probe
    pub token_env: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            probe: ProbeKind::Docker,
            scheme: "https".to_string(),
            skip_tls: false,
            token_env: "K8A_REGISTRY_TOKEN".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub paths: PathsConfig,
    pub tools: ToolsConfig,
    pub cluster: ClusterConfig,
    pub job: JobConfig,
    pub dry_run: DryRunConfig,
    pub registry: RegistryConfig,
}

impl AppConfig {
    /// Load configuration from `explicit` if given, otherwise from the first
    /// existing default location, then apply environment overrides.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_locations().into_iter().find(|p| p.is_file()) {
                Some(path) => Self::from_file(&path)?,
                None => {
                    debug!("No configuration file found, using defaults");
                    Self::default()
                }
            },
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from {}", path.display());
        let content = std::fs::read_to_string(path).map_err(|e| K8aError::io(path, e))?;
        Self::from_toml(&content)
            .map_err(|e| K8aError::Configuration(format!("{}: {}", path.display(), e)))
    }

    pub fn from_toml(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    fn default_locations() -> Vec<PathBuf> {
        let mut locations = vec![PathBuf::from(LOCAL_CONFIG_FILE)];
        if let Some(home) = home::home_dir() {
            locations.push(home.join(".config").join("k8analysis").join("config.toml"));
        }
        locations
    }

    /// Apply `K8A_*` overrides. `lookup` is `std::env::var` outside of tests.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("K8A_CLUSTER") {
            self.cluster.name = v;
        }
        if let Some(v) = lookup("K8A_REGION") {
            self.cluster.region = v;
        }
        if let Some(v) = lookup("K8A_PROJECT") {
            self.cluster.project = v;
        }
        if let Some(v) = lookup("K8A_NAMESPACE") {
            self.cluster.namespace = Some(v).filter(|ns| !ns.is_empty());
        }
        if let Some(v) = lookup("K8A_REPO_DIR") {
            self.paths.repo_dir = PathBuf::from(v);
        }
        if let Some(v) = lookup("K8A_DEFAULT_IMAGE_FILE") {
            self.paths.default_image_file = PathBuf::from(v);
        }
        if let Some(v) = lookup("K8A_DRY_RUN_MODE") {
            self.dry_run.mode = match v.to_ascii_lowercase().as_str() {
                "external" => DryRunMode::External,
                "native" => DryRunMode::Native,
                other => {
                    return Err(K8aError::Configuration(format!(
                        "K8A_DRY_RUN_MODE must be 'external' or 'native', got '{}'",
                        other
                    )));
                }
            };
        }
        if let Some(v) = lookup("K8A_REGISTRY_PROBE") {
            self.registry.probe = match v.to_ascii_lowercase().as_str() {
                "docker" => ProbeKind::Docker,
                "http" => ProbeKind::Http,
                other => {
                    return Err(K8aError::Configuration(format!(
                        "K8A_REGISTRY_PROBE must be 'docker' or 'http', got '{}'",
                        other
                    )));
                }
            };
        }
        Ok(())
    }

    /// Location of the default image file with `repo_dir` applied
    pub fn default_image_path(&self) -> PathBuf {
        self.paths.repo_dir.join(&self.paths.default_image_file)
    }

    pub fn validate(&self) -> Result<()> {
        if self.cluster.name.is_empty()
            || self.cluster.region.is_empty()
            || self.cluster.project.is_empty()
        {
            return Err(K8aError::Configuration(
                "cluster name, region and project must all be set".to_string(),
            ));
        }
        if self.dry_run.mode == DryRunMode::External && self.dry_run.command.is_empty() {
            return Err(K8aError::Configuration(
                "dry_run.command must name a program when dry_run.mode is 'external'".to_string(),
            ));
        }
        if self.job.backoff_limit < 0 {
            return Err(K8aError::Configuration(
                "job.backoff_limit cannot be negative".to_string(),
            ));
        }
        Ok(())
    }
}
