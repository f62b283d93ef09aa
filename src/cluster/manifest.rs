//! Kubernetes Job manifest for an analysis run

use std::collections::BTreeMap;

use k8s_openapi::api::batch::v1::{Job, JobSpec};
use k8s_openapi::api::core::v1::{Container, PodSpec, PodTemplateSpec, ResourceRequirements};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

use crate::cluster::naming::KubeName;
use crate::config::JobConfig;
use crate::error::Result;
use crate::jobs::JobArguments;

pub const APP_LABEL: &str = "app.kubernetes.io/name";
pub const APP_NAME: &str = "k8analysis";
pub const JOB_NAME_LABEL: &str = "k8analysis/job-name";
pub const RUN_ID_LABEL: &str = "k8analysis/run-id";
pub const JOB_ARGS_ANNOTATION: &str = "k8analysis/job-args";

pub struct JobManifestBuilder<'a> {
    name: &'a KubeName,
    image: &'a str,
    arguments: &'a JobArguments,
    settings: &'a JobConfig,
    namespace: Option<&'a str>,
    run_id: String,
}

impl<'a> JobManifestBuilder<'a> {
    pub fn new(
        name: &'a KubeName,
        image: &'a str,
        arguments: &'a JobArguments,
        settings: &'a JobConfig,
    ) -> Self {
        Self {
            name,
            image,
            arguments,
            settings,
            namespace: None,
            run_id: uuid::Uuid::new_v4().to_string(),
        }
    }

    pub fn namespace(mut self, namespace: Option<&'a str>) -> Self {
        self.namespace = namespace;
        self
    }

    pub fn run_id(mut self, run_id: impl Into<String>) -> Self {
        self.run_id = run_id.into();
        self
    }

    pub fn build(self) -> Job {
        let labels: BTreeMap<String, String> = [
            (APP_LABEL, APP_NAME.to_string()),
            (JOB_NAME_LABEL, self.name.to_string()),
            (RUN_ID_LABEL, self.run_id.clone()),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        let requests: BTreeMap<String, Quantity> = [
            ("cpu", &self.settings.cpu_request),
            ("memory", &self.settings.memory_request),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), Quantity(v.clone())))
        .collect();

        // the entry point re-splits the argument string itself
        let container = Container {
            name: self.settings.container_name.clone(),
            image: Some(self.image.to_string()),
            image_pull_policy: Some("Always".to_string()),
            args: Some(vec![self.arguments.to_string()]),
            resources: Some(ResourceRequirements {
                requests: Some(requests),
                ..Default::default()
            }),
            ..Default::default()
        };

        let template = PodTemplateSpec {
            metadata: Some(ObjectMeta {
                labels: Some(labels.clone()),
                ..Default::default()
            }),
            spec: Some(PodSpec {
                containers: vec![container],
                restart_policy: Some("Never".to_string()),
                service_account_name: self.settings.service_account.clone(),
                ..Default::default()
            }),
        };

        Job {
            metadata: ObjectMeta {
                name: Some(self.name.to_string()),
                namespace: self.namespace.map(str::to_string),
                labels: Some(labels),
                annotations: Some(BTreeMap::from([(
                    JOB_ARGS_ANNOTATION.to_string(),
                    self.arguments.to_string(),
                )])),
                ..Default::default()
            },
            spec: Some(JobSpec {
                backoff_limit: Some(self.settings.backoff_limit),
                ttl_seconds_after_finished: self.settings.ttl_seconds_after_finished,
                template,
                ..Default::default()
            }),
            status: None,
        }
    }
}

pub fn to_json(job: &Job) -> Result<String> {
    Ok(serde_json::to_string_pretty(job)?)
}

/// The run id label of a built manifest
pub fn run_id(job: &Job) -> Option<&str> {
    job.metadata
        .labels
        .as_ref()
        .and_then(|labels| labels.get(RUN_ID_LABEL))
        .map(String::as_str)
}
