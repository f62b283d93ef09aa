use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::ACCEPT;
use tracing::debug;
use url::Url;

use crate::error::handlers::HttpErrorHandler;
use crate::error::{K8aError, Result};
use crate::image::ImageRef;
use crate::registry::RegistryProbe;

const MANIFEST_MEDIA_TYPES: &[&str] = &[
    "application/vnd.oci.image.index.v1+json",
    "application/vnd.oci.image.manifest.v1+json",
    "application/vnd.docker.distribution.manifest.list.v2+json",
    "application/vnd.docker.distribution.manifest.v2+json",
];

/// Looks images up through the registry API (`HEAD /v2/<repo>/manifests/<ref>`)
pub struct HttpRegistryProbe {
    client: Client,
    scheme: String,
    token: Option<String>,
}

impl HttpRegistryProbe {
    pub fn new(scheme: impl Into<String>, skip_tls: bool, token: Option<String>) -> Result<Self> {
        let client = if skip_tls {
            Client::builder()
                .danger_accept_invalid_certs(true)
                .danger_accept_invalid_hostnames(true)
                .build()?
        } else {
            Client::new()
        };

        Ok(Self {
            client,
            scheme: scheme.into(),
            token,
        })
    }

    pub fn manifest_url(&self, image: &ImageRef) -> Result<Url> {
        let raw = format!(
            "{}://{}/v2/{}/manifests/{}",
            self.scheme,
            image.registry(),
            image.repository(),
            image.reference()
        );
        Url::parse(&raw)
            .map_err(|e| K8aError::Configuration(format!("Invalid registry URL {}: {}", raw, e)))
    }
}

#[async_trait]
impl RegistryProbe for HttpRegistryProbe {
    async fn exists(&self, image: &ImageRef) -> Result<bool> {
        let url = self.manifest_url(image)?;
        debug!("Checking {}", url);

        let mut request = self
            .client
            .head(url)
            .header(ACCEPT, MANIFEST_MEDIA_TYPES.join(", "));
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        debug!("Manifest lookup for {} returned {}", image, response.status());

        match response.status().as_u16() {
            200 => Ok(true),
            404 => Ok(false),
            _ => Err(HttpErrorHandler::handle_registry_error(
                response.status(),
                image.as_str(),
            )),
        }
    }
}
