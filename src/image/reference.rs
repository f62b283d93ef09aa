//! Container image names

use std::fmt;
use std::str::FromStr;

use crate::error::{K8aError, Result};

pub const DOCKER_HUB_REGISTRY: &str = "registry-1.docker.io";
pub const DEFAULT_TAG: &str = "latest";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reference {
    Tag(String),
    Digest(String),
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reference::Tag(tag) => write!(f, "{}", tag),
            Reference::Digest(digest) => write!(f, "{}", digest),
        }
    }
}

/// A parsed image name such as `eu.gcr.io/project/k8analysis:v1`.
///
/// The original spelling is kept and used for display, so the default image
/// file and submitted manifests contain exactly what the operator typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    original: String,
    registry: String,
    repository: String,
    reference: Reference,
}

impl ImageRef {
    pub fn parse(input: &str) -> Result<Self> {
        let original = input.trim();
        if original.is_empty() {
            return Err(K8aError::Validation("Image name cannot be empty".to_string()));
        }
        if original.contains(char::is_whitespace) {
            return Err(invalid(original, "contains whitespace"));
        }

        let (name, reference) = match original.split_once('@') {
            Some((name, digest)) => {
                validate_digest(original, digest)?;
                (name, Reference::Digest(digest.to_string()))
            }
            None => {
                let last_slash = original.rfind('/').map_or(0, |i| i + 1);
                match original[last_slash..].rfind(':') {
                    Some(pos) => {
                        let split = last_slash + pos;
                        let tag = &original[split + 1..];
                        validate_tag(original, tag)?;
                        (&original[..split], Reference::Tag(tag.to_string()))
                    }
                    None => (original, Reference::Tag(DEFAULT_TAG.to_string())),
                }
            }
        };

        let (registry, repository) = match name.split_once('/') {
            Some((first, rest)) if is_registry_host(first) => (first.to_string(), rest.to_string()),
            Some(_) => (DOCKER_HUB_REGISTRY.to_string(), name.to_string()),
            None => (DOCKER_HUB_REGISTRY.to_string(), format!("library/{}", name)),
        };

        validate_repository(original, &repository)?;

        Ok(Self {
            original: original.to_string(),
            registry,
            repository,
            reference,
        })
    }

    pub fn registry(&self) -> &str {
        &self.registry
    }

    pub fn repository(&self) -> &str {
        &self.repository
    }

    pub fn reference(&self) -> &Reference {
        &self.reference
    }

    pub fn as_str(&self) -> &str {
        &self.original
    }
}

impl FromStr for ImageRef {
    type Err = K8aError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}

fn is_registry_host(component: &str) -> bool {
    component.contains('.') || component.contains(':') || component == "localhost"
}

fn invalid(image: &str, reason: &str) -> K8aError {
    K8aError::Validation(format!("Invalid image name '{}': {}", image, reason))
}

fn validate_tag(image: &str, tag: &str) -> Result<()> {
    if tag.is_empty() || tag.len() > 128 {
        return Err(invalid(image, "tag must be 1 to 128 characters"));
    }
    if tag.starts_with('.') || tag.starts_with('-') {
        return Err(invalid(image, "tag cannot start with '.' or '-'"));
    }
    if !tag
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
    {
        return Err(invalid(image, "tag may only contain [A-Za-z0-9_.-]"));
    }
    Ok(())
}

fn validate_digest(image: &str, digest: &str) -> Result<()> {
    match digest.split_once(':') {
        Some((algorithm, hex))
            if !algorithm.is_empty()
                && !hex.is_empty()
                && hex.chars().all(|c| c.is_ascii_hexdigit()) =>
        {
            Ok(())
        }
        _ => Err(invalid(image, "digest must look like 'sha256:<hex>'")),
    }
}

fn validate_repository(image: &str, repository: &str) -> Result<()> {
    if repository.is_empty() {
        return Err(invalid(image, "repository cannot be empty"));
    }
    if repository.starts_with('/') || repository.ends_with('/') || repository.contains("//") {
        return Err(invalid(image, "repository has an empty path component"));
    }
    if !repository
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '.' | '_' | '-' | '/'))
    {
        return Err(invalid(image, "repository may only contain [a-z0-9._-/]"));
    }
    Ok(())
}
