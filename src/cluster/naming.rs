//! Kubernetes resource names for jobs

use std::fmt;

use sha2::{Digest, Sha256};

use crate::error::{K8aError, Result};

/// Longest DNS-1123 label
pub const MAX_NAME_LEN: usize = 63;
const HASH_LEN: usize = 5;

/// A job name turned into a DNS-1123 label
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KubeName(String);

impl KubeName {
    /// Lowercase the job name and replace `_` and `.` with `-`.
    ///
    /// Names over the length limit are cut and given a short hash of the
    /// full name so distinct long names stay distinct. Anything still not a
    /// valid label is rejected.
    pub fn from_job_name(job_name: &str) -> Result<Self> {
        let sanitized = sanitize(job_name);
        if sanitized.is_empty() {
            return Err(K8aError::Validation("Job name cannot be empty".to_string()));
        }
        if let Some(bad) = sanitized
            .chars()
            .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-'))
        {
            return Err(K8aError::Validation(format!(
                "Job name '{}' contains '{}'; only letters, digits, '-', '_' and '.' are allowed",
                job_name, bad
            )));
        }
        if sanitized.starts_with('-') || sanitized.ends_with('-') {
            return Err(K8aError::Validation(format!(
                "Job name '{}' must start and end with a letter or digit",
                job_name
            )));
        }

        if sanitized.len() <= MAX_NAME_LEN {
            return Ok(Self(sanitized));
        }

        let hash = hex::encode(Sha256::digest(sanitized.as_bytes()));
        let keep = MAX_NAME_LEN - HASH_LEN - 1;
        let head = sanitized[..keep].trim_end_matches('-');
        Ok(Self(format!("{}-{}", head, &hash[..HASH_LEN])))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for KubeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn sanitize(job_name: &str) -> String {
    job_name
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c == '_' || c == '.' { '-' } else { c })
        .collect()
}
