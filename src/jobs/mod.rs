//! Analysis jobs as seen from the dispatcher
//!
//! The dispatcher never runs a job itself. It only knows the job names, the
//! argument string forwarded to the container, and how to check that string
//! before anything is submitted.

pub mod dry_run;
pub mod grammar;

use std::fmt;
use std::str::FromStr;

use crate::error::K8aError;

pub use dry_run::{DetectedJob, DryRunReport, DryRunValidator, ExternalDryRun, NativeDryRun};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum JobType {
    DnaAlign,
    RnaAlign,
    NonUmiDedup,
    UmiDedup,
    Flagstat,
    CountMappingCoords,
}

impl JobType {
    pub const ALL: [JobType; 6] = [
        JobType::DnaAlign,
        JobType::RnaAlign,
        JobType::NonUmiDedup,
        JobType::UmiDedup,
        JobType::Flagstat,
        JobType::CountMappingCoords,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            JobType::DnaAlign => "dna_align",
            JobType::RnaAlign => "rna_align",
            JobType::NonUmiDedup => "non_umi_dedup",
            JobType::UmiDedup => "umi_dedup",
            JobType::Flagstat => "flagstat",
            JobType::CountMappingCoords => "count_mapping_coords",
        }
    }

    pub fn from_name(name: &str) -> Option<JobType> {
        Self::ALL.into_iter().find(|job| job.name() == name)
    }

    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(JobType::name).collect()
    }
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for JobType {
    type Err = K8aError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        JobType::from_name(s).ok_or_else(|| {
            K8aError::Validation(format!(
                "Unrecognized job name '{}'. Recognized job names: {}",
                s,
                JobType::names().join(", ")
            ))
        })
    }
}

/// The argument string handed to the job container, with every run of
/// whitespace collapsed to a single space
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobArguments {
    normalized: String,
}

impl JobArguments {
    /// `None` when the tokens contain nothing but whitespace
    pub fn from_tokens<I, S>(tokens: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut normalized = String::new();
        for token in tokens {
            for word in token.as_ref().split_whitespace() {
                if !normalized.is_empty() {
                    normalized.push(' ');
                }
                normalized.push_str(word);
            }
        }
        (!normalized.is_empty()).then_some(Self { normalized })
    }

    pub fn as_str(&self) -> &str {
        &self.normalized
    }

    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.normalized.split(' ')
    }
}

impl fmt::Display for JobArguments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.normalized)
    }
}
