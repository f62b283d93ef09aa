//! Argument grammars of the analysis jobs
//!
//! Mirrors what the job entry point in the container accepts, so argument
//! mistakes are caught before a job is submitted.

use std::collections::BTreeMap;

use clap::{Arg, ArgAction, Command};

use crate::error::handlers::ArgErrorHandler;
use crate::jobs::JobType;

pub const REF_GENOME_37: &str = "37";
pub const REF_GENOME_38: &str = "38";

const BUCKET_PREFIX: &str = "gs://";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// `gs://...*.fastq.gz`, `*` allowed
    WildcardFastqPath,
    /// `gs://....bam`
    BamPath,
    /// any `gs://` path
    BucketPath,
    /// `37`, `38` or a bucket path
    DnaReferenceGenome,
    /// `38` or a bucket directory with the aligner resources
    RnaReferenceGenome,
}

impl ValueKind {
    pub fn accepts(&self, value: &str) -> bool {
        match self {
            ValueKind::WildcardFastqPath => is_bucket_path(value, true, Some(".fastq.gz")),
            ValueKind::BamPath => is_bucket_path(value, false, Some(".bam")),
            ValueKind::BucketPath => is_bucket_path(value, false, None),
            ValueKind::DnaReferenceGenome => {
                value == REF_GENOME_37
                    || value == REF_GENOME_38
                    || is_bucket_path(value, false, None)
            }
            ValueKind::RnaReferenceGenome => {
                value == REF_GENOME_38 || is_bucket_path(value, false, None)
            }
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ValueKind::WildcardFastqPath => "a bucket path to FASTQ files, e.g. 'gs://bucket/path*.fastq.gz'",
            ValueKind::BamPath => "a bucket path to a BAM file, e.g. 'gs://bucket/path.bam'",
            ValueKind::BucketPath => "a bucket path, e.g. 'gs://bucket/path'",
            ValueKind::DnaReferenceGenome => "'37', '38' or a bucket path to a FASTA file",
            ValueKind::RnaReferenceGenome => "'38' or a bucket path to a resource directory",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct OptionSpec {
    pub long: &'static str,
    pub short: char,
    pub kind: ValueKind,
}

const fn opt(long: &'static str, short: char, kind: ValueKind) -> OptionSpec {
    OptionSpec { long, short, kind }
}

/// Options of a job. All of them are required.
pub fn options(job: JobType) -> &'static [OptionSpec] {
    const DNA_ALIGN: &[OptionSpec] = &[
        opt("input", 'i', ValueKind::WildcardFastqPath),
        opt("ref-genome", 'r', ValueKind::DnaReferenceGenome),
        opt("output", 'o', ValueKind::BamPath),
    ];
    const RNA_ALIGN: &[OptionSpec] = &[
        opt("input", 'i', ValueKind::WildcardFastqPath),
        opt("ref-genome", 'r', ValueKind::RnaReferenceGenome),
        opt("output", 'o', ValueKind::BamPath),
    ];
    const BAM_TO_BAM: &[OptionSpec] = &[
        opt("input", 'i', ValueKind::BamPath),
        opt("output", 'o', ValueKind::BamPath),
    ];
    const BAM_TO_REPORT: &[OptionSpec] = &[
        opt("input", 'i', ValueKind::BamPath),
        opt("output", 'o', ValueKind::BucketPath),
    ];

    match job {
        JobType::DnaAlign => DNA_ALIGN,
        JobType::RnaAlign => RNA_ALIGN,
        JobType::NonUmiDedup | JobType::UmiDedup => BAM_TO_BAM,
        JobType::Flagstat | JobType::CountMappingCoords => BAM_TO_REPORT,
    }
}

/// Check `gs://<chars>[suffix]` where chars are `[A-Za-z0-9/._-]` (plus `*`
/// when wildcards are allowed) and at least one char precedes the suffix.
pub fn is_bucket_path(value: &str, allow_wildcard: bool, suffix: Option<&str>) -> bool {
    let Some(rest) = value.strip_prefix(BUCKET_PREFIX) else {
        return false;
    };
    let body = match suffix {
        Some(suffix) => match rest.strip_suffix(suffix) {
            Some(body) => body,
            None => return false,
        },
        None => rest,
    };
    if body.is_empty() {
        return false;
    }
    rest.chars().all(|c| {
        c.is_ascii_alphanumeric() || matches!(c, '/' | '.' | '_' | '-') || (allow_wildcard && c == '*')
    })
}

fn job_command(job: JobType) -> Command {
    let mut command = Command::new(job.name())
        .no_binary_name(true)
        .disable_help_flag(true)
        .disable_version_flag(true)
        .args_override_self(true);
    for spec in options(job) {
        let kind = spec.kind;
        command = command.arg(
            Arg::new(spec.long)
                .short(spec.short)
                .long(spec.long)
                .required(true)
                .action(ArgAction::Set)
                .value_parser(move |value: &str| {
                    if kind.accepts(value) {
                        Ok(value.to_string())
                    } else {
                        Err(format!("expected {}", kind.description()))
                    }
                }),
        );
    }
    command
}

/// Parse the options following a job name.
///
/// Accepts `--long value`, `--long=value`, `-s value` and `-svalue`; later
/// occurrences win.
pub fn parse_options(job: JobType, tokens: &[&str]) -> Result<BTreeMap<&'static str, String>, String> {
    let matches = job_command(job)
        .try_get_matches_from(tokens)
        .map_err(|e| ArgErrorHandler::summary(&e))?;

    Ok(options(job)
        .iter()
        .filter_map(|spec| {
            matches
                .get_one::<String>(spec.long)
                .map(|value| (spec.long, value.clone()))
        })
        .collect())
}
