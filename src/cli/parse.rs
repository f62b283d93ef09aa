//! Option validation for the subcommands
//!
//! Parsing is pure: it returns either the parsed arguments or every problem
//! found at once. Printing usage and exiting is left to the caller.

use std::fmt;

use crate::jobs::JobArguments;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    /// No subcommand yet (top-level usage)
    Top,
    Build,
    Push,
    Run,
    SetDefault,
    Version,
}

impl CommandKind {
    pub fn name(&self) -> &'static str {
        match self {
            CommandKind::Top => "k8analysis",
            CommandKind::Build => "build",
            CommandKind::Push => "push",
            CommandKind::Run => "run",
            CommandKind::SetDefault => "set_default",
            CommandKind::Version => "version",
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    NoCommand,
    Unrecognized(String),
    Missing(&'static str),
    MissingValue(String),
}

/// All command-line problems of one invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageError {
    pub command: CommandKind,
    pub violations: Vec<Violation>,
}

impl UsageError {
    pub fn new(command: CommandKind, violations: Vec<Violation>) -> Self {
        Self {
            command,
            violations,
        }
    }
}

impl fmt::Display for UsageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();

        if self.violations.contains(&Violation::NoCommand) {
            parts.push("No command given".to_string());
        }

        let unrecognized: Vec<&str> = self
            .violations
            .iter()
            .filter_map(|v| match v {
                Violation::Unrecognized(token) => Some(token.as_str()),
                _ => None,
            })
            .collect();
        if !unrecognized.is_empty() {
            parts.push(format!("Unrecognized options: {}", unrecognized.join(" ")));
        }

        let without_value: Vec<&str> = self
            .violations
            .iter()
            .filter_map(|v| match v {
                Violation::MissingValue(flag) => Some(flag.as_str()),
                _ => None,
            })
            .collect();
        if !without_value.is_empty() {
            parts.push(format!("Options without a value: {}", without_value.join(" ")));
        }

        let missing: Vec<&str> = self
            .violations
            .iter()
            .filter_map(|v| match v {
                Violation::Missing(what) => Some(*what),
                _ => None,
            })
            .collect();
        if !missing.is_empty() {
            parts.push(format!("Missing required: {}", missing.join(", ")));
        }

        write!(f, "Invalid '{}' invocation. {}", self.command, parts.join(". "))
    }
}

impl std::error::Error for UsageError {}

/// Result of parsing: either arguments to act on or a request for help
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parsed<T> {
    Args(T),
    Help,
}

/// Arguments of `build`, `push` and `set_default`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameArgs {
    pub name: String,
}

/// Arguments of `run`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunArgs {
    pub job_name: String,
    pub docker_image: Option<String>,
    pub arguments: JobArguments,
}

fn is_help(token: &str) -> bool {
    token == "-h" || token == "--help"
}

/// Split `--flag=value` into its parts
fn split_inline(token: &str) -> (&str, Option<&str>) {
    match token.split_once('=') {
        Some((flag, value)) if flag.starts_with("--") => (flag, Some(value)),
        _ => (token, None),
    }
}

/// Take the value of `flag`, either inline or from the next token
fn take_value<'a>(
    flag: &str,
    inline: Option<&'a str>,
    tokens: &'a [String],
    i: &mut usize,
    violations: &mut Vec<Violation>,
) -> Option<String> {
    let value = match inline {
        Some(value) => Some(value),
        None => {
            let next = tokens.get(*i).map(String::as_str);
            if next.is_some() {
                *i += 1;
            }
            next
        }
    };
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(value) => Some(value.to_string()),
        None => {
            violations.push(Violation::MissingValue(flag.to_string()));
            None
        }
    }
}

/// Parse `-n/--name <image>`, the only option of `build`, `push` and `set_default`.
pub fn parse_name_args(command: CommandKind, tokens: &[String]) -> Result<Parsed<NameArgs>, UsageError> {
    if tokens.iter().any(|t| is_help(t)) {
        return Ok(Parsed::Help);
    }

    let mut violations = Vec::new();
    let mut name = None;
    let mut name_flag_seen = false;

    let mut i = 0;
    while i < tokens.len() {
        let (flag, inline) = split_inline(&tokens[i]);
        i += 1;
        match flag {
            "-n" | "--name" => {
                name_flag_seen = true;
                if let Some(value) = take_value(flag, inline, tokens, &mut i, &mut violations) {
                    name = Some(value);
                }
            }
            _ => violations.push(Violation::Unrecognized(tokens[i - 1].clone())),
        }
    }

    if name.is_none() && !name_flag_seen {
        violations.push(Violation::Missing("-n/--name"));
    }

    match name {
        Some(name) if violations.is_empty() => Ok(Parsed::Args(NameArgs { name })),
        _ => Err(UsageError::new(command, violations)),
    }
}

/// `version` takes no options.
pub fn parse_no_args(command: CommandKind, tokens: &[String]) -> Result<Parsed<()>, UsageError> {
    if tokens.iter().any(|t| is_help(t)) {
        return Ok(Parsed::Help);
    }
    if tokens.is_empty() {
        return Ok(Parsed::Args(()));
    }
    Err(UsageError::new(
        command,
        tokens.iter().cloned().map(Violation::Unrecognized).collect(),
    ))
}

/// Parse `run`: options first, then everything from the first non-option
/// token onward is passed to the job.
pub fn parse_run_args(tokens: &[String]) -> Result<Parsed<RunArgs>, UsageError> {
    let mut violations = Vec::new();
    let mut job_name = None;
    let mut job_name_flag_seen = false;
    let mut docker_image = None;
    let mut job_tokens: &[String] = &[];

    let mut i = 0;
    while i < tokens.len() {
        let token = &tokens[i];
        if !token.starts_with('-') {
            job_tokens = &tokens[i..];
            break;
        }
        if is_help(token) {
            return Ok(Parsed::Help);
        }

        let (flag, inline) = split_inline(token);
        i += 1;
        match flag {
            "-n" | "--job_name" => {
                job_name_flag_seen = true;
                if let Some(value) = take_value(flag, inline, tokens, &mut i, &mut violations) {
                    job_name = Some(value);
                }
            }
            "-d" | "--docker_image" => {
                if let Some(value) = take_value(flag, inline, tokens, &mut i, &mut violations) {
                    docker_image = Some(value);
                }
            }
            _ => violations.push(Violation::Unrecognized(token.clone())),
        }
    }

    if job_name.is_none() && !job_name_flag_seen {
        violations.push(Violation::Missing("-n/--job_name"));
    }
    let arguments = JobArguments::from_tokens(job_tokens);
    if arguments.is_none() {
        violations.push(Violation::Missing("job arguments"));
    }

    match (job_name, arguments) {
        (Some(job_name), Some(arguments)) if violations.is_empty() => Ok(Parsed::Args(RunArgs {
            job_name,
            docker_image,
            arguments,
        })),
        _ => Err(UsageError::new(CommandKind::Run, violations)),
    }
}
