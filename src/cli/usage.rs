//! Usage text printed for `-h` and for invalid invocations

use crate::cli::parse::CommandKind;
use crate::jobs::JobType;

const TOP_LEVEL: &str = "\
Usage: k8analysis [--config <path>] [-v|--verbose] [-q|--quiet] <command> [options]

Commands:
  build        Build a docker image from the repository
  push         Push a built image to the registry
  set_default  Make a pushed image the default for new jobs
  run          Submit an analysis job to the cluster
  version      Print the current default image

Run 'k8analysis <command> -h' for the options of a command.";

const BUILD: &str = "\
Usage: k8analysis build -n <image>

Build a docker image from the repository.

Options:
  -n, --name <image>   Name and tag of the image, e.g. eu.gcr.io/project/k8analysis:v3
  -h, --help           Print this help";

const PUSH: &str = "\
Usage: k8analysis push -n <image>

Push a built image to the registry. Pushed images are never overwritten;
build under a new tag instead.

Options:
  -n, --name <image>   Name and tag of the image to push
  -h, --help           Print this help";

const SET_DEFAULT: &str = "\
Usage: k8analysis set_default -n <image>

Use an image that exists in the registry for jobs submitted without -d.

Options:
  -n, --name <image>   Name and tag of the image
  -h, --help           Print this help";

const VERSION: &str = "\
Usage: k8analysis version

Print the default image used for new jobs.";

/// Usage for `command`
pub fn for_command(command: CommandKind) -> String {
    match command {
        CommandKind::Top => TOP_LEVEL.to_string(),
        CommandKind::Build => BUILD.to_string(),
        CommandKind::Push => PUSH.to_string(),
        CommandKind::SetDefault => SET_DEFAULT.to_string(),
        CommandKind::Version => VERSION.to_string(),
        CommandKind::Run => run_usage(),
    }
}

fn run_usage() -> String {
    format!(
        "\
Usage: k8analysis run -n <job_name> [-d <image>] <job> [job options]...

Check the job arguments with a dry run, then submit them to the cluster as a
Kubernetes job. Everything from the first non-option token onward is passed to
the job container unchanged.

Options:
  -n, --job_name <name>       Name of the Kubernetes job
  -d, --docker_image <image>  Image to run instead of the default image
  -h, --help                  Print this help

Jobs: {}

Example:
  k8analysis run -n sample1 dna_align --input 'gs://bucket/sample1_*.fastq.gz' \\
      --ref-genome 38 --output gs://bucket/sample1.bam",
        JobType::names().join(", ")
    )
}

/// Top-level usage followed by the usage of every command
pub fn detailed() -> String {
    [
        CommandKind::Top,
        CommandKind::Build,
        CommandKind::Push,
        CommandKind::SetDefault,
        CommandKind::Run,
        CommandKind::Version,
    ]
    .into_iter()
    .map(for_command)
    .collect::<Vec<_>>()
    .join("\n\n")
}
