mod common;

use std::sync::Arc;

use clap::Parser;
use common::{DRY_RUN_PROGRAM, FakeRunner, context, failed, is_manifest_inspect, ok, test_config};
use k8analysis::K8aError;
use k8analysis::cli::parse::{self, Parsed};
use k8analysis::cli::{Cli, NameArgs, RunArgs, Runner};
use k8analysis::commands;
use k8analysis::config::DryRunMode;
use k8analysis::jobs::{JobArguments, JobType};
use serde_json::Value;

fn name(image: &str) -> NameArgs {
    NameArgs {
        name: image.to_string(),
    }
}

fn run_args(tokens: &[&str]) -> RunArgs {
    let tokens: Vec<String> = tokens.iter().map(|t| t.to_string()).collect();
    match parse::parse_run_args(&tokens).unwrap() {
        Parsed::Args(args) => args,
        Parsed::Help => panic!("unexpected help request"),
    }
}

/// Registry answers "present" for every image
fn registry_has_everything() -> Arc<FakeRunner> {
    FakeRunner::succeeding()
}

/// Registry answers "absent" for every image, everything else succeeds
fn registry_is_empty() -> Arc<FakeRunner> {
    FakeRunner::with(|cmd| {
        if is_manifest_inspect(cmd) {
            failed(1, "no such manifest")
        } else {
            ok("")
        }
    })
}

#[tokio::test]
async fn test_build_runs_docker_build_in_repo_dir() {
    let repo = tempfile::tempdir().unwrap();
    let runner = FakeRunner::succeeding();
    let ctx = context(test_config(repo.path()), runner.clone());

    commands::build::execute(&ctx, &name("eu.gcr.io/p/k8analysis:v1"))
        .await
        .unwrap();

    let calls = runner.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].program, "docker");
    assert_eq!(
        calls[0].args,
        vec![
            "build".to_string(),
            "-t".to_string(),
            "eu.gcr.io/p/k8analysis:v1".to_string(),
            repo.path().to_string_lossy().to_string(),
        ]
    );
    // build output streams to the terminal
    assert!(!calls[0].capture);
}

#[tokio::test]
async fn test_build_failure_is_fatal() {
    let repo = tempfile::tempdir().unwrap();
    let runner = FakeRunner::with(|_| failed(1, "Dockerfile not found"));
    let ctx = context(test_config(repo.path()), runner);

    let err = commands::build::execute(&ctx, &name("k8analysis:v1"))
        .await
        .unwrap_err();
    assert!(matches!(err, K8aError::Tool { .. }));
}

#[tokio::test]
async fn test_invalid_image_name_touches_nothing() {
    let repo = tempfile::tempdir().unwrap();
    let runner = FakeRunner::succeeding();
    let ctx = context(test_config(repo.path()), runner.clone());

    let err = commands::push::execute(&ctx, &name("Bad Image:v1"))
        .await
        .unwrap_err();
    assert!(matches!(err, K8aError::Validation(_)));
    assert!(runner.calls().is_empty());
}

#[tokio::test]
async fn test_push_refuses_existing_image() {
    let repo = tempfile::tempdir().unwrap();
    let runner = registry_has_everything();
    let ctx = context(test_config(repo.path()), runner.clone());

    let err = commands::push::execute(&ctx, &name("eu.gcr.io/p/k8analysis:v1"))
        .await
        .unwrap_err();

    assert!(matches!(err, K8aError::Precondition(_)));
    assert!(err.to_string().contains("new tag"));
    assert_eq!(
        runner.command_lines(),
        vec!["docker manifest inspect eu.gcr.io/p/k8analysis:v1"]
    );
}

#[tokio::test]
async fn test_push_stops_when_registry_lookup_fails() {
    let repo = tempfile::tempdir().unwrap();
    let runner = FakeRunner::with(|cmd| {
        if is_manifest_inspect(cmd) {
            failed(1, "unauthorized: authentication required")
        } else {
            ok("")
        }
    });
    let ctx = context(test_config(repo.path()), runner.clone());

    let err = commands::push::execute(&ctx, &name("eu.gcr.io/p/k8analysis:v2"))
        .await
        .unwrap_err();

    match err {
        K8aError::Tool { stderr, .. } => assert!(stderr.contains("unauthorized")),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(
        runner.command_lines(),
        vec!["docker manifest inspect eu.gcr.io/p/k8analysis:v2"]
    );
}

#[tokio::test]
async fn test_set_default_stops_when_registry_lookup_fails() {
    let repo = tempfile::tempdir().unwrap();
    let runner = FakeRunner::with(|_| failed(1, "dial tcp: lookup eu.gcr.io: no such host"));
    let ctx = context(test_config(repo.path()), runner);

    let err = commands::set_default::execute(&ctx, &name("eu.gcr.io/p/k8analysis:v2"))
        .await
        .unwrap_err();

    assert!(matches!(err, K8aError::Tool { .. }));
    assert!(!repo.path().join("default_image.txt").exists());
}

#[tokio::test]
async fn test_push_new_image() {
    let repo = tempfile::tempdir().unwrap();
    let runner = registry_is_empty();
    let ctx = context(test_config(repo.path()), runner.clone());

    commands::push::execute(&ctx, &name("eu.gcr.io/p/k8analysis:v2"))
        .await
        .unwrap();

    assert_eq!(
        runner.command_lines(),
        vec![
            "docker manifest inspect eu.gcr.io/p/k8analysis:v2",
            "docker push eu.gcr.io/p/k8analysis:v2",
        ]
    );
}

#[tokio::test]
async fn test_set_default_rejects_absent_image() {
    let repo = tempfile::tempdir().unwrap();
    let default_file = repo.path().join("default_image.txt");
    std::fs::write(&default_file, "eu.gcr.io/p/k8analysis:v1\n").unwrap();

    let ctx = context(test_config(repo.path()), registry_is_empty());
    let err = commands::set_default::execute(&ctx, &name("eu.gcr.io/p/k8analysis:v9"))
        .await
        .unwrap_err();

    assert!(matches!(err, K8aError::Precondition(_)));
    assert_eq!(
        std::fs::read_to_string(&default_file).unwrap(),
        "eu.gcr.io/p/k8analysis:v1\n"
    );
}

#[tokio::test]
async fn test_set_default_then_version() {
    let repo = tempfile::tempdir().unwrap();
    let ctx = context(test_config(repo.path()), registry_has_everything());

    commands::set_default::execute(&ctx, &name("eu.gcr.io/p/k8analysis:v3"))
        .await
        .unwrap();

    assert_eq!(
        commands::version::execute(&ctx).unwrap(),
        "eu.gcr.io/p/k8analysis:v3"
    );
}

#[tokio::test]
async fn test_version_without_default_image() {
    let repo = tempfile::tempdir().unwrap();
    let ctx = context(test_config(repo.path()), FakeRunner::succeeding());

    let err = commands::version::execute(&ctx).unwrap_err();
    assert!(matches!(err, K8aError::NoDefaultImage { .. }));
}

#[tokio::test]
async fn test_run_submits_job() {
    let repo = tempfile::tempdir().unwrap();
    std::fs::write(
        repo.path().join("default_image.txt"),
        "eu.gcr.io/p/k8analysis:v1\n",
    )
    .unwrap();
    let runner = FakeRunner::succeeding();
    let ctx = context(test_config(repo.path()), runner.clone());

    let submission = commands::run::execute(
        &ctx,
        &run_args(&[
            "--job_name",
            "test1",
            "dna_align",
            "--input",
            "a.fastq",
            "--output",
            "b.bam",
        ]),
    )
    .await
    .unwrap();

    assert_eq!(submission.name.as_str(), "test1");
    assert_eq!(submission.image, "eu.gcr.io/p/k8analysis:v1");
    assert_eq!(submission.jobs, vec![JobType::DnaAlign]);
    assert!(!submission.run_id.is_empty());

    let calls = runner.calls();
    assert_eq!(runner.programs(), vec![DRY_RUN_PROGRAM, "gcloud", "kubectl"]);
    // the dry-run script resolves its paths from the repository
    assert_eq!(calls[0].current_dir.as_deref(), Some(repo.path()));
    assert_eq!(calls[1].current_dir, None);
    assert_eq!(calls[2].current_dir, None);
    assert_eq!(
        calls[0].args,
        vec!["dna_align", "--input", "a.fastq", "--output", "b.bam"]
    );
    assert_eq!(
        calls[1].args,
        vec![
            "container",
            "clusters",
            "get-credentials",
            "k8analysis-cluster",
            "--region",
            "europe-west4",
            "--project",
            "k8analysis",
        ]
    );
    assert_eq!(calls[2].args, vec!["create", "-f", "-"]);

    let manifest: Value = serde_json::from_str(calls[2].stdin.as_deref().unwrap()).unwrap();
    assert_eq!(manifest["kind"], "Job");
    assert_eq!(manifest["metadata"]["name"], "test1");
    assert_eq!(
        manifest["metadata"]["labels"]["k8analysis/run-id"],
        submission.run_id.as_str()
    );
    let container = &manifest["spec"]["template"]["spec"]["containers"][0];
    assert_eq!(container["image"], "eu.gcr.io/p/k8analysis:v1");
    assert_eq!(
        container["args"],
        serde_json::json!(["dna_align --input a.fastq --output b.bam"])
    );
}

#[tokio::test]
async fn test_run_with_image_override_and_namespace() {
    let repo = tempfile::tempdir().unwrap();
    let runner = FakeRunner::succeeding();
    let mut config = test_config(repo.path());
    config.cluster.namespace = Some("analysis".to_string());
    let ctx = context(config, runner.clone());

    // no default image stored; the override is enough
    let submission = commands::run::execute(
        &ctx,
        &run_args(&["-n", "My_Job.Name", "-d", "eu.gcr.io/p/k8analysis:v7", "flagstat"]),
    )
    .await
    .unwrap();

    assert_eq!(submission.name.as_str(), "my-job-name");
    assert_eq!(submission.image, "eu.gcr.io/p/k8analysis:v7");

    let calls = runner.calls();
    let submit = calls.last().unwrap();
    assert_eq!(submit.args, vec!["create", "-f", "-", "--namespace", "analysis"]);
    let manifest: Value = serde_json::from_str(submit.stdin.as_deref().unwrap()).unwrap();
    assert_eq!(manifest["metadata"]["namespace"], "analysis");
    assert_eq!(
        manifest["spec"]["template"]["spec"]["containers"][0]["image"],
        "eu.gcr.io/p/k8analysis:v7"
    );
}

#[tokio::test]
async fn test_failed_dry_run_stops_before_cluster() {
    let repo = tempfile::tempdir().unwrap();
    std::fs::write(repo.path().join("default_image.txt"), "k8analysis:v1").unwrap();
    let runner = FakeRunner::with(|cmd| {
        if cmd.program == DRY_RUN_PROGRAM {
            failed(2, "dna_align: --output is required")
        } else {
            ok("")
        }
    });
    let ctx = context(test_config(repo.path()), runner.clone());

    let err = commands::run::execute(&ctx, &run_args(&["-n", "job", "dna_align", "--input", "x"]))
        .await
        .unwrap_err();

    match err {
        K8aError::DryRun(detail) => assert!(detail.contains("--output is required")),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(runner.programs(), vec![DRY_RUN_PROGRAM]);
}

#[tokio::test]
async fn test_unusable_job_name_runs_nothing() {
    let repo = tempfile::tempdir().unwrap();
    std::fs::write(repo.path().join("default_image.txt"), "k8analysis:v1").unwrap();
    let runner = FakeRunner::succeeding();
    let ctx = context(test_config(repo.path()), runner.clone());

    let err = commands::run::execute(&ctx, &run_args(&["-n", "my job", "flagstat"]))
        .await
        .unwrap_err();

    assert!(matches!(err, K8aError::Validation(_)));
    assert!(!runner.programs().iter().any(|p| p == "gcloud"));
    assert!(runner.calls().is_empty());
}

#[tokio::test]
async fn test_run_without_default_image_stops_before_cluster() {
    let repo = tempfile::tempdir().unwrap();
    let runner = FakeRunner::succeeding();
    let ctx = context(test_config(repo.path()), runner.clone());

    let err = commands::run::execute(&ctx, &run_args(&["-n", "job", "flagstat"]))
        .await
        .unwrap_err();

    assert!(matches!(err, K8aError::NoDefaultImage { .. }));
    assert_eq!(runner.programs(), vec![DRY_RUN_PROGRAM]);
}

#[tokio::test]
async fn test_rejected_submission_reports_existing_job() {
    let repo = tempfile::tempdir().unwrap();
    std::fs::write(repo.path().join("default_image.txt"), "k8analysis:v1").unwrap();
    let runner = FakeRunner::with(|cmd| {
        if cmd.program == "kubectl" {
            failed(
                1,
                "Error from server (AlreadyExists): jobs.batch \"test1\" already exists",
            )
        } else {
            ok("")
        }
    });
    let ctx = context(test_config(repo.path()), runner);

    let err = commands::run::execute(&ctx, &run_args(&["-n", "test1", "flagstat"]))
        .await
        .unwrap_err();
    assert!(matches!(err, K8aError::Precondition(_)));
    assert!(err.to_string().contains("test1"));
}

#[tokio::test]
async fn test_native_dry_run_runs_no_programs_on_bad_arguments() {
    let repo = tempfile::tempdir().unwrap();
    std::fs::write(repo.path().join("default_image.txt"), "k8analysis:v1").unwrap();
    let runner = FakeRunner::succeeding();
    let mut config = test_config(repo.path());
    config.dry_run.mode = DryRunMode::Native;
    let ctx = context(config, runner.clone());

    let err = commands::run::execute(
        &ctx,
        &run_args(&["-n", "job", "dna_align", "--input", "local.fastq.gz"]),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, K8aError::DryRun(_)));
    assert!(runner.calls().is_empty());
}

#[tokio::test]
async fn test_native_dry_run_accepts_valid_pipeline() {
    let repo = tempfile::tempdir().unwrap();
    std::fs::write(repo.path().join("default_image.txt"), "k8analysis:v1").unwrap();
    let runner = FakeRunner::succeeding();
    let mut config = test_config(repo.path());
    config.dry_run.mode = DryRunMode::Native;
    let ctx = context(config, runner.clone());

    let submission = commands::run::execute(
        &ctx,
        &run_args(&[
            "-n",
            "sample1",
            "dna_align",
            "--input",
            "gs://bucket/sample1_*.fastq.gz",
            "--ref-genome",
            "38",
            "--output",
            "gs://bucket/sample1.bam",
            "flagstat",
            "-i",
            "gs://bucket/sample1.bam",
            "-o",
            "gs://bucket/sample1.flagstat",
        ]),
    )
    .await
    .unwrap();

    assert_eq!(submission.jobs, vec![JobType::DnaAlign, JobType::Flagstat]);
    assert_eq!(runner.programs(), vec!["gcloud", "kubectl"]);
}

#[tokio::test]
async fn test_usage_errors_run_no_programs() {
    for argv in [
        vec!["k8analysis", "run", "dna_align", "--input", "a"],
        vec!["k8analysis", "run", "-n", "test1"],
        vec!["k8analysis", "push", "--foo", "--bar"],
        vec!["k8analysis", "build"],
        vec!["k8analysis", "version", "extra"],
        vec!["k8analysis"],
    ] {
        let runner = FakeRunner::succeeding();
        let cli = Cli::try_parse_from(&argv).unwrap();
        let err = Runner::new(cli)
            .with_command_runner(runner.clone())
            .run()
            .await
            .unwrap_err();

        assert!(err.usage().is_some(), "{argv:?} should be a usage error");
        assert!(runner.calls().is_empty(), "{argv:?} ran {:?}", runner.calls());
    }
}

#[tokio::test]
async fn test_help_runs_no_programs() {
    for argv in [
        vec!["k8analysis", "-h"],
        vec!["k8analysis", "build", "--help"],
        vec!["k8analysis", "run", "-h"],
    ] {
        let runner = FakeRunner::succeeding();
        let cli = Cli::try_parse_from(&argv).unwrap();
        Runner::new(cli)
            .with_command_runner(runner.clone())
            .run()
            .await
            .unwrap();
        assert!(runner.calls().is_empty());
    }
}

#[tokio::test]
async fn test_runner_with_config_file() {
    let repo = tempfile::tempdir().unwrap();
    std::fs::write(repo.path().join("current_image"), "eu.gcr.io/p/k8analysis:v5\n").unwrap();
    let config_path = repo.path().join("k8analysis.toml");
    std::fs::write(
        &config_path,
        format!(
            "[paths]\nrepo_dir = {:?}\ndefault_image_file = \"current_image\"\n\n[dry_run]\nmode = \"native\"\n",
            repo.path().to_string_lossy()
        ),
    )
    .unwrap();

    let runner = FakeRunner::succeeding();
    let cli = Cli::try_parse_from([
        "k8analysis",
        "-q",
        "--config",
        config_path.to_str().unwrap(),
        "run",
        "-n",
        "sample1",
        "flagstat",
        "--input",
        "gs://bucket/a.bam",
        "--output",
        "gs://bucket/a.flagstat",
    ])
    .unwrap();
    Runner::new(cli)
        .with_command_runner(runner.clone())
        .run()
        .await
        .unwrap();

    let calls = runner.calls();
    assert_eq!(runner.programs(), vec!["gcloud", "kubectl"]);
    let manifest: Value = serde_json::from_str(calls[1].stdin.as_deref().unwrap()).unwrap();
    assert_eq!(
        manifest["spec"]["template"]["spec"]["containers"][0]["image"],
        "eu.gcr.io/p/k8analysis:v5"
    );
}

#[test]
fn test_job_arguments_are_forwarded_verbatim() {
    let args = run_args(&["-n", "x", "umi_dedup", "--input", "gs://b/in.bam", "--output", "gs://b/out.bam"]);
    assert_eq!(
        args.arguments,
        JobArguments::from_tokens(["umi_dedup --input gs://b/in.bam --output gs://b/out.bam"]).unwrap()
    );
}
