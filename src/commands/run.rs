//! Job submission

use tracing::info;

use crate::cli::parse::RunArgs;
use crate::cluster::{manifest, JobManifestBuilder, KubeName};
use crate::commands::Context;
use crate::error::Result;
use crate::image::ImageRef;
use crate::jobs::JobType;

/// What was handed to the cluster
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub name: KubeName,
    pub image: String,
    pub run_id: String,
    pub jobs: Vec<JobType>,
}

/// Check the job arguments, then submit them as a Kubernetes job.
///
/// Every step is fatal. Nothing reaches the cluster unless the job name is
/// usable, the dry run passed and an image could be resolved.
pub async fn execute(ctx: &Context, args: &RunArgs) -> Result<Submission> {
    let name = KubeName::from_job_name(&args.job_name)?;
    if name.as_str() != args.job_name {
        info!("Job name {} is submitted as {}", args.job_name, name);
    }

    let report = ctx.dry_run.validate(&args.arguments).await?;
    let jobs = report.job_types();
    info!(
        "Dry run passed for {}",
        jobs.iter().map(JobType::name).collect::<Vec<_>>().join(", ")
    );

    let image = match &args.docker_image {
        Some(image) => image.clone(),
        None => ctx.store.read()?,
    };
    let image = ImageRef::parse(&image)?;
    info!("Using image {}", image);

    ctx.cluster.refresh_credentials().await?;

    let job = JobManifestBuilder::new(&name, image.as_str(), &args.arguments, &ctx.config.job)
        .namespace(ctx.config.cluster.namespace.as_deref())
        .build();
    let run_id = manifest::run_id(&job).unwrap_or_default().to_string();

    ctx.cluster.submit(&job).await?;

    ctx.output.success(&format!("Submitted job {}", name));
    ctx.output.summary(
        "Submission",
        &[
            ("Job", name.to_string()),
            ("Run id", run_id.clone()),
            ("Image", image.to_string()),
            ("Arguments", args.arguments.to_string()),
        ],
    );

    Ok(Submission {
        name,
        image: image.to_string(),
        run_id,
        jobs,
    })
}
