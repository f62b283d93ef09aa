use tracing::info;

use crate::cli::parse::NameArgs;
use crate::commands::Context;
use crate::error::Result;
use crate::image::ImageRef;

/// Build `args.name` from the repository directory.
pub async fn execute(ctx: &Context, args: &NameArgs) -> Result<ImageRef> {
    let image = ImageRef::parse(&args.name)?;
    info!("Building {} from {}", image, ctx.config.paths.repo_dir.display());

    ctx.engine.build(&image, &ctx.config.paths.repo_dir).await?;

    ctx.output.success(&format!("Built image {}", image));
    ctx.output
        .hint(&format!("Push it with: k8analysis push -n {}", image));
    Ok(image)
}
