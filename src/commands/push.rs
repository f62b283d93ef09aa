use tracing::info;

use crate::cli::parse::NameArgs;
use crate::commands::Context;
use crate::error::{K8aError, Result};
use crate::image::ImageRef;

/// Push `args.name` unless the registry already has it. Pushed tags are
/// never overwritten.
pub async fn execute(ctx: &Context, args: &NameArgs) -> Result<ImageRef> {
    let image = ImageRef::parse(&args.name)?;

    if ctx.registry.exists(&image).await? {
        return Err(K8aError::Precondition(format!(
            "Image {} already exists in the registry. Build the image again under a new tag and push that",
            image
        )));
    }

    info!("{} is not in the registry yet", image);
    ctx.engine.push(&image).await?;

    ctx.output.success(&format!("Pushed image {}", image));
    ctx.output.hint(&format!(
        "To use it for new jobs run: k8analysis set_default -n {}",
        image
    ));
    Ok(image)
}
