use tracing::info;

use crate::cli::parse::NameArgs;
use crate::commands::Context;
use crate::error::{K8aError, Result};
use crate::image::ImageRef;

/// Record `args.name` as the default image. Only images present in the
/// registry are accepted.
pub async fn execute(ctx: &Context, args: &NameArgs) -> Result<ImageRef> {
    let image = ImageRef::parse(&args.name)?;

    if !ctx.registry.exists(&image).await? {
        return Err(K8aError::Precondition(format!(
            "Image {} does not exist in the registry. Push it first with: k8analysis push -n {}",
            image, image
        )));
    }

    ctx.store.write(&image)?;
    info!("Default image is now {}", image);
    ctx.output.success(&format!("Default image set to {}", image));
    Ok(image)
}
