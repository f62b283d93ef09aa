use crate::commands::Context;
use crate::error::Result;

/// Print the default image.
pub fn execute(ctx: &Context) -> Result<String> {
    let image = ctx.store.read()?;
    ctx.output.result(&image);
    Ok(image)
}
