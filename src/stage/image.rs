// src/stage/image.rs

//! Image stage: verbatim copy of static images, followed by the rasterizer
//! collaborator that derives additional sizes from vector sources.
//!
//! The rasterizer is opaque: buildline sequences it strictly after the copy
//! completes and judges it by exit status only.

use anyhow::Result;
use tracing::{debug, info};

use crate::exec;
use crate::stage::AssetClass;
use crate::stage::context::BuildContext;
use crate::stage::copy;

/// Copy all static images into the build directory.
pub fn copy_static(ctx: &BuildContext) -> Result<()> {
    copy::run(ctx, AssetClass::Images)
}

/// Invoke the rasterizer collaborator, if one is configured.
pub async fn rasterize(ctx: &BuildContext) -> Result<()> {
    match &ctx.images.raster_cmd {
        Some(cmd) => {
            info!(cmd = %cmd, "rasterizing vector images");
            exec::run_hook(cmd).await
        }
        None => {
            debug!("no rasterizer configured; skipping");
            Ok(())
        }
    }
}
