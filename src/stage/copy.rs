// src/stage/copy.rs

//! Structure-preserving copy stage used by the markup, font and locale
//! classes. No transformation is applied.

use std::fs;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::stage::AssetClass;
use crate::stage::context::BuildContext;
use crate::stage::fsutil::collect_sources;

pub fn run(ctx: &BuildContext, class: AssetClass) -> Result<()> {
    let spec = ctx.class(class);
    let sources = collect_sources(&ctx.root, spec)?;

    let out_root = if spec.out.is_empty() {
        ctx.build_dir.clone()
    } else {
        ctx.build_dir.join(&spec.out)
    };

    for file in &sources {
        let dest = out_root.join(&file.rel);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating output directory {:?}", parent))?;
        }
        debug!(class = %class, path = %file.rel, "copying");
        fs::copy(&file.abs, &dest)
            .with_context(|| format!("copying {:?} to {:?}", file.abs, dest))?;
    }

    info!(class = %class, files = sources.len(), "copy stage complete");
    Ok(())
}
