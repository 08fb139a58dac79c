// src/stage/clean.rs

//! Output cleaning. Runs before a class's build stage so no stale artifact
//! survives into a fresh pass.
//!
//! Deletion is glob-driven and irreversible; exclusion globs win over
//! inclusion globs. Zero matches and a missing build dir are both success.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::stage::context::BuildContext;
use crate::stage::fsutil::{relative_str, walk_files};
use crate::stage::AssetClass;

/// Remove every previous output of `class` from the build directory.
pub fn run(ctx: &BuildContext, class: AssetClass) -> Result<()> {
    let spec = ctx.class(class);

    if !ctx.build_dir.is_dir() {
        debug!(class = %class, "build dir missing; nothing to clean");
        return Ok(());
    }

    let mut removed = 0usize;
    for abs in walk_files(&ctx.build_dir)? {
        let Some(rel) = relative_str(&ctx.build_dir, &abs) else {
            continue;
        };
        if !spec.clean.is_match(&rel) {
            continue;
        }
        if let Some(exclude) = &spec.clean_exclude
            && exclude.is_match(&rel)
        {
            debug!(class = %class, path = %rel, "preserved by clean exclusion");
            continue;
        }

        fs::remove_file(&abs).with_context(|| format!("removing {:?}", abs))?;
        removed += 1;
    }

    debug!(class = %class, removed, "clean pass complete");
    Ok(())
}

/// Remove whole trees (used by `--clean` for the build and dist dirs).
/// Missing paths are success.
pub fn clean_trees<P: AsRef<Path>>(paths: &[P]) -> Result<()> {
    for path in paths {
        let path = path.as_ref();
        match fs::remove_dir_all(path) {
            Ok(()) => info!(path = ?path, "removed"),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = ?path, "already absent");
            }
            Err(err) => {
                return Err(err).with_context(|| format!("removing {:?}", path));
            }
        }
    }
    Ok(())
}
