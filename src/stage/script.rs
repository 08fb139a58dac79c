// src/stage/script.rs

//! Script build stage: optional syntax lowering through an external filter
//! command, then build-time environment inlining.
//!
//! Every source is transformed in memory before anything is written, so a
//! failing file leaves no partial output for the pass.

use std::env;
use std::fs;
use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex::{Captures, Regex};
use tracing::{debug, info};

use crate::exec;
use crate::stage::AssetClass;
use crate::stage::context::BuildContext;
use crate::stage::fsutil::{collect_sources, write_file};

/// Textual pattern for environment references inside script source.
static ENV_REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)process\.env\.([A-Za-z_][A-Za-z0-9_]*)").expect("env reference pattern")
});

/// Replace every environment reference with the literal current value of the
/// variable, quoted, or the bare `undefined` token when unset.
///
/// This is a one-shot build-time substitution: no runtime lookup survives in
/// the output, and re-running the pass over its own output is a no-op.
pub fn inline_env(source: &str) -> String {
    ENV_REF
        .replace_all(source, |caps: &Captures<'_>| match env::var(&caps[1]) {
            Ok(value) => format!("'{value}'"),
            Err(_) => "undefined".to_string(),
        })
        .into_owned()
}

pub async fn run(ctx: &BuildContext) -> Result<()> {
    let spec = ctx.class(AssetClass::Scripts);
    let sources = collect_sources(&ctx.root, spec)?;

    let mut outputs = Vec::with_capacity(sources.len());
    for file in &sources {
        let text = fs::read_to_string(&file.abs)
            .with_context(|| format!("reading script source {:?}", file.abs))?;

        let lowered = match &ctx.scripts.lower_cmd {
            Some(cmd) => exec::run_filter(cmd, &text)
                .await
                .with_context(|| format!("lowering {}", file.rel))?,
            None => text,
        };

        let inlined = if ctx.scripts.inline_env {
            inline_env(&lowered)
        } else {
            lowered
        };

        outputs.push((file.rel.clone(), inlined));
    }

    let out_root = if spec.out.is_empty() {
        ctx.build_dir.clone()
    } else {
        ctx.build_dir.join(&spec.out)
    };

    for (rel, text) in &outputs {
        let dest = out_root.join(rel);
        debug!(path = %rel, "writing script artifact");
        write_file(&dest, text.as_bytes())?;
    }

    info!(files = outputs.len(), "script stage complete");
    Ok(())
}
