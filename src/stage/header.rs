// src/stage/header.rs

//! Release header stamping: prepend a generated comment block to every
//! produced script artifact. Runs only in release builds, after all build
//! stages have completed.

use std::fs;

use anyhow::{Context, Result};
use chrono::{DateTime, Datelike, Utc};
use tracing::{debug, info};

use crate::config::model::PackageSection;
use crate::stage::context::BuildContext;
use crate::stage::fsutil::walk_files;

/// Render the release header comment block.
///
/// Field order is fixed: product name, version, API version, UTC build
/// timestamp, copyright line, license notice.
pub fn render_header(package: &PackageSection, now: DateTime<Utc>) -> String {
    format!(
        "/*!\n{product}\nVersion: v{version}\nAPI Version: v{api}\nCompiled: {compiled}\nCopyright (C) {year} {author}\nThis software may be modified and distributed under the terms of the MIT license.\n*/\n",
        product = package.product_name,
        version = package.version,
        api = package.api_version,
        compiled = now.to_rfc2822(),
        year = now.year(),
        author = package.author,
    )
}

pub fn run(ctx: &BuildContext) -> Result<()> {
    if !ctx.build_dir.is_dir() {
        debug!("build dir missing; nothing to stamp");
        return Ok(());
    }

    let header = render_header(&ctx.package, Utc::now());
    let mut stamped = 0usize;

    for path in walk_files(&ctx.build_dir)? {
        if path.extension().and_then(|e| e.to_str()) != Some("js") {
            continue;
        }
        let body =
            fs::read_to_string(&path).with_context(|| format!("reading artifact {:?}", path))?;
        let mut out = String::with_capacity(header.len() + body.len());
        out.push_str(&header);
        out.push_str(&body);
        fs::write(&path, out).with_context(|| format!("stamping {:?}", path))?;
        stamped += 1;
    }

    info!(artifacts = stamped, "release header stamped");
    Ok(())
}
