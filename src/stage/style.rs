// src/stage/style.rs

//! Style build stage: per-file preprocessor compilation (external filter
//! command), minification, and concatenation into a single bundle artifact.
//!
//! Outputs are concatenated in sorted source order, so the bundle content is
//! deterministic for a given source tree.

use std::fs;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::exec;
use crate::stage::AssetClass;
use crate::stage::context::BuildContext;
use crate::stage::fsutil::{collect_sources, write_file};

/// Minify plain stylesheet syntax: strip comments, collapse whitespace and
/// drop redundant separators. String literals are preserved verbatim.
pub fn minify_css(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();
    let mut in_string: Option<char> = None;

    while let Some(c) = chars.next() {
        if let Some(quote) = in_string {
            out.push(c);
            if c == quote {
                in_string = None;
            }
            continue;
        }

        match c {
            '"' | '\'' => {
                in_string = Some(c);
                out.push(c);
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                // Skip to the end of the comment.
                let mut prev = '\0';
                for c in chars.by_ref() {
                    if prev == '*' && c == '/' {
                        break;
                    }
                    prev = c;
                }
            }
            c if c.is_whitespace() => {
                while chars.peek().is_some_and(|c| c.is_whitespace()) {
                    chars.next();
                }
                // Whitespace is only significant between identifier-ish
                // characters (selectors like `div p`).
                let prev = out.chars().last();
                let next = chars.peek().copied();
                let keep = prev.is_some_and(|p| p.is_alphanumeric() || p == '*' || p == ')')
                    && next.is_some_and(|n| n.is_alphanumeric() || n == '*' || n == '.' || n == '#');
                if keep {
                    out.push(' ');
                }
            }
            '{' | '}' | ':' | ';' | ',' => {
                while out.ends_with(' ') {
                    out.pop();
                }
                // Final semicolon before a closing brace is redundant.
                if c == '}' && out.ends_with(';') {
                    out.pop();
                }
                out.push(c);
            }
            _ => out.push(c),
        }
    }

    out.trim().to_string()
}

pub async fn run(ctx: &BuildContext) -> Result<()> {
    let spec = ctx.class(AssetClass::Styles);
    let sources = collect_sources(&ctx.root, spec)?;

    let mut bundle = String::new();
    for file in &sources {
        let text = fs::read_to_string(&file.abs)
            .with_context(|| format!("reading style source {:?}", file.abs))?;

        let compiled = match &ctx.styles.compile_cmd {
            Some(cmd) => exec::run_filter(cmd, &text)
                .await
                .with_context(|| format!("compiling {}", file.rel))?,
            None => text,
        };

        debug!(path = %file.rel, "minifying style source");
        bundle.push_str(&minify_css(&compiled));
    }

    let dest = ctx.build_dir.join(&spec.out).join(&ctx.styles.bundle);
    write_file(&dest, bundle.as_bytes())?;

    info!(
        files = sources.len(),
        bundle = %ctx.styles.bundle,
        "style stage complete"
    );
    Ok(())
}
