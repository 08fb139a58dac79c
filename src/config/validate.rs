// src/config/validate.rs

use std::str::FromStr;

use anyhow::{Context, Result, anyhow};
use globset::Glob;

use crate::config::model::ConfigFile;
use crate::engine::TriggerWhileRunningBehaviour;
use crate::errors::FailurePolicy;

/// Run semantic validation against a loaded manifest.
///
/// This checks:
/// - `[build].on_error` is valid ("continue" or "abort")
/// - `[build].while_running` is valid ("queue" or "cancel")
/// - `[build].queue_length >= 1`
/// - `build_dir` is non-empty
/// - `[package].version` is non-empty
/// - every source/exclude/clean glob compiles
/// - the style bundle name is non-empty
pub fn validate_config(cfg: &ConfigFile) -> Result<()> {
    validate_build_section(cfg)?;
    validate_package(cfg)?;
    validate_globs(cfg)?;
    Ok(())
}

fn validate_build_section(cfg: &ConfigFile) -> Result<()> {
    FailurePolicy::from_str(&cfg.build.on_error)
        .map_err(|e| anyhow!(e))
        .context("invalid [build].on_error")?;

    TriggerWhileRunningBehaviour::from_str(&cfg.build.while_running)
        .map_err(|e| anyhow!(e))
        .context("invalid [build].while_running")?;

    if cfg.build.queue_length == 0 {
        return Err(anyhow!("[build].queue_length must be >= 1 (got 0)"));
    }

    if cfg.build.build_dir.trim().is_empty() {
        return Err(anyhow!("[build].build_dir must not be empty"));
    }

    Ok(())
}

fn validate_package(cfg: &ConfigFile) -> Result<()> {
    if cfg.package.version.trim().is_empty() {
        return Err(anyhow!("[package].version must not be empty"));
    }
    if cfg.styles.bundle.trim().is_empty() {
        return Err(anyhow!("[styles].bundle must not be empty"));
    }
    Ok(())
}

fn validate_globs(cfg: &ConfigFile) -> Result<()> {
    let mut check = |section: &str, patterns: &[String]| -> Result<()> {
        for pat in patterns {
            Glob::new(pat).with_context(|| format!("invalid glob `{pat}` in [{section}]"))?;
        }
        Ok(())
    };

    check("scripts", &cfg.scripts.src)?;
    check("scripts", &cfg.scripts.exclude)?;
    check("scripts", &cfg.scripts.clean)?;
    check("scripts", &cfg.scripts.clean_exclude)?;

    check("styles", &cfg.styles.src)?;
    check("styles", &cfg.styles.exclude)?;
    if let Some(ref clean) = cfg.styles.clean {
        check("styles", clean)?;
    }
    check("styles", &cfg.styles.clean_exclude)?;

    for (name, class) in [
        ("markup", &cfg.markup),
        ("fonts", &cfg.fonts),
        ("locales", &cfg.locales),
    ] {
        check(name, &class.src)?;
        check(name, &class.exclude)?;
        if let Some(ref clean) = class.clean {
            check(name, clean)?;
        }
        check(name, &class.clean_exclude)?;
    }

    check("images", &cfg.images.src)?;
    check("images", &cfg.images.exclude)?;
    if let Some(ref clean) = cfg.images.clean {
        check("images", clean)?;
    }
    check("images", &cfg.images.clean_exclude)?;

    Ok(())
}
