// src/stage/context.rs

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result, anyhow};
use globset::GlobSet;

use crate::config::model::{ClassSection, ConfigFile, PackageSection};
use crate::errors::FailurePolicy;
use crate::stage::AssetClass;
use crate::stage::fsutil::build_globset;

/// Compiled, per-class view of the manifest: where sources live, where output
/// goes, and what the clean pass may delete.
#[derive(Debug, Clone)]
pub struct ClassSpec {
    pub class: AssetClass,
    /// Source root, relative to the project root.
    pub src_dir: String,
    /// Source globs, evaluated against paths relative to `src_dir`.
    pub sources: GlobSet,
    pub exclude: Option<GlobSet>,
    /// Output directory relative to the build dir (may be empty for the
    /// build root itself).
    pub out: String,
    /// Clean globs, evaluated against paths relative to the build dir.
    pub clean: GlobSet,
    /// A path matching both `clean` and `clean_exclude` is preserved.
    pub clean_exclude: Option<GlobSet>,
    pub watch: bool,
}

#[derive(Debug, Clone)]
pub struct ScriptOptions {
    pub lower_cmd: Option<String>,
    pub inline_env: bool,
}

#[derive(Debug, Clone)]
pub struct StyleOptions {
    pub compile_cmd: Option<String>,
    pub bundle: String,
}

#[derive(Debug, Clone)]
pub struct ImageOptions {
    pub raster_cmd: Option<String>,
}

/// Everything a stage needs to run, derived once from a validated manifest.
///
/// The context is shared read-only across concurrently running stages; all
/// mutable build state lives in the scheduler.
#[derive(Debug)]
pub struct BuildContext {
    pub root: PathBuf,
    pub build_dir: PathBuf,
    pub dist_dir: PathBuf,
    pub package: PackageSection,
    pub policy: FailurePolicy,
    pub use_hash: bool,
    pub classes: BTreeMap<AssetClass, ClassSpec>,
    pub scripts: ScriptOptions,
    pub styles: StyleOptions,
    pub images: ImageOptions,
}

impl BuildContext {
    /// Compile a validated manifest into a build context rooted at `root`.
    pub fn from_config(root: impl Into<PathBuf>, cfg: &ConfigFile) -> Result<Self> {
        let root = root.into();

        let policy = FailurePolicy::from_str(&cfg.build.on_error).map_err(|e| anyhow!(e))?;

        let mut classes = BTreeMap::new();

        classes.insert(
            AssetClass::Scripts,
            compile_class(
                AssetClass::Scripts,
                &cfg.scripts.src_dir,
                &cfg.scripts.src,
                &cfg.scripts.exclude,
                &cfg.scripts.out,
                Some(&cfg.scripts.clean),
                &cfg.scripts.clean_exclude,
                cfg.scripts.watch,
            )?,
        );

        classes.insert(
            AssetClass::Styles,
            compile_class(
                AssetClass::Styles,
                &cfg.styles.src_dir,
                &cfg.styles.src,
                &cfg.styles.exclude,
                &cfg.styles.out,
                cfg.styles.clean.as_deref(),
                &cfg.styles.clean_exclude,
                cfg.styles.watch,
            )?,
        );

        for (class, section) in [
            (AssetClass::Markup, &cfg.markup),
            (AssetClass::Fonts, &cfg.fonts),
            (AssetClass::Locales, &cfg.locales),
        ] {
            classes.insert(class, compile_copy_class(class, section)?);
        }

        classes.insert(
            AssetClass::Images,
            compile_class(
                AssetClass::Images,
                &cfg.images.src_dir,
                &cfg.images.src,
                &cfg.images.exclude,
                &cfg.images.out,
                cfg.images.clean.as_deref(),
                &cfg.images.clean_exclude,
                cfg.images.watch,
            )?,
        );

        Ok(Self {
            root: root.clone(),
            build_dir: root.join(&cfg.build.build_dir),
            dist_dir: root.join(&cfg.build.dist_dir),
            package: cfg.package.clone(),
            policy,
            use_hash: cfg.build.use_hash,
            classes,
            scripts: ScriptOptions {
                lower_cmd: cfg.scripts.lower_cmd.clone(),
                inline_env: cfg.scripts.inline_env,
            },
            styles: StyleOptions {
                compile_cmd: cfg.styles.compile_cmd.clone(),
                bundle: cfg.styles.bundle.clone(),
            },
            images: ImageOptions {
                raster_cmd: cfg.images.raster_cmd.clone(),
            },
        })
    }

    /// Spec for a class. Every class is present by construction.
    pub fn class(&self, class: AssetClass) -> &ClassSpec {
        &self.classes[&class]
    }
}

fn compile_copy_class(class: AssetClass, section: &ClassSection) -> Result<ClassSpec> {
    compile_class(
        class,
        &section.src_dir,
        &section.src,
        &section.exclude,
        &section.out,
        section.clean.as_deref(),
        &section.clean_exclude,
        section.watch,
    )
}

#[allow(clippy::too_many_arguments)]
fn compile_class(
    class: AssetClass,
    src_dir: &str,
    src: &[String],
    exclude: &[String],
    out: &str,
    clean: Option<&[String]>,
    clean_exclude: &[String],
    watch: bool,
) -> Result<ClassSpec> {
    let sources = build_globset(src)
        .with_context(|| format!("building source globset for class {class}"))?;

    let exclude = if exclude.is_empty() {
        None
    } else {
        Some(
            build_globset(exclude)
                .with_context(|| format!("building exclude globset for class {class}"))?,
        )
    };

    // Classes with a dedicated output directory clean that whole subtree by
    // default; classes sharing the build root must spell out their globs.
    let clean_patterns: Vec<String> = match clean {
        Some(patterns) => patterns.to_vec(),
        None => {
            let out = out.trim_matches('/');
            if out.is_empty() {
                return Err(anyhow!(
                    "class {class} writes to the build root and must define explicit clean globs"
                ));
            }
            vec![format!("{out}/**")]
        }
    };

    let clean = build_globset(&clean_patterns)
        .with_context(|| format!("building clean globset for class {class}"))?;

    let clean_exclude = if clean_exclude.is_empty() {
        None
    } else {
        Some(
            build_globset(clean_exclude)
                .with_context(|| format!("building clean exclude globset for class {class}"))?,
        )
    };

    Ok(ClassSpec {
        class,
        src_dir: src_dir.trim_end_matches('/').to_string(),
        sources,
        exclude,
        out: out.trim_matches('/').to_string(),
        clean,
        clean_exclude,
        watch,
    })
}
