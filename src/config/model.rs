// src/config/model.rs

use serde::Deserialize;

/// Top-level manifest as read from `Buildline.toml`.
///
/// Every section is optional; the defaults describe a conventional project
/// layout:
///
/// ```toml
/// [package]
/// product_name = "My App"
/// version = "1.2.3"
///
/// [build]
/// build_dir = "build"
/// on_error = "continue"
///
/// [styles]
/// src_dir = "src/assets/less"
/// bundle = "core.css"
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    /// Product metadata from `[package]`, used by the release header stamp.
    #[serde(default)]
    pub package: PackageSection,

    /// Global build behaviour from `[build]`.
    #[serde(default)]
    pub build: BuildSection,

    #[serde(default)]
    pub scripts: ScriptSection,

    #[serde(default)]
    pub styles: StyleSection,

    #[serde(default = "ClassSection::markup_default")]
    pub markup: ClassSection,

    #[serde(default = "ClassSection::fonts_default")]
    pub fonts: ClassSection,

    #[serde(default)]
    pub images: ImageSection,

    #[serde(default = "ClassSection::locales_default")]
    pub locales: ClassSection,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            package: PackageSection::default(),
            build: BuildSection::default(),
            scripts: ScriptSection::default(),
            styles: StyleSection::default(),
            markup: ClassSection::markup_default(),
            fonts: ClassSection::fonts_default(),
            images: ImageSection::default(),
            locales: ClassSection::locales_default(),
        }
    }
}

/// `[package]` section: metadata stamped into release artifacts.
#[derive(Debug, Clone, Deserialize)]
pub struct PackageSection {
    #[serde(default = "default_product_name")]
    pub product_name: String,

    #[serde(default = "default_version")]
    pub version: String,

    /// Separately tracked integration API version, stamped alongside the
    /// package version.
    #[serde(default = "default_api_version")]
    pub api_version: String,

    #[serde(default)]
    pub author: String,
}

fn default_product_name() -> String {
    "buildline".to_string()
}

fn default_version() -> String {
    "0.0.0".to_string()
}

fn default_api_version() -> String {
    "1".to_string()
}

impl Default for PackageSection {
    fn default() -> Self {
        Self {
            product_name: default_product_name(),
            version: default_version(),
            api_version: default_api_version(),
            author: String::new(),
        }
    }
}

/// `[build]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct BuildSection {
    /// Root of all build output, relative to the project root.
    #[serde(default = "default_build_dir")]
    pub build_dir: String,

    /// Root of packaged distributables; only touched by `--clean`.
    #[serde(default = "default_dist_dir")]
    pub dist_dir: String,

    /// `"continue"` or `"abort"`.
    ///
    /// - `"continue"` (default): a stage failure is logged through the
    ///   structured failure channel; the run and any watch session go on.
    /// - `"abort"`: the first stage failure stops the runtime with an error.
    #[serde(default = "default_on_error")]
    pub on_error: String,

    /// `"queue"` or `"cancel"`: what to do with triggers that arrive while
    /// a run is active.
    #[serde(default = "default_while_running")]
    pub while_running: String,

    /// Maximum number of queued follow-up runs. The default of 1 gives
    /// single-slot debounce: at most one pending run, however many changes
    /// land mid-run.
    #[serde(default = "default_queue_length")]
    pub queue_length: usize,

    /// Skip watch triggers whose class source set hashes identically to the
    /// previous run.
    #[serde(default)]
    pub use_hash: bool,
}

fn default_build_dir() -> String {
    "build".to_string()
}

fn default_dist_dir() -> String {
    "dist".to_string()
}

fn default_on_error() -> String {
    "continue".to_string()
}

fn default_while_running() -> String {
    "queue".to_string()
}

fn default_queue_length() -> usize {
    1
}

impl Default for BuildSection {
    fn default() -> Self {
        Self {
            build_dir: default_build_dir(),
            dist_dir: default_dist_dir(),
            on_error: default_on_error(),
            while_running: default_while_running(),
            queue_length: default_queue_length(),
            use_hash: false,
        }
    }
}

/// Shared fields for the plain copy classes (`[markup]`, `[fonts]`,
/// `[locales]`).
#[derive(Debug, Clone, Deserialize)]
pub struct ClassSection {
    /// Directory the source globs are evaluated against.
    pub src_dir: String,

    /// Source globs, relative to `src_dir`.
    #[serde(default = "default_all_glob")]
    pub src: Vec<String>,

    /// Exclusion globs, relative to `src_dir`.
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Output directory, relative to `build_dir`.
    pub out: String,

    /// Clean globs, relative to `build_dir`. Defaults to `"{out}/**"`.
    #[serde(default)]
    pub clean: Option<Vec<String>>,

    /// Exclusions for the clean pass; a path matching both is preserved.
    #[serde(default)]
    pub clean_exclude: Vec<String>,

    /// Whether this class participates in watch mode.
    #[serde(default = "default_true")]
    pub watch: bool,
}

fn default_all_glob() -> Vec<String> {
    vec!["**/*".to_string()]
}

fn default_true() -> bool {
    true
}

impl ClassSection {
    pub fn markup_default() -> Self {
        Self {
            src_dir: "src/public_html".to_string(),
            src: vec!["**/*.html".to_string()],
            exclude: Vec::new(),
            out: "public_html".to_string(),
            clean: None,
            clean_exclude: Vec::new(),
            watch: true,
        }
    }

    pub fn fonts_default() -> Self {
        Self {
            src_dir: "vendor/fonts".to_string(),
            src: default_all_glob(),
            exclude: Vec::new(),
            out: "assets/fonts".to_string(),
            clean: None,
            clean_exclude: Vec::new(),
            // Fonts are vendored, not edited during development.
            watch: false,
        }
    }

    pub fn locales_default() -> Self {
        Self {
            src_dir: "src/_locales".to_string(),
            src: vec!["*.json".to_string()],
            exclude: Vec::new(),
            out: "_locales".to_string(),
            clean: None,
            clean_exclude: Vec::new(),
            watch: true,
        }
    }
}

/// `[scripts]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ScriptSection {
    #[serde(default = "default_script_src_dir")]
    pub src_dir: String,

    #[serde(default = "default_script_src")]
    pub src: Vec<String>,

    #[serde(default)]
    pub exclude: Vec<String>,

    /// Scripts land at the root of `build_dir` by default, preserving their
    /// relative structure.
    #[serde(default)]
    pub out: String,

    /// Optional syntax-lowering command. Receives a source file on stdin and
    /// must write the lowered text to stdout.
    #[serde(default)]
    pub lower_cmd: Option<String>,

    /// Apply the build-time `process.env.NAME` substitution pass.
    #[serde(default = "default_true")]
    pub inline_env: bool,

    /// Scripts share the build root with other classes, so the clean pass
    /// needs an explicit include/exclude pair rather than a subtree glob.
    #[serde(default = "default_script_clean")]
    pub clean: Vec<String>,

    #[serde(default = "default_script_clean_exclude")]
    pub clean_exclude: Vec<String>,

    #[serde(default = "default_true")]
    pub watch: bool,
}

fn default_script_src_dir() -> String {
    "src".to_string()
}

fn default_script_src() -> Vec<String> {
    vec!["**/*.js".to_string()]
}

fn default_script_clean() -> Vec<String> {
    vec!["*.js".to_string(), "**/*.js".to_string()]
}

fn default_script_clean_exclude() -> Vec<String> {
    vec!["assets/**".to_string()]
}

impl Default for ScriptSection {
    fn default() -> Self {
        Self {
            src_dir: default_script_src_dir(),
            src: default_script_src(),
            exclude: Vec::new(),
            out: String::new(),
            lower_cmd: None,
            inline_env: true,
            clean: default_script_clean(),
            clean_exclude: default_script_clean_exclude(),
            watch: true,
        }
    }
}

/// `[styles]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct StyleSection {
    #[serde(default = "default_style_src_dir")]
    pub src_dir: String,

    #[serde(default = "default_style_src")]
    pub src: Vec<String>,

    #[serde(default)]
    pub exclude: Vec<String>,

    #[serde(default = "default_style_out")]
    pub out: String,

    /// Name of the single concatenated artifact inside `out`.
    #[serde(default = "default_style_bundle")]
    pub bundle: String,

    /// Optional preprocessor command (stdin → stdout, one file at a time).
    #[serde(default)]
    pub compile_cmd: Option<String>,

    #[serde(default)]
    pub clean: Option<Vec<String>>,

    #[serde(default)]
    pub clean_exclude: Vec<String>,

    #[serde(default = "default_true")]
    pub watch: bool,
}

fn default_style_src_dir() -> String {
    "src/assets/less".to_string()
}

fn default_style_src() -> Vec<String> {
    vec!["**/*.less".to_string()]
}

fn default_style_out() -> String {
    "assets/css".to_string()
}

fn default_style_bundle() -> String {
    "core.css".to_string()
}

impl Default for StyleSection {
    fn default() -> Self {
        Self {
            src_dir: default_style_src_dir(),
            src: default_style_src(),
            exclude: Vec::new(),
            out: default_style_out(),
            bundle: default_style_bundle(),
            compile_cmd: None,
            clean: None,
            clean_exclude: Vec::new(),
            watch: true,
        }
    }
}

/// `[images]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ImageSection {
    #[serde(default = "default_image_src_dir")]
    pub src_dir: String,

    #[serde(default = "default_all_glob")]
    pub src: Vec<String>,

    #[serde(default)]
    pub exclude: Vec<String>,

    #[serde(default = "default_image_out")]
    pub out: String,

    /// Opaque rasterizer collaborator, run strictly after the static copy
    /// completes. No contract beyond its exit status.
    #[serde(default)]
    pub raster_cmd: Option<String>,

    #[serde(default)]
    pub clean: Option<Vec<String>>,

    #[serde(default)]
    pub clean_exclude: Vec<String>,

    #[serde(default = "default_true")]
    pub watch: bool,
}

fn default_image_src_dir() -> String {
    "src/assets/img".to_string()
}

fn default_image_out() -> String {
    "assets/img".to_string()
}

impl Default for ImageSection {
    fn default() -> Self {
        Self {
            src_dir: default_image_src_dir(),
            src: default_all_glob(),
            exclude: Vec::new(),
            out: default_image_out(),
            raster_cmd: None,
            clean: None,
            clean_exclude: Vec::new(),
            watch: true,
        }
    }
}
