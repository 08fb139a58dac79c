use std::error::Error;
use std::path::PathBuf;

use buildline::config::model::ConfigFile;
use buildline::config::{load_and_validate, validate_config};

type TestResult = Result<(), Box<dyn Error>>;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

#[test]
fn manifest_overrides_merge_with_section_defaults() -> TestResult {
    let cfg = load_and_validate(fixture("manifest.toml"))?;

    assert_eq!(cfg.package.product_name, "Demo Player");
    assert_eq!(cfg.package.api_version, "3");

    assert_eq!(cfg.build.build_dir, "out");
    assert_eq!(cfg.build.on_error, "abort");
    assert_eq!(cfg.build.queue_length, 2);
    assert!(cfg.build.use_hash);
    // Untouched field keeps its default.
    assert_eq!(cfg.build.while_running, "queue");

    assert_eq!(cfg.styles.bundle, "app.css");
    assert_eq!(cfg.styles.src_dir, "src/assets/less");

    assert_eq!(cfg.fonts.src_dir, "third_party/fonts");
    assert!(!cfg.fonts.watch);

    assert_eq!(cfg.images.raster_cmd.as_deref(), Some("scripts/raster.sh"));
    Ok(())
}

#[test]
fn default_manifest_validates() -> TestResult {
    validate_config(&ConfigFile::default())?;
    Ok(())
}

#[test]
fn invalid_on_error_policy_is_rejected() {
    let mut cfg = ConfigFile::default();
    cfg.build.on_error = "retry".to_string();
    assert!(validate_config(&cfg).is_err());
}

#[test]
fn zero_queue_length_is_rejected() {
    let mut cfg = ConfigFile::default();
    cfg.build.queue_length = 0;
    assert!(validate_config(&cfg).is_err());
}

#[test]
fn empty_version_is_rejected() {
    let mut cfg = ConfigFile::default();
    cfg.package.version = "  ".to_string();
    assert!(validate_config(&cfg).is_err());
}

#[test]
fn bad_source_glob_is_rejected() {
    let mut cfg = ConfigFile::default();
    cfg.scripts.src = vec!["src/[".to_string()];
    assert!(validate_config(&cfg).is_err());
}

#[test]
fn missing_manifest_path_errors_for_strict_load() {
    assert!(load_and_validate(fixture("does-not-exist.toml")).is_err());
}
