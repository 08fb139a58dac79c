use std::error::Error;
use std::fs;

use buildline::config::model::ConfigFile;
use buildline::stage::{AssetClass, BuildContext};
use buildline::watch::{build_watch_profiles, compute_class_hash, load_class_hash, save_class_hash};

type TestResult = Result<(), Box<dyn Error>>;

#[test]
fn style_change_routes_to_styles_only() -> TestResult {
    let tmp = tempfile::tempdir()?;
    let ctx = BuildContext::from_config(tmp.path(), &ConfigFile::default())?;
    let profiles = build_watch_profiles(&ctx);

    let changed = "src/assets/less/theme.less";
    let matching: Vec<AssetClass> = profiles
        .iter()
        .filter(|p| p.matches(changed))
        .map(|p| p.class())
        .collect();

    assert_eq!(matching, vec![AssetClass::Styles]);
    Ok(())
}

#[test]
fn script_change_routes_to_scripts_only() -> TestResult {
    let tmp = tempfile::tempdir()?;
    let ctx = BuildContext::from_config(tmp.path(), &ConfigFile::default())?;
    let profiles = build_watch_profiles(&ctx);

    let matching: Vec<AssetClass> = profiles
        .iter()
        .filter(|p| p.matches("src/renderer/app.js"))
        .map(|p| p.class())
        .collect();

    assert_eq!(matching, vec![AssetClass::Scripts]);
    Ok(())
}

#[test]
fn fonts_do_not_participate_in_watch_mode() -> TestResult {
    let tmp = tempfile::tempdir()?;
    let ctx = BuildContext::from_config(tmp.path(), &ConfigFile::default())?;
    let profiles = build_watch_profiles(&ctx);

    assert!(profiles.iter().all(|p| p.class() != AssetClass::Fonts));
    Ok(())
}

#[test]
fn paths_outside_any_source_dir_match_nothing() -> TestResult {
    let tmp = tempfile::tempdir()?;
    let ctx = BuildContext::from_config(tmp.path(), &ConfigFile::default())?;
    let profiles = build_watch_profiles(&ctx);

    for rel in ["build/app.js", "build/assets/css/core.css", ".buildline/hashes"] {
        assert!(profiles.iter().all(|p| !p.matches(rel)), "{rel} must not route");
    }
    Ok(())
}

#[test]
fn class_hash_is_stable_until_sources_change() -> TestResult {
    let tmp = tempfile::tempdir()?;
    let less_dir = tmp.path().join("src/assets/less");
    fs::create_dir_all(&less_dir)?;
    fs::write(less_dir.join("a.less"), "a{color:red}")?;

    let ctx = BuildContext::from_config(tmp.path(), &ConfigFile::default())?;
    let spec = ctx.class(AssetClass::Styles);

    let first = compute_class_hash(&ctx.root, spec)?;
    assert_eq!(first, compute_class_hash(&ctx.root, spec)?);

    save_class_hash(&ctx.root, "styles", &first)?;
    assert_eq!(load_class_hash(&ctx.root, "styles")?.as_deref(), Some(first.as_str()));

    fs::write(less_dir.join("a.less"), "a{color:blue}")?;
    assert_ne!(first, compute_class_hash(&ctx.root, spec)?);
    Ok(())
}
