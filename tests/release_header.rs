use std::error::Error;
use std::fs;

use buildline::config::model::{ConfigFile, PackageSection};
use buildline::stage::header::{self, render_header};
use buildline::stage::BuildContext;
use chrono::{TimeZone, Utc};

type TestResult = Result<(), Box<dyn Error>>;

fn package() -> PackageSection {
    PackageSection {
        product_name: "X".to_string(),
        version: "1.2.3".to_string(),
        api_version: "2".to_string(),
        author: "Jane Doe".to_string(),
    }
}

#[test]
fn header_fields_appear_in_fixed_order() {
    let now = Utc.with_ymd_and_hms(2026, 8, 25, 12, 0, 0).unwrap();
    let header = render_header(&package(), now);

    // Content lines between the comment delimiters, skipping blanks.
    let lines: Vec<&str> = header
        .lines()
        .filter(|l| !l.trim().is_empty() && !l.starts_with("/*") && !l.starts_with("*/"))
        .collect();

    assert_eq!(lines[0], "X");
    assert_eq!(lines[1], "Version: v1.2.3");
    assert_eq!(lines[2], "API Version: v2");
    assert!(lines[3].starts_with("Compiled: "));
    assert_eq!(lines[4], "Copyright (C) 2026 Jane Doe");
    assert!(lines[5].contains("MIT license"));
}

#[test]
fn stamping_prepends_header_to_every_script_artifact() -> TestResult {
    let tmp = tempfile::tempdir()?;
    let mut cfg = ConfigFile::default();
    cfg.package = package();
    let ctx = BuildContext::from_config(tmp.path(), &cfg)?;

    fs::create_dir_all(ctx.build_dir.join("renderer"))?;
    fs::create_dir_all(ctx.build_dir.join("assets/css"))?;
    fs::write(ctx.build_dir.join("main.js"), "run();\n")?;
    fs::write(ctx.build_dir.join("renderer/app.js"), "boot();\n")?;
    fs::write(ctx.build_dir.join("assets/css/core.css"), "a{color:red}")?;

    header::run(&ctx)?;

    let main = fs::read_to_string(ctx.build_dir.join("main.js"))?;
    let app = fs::read_to_string(ctx.build_dir.join("renderer/app.js"))?;
    let css = fs::read_to_string(ctx.build_dir.join("assets/css/core.css"))?;

    assert!(main.starts_with("/*!\nX\nVersion: v1.2.3\nAPI Version: v2\n"));
    assert!(main.ends_with("run();\n"));
    assert!(app.starts_with("/*!\n"));
    assert_eq!(css, "a{color:red}", "non-script artifacts are not stamped");
    Ok(())
}

#[test]
fn stamping_with_missing_build_dir_succeeds() -> TestResult {
    let tmp = tempfile::tempdir()?;
    let ctx = BuildContext::from_config(tmp.path(), &ConfigFile::default())?;
    header::run(&ctx)?;
    Ok(())
}
