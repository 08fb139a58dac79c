use std::error::Error;
use std::fs;

use buildline::config::model::ConfigFile;
use buildline::stage::style::{self, minify_css};
use buildline::stage::BuildContext;

type TestResult = Result<(), Box<dyn Error>>;

#[test]
fn minify_strips_comments_and_whitespace() {
    let source = "/* banner */\na {\n  color: red;\n}\n";
    assert_eq!(minify_css(source), "a{color:red}");
}

#[test]
fn minify_keeps_descendant_selector_space() {
    assert_eq!(minify_css("div p { margin: 0; }"), "div p{margin:0}");
}

#[test]
fn minify_preserves_string_literals() {
    let source = "a::before { content: \"  spaced  \"; }";
    assert_eq!(minify_css(source), "a::before{content:\"  spaced  \"}");
}

#[tokio::test]
async fn bundle_concatenates_minified_sources_in_order() -> TestResult {
    let tmp = tempfile::tempdir()?;
    let less_dir = tmp.path().join("src/assets/less");
    fs::create_dir_all(&less_dir)?;
    fs::write(less_dir.join("a.less"), "a {\n  color: red;\n}\n")?;
    fs::write(less_dir.join("b.less"), "b {\n  color: blue;\n}\n")?;

    let cfg = ConfigFile::default();
    let ctx = BuildContext::from_config(tmp.path(), &cfg)?;

    style::run(&ctx).await?;

    let bundle = fs::read_to_string(ctx.build_dir.join("assets/css/core.css"))?;
    let a = bundle.find("a{color:red}").expect("rule set from a.less");
    let b = bundle.find("b{color:blue}").expect("rule set from b.less");
    assert!(a < b, "sorted source order must be preserved");
    Ok(())
}

#[tokio::test]
async fn empty_source_set_produces_empty_bundle() -> TestResult {
    let tmp = tempfile::tempdir()?;
    let cfg = ConfigFile::default();
    let ctx = BuildContext::from_config(tmp.path(), &cfg)?;

    style::run(&ctx).await?;

    let bundle = fs::read_to_string(ctx.build_dir.join("assets/css/core.css"))?;
    assert!(bundle.is_empty());
    Ok(())
}
