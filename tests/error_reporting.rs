use buildline::errors::StageError;
use buildline::stage::fsutil::{build_globset, walk_files, write_file};

#[test]
fn invalid_pattern_surfaces_as_pattern_error() {
    let err = build_globset(&["src/[".to_string()]).unwrap_err();
    match err.downcast_ref::<StageError>() {
        Some(StageError::Pattern { pattern, .. }) => assert_eq!(pattern, "src/["),
        other => panic!("expected pattern error, got {other:?}"),
    }
}

#[test]
fn unreadable_directory_surfaces_as_io_error_with_path() {
    let tmp = tempfile::tempdir().unwrap();
    let missing = tmp.path().join("nope");

    let err = walk_files(&missing).unwrap_err();
    match err.downcast_ref::<StageError>() {
        Some(StageError::Io { path, .. }) => assert_eq!(path, &missing),
        other => panic!("expected io error, got {other:?}"),
    }
}

#[test]
fn write_below_a_regular_file_surfaces_as_io_error() {
    let tmp = tempfile::tempdir().unwrap();
    let occupied = tmp.path().join("occupied");
    std::fs::write(&occupied, "x").unwrap();

    // Parent component is a regular file, so directory creation must fail.
    let err = write_file(&occupied.join("child.txt"), b"y").unwrap_err();
    assert!(matches!(
        err.downcast_ref::<StageError>(),
        Some(StageError::Io { .. })
    ));
}

#[cfg(unix)]
#[tokio::test]
async fn failing_filter_surfaces_as_tool_error_with_exit_code() {
    let err = buildline::exec::run_filter("exit 3", "").await.unwrap_err();
    match err.downcast_ref::<StageError>() {
        Some(StageError::Tool { code, .. }) => assert_eq!(*code, 3),
        other => panic!("expected tool error, got {other:?}"),
    }
}
