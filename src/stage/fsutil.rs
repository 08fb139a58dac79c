// src/stage/fsutil.rs

//! Small filesystem helpers shared by the stages: glob compilation, recursive
//! walking and source collection.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::errors::StageError;
use crate::stage::context::ClassSpec;

/// Build a `GlobSet` from simple string patterns.
pub fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob = Glob::new(pat).map_err(|source| StageError::Pattern {
            pattern: pat.clone(),
            source,
        })?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}

/// A source file selected by a class's globs: absolute path plus its path
/// relative to the class source dir, with forward slashes.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub abs: PathBuf,
    pub rel: String,
}

/// Collect every file under `root/src_dir` matching the class's source globs
/// minus its exclusions, sorted by relative path for deterministic output
/// order. A missing source dir yields an empty set.
pub fn collect_sources(root: &Path, spec: &ClassSpec) -> Result<Vec<SourceFile>> {
    let base = root.join(&spec.src_dir);
    if !base.is_dir() {
        return Ok(Vec::new());
    }

    let mut out = Vec::new();
    for abs in walk_files(&base)? {
        let Some(rel) = relative_str(&base, &abs) else {
            continue;
        };
        if !spec.sources.is_match(&rel) {
            continue;
        }
        if let Some(exclude) = &spec.exclude
            && exclude.is_match(&rel)
        {
            continue;
        }
        out.push(SourceFile { abs, rel });
    }

    out.sort_by(|a, b| a.rel.cmp(&b.rel));
    Ok(out)
}

/// Recursively list all regular files under `root`.
pub fn walk_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut stack = vec![root.to_path_buf()];

    while let Some(dir) = stack.pop() {
        let entries = fs::read_dir(&dir).map_err(|source| StageError::io(&dir, source))?;
        for entry in entries {
            let entry = entry.map_err(|source| StageError::io(&dir, source))?;
            let path = entry.path();
            let file_type = entry
                .file_type()
                .map_err(|source| StageError::io(&path, source))?;
            if file_type.is_dir() {
                stack.push(path);
            } else if file_type.is_file() {
                files.push(path);
            }
        }
    }

    Ok(files)
}

/// Convert a path into a string relative to `root`, with forward slashes.
///
/// Returns `None` if the path is not under `root`.
pub fn relative_str(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    Some(rel.to_string_lossy().replace('\\', "/"))
}

/// Write `contents` to `path`, creating parent directories as needed.
pub fn write_file(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| StageError::io(parent, source))?;
    }
    fs::write(path, contents).map_err(|source| StageError::io(path, source))?;
    Ok(())
}
