// src/watch/hash.rs

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

use anyhow::{Context, Result};
use blake3::Hasher;
use tracing::debug;

use crate::stage::context::ClassSpec;
use crate::stage::fsutil::collect_sources;

/// Location of the stored hashes, relative to the project root.
///
/// The file is a simple line-based mapping:
///
/// ```text
/// scripts <whitespace> hex_hash
/// styles  <whitespace> hex_hash
/// ```
pub const HASH_FILE_REL: &str = ".buildline/hashes";

/// Aggregate content hash over a class's current source set.
///
/// Sources are collected and hashed in sorted relative-path order, so the
/// result is stable for a given tree.
pub fn compute_class_hash(root: &Path, spec: &ClassSpec) -> Result<String> {
    let mut hasher = Hasher::new();

    for file in collect_sources(root, spec)? {
        hasher.update(file.rel.as_bytes());

        let mut f = File::open(&file.abs)
            .with_context(|| format!("opening file for hashing: {:?}", file.abs))?;
        let mut buf = [0u8; 8192];
        loop {
            let n = f.read(&mut buf)?;
            if n == 0 {
                break;
            }
            hasher.update(&buf[..n]);
        }
    }

    let hash = hasher.finalize().to_hex().to_string();
    debug!(class = %spec.class, hash = %hash, "computed class source hash");
    Ok(hash)
}

fn load_all(root: &Path) -> Result<HashMap<String, String>> {
    let path = root.join(HASH_FILE_REL);
    if !path.exists() {
        return Ok(HashMap::new());
    }

    let file = File::open(&path).with_context(|| format!("opening hash file at {:?}", path))?;
    let reader = BufReader::new(file);

    let mut map = HashMap::new();
    for line in reader.lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some((name, hash)) = trimmed.split_once(char::is_whitespace) {
            map.insert(name.to_string(), hash.trim().to_string());
        }
    }

    Ok(map)
}

fn save_all(root: &Path, map: &HashMap<String, String>) -> Result<()> {
    let path = root.join(HASH_FILE_REL);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating hash directory at {:?}", parent))?;
    }

    let file = File::create(&path).with_context(|| format!("creating hash file at {:?}", path))?;
    let mut writer = BufWriter::new(file);
    for (name, hash) in map {
        writeln!(writer, "{name} {hash}")?;
    }
    writer.flush()?;
    Ok(())
}

/// Load the previously stored hash for a class, if present.
pub fn load_class_hash(root: &Path, class: &str) -> Result<Option<String>> {
    Ok(load_all(root)?.get(class).cloned())
}

/// Store the hash for a class, merging with existing entries.
pub fn save_class_hash(root: &Path, class: &str, hash: &str) -> Result<()> {
    let mut map = load_all(root)?;
    map.insert(class.to_string(), hash.to_string());
    save_all(root, &map)
}
