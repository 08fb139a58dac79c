// src/watch/mod.rs

//! File watching and change detection.
//!
//! This module is responsible for:
//! - routing changed paths to the asset class whose source globs match
//!   (`patterns`),
//! - wiring up a cross-platform filesystem watcher (`watcher`),
//! - optional content hashing so a class is not re-run when its watched
//!   sources haven't actually changed (`hash`).
//!
//! It does **not** know about stage ordering; it only turns filesystem
//! changes into class-root triggers for the runtime.

pub mod hash;
pub mod patterns;
pub mod watcher;

pub use hash::{HASH_FILE_REL, compute_class_hash, load_class_hash, save_class_hash};
pub use patterns::{ClassWatchProfile, build_watch_profiles};
pub use watcher::{WatcherHandle, spawn_watcher};
