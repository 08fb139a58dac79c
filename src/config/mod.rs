// src/config/mod.rs

//! Configuration loading and validation for buildline.
//!
//! Responsibilities:
//! - Define the TOML-backed manifest model (`model.rs`).
//! - Load a manifest from disk (`loader.rs`).
//! - Validate semantic invariants like glob syntax, policy strings and
//!   package metadata (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path};
pub use model::{
    BuildSection, ClassSection, ConfigFile, ImageSection, PackageSection, ScriptSection,
    StyleSection,
};
pub use validate::validate_config;
