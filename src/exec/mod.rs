// src/exec/mod.rs

//! Stage execution layer.
//!
//! - [`command`] runs external collaborator processes (syntax lowering,
//!   stylesheet preprocessing, rasterization) via `tokio::process::Command`.
//! - [`runner`] owns the executor loop that consumes scheduled stages, runs
//!   them and reports completions back to the runtime.

pub mod command;
pub mod runner;

pub use command::{run_filter, run_hook};
pub use runner::spawn_executor;
