// src/engine/mod.rs

//! Orchestration engine for buildline.
//!
//! This module ties together:
//! - the stage scheduler
//! - the trigger queue (what happens when file changes arrive while a run is
//!   active)
//! - the main runtime event loop that reacts to:
//!   - file-watch triggers
//!   - stage completion events
//!   - shutdown signals

pub mod queue;
pub mod runtime;

pub use queue::{TriggerQueue, TriggerWhileRunningBehaviour};
pub use runtime::{Runtime, RuntimeEvent, RuntimeOptions, StageOutcome, TriggerReason};
