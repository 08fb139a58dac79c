// src/dag/mod.rs

//! Stage graph representation and scheduling.
//!
//! - [`graph`] composes the fixed build graph: Clean before Build per class,
//!   image copy before rasterization, header stamping last (release only).
//!   Independent classes carry no edges between them and run concurrently.
//! - [`scheduler`] contains the per-run state machine that decides which
//!   stages are ready to run and when dependents can be scheduled.

pub mod graph;
pub mod scheduler;

pub use graph::DagGraph;
pub use scheduler::Scheduler;
