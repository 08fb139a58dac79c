// src/engine/queue.rs

use std::collections::{HashSet, VecDeque};
use std::str::FromStr;

use tracing::{debug, warn};

use crate::stage::StageId;

/// Behaviour when a trigger arrives while a run is already in progress.
///
/// - `Queue`: remember the trigger and start a follow-up run when the current
///   one finishes (default).
/// - `Cancel`: drop anything already queued and keep only the latest trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TriggerWhileRunningBehaviour {
    #[default]
    Queue,
    Cancel,
}

impl FromStr for TriggerWhileRunningBehaviour {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "queue" => Ok(TriggerWhileRunningBehaviour::Queue),
            "cancel" => Ok(TriggerWhileRunningBehaviour::Cancel),
            other => Err(format!(
                "invalid while_running behaviour: {other} (expected \"queue\" or \"cancel\")"
            )),
        }
    }
}

/// Queue of triggers that arrive while a run is executing.
///
/// Each queued entry is a *batch* of stage triggers that will start one
/// follow-up run. With the default `max_runs` of 1 this is a single-slot
/// debounce: however many changes land mid-run, exactly one follow-up run is
/// scheduled, and triggers for the same stage coalesce.
#[derive(Debug)]
pub struct TriggerQueue {
    behaviour: TriggerWhileRunningBehaviour,
    max_runs: usize,
    runs: VecDeque<HashSet<StageId>>,
}

impl TriggerQueue {
    /// `max_runs` is clamped to at least 1; a zero-length queue would make
    /// queuing semantics meaningless.
    pub fn new(behaviour: TriggerWhileRunningBehaviour, max_runs: usize) -> Self {
        Self {
            behaviour,
            max_runs: max_runs.max(1),
            runs: VecDeque::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    pub fn behaviour(&self) -> TriggerWhileRunningBehaviour {
        self.behaviour
    }

    /// Record a trigger that arrived while a run is active.
    pub fn record_trigger(&mut self, stage: StageId) {
        match self.behaviour {
            TriggerWhileRunningBehaviour::Queue => {
                if let Some(last) = self.runs.back_mut() {
                    let inserted = last.insert(stage);
                    debug!(stage = %stage, inserted, "merged trigger into queued batch");
                } else {
                    self.runs.push_back(HashSet::from([stage]));
                    debug!(stage = %stage, "created queued batch");
                }

                if self.runs.len() > self.max_runs {
                    warn!(
                        batches = self.runs.len(),
                        max_runs = self.max_runs,
                        "dropping oldest queued batches"
                    );
                    while self.runs.len() > self.max_runs {
                        self.runs.pop_front();
                    }
                }
            }
            TriggerWhileRunningBehaviour::Cancel => {
                debug!(stage = %stage, "resetting queued batches to this trigger only");
                self.runs.clear();
                self.runs.push_back(HashSet::from([stage]));
            }
        }
    }

    /// Drain all queued batches, merged into a single trigger set for the
    /// next run.
    pub fn drain_pending(&mut self) -> Vec<StageId> {
        let mut merged: HashSet<StageId> = HashSet::new();
        while let Some(batch) = self.runs.pop_front() {
            merged.extend(batch);
        }

        let triggers: Vec<StageId> = merged.into_iter().collect();
        debug!(drained = triggers.len(), "drained queued triggers");
        triggers
    }
}
