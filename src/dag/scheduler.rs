// src/dag/scheduler.rs

use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::dag::graph::DagGraph;
use crate::engine::StageOutcome;
use crate::stage::StageId;

/// Per-run state of a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunState {
    /// Stage participates in this run but is waiting on dependencies.
    Pending,
    /// Stage has been dispatched to the executor.
    Running,
    /// Stage completed successfully in this run.
    DoneSuccess,
    /// Stage failed in this run, or was skipped because an upstream stage
    /// failed.
    DoneFailed,
}

#[derive(Debug, Clone, Copy, Default)]
struct StageState {
    /// `None` while the stage is not participating in the current run.
    run_state: Option<RunState>,
    /// Last run ID in which this stage succeeded; lets a scoped watch run
    /// treat untouched upstream stages as satisfied.
    last_success: Option<u64>,
}

/// Scheduler holds the immutable stage graph plus mutable per-run state.
///
/// Responsibilities:
/// - remember which stages are part of the current run
/// - decide when a triggered stage is ready (dependencies satisfied)
/// - pull a trigger's transitive dependents into the run, so a class's clean
///   trigger re-runs its whole subtree
/// - skip dependents when a stage fails, without wedging the run
pub struct Scheduler {
    graph: DagGraph,
    state: HashMap<StageId, StageState>,

    run_counter: u64,
    current_run_id: Option<u64>,
    failed_this_run: usize,
}

impl Scheduler {
    pub fn new(graph: DagGraph) -> Self {
        let state = graph.stages().map(|s| (s, StageState::default())).collect();
        Self {
            graph,
            state,
            run_counter: 0,
            current_run_id: None,
            failed_this_run: 0,
        }
    }

    pub fn graph(&self) -> &DagGraph {
        &self.graph
    }

    /// Returns `true` if there is currently no active run.
    pub fn is_idle(&self) -> bool {
        self.current_run_id.is_none()
    }

    /// Number of stages that failed or were skipped in the most recent run.
    pub fn failures_in_last_run(&self) -> usize {
        self.failed_this_run
    }

    /// Start a new run, resetting per-run state but keeping success history
    /// so scoped runs can treat untouched stages as satisfied.
    pub fn start_new_run(&mut self) {
        self.run_counter += 1;
        self.current_run_id = Some(self.run_counter);
        self.failed_this_run = 0;

        for state in self.state.values_mut() {
            state.run_state = None;
        }

        debug!(run_id = self.run_counter, "scheduler: starting new run");
    }

    /// Mark a stage and its transitive dependents as participating in the
    /// current run. Triggering a class's clean stage therefore re-runs its
    /// whole subtree, and nothing else.
    ///
    /// Returns the stages that are now ready to execute.
    pub fn handle_trigger(&mut self, stage: StageId) -> Vec<StageId> {
        if self.current_run_id.is_none() {
            warn!("handle_trigger with no active run; implicitly starting one");
            self.start_new_run();
        }

        if !self.state.contains_key(&stage) {
            warn!(stage = %stage, "trigger for stage outside the graph; ignoring");
            return Vec::new();
        }

        let mut stack = vec![stage];
        while let Some(id) = stack.pop() {
            if let Some(state) = self.state.get_mut(&id)
                && state.run_state.is_none()
            {
                state.run_state = Some(RunState::Pending);
                debug!(stage = %id, "stage marked Pending in this run");
                stack.extend(self.graph.dependents_of(id).iter().copied());
            }
        }

        let ready = self.settle();
        self.maybe_finish_run();
        ready
    }

    /// Record the outcome of a dispatched stage.
    ///
    /// Success activates the stage's dependents; failure leaves them out of
    /// this run (skipped, counted as failures) so the run can still reach a
    /// terminal state.
    pub fn handle_completion(&mut self, stage: StageId, outcome: StageOutcome) -> Vec<StageId> {
        let run_id = match self.current_run_id {
            Some(id) => id,
            None => {
                warn!(stage = %stage, "completion with no active run; ignoring");
                return Vec::new();
            }
        };

        match self.state.get_mut(&stage) {
            Some(state) => match outcome {
                StageOutcome::Success => {
                    state.run_state = Some(RunState::DoneSuccess);
                    state.last_success = Some(run_id);
                    debug!(stage = %stage, "stage completed successfully");
                }
                StageOutcome::Failed => {
                    state.run_state = Some(RunState::DoneFailed);
                    self.failed_this_run += 1;
                    warn!(stage = %stage, "stage failed; its dependents are skipped this run");
                }
            },
            None => {
                warn!(stage = %stage, "completion for stage outside the graph; ignoring");
            }
        }

        let ready = self.settle();
        self.maybe_finish_run();
        ready
    }

    /// Drive pending stages to a fixpoint: dispatch those whose dependencies
    /// are satisfied, fail those with a failed dependency. Loops because a
    /// newly failed stage can unblock the failure of its own dependents.
    fn settle(&mut self) -> Vec<StageId> {
        let mut ready = Vec::new();

        loop {
            let pending: Vec<StageId> = self
                .state
                .iter()
                .filter(|(_, s)| matches!(s.run_state, Some(RunState::Pending)))
                .map(|(id, _)| *id)
                .collect();

            let mut changed = false;
            for stage in pending {
                if self.any_dep_failed(stage) {
                    if let Some(state) = self.state.get_mut(&stage) {
                        state.run_state = Some(RunState::DoneFailed);
                        self.failed_this_run += 1;
                        warn!(stage = %stage, "skipped: upstream stage failed this run");
                        changed = true;
                    }
                } else if self.deps_satisfied(stage) {
                    if let Some(state) = self.state.get_mut(&stage) {
                        state.run_state = Some(RunState::Running);
                        debug!(stage = %stage, "dependencies satisfied; dispatching");
                        ready.push(stage);
                        changed = true;
                    }
                }
            }

            if !changed {
                break;
            }
        }

        ready
    }

    fn any_dep_failed(&self, stage: StageId) -> bool {
        self.graph.dependencies_of(stage).iter().any(|dep| {
            matches!(
                self.state.get(dep).and_then(|s| s.run_state),
                Some(RunState::DoneFailed)
            )
        })
    }

    /// A dependency is satisfied if it succeeded in this run, or is not part
    /// of this run but succeeded in an earlier one.
    fn deps_satisfied(&self, stage: StageId) -> bool {
        self.graph.dependencies_of(stage).iter().all(|dep| {
            let Some(dep_state) = self.state.get(dep) else {
                return false;
            };
            match dep_state.run_state {
                Some(RunState::DoneSuccess) => true,
                Some(RunState::DoneFailed) => false,
                Some(RunState::Pending) | Some(RunState::Running) => false,
                None => dep_state.last_success.is_some(),
            }
        })
    }

    fn maybe_finish_run(&mut self) {
        if self.current_run_id.is_none() {
            return;
        }

        let any_active = self.state.values().any(|s| {
            matches!(
                s.run_state,
                Some(RunState::Pending) | Some(RunState::Running)
            )
        });

        if !any_active {
            info!(
                run_id = self.current_run_id,
                failures = self.failed_this_run,
                "scheduler: all stages terminal; run finished"
            );
            self.current_run_id = None;
        }
    }
}
