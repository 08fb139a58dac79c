// src/engine/runtime.rs

use std::collections::HashSet;

use anyhow::{Result, anyhow};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

use crate::dag::Scheduler;
use crate::engine::queue::TriggerQueue;
use crate::errors::FailurePolicy;
use crate::stage::StageId;

/// Why a stage was triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerReason {
    FileWatch,
    Startup,
}

/// Result of a dispatched stage, as reported by the executor. The cause of a
/// failure has already been routed through the failure sink by then.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageOutcome {
    Success,
    Failed,
}

/// Events sent into the runtime from watchers, the executor, or signals.
#[derive(Debug)]
pub enum RuntimeEvent {
    StageTriggered {
        stage: StageId,
        reason: TriggerReason,
    },
    StageCompleted {
        stage: StageId,
        outcome: StageOutcome,
    },
    ShutdownRequested,
}

/// Options that influence how the runtime behaves.
#[derive(Debug, Default)]
pub struct RuntimeOptions {
    /// Exit as soon as the scheduler is idle with nothing queued. `false` in
    /// watch mode.
    pub exit_when_idle: bool,

    /// The continue/abort choice from `[build].on_error`.
    pub policy: FailurePolicy,

    /// Fired once, when the first run reaches a terminal state. Watch mode
    /// uses this to establish watch bindings only after the initial build.
    pub initial_run_done: Option<oneshot::Sender<()>>,
}

/// The main orchestration runtime.
///
/// Responsibilities:
/// - consume `RuntimeEvent`s from the watcher, executor and signal handler
/// - apply queue semantics for triggers arriving mid-run
/// - drive the stage scheduler
/// - dispatch ready stages to the executor
pub struct Runtime {
    scheduler: Scheduler,
    queue: TriggerQueue,
    options: RuntimeOptions,
    total_failures: usize,

    events_rx: mpsc::Receiver<RuntimeEvent>,
    exec_tx: mpsc::Sender<StageId>,
}

impl Runtime {
    pub fn new(
        scheduler: Scheduler,
        queue: TriggerQueue,
        options: RuntimeOptions,
        events_rx: mpsc::Receiver<RuntimeEvent>,
        exec_tx: mpsc::Sender<StageId>,
    ) -> Self {
        Self {
            scheduler,
            queue,
            options,
            total_failures: 0,
            events_rx,
            exec_tx,
        }
    }

    /// Main event loop. Runs until shutdown, an abort-policy failure, or
    /// (with `exit_when_idle`) until there is nothing left to do.
    pub async fn run(mut self) -> Result<()> {
        info!("buildline runtime started");

        while let Some(event) = self.events_rx.recv().await {
            debug!(?event, "runtime received event");

            let keep_running = match event {
                RuntimeEvent::StageTriggered { stage, reason } => {
                    self.handle_stage_trigger(stage, reason).await?
                }
                RuntimeEvent::StageCompleted { stage, outcome } => {
                    self.handle_stage_completion(stage, outcome).await?
                }
                RuntimeEvent::ShutdownRequested => {
                    info!("shutdown requested, stopping runtime");
                    false
                }
            };

            if !keep_running {
                break;
            }
        }

        if self.total_failures > 0 {
            warn!(
                failures = self.total_failures,
                "runtime exiting with logged stage failures"
            );
        } else {
            info!("buildline runtime exiting");
        }
        Ok(())
    }

    async fn handle_stage_trigger(&mut self, stage: StageId, reason: TriggerReason) -> Result<bool> {
        info!(stage = %stage, ?reason, "stage triggered");

        if self.scheduler.is_idle() {
            // Starting a new run: combine this trigger with anything queued.
            let mut triggers: HashSet<StageId> = self.queue.drain_pending().into_iter().collect();
            triggers.insert(stage);
            self.start_new_run(triggers.into_iter().collect()).await?;
        } else if reason == TriggerReason::Startup {
            // Startup triggers arrive as a burst and all belong to the
            // initial run; join it instead of queuing.
            let ready = self.scheduler.handle_trigger(stage);
            self.dispatch(ready).await?;
        } else {
            self.queue.record_trigger(stage);
            debug!(stage = %stage, "trigger recorded in queue (run active)");
        }

        Ok(true)
    }

    async fn handle_stage_completion(
        &mut self,
        stage: StageId,
        outcome: StageOutcome,
    ) -> Result<bool> {
        match outcome {
            StageOutcome::Success => info!(stage = %stage, "stage completed"),
            StageOutcome::Failed => {
                self.total_failures += 1;
                if self.options.policy == FailurePolicy::Abort {
                    return Err(anyhow!("stage {stage} failed and on_error is \"abort\""));
                }
            }
        }

        let ready = self.scheduler.handle_completion(stage, outcome);
        self.dispatch(ready).await?;

        if self.scheduler.is_idle() {
            self.on_run_finished().await?;

            if self.options.exit_when_idle && self.queue.is_empty() && self.scheduler.is_idle() {
                info!("runtime idle and exit_when_idle=true, stopping");
                return Ok(false);
            }
        }

        Ok(true)
    }

    /// Housekeeping when a run reaches terminal state: signal the initial
    /// build (once) and start any queued follow-up run.
    async fn on_run_finished(&mut self) -> Result<()> {
        if let Some(done) = self.options.initial_run_done.take() {
            // Receiver may be gone in --once mode.
            let _ = done.send(());
        }

        let triggers = self.queue.drain_pending();
        if !triggers.is_empty() {
            self.start_new_run(triggers).await?;
        }
        Ok(())
    }

    async fn start_new_run(&mut self, triggers: Vec<StageId>) -> Result<()> {
        if triggers.is_empty() {
            debug!("start_new_run with empty trigger set; nothing to do");
            return Ok(());
        }

        info!(?triggers, "starting new run");
        self.scheduler.start_new_run();

        for stage in triggers {
            let ready = self.scheduler.handle_trigger(stage);
            self.dispatch(ready).await?;
        }

        Ok(())
    }

    async fn dispatch(&mut self, stages: Vec<StageId>) -> Result<()> {
        for stage in stages {
            debug!(stage = %stage, "dispatching stage to executor");
            if let Err(err) = self.exec_tx.send(stage).await {
                error!(error = %err, "failed to send stage to executor");
                return Err(err.into());
            }
        }
        Ok(())
    }
}
