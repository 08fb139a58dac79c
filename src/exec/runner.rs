// src/exec/runner.rs

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::engine::{RuntimeEvent, StageOutcome};
use crate::errors::report_stage_failure;
use crate::stage::{self, BuildContext, StageId};

/// Spawn the background executor loop.
///
/// The returned sender is what the runtime uses to dispatch ready stages.
/// Each stage runs in its own tokio task, so independent stages interleave;
/// ordering is entirely the scheduler's concern.
///
/// A failing stage is routed through the failure sink and then reported as a
/// completed-with-failure event, so the surrounding run and any watch session
/// keep operating.
pub fn spawn_executor(
    ctx: Arc<BuildContext>,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
) -> mpsc::Sender<StageId> {
    let (tx, mut rx) = mpsc::channel::<StageId>(32);

    tokio::spawn(async move {
        info!("executor loop started");
        while let Some(stage) = rx.recv().await {
            let ctx = Arc::clone(&ctx);
            let runtime_tx = runtime_tx.clone();
            tokio::spawn(async move {
                run_one(ctx, stage, runtime_tx).await;
            });
        }
        info!("executor loop finished (channel closed)");
    });

    tx
}

async fn run_one(ctx: Arc<BuildContext>, stage: StageId, runtime_tx: mpsc::Sender<RuntimeEvent>) {
    debug!(stage = %stage, "executing stage");

    let outcome = match stage::run_stage(&ctx, stage).await {
        Ok(()) => StageOutcome::Success,
        Err(err) => {
            report_stage_failure(stage, &err);
            StageOutcome::Failed
        }
    };

    // If the runtime is gone there is nobody left to report to.
    let _ = runtime_tx
        .send(RuntimeEvent::StageCompleted { stage, outcome })
        .await;
}
