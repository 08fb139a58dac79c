#![cfg(unix)]

use std::error::Error;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use tokio::sync::mpsc;

use buildline::config::model::ConfigFile;
use buildline::dag::{DagGraph, Scheduler};
use buildline::engine::{
    Runtime, RuntimeEvent, RuntimeOptions, TriggerQueue, TriggerReason,
    TriggerWhileRunningBehaviour,
};
use buildline::errors::FailurePolicy;
use buildline::exec::spawn_executor;
use buildline::stage::BuildContext;

type TestResult = Result<(), Box<dyn Error>>;

fn seed_project(root: &Path) -> TestResult {
    fs::create_dir_all(root.join("src/assets/less"))?;
    fs::write(root.join("src/app.js"), "start();\n")?;
    fs::write(root.join("src/assets/less/a.less"), "a { color: red; }\n")?;
    Ok(())
}

async fn drive_full_build(cfg: ConfigFile, root: &Path, policy: FailurePolicy) -> anyhow::Result<()> {
    let ctx = Arc::new(BuildContext::from_config(root, &cfg)?);

    let graph = DagGraph::compose(false);
    let roots = graph.roots();
    let scheduler = Scheduler::new(graph);
    let queue = TriggerQueue::new(TriggerWhileRunningBehaviour::Queue, 1);

    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(64);
    let exec_tx = spawn_executor(Arc::clone(&ctx), rt_tx.clone());

    for stage in roots {
        rt_tx
            .send(RuntimeEvent::StageTriggered {
                stage,
                reason: TriggerReason::Startup,
            })
            .await?;
    }

    let options = RuntimeOptions {
        exit_when_idle: true,
        policy,
        initial_run_done: None,
    };
    Runtime::new(scheduler, queue, options, rt_rx, exec_tx)
        .run()
        .await
}

#[tokio::test]
async fn failed_stage_does_not_stop_the_run_under_continue_policy() -> TestResult {
    let tmp = tempfile::tempdir()?;
    seed_project(tmp.path())?;

    let mut cfg = ConfigFile::default();
    cfg.scripts.lower_cmd = Some("false".to_string());

    drive_full_build(cfg, tmp.path(), FailurePolicy::Continue).await?;

    let build_dir = tmp.path().join("build");
    assert!(!build_dir.join("app.js").exists(), "failed stage wrote output");
    assert!(
        build_dir.join("assets/css/core.css").exists(),
        "unrelated class was not built"
    );
    Ok(())
}

#[tokio::test]
async fn failed_stage_aborts_the_run_under_abort_policy() -> TestResult {
    let tmp = tempfile::tempdir()?;
    seed_project(tmp.path())?;

    let mut cfg = ConfigFile::default();
    cfg.scripts.lower_cmd = Some("false".to_string());

    let result = drive_full_build(cfg, tmp.path(), FailurePolicy::Abort).await;
    assert!(result.is_err());
    Ok(())
}

#[tokio::test]
async fn clean_full_build_exits_once_idle() -> TestResult {
    let tmp = tempfile::tempdir()?;
    seed_project(tmp.path())?;

    drive_full_build(ConfigFile::default(), tmp.path(), FailurePolicy::Continue).await?;

    let build_dir = tmp.path().join("build");
    assert!(build_dir.join("app.js").exists());
    assert!(build_dir.join("assets/css/core.css").exists());
    Ok(())
}
