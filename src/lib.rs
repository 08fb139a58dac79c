// src/lib.rs

pub mod cli;
pub mod config;
pub mod dag;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod stage;
pub mod watch;

use std::str::FromStr;
use std::sync::Arc;

use anyhow::{Result, anyhow};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::loader::load_or_default;
use crate::config::model::ConfigFile;
use crate::dag::{DagGraph, Scheduler};
use crate::engine::{
    Runtime, RuntimeEvent, RuntimeOptions, TriggerQueue, TriggerReason,
    TriggerWhileRunningBehaviour,
};
use crate::stage::BuildContext;
use crate::stage::clean::clean_trees;
use crate::watch::{build_watch_profiles, spawn_watcher, watcher::manifest_root_dir};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - manifest loading
/// - build context / stage graph / scheduler / trigger queue
/// - the stage executor
/// - (watch mode) the file watcher, established after the initial build
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = std::path::PathBuf::from(&args.config);
    let cfg = load_or_default(&config_path)?;

    if args.dry_run {
        print_dry_run(&cfg, args.release);
        return Ok(());
    }

    let root = manifest_root_dir(&config_path);
    let ctx = Arc::new(BuildContext::from_config(root, &cfg)?);

    if args.clean {
        info!("cleaning build and dist directories");
        return clean_trees(&[&ctx.build_dir, &ctx.dist_dir]);
    }

    let graph = DagGraph::compose(args.release);
    let roots = graph.roots();
    let scheduler = Scheduler::new(graph);

    let behaviour = TriggerWhileRunningBehaviour::from_str(&cfg.build.while_running)
        .map_err(|e| anyhow!(e))?;
    let queue = TriggerQueue::new(behaviour, cfg.build.queue_length);

    // Runtime event channel.
    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(64);

    // Stage executor.
    let exec_tx = exec::spawn_executor(Arc::clone(&ctx), rt_tx.clone());

    // In watch mode, watch bindings are established only once the initial
    // build run reaches a terminal state, so the build directory is
    // consistent at watch start.
    let initial_run_done = if args.watch {
        let (ready_tx, ready_rx) = oneshot::channel::<()>();
        let watch_ctx = Arc::clone(&ctx);
        let watch_tx = rt_tx.clone();
        tokio::spawn(async move {
            if ready_rx.await.is_err() {
                return;
            }
            let profiles = build_watch_profiles(&watch_ctx);
            match spawn_watcher(watch_ctx, profiles, watch_tx) {
                Ok(_handle) => {
                    // Keep the watcher alive until process exit.
                    std::future::pending::<()>().await;
                }
                Err(err) => {
                    eprintln!("buildline: failed to start file watcher: {err:?}");
                }
            }
        });
        Some(ready_tx)
    } else {
        None
    };

    // Ctrl-C → graceful shutdown.
    {
        let tx = rt_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            let _ = tx.send(RuntimeEvent::ShutdownRequested).await;
        });
    }

    // Seed the initial full build from the graph roots.
    info!(?roots, "triggering full build");
    for stage in roots {
        rt_tx
            .send(RuntimeEvent::StageTriggered {
                stage,
                reason: TriggerReason::Startup,
            })
            .await?;
    }

    let options = RuntimeOptions {
        exit_when_idle: !args.watch,
        policy: ctx.policy,
        initial_run_done,
    };

    let runtime = Runtime::new(scheduler, queue, options, rt_rx, exec_tx);
    runtime.run().await
}

/// Dry-run output: the composed stage plan plus per-class routing.
fn print_dry_run(cfg: &ConfigFile, release: bool) {
    let graph = DagGraph::compose(release);

    println!("buildline dry-run ({})", if release { "release" } else { "dev" });
    println!("  build.on_error = {}", cfg.build.on_error);
    println!("  build.while_running = {}", cfg.build.while_running);
    println!("  build.queue_length = {}", cfg.build.queue_length);
    println!();

    println!("stage plan (topological):");
    for stage in graph.topo_order() {
        let deps = graph.dependencies_of(stage);
        if deps.is_empty() {
            println!("  - {stage}");
        } else {
            let deps: Vec<String> = deps.iter().map(|d| d.to_string()).collect();
            println!("  - {stage}  (after {})", deps.join(", "));
        }
    }
    println!();

    println!("classes:");
    for (name, src_dir, out, watch) in [
        ("scripts", &cfg.scripts.src_dir, &cfg.scripts.out, cfg.scripts.watch),
        ("styles", &cfg.styles.src_dir, &cfg.styles.out, cfg.styles.watch),
        ("markup", &cfg.markup.src_dir, &cfg.markup.out, cfg.markup.watch),
        ("fonts", &cfg.fonts.src_dir, &cfg.fonts.out, cfg.fonts.watch),
        ("images", &cfg.images.src_dir, &cfg.images.out, cfg.images.watch),
        ("locales", &cfg.locales.src_dir, &cfg.locales.out, cfg.locales.watch),
    ] {
        let out = if out.is_empty() { "." } else { out };
        println!("  - {name}: {src_dir} -> {}/{out} (watch: {watch})", cfg.build.build_dir);
    }

    debug!("dry-run complete (no execution)");
}
