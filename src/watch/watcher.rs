// src/watch/watcher.rs

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::dag::DagGraph;
use crate::engine::{RuntimeEvent, TriggerReason};
use crate::stage::context::BuildContext;
use crate::watch::hash::{compute_class_hash, load_class_hash, save_class_hash};
use crate::watch::patterns::ClassWatchProfile;

/// Handle for the filesystem watcher.
///
/// Exists mainly so the underlying `RecommendedWatcher` is kept alive as long
/// as needed. Dropping this handle stops file watching; it is otherwise torn
/// down only on process exit.
pub struct WatcherHandle {
    _inner: RecommendedWatcher,
}

impl std::fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherHandle").finish()
    }
}

/// Spawn a filesystem watcher observing the project root recursively.
///
/// A changed path that matches a class profile triggers that class's clean
/// stage (the root of its subtree); the scheduler re-runs only the affected
/// pair. With `use_hash` enabled, a trigger whose class source set hashes
/// identically to the last recorded run is suppressed.
pub fn spawn_watcher(
    ctx: Arc<BuildContext>,
    profiles: Vec<ClassWatchProfile>,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
) -> Result<WatcherHandle> {
    let root = ctx
        .root
        .canonicalize()
        .unwrap_or_else(|_| ctx.root.clone());

    let profiles = Arc::new(profiles);

    // Channel from the blocking notify callback into the async world.
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<Event>();

    let mut watcher = RecommendedWatcher::new(
        {
            let event_tx = event_tx.clone();
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if let Err(err) = event_tx.send(event) {
                        eprintln!("buildline: failed to forward notify event: {err}");
                    }
                }
                Err(err) => {
                    eprintln!("buildline: file watch error: {err}");
                }
            }
        },
        Config::default(),
    )?;

    watcher.watch(&root, RecursiveMode::Recursive)?;
    info!("file watcher started on {:?}", root);

    let async_root = root.clone();
    let async_profiles = Arc::clone(&profiles);
    tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            debug!("received notify event: {:?}", event);

            for path in &event.paths {
                let Some(rel) = relative_str(&async_root, path) else {
                    continue;
                };

                for profile in async_profiles.iter() {
                    if !profile.matches(&rel) {
                        continue;
                    }

                    let class = profile.class();
                    if ctx.use_hash && !class_sources_changed(&ctx, class) {
                        debug!(class = %class, "source set unchanged; suppressing trigger");
                        continue;
                    }

                    let stage = DagGraph::class_root(class);
                    debug!(class = %class, path = %rel, "watch match -> triggering");
                    if runtime_tx
                        .send(RuntimeEvent::StageTriggered {
                            stage,
                            reason: TriggerReason::FileWatch,
                        })
                        .await
                        .is_err()
                    {
                        // Runtime gone; no point keeping the loop alive.
                        warn!("runtime channel closed; stopping watch loop");
                        return;
                    }
                }
            }
        }

        debug!("file watcher loop ended");
    });

    Ok(WatcherHandle { _inner: watcher })
}

/// Hash the class's current source set against the stored value, recording
/// the new value when it differs.
fn class_sources_changed(ctx: &BuildContext, class: crate::stage::AssetClass) -> bool {
    let spec = ctx.class(class);
    let current = match compute_class_hash(&ctx.root, spec) {
        Ok(hash) => hash,
        Err(err) => {
            warn!(class = %class, error = ?err, "hashing failed; treating as changed");
            return true;
        }
    };

    let stored = load_class_hash(&ctx.root, class.name()).unwrap_or_default();
    if stored.as_deref() == Some(current.as_str()) {
        return false;
    }

    if let Err(err) = save_class_hash(&ctx.root, class.name(), &current) {
        warn!(class = %class, error = ?err, "failed to store class hash");
    }
    true
}

/// Convert a path into a string relative to `root`, with forward slashes.
fn relative_str(root: &Path, path: &Path) -> Option<String> {
    let rel: &Path = path.strip_prefix(root).ok()?;
    Some(rel.to_string_lossy().replace('\\', "/"))
}

/// Figure out a sensible project root for watching: the directory containing
/// the manifest, or `.`.
pub fn manifest_root_dir(config_path: &Path) -> PathBuf {
    config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}
