// src/dag/graph.rs

use std::collections::BTreeMap;

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::stage::{AssetClass, StageId};

/// The composed build graph: adjacency information between stages.
///
/// Only true dependencies are encoded:
/// - `Clean(c)` before `Build(c)` for every class (no stale-file leakage),
/// - `Build(Images)` before `Raster`,
/// - every build stage (and `Raster`) before `Stamp` in release graphs.
///
/// Classes have no cross-edges; the scheduler runs them as a concurrent
/// group.
#[derive(Debug, Clone)]
pub struct DagGraph {
    deps: BTreeMap<StageId, Vec<StageId>>,
    dependents: BTreeMap<StageId, Vec<StageId>>,
}

impl DagGraph {
    /// Compose the canonical full-build graph, with the stamp stage included
    /// only for release builds.
    pub fn compose(release: bool) -> Self {
        let mut deps: BTreeMap<StageId, Vec<StageId>> = BTreeMap::new();

        for class in AssetClass::ALL {
            deps.insert(StageId::Clean(class), Vec::new());
            deps.insert(StageId::Build(class), vec![StageId::Clean(class)]);
        }
        deps.insert(StageId::Raster, vec![StageId::Build(AssetClass::Images)]);

        if release {
            let mut stamp_deps: Vec<StageId> =
                AssetClass::ALL.iter().map(|c| StageId::Build(*c)).collect();
            stamp_deps.push(StageId::Raster);
            deps.insert(StageId::Stamp, stamp_deps);
        }

        let mut dependents: BTreeMap<StageId, Vec<StageId>> =
            deps.keys().map(|id| (*id, Vec::new())).collect();
        for (stage, stage_deps) in &deps {
            for dep in stage_deps {
                if let Some(list) = dependents.get_mut(dep) {
                    list.push(*stage);
                }
            }
        }

        Self { deps, dependents }
    }

    /// All stages in the graph, in stable order.
    pub fn stages(&self) -> impl Iterator<Item = StageId> + '_ {
        self.deps.keys().copied()
    }

    /// Immediate dependencies of a stage.
    pub fn dependencies_of(&self, stage: StageId) -> &[StageId] {
        self.deps.get(&stage).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Immediate dependents of a stage.
    pub fn dependents_of(&self, stage: StageId) -> &[StageId] {
        self.dependents
            .get(&stage)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Stages with no dependencies: the per-class clean stages. These are the
    /// triggers for a full build.
    pub fn roots(&self) -> Vec<StageId> {
        self.stages()
            .filter(|s| self.dependencies_of(*s).is_empty())
            .collect()
    }

    /// Watchable root for a class: the trigger a file change maps to.
    pub fn class_root(class: AssetClass) -> StageId {
        StageId::Clean(class)
    }

    /// Topological order of the graph, used for dry-run plan output.
    pub fn topo_order(&self) -> Vec<StageId> {
        let mut graph: DiGraphMap<StageId, ()> = DiGraphMap::new();
        for stage in self.stages() {
            graph.add_node(stage);
        }
        for (stage, deps) in &self.deps {
            for dep in deps {
                graph.add_edge(*dep, *stage, ());
            }
        }

        // The composed graph is acyclic by construction.
        match toposort(&graph, None) {
            Ok(order) => order,
            Err(_) => self.stages().collect(),
        }
    }
}
