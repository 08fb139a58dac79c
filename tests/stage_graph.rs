use std::error::Error;

use buildline::dag::{DagGraph, Scheduler};
use buildline::engine::StageOutcome;
use buildline::stage::{AssetClass, StageId};

type TestResult = Result<(), Box<dyn Error>>;

fn run_full_build(scheduler: &mut Scheduler) {
    scheduler.start_new_run();

    let mut ready: Vec<StageId> = Vec::new();
    for root in scheduler.graph().roots() {
        ready.extend(scheduler.handle_trigger(root));
    }

    while let Some(stage) = ready.pop() {
        ready.extend(scheduler.handle_completion(stage, StageOutcome::Success));
    }

    assert!(scheduler.is_idle());
}

#[test]
fn build_stage_is_not_ready_before_its_clean_completes() -> TestResult {
    let mut scheduler = Scheduler::new(DagGraph::compose(false));

    scheduler.start_new_run();
    let ready = scheduler.handle_trigger(StageId::Clean(AssetClass::Styles));
    assert_eq!(ready, vec![StageId::Clean(AssetClass::Styles)]);

    let ready = scheduler.handle_completion(StageId::Clean(AssetClass::Styles), StageOutcome::Success);
    assert_eq!(ready, vec![StageId::Build(AssetClass::Styles)]);

    let ready = scheduler.handle_completion(StageId::Build(AssetClass::Styles), StageOutcome::Success);
    assert!(ready.is_empty());
    assert!(scheduler.is_idle());
    Ok(())
}

#[test]
fn class_roots_run_as_a_concurrent_group() -> TestResult {
    let mut scheduler = Scheduler::new(DagGraph::compose(false));

    scheduler.start_new_run();
    let mut ready: Vec<StageId> = Vec::new();
    for root in scheduler.graph().roots() {
        ready.extend(scheduler.handle_trigger(root));
    }

    // Every class clean stage is dispatched without waiting on any other
    // class.
    assert_eq!(ready.len(), AssetClass::ALL.len());
    for class in AssetClass::ALL {
        assert!(ready.contains(&StageId::Clean(class)));
    }
    Ok(())
}

#[test]
fn rasterizer_runs_strictly_after_image_copy() -> TestResult {
    let mut scheduler = Scheduler::new(DagGraph::compose(false));

    scheduler.start_new_run();
    let ready = scheduler.handle_trigger(StageId::Clean(AssetClass::Images));
    assert_eq!(ready, vec![StageId::Clean(AssetClass::Images)]);

    let ready = scheduler.handle_completion(StageId::Clean(AssetClass::Images), StageOutcome::Success);
    assert_eq!(ready, vec![StageId::Build(AssetClass::Images)]);

    let ready = scheduler.handle_completion(StageId::Build(AssetClass::Images), StageOutcome::Success);
    assert_eq!(ready, vec![StageId::Raster]);

    scheduler.handle_completion(StageId::Raster, StageOutcome::Success);
    assert!(scheduler.is_idle());
    Ok(())
}

#[test]
fn watch_trigger_reruns_only_the_affected_class_subtree() -> TestResult {
    let mut scheduler = Scheduler::new(DagGraph::compose(false));
    run_full_build(&mut scheduler);

    scheduler.start_new_run();
    let mut seen: Vec<StageId> = Vec::new();
    let mut ready = scheduler.handle_trigger(StageId::Clean(AssetClass::Styles));
    while let Some(stage) = ready.pop() {
        seen.push(stage);
        ready.extend(scheduler.handle_completion(stage, StageOutcome::Success));
    }

    assert!(scheduler.is_idle());
    assert_eq!(
        seen,
        vec![
            StageId::Clean(AssetClass::Styles),
            StageId::Build(AssetClass::Styles)
        ]
    );
    Ok(())
}

#[test]
fn failed_stage_skips_dependents_but_run_still_terminates() -> TestResult {
    let mut scheduler = Scheduler::new(DagGraph::compose(false));

    scheduler.start_new_run();
    let ready = scheduler.handle_trigger(StageId::Clean(AssetClass::Scripts));
    assert_eq!(ready, vec![StageId::Clean(AssetClass::Scripts)]);

    // Clean fails: the build stage must not run against an uncleaned output.
    let ready = scheduler.handle_completion(StageId::Clean(AssetClass::Scripts), StageOutcome::Failed);
    assert!(ready.is_empty());
    assert!(scheduler.is_idle(), "run reaches terminal state");
    assert_eq!(scheduler.failures_in_last_run(), 2);
    Ok(())
}

#[test]
fn failure_in_one_class_leaves_later_runs_responsive() -> TestResult {
    let mut scheduler = Scheduler::new(DagGraph::compose(false));

    scheduler.start_new_run();
    let ready = scheduler.handle_trigger(StageId::Clean(AssetClass::Scripts));
    assert_eq!(ready, vec![StageId::Clean(AssetClass::Scripts)]);
    scheduler.handle_completion(StageId::Clean(AssetClass::Scripts), StageOutcome::Success);
    scheduler.handle_completion(StageId::Build(AssetClass::Scripts), StageOutcome::Failed);
    assert!(scheduler.is_idle());

    // An unrelated change still triggers a successful scoped run.
    scheduler.start_new_run();
    let ready = scheduler.handle_trigger(StageId::Clean(AssetClass::Locales));
    assert_eq!(ready, vec![StageId::Clean(AssetClass::Locales)]);
    let ready = scheduler.handle_completion(StageId::Clean(AssetClass::Locales), StageOutcome::Success);
    assert_eq!(ready, vec![StageId::Build(AssetClass::Locales)]);
    let ready = scheduler.handle_completion(StageId::Build(AssetClass::Locales), StageOutcome::Success);
    assert!(ready.is_empty());
    assert!(scheduler.is_idle());
    Ok(())
}

#[test]
fn stamp_waits_for_every_build_stage_and_raster() -> TestResult {
    let mut scheduler = Scheduler::new(DagGraph::compose(true));

    scheduler.start_new_run();
    let mut ready: Vec<StageId> = Vec::new();
    for root in scheduler.graph().roots() {
        ready.extend(scheduler.handle_trigger(root));
    }

    let mut completed: Vec<StageId> = Vec::new();
    while let Some(stage) = ready.pop() {
        completed.push(stage);
        ready.extend(scheduler.handle_completion(stage, StageOutcome::Success));
    }

    assert!(scheduler.is_idle());
    assert_eq!(completed.last(), Some(&StageId::Stamp));

    // Stamp must come after every other stage.
    let stamp_pos = completed.iter().position(|s| *s == StageId::Stamp).unwrap();
    assert_eq!(stamp_pos, completed.len() - 1);
    assert_eq!(completed.len(), 14); // 6 cleans + 6 builds + raster + stamp
    Ok(())
}

#[test]
fn topological_plan_orders_cleans_before_builds() -> TestResult {
    let graph = DagGraph::compose(true);
    let order = graph.topo_order();

    let pos = |s: StageId| order.iter().position(|o| *o == s).unwrap();
    for class in AssetClass::ALL {
        assert!(pos(StageId::Clean(class)) < pos(StageId::Build(class)));
    }
    assert!(pos(StageId::Build(AssetClass::Images)) < pos(StageId::Raster));
    assert_eq!(order.last(), Some(&StageId::Stamp));
    Ok(())
}
