mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use common::*;
use orb_brain::{
    OrbBrain, OrbConfig, OrbDriver, OrbHandle, TickOutcome, ToolCall, ToolError, ToolExecutor,
    ToolOutput,
};
use orb_goals::{Goal, GoalKind, GoalStatus};
use orb_perception::{SandboxWorld, WorldContext};
use tokio::sync::RwLock;

/// Writes requested blocks straight into the shared sandbox.
struct SandboxBuilder {
    world: Arc<RwLock<SandboxWorld>>,
    calls: AtomicUsize,
}

#[async_trait]
impl ToolExecutor for SandboxBuilder {
    async fn execute(&self, call: ToolCall) -> Result<ToolOutput, ToolError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let placed = self.world.write().await.place_blocks(&call.blocks);
        Ok(ToolOutput {
            blocks_placed: placed,
        })
    }
}

struct Offline;

#[async_trait]
impl ToolExecutor for Offline {
    async fn execute(&self, call: ToolCall) -> Result<ToolOutput, ToolError> {
        Err(ToolError::Unavailable(call.name))
    }
}

/// Panics on its first call, then places blocks like [`SandboxBuilder`].
struct FlakyBuilder {
    inner: SandboxBuilder,
}

#[async_trait]
impl ToolExecutor for FlakyBuilder {
    async fn execute(&self, call: ToolCall) -> Result<ToolOutput, ToolError> {
        if self.inner.calls.load(Ordering::SeqCst) == 0 {
            self.inner.calls.fetch_add(1, Ordering::SeqCst);
            panic!("executor crashed");
        }
        self.inner.execute(call).await
    }
}

fn fast_config() -> OrbConfig {
    let mut config = OrbConfig::default();
    config.brain.behavior_tick_rate_ms = 5;
    config.brain.frame_interval_ms = 1;
    config
}

#[test]
fn overlapping_tick_is_skipped() {
    let world = empty_world();
    let handle = OrbHandle::new(brain());

    let guard = handle.begin_tick().expect("idle handle");
    assert!(handle.is_ticking());
    assert_eq!(handle.try_tick(&tick_ctx(0), &world), TickOutcome::Skipped);
    assert_eq!(handle.state().tick_count, 0);

    drop(guard);
    assert!(!handle.is_ticking());
    assert!(matches!(
        handle.try_tick(&tick_ctx(1), &world),
        TickOutcome::Ran(_)
    ));
    assert_eq!(handle.state().tick_count, 1);
    assert!(!handle.is_ticking());
}

#[test]
fn clones_share_one_brain() {
    let handle = OrbHandle::new(brain());
    let other = handle.clone();
    other.with_brain(|b| b.add_goal(Goal::new(GoalKind::Idle, 2, 0)));
    assert_eq!(handle.state().goals.len(), 1);

    let _guard = other.begin_tick().expect("idle handle");
    assert!(handle.begin_tick().is_none());
}

#[tokio::test]
async fn driver_builds_through_the_executor() {
    let world = Arc::new(RwLock::new(empty_world()));
    let mut brain = OrbBrain::new(&fast_config());
    let id = brain.add_goal(
        Goal::new(GoalKind::Build, 7, 0).with_target_blocks(wall_under_spawn(2)),
    );
    let handle = OrbHandle::new(brain);
    let executor = Arc::new(SandboxBuilder {
        world: world.clone(),
        calls: AtomicUsize::new(0),
    });
    let driver = OrbDriver::new(handle.clone(), world.clone(), executor.clone());

    let report = driver.run(Some(12), std::future::pending()).await;

    assert_eq!(report.ticks, 12);
    assert!(report.tool_calls >= 1);
    assert_eq!(executor.calls.load(Ordering::SeqCst) as u64, report.tool_calls);
    assert!(report.frames > 0);

    let cell = wall_under_spawn(1)[0].position;
    assert!(world.read().await.has_block(cell));

    // Completions still queued at shutdown land on the next tick.
    let world_guard = world.read().await;
    handle.try_tick(&tick_ctx(100), &*world_guard);
    let state = handle.state();
    if let Some(goal) = state.goal(id) {
        assert!(goal.progress > 0.0);
    }
}

#[tokio::test]
async fn shutdown_signal_stops_the_loop() {
    let world = Arc::new(RwLock::new(empty_world()));
    let handle = OrbHandle::new(OrbBrain::new(&fast_config()));
    let driver = OrbDriver::new(handle.clone(), world, Arc::new(Offline));

    let report = driver
        .run(None, tokio::time::sleep(Duration::from_millis(40)))
        .await;

    assert!(report.ticks >= 1);
    assert_eq!(handle.state().tick_count, report.ticks);
    assert!(!handle.is_ticking());
}

#[tokio::test]
async fn unavailable_tool_leaves_build_pending() {
    let world = Arc::new(RwLock::new(empty_world()));
    let mut brain = OrbBrain::new(&fast_config());
    let id = brain.add_goal(
        Goal::new(GoalKind::Build, 7, 0).with_target_blocks(wall_under_spawn(1)),
    );
    let handle = OrbHandle::new(brain);
    let driver = OrbDriver::new(handle.clone(), world.clone(), Arc::new(Offline));

    driver.run(Some(6), std::future::pending()).await;

    let state = handle.state();
    let goal = state.goal(id).expect("build goal kept");
    assert_eq!(goal.progress, 0.0);
    assert_ne!(goal.status, GoalStatus::Completed);
    assert_eq!(world.read().await.block_count(), 0);
}

#[tokio::test]
async fn observer_sees_every_tick() {
    #[derive(Clone, Default)]
    struct Seen(Arc<Mutex<Vec<u64>>>);

    impl orb_brain::StateObserver for Seen {
        fn on_state(&mut self, state: &orb_brain::OrbState) {
            self.0.lock().unwrap().push(state.tick_count);
        }
    }

    let seen = Seen::default();
    let world = Arc::new(RwLock::new(empty_world()));
    let brain = OrbBrain::new(&fast_config()).with_state_observer(Box::new(seen.clone()));
    let driver = OrbDriver::new(OrbHandle::new(brain), world, Arc::new(Offline));

    driver.run(Some(3), std::future::pending()).await;

    assert_eq!(seen.0.lock().unwrap().as_slice(), [1, 2, 3]);
}

#[tokio::test]
async fn panicking_executor_counts_as_a_failed_call() {
    let world = Arc::new(RwLock::new(empty_world()));
    let mut brain = OrbBrain::new(&fast_config());
    let id = brain.add_goal(
        Goal::new(GoalKind::Build, 7, 0).with_target_blocks(wall_under_spawn(3)),
    );
    let handle = OrbHandle::new(brain);
    let executor = Arc::new(FlakyBuilder {
        inner: SandboxBuilder {
            world: world.clone(),
            calls: AtomicUsize::new(0),
        },
    });
    let driver = OrbDriver::new(handle.clone(), world.clone(), executor.clone());

    let report = driver.run(Some(40), std::future::pending()).await;

    assert!(report.tool_calls >= 2);
    assert!(executor.inner.calls.load(Ordering::SeqCst) >= 2);
    let first = wall_under_spawn(1)[0].position;
    assert!(world.read().await.has_block(first));

    let world_guard = world.read().await;
    handle.try_tick(&tick_ctx(100), &*world_guard);
    let state = handle.state();
    if let Some(goal) = state.goal(id) {
        assert!(goal.progress > 0.0);
    }
}
