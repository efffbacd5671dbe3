//! Timer-driven execution of an [`OrbBrain`] on tokio.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use orb_core::TickContext;
use orb_goals::OrbAction;
use orb_nav::MotionStep;
use orb_perception::WorldContext;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use futures::FutureExt;

use crate::tools::{ToolCall, ToolCompletion, ToolError, ToolExecutor};
use crate::{OrbBrain, OrbState};

#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    Ran(OrbAction),
    /// Another tick was still running.
    Skipped,
}

/// Clears the processing flag when dropped.
#[derive(Debug)]
pub struct TickGuard {
    flag: Arc<AtomicBool>,
}

impl Drop for TickGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Shared access to a brain from the tick timer and the frame loop.
#[derive(Clone)]
pub struct OrbHandle {
    brain: Arc<Mutex<OrbBrain>>,
    processing: Arc<AtomicBool>,
}

impl OrbHandle {
    pub fn new(brain: OrbBrain) -> Self {
        Self {
            brain: Arc::new(Mutex::new(brain)),
            processing: Arc::new(AtomicBool::new(false)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, OrbBrain> {
        self.brain.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Marks a tick as running, or returns `None` if one already is.
    pub fn begin_tick(&self) -> Option<TickGuard> {
        self.processing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| TickGuard {
                flag: self.processing.clone(),
            })
    }

    pub fn is_ticking(&self) -> bool {
        self.processing.load(Ordering::Acquire)
    }

    /// Runs one tick unless another is in progress; overlapping ticks are
    /// dropped, not queued.
    pub fn try_tick(&self, ctx: &TickContext, world: &dyn WorldContext) -> TickOutcome {
        let Some(_guard) = self.begin_tick() else {
            tracing::debug!(tick = ctx.tick, "tick skipped, previous tick still running");
            return TickOutcome::Skipped;
        };
        TickOutcome::Ran(self.lock().tick(ctx, world))
    }

    pub fn move_along_path(&self, dt: f32) -> MotionStep {
        self.lock().move_along_path(dt)
    }

    pub fn with_brain<R>(&self, f: impl FnOnce(&mut OrbBrain) -> R) -> R {
        f(&mut self.lock())
    }

    pub fn state(&self) -> OrbState {
        self.lock().state()
    }
}

/// Counters from one [`OrbDriver::run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DriverReport {
    pub ticks: u64,
    pub skipped: u64,
    pub frames: u64,
    pub tool_calls: u64,
}

/// Ticks the brain on a fixed interval, integrates motion on a faster one,
/// and runs tool calls as tasks whose results land on the next tick.
pub struct OrbDriver<W> {
    handle: OrbHandle,
    world: Arc<RwLock<W>>,
    executor: Arc<dyn ToolExecutor>,
    tick_rate: Duration,
    frame_interval: Duration,
    seed: u64,
}

impl<W> OrbDriver<W>
where
    W: WorldContext + Send + Sync + 'static,
{
    pub fn new(handle: OrbHandle, world: Arc<RwLock<W>>, executor: Arc<dyn ToolExecutor>) -> Self {
        let (tick_ms, frame_ms, seed) = handle.with_brain(|b| {
            let c = b.config();
            (c.behavior_tick_rate_ms, c.frame_interval_ms, c.seed)
        });
        Self {
            handle,
            world,
            executor,
            tick_rate: Duration::from_millis(tick_ms.max(1)),
            frame_interval: Duration::from_millis(frame_ms.max(1)),
            seed,
        }
    }

    pub fn handle(&self) -> &OrbHandle {
        &self.handle
    }

    /// Runs until `shutdown` resolves or `max_ticks` ticks have run, then
    /// waits for outstanding tool calls.
    pub async fn run<F>(&self, max_ticks: Option<u64>, shutdown: F) -> DriverReport
    where
        F: Future<Output = ()>,
    {
        let mut report = DriverReport::default();
        let started = Instant::now();
        let mut last_frame = started;
        let mut tasks: Vec<JoinHandle<()>> = Vec::new();

        let mut ticker = tokio::time::interval(self.tick_rate);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut frames = tokio::time::interval(self.frame_interval);
        frames.set_missed_tick_behavior(MissedTickBehavior::Skip);

        tokio::pin!(shutdown);
        tracing::info!(
            tick_rate_ms = self.tick_rate.as_millis() as u64,
            max_ticks,
            "orb driver started"
        );

        loop {
            if max_ticks.is_some_and(|max| report.ticks >= max) {
                break;
            }
            tokio::select! {
                _ = &mut shutdown => break,
                now = frames.tick() => {
                    let dt = now.duration_since(last_frame).as_secs_f32();
                    last_frame = now;
                    self.handle.move_along_path(dt);
                    report.frames += 1;
                }
                now = ticker.tick() => {
                    let elapsed_ms = now.duration_since(started).as_millis() as u64;
                    let ctx = TickContext::new(report.ticks + report.skipped, elapsed_ms)
                        .with_seed(self.seed);
                    let outcome = {
                        let world = self.world.read().await;
                        self.handle.try_tick(&ctx, &*world)
                    };
                    match outcome {
                        TickOutcome::Ran(_) => report.ticks += 1,
                        TickOutcome::Skipped => report.skipped += 1,
                    }
                    for call in self.handle.with_brain(|b| b.drain_tool_calls()) {
                        tasks.push(self.spawn_tool_call(call));
                        report.tool_calls += 1;
                    }
                    tasks.retain(|t| !t.is_finished());
                }
            }
        }

        for result in futures::future::join_all(tasks).await {
            if let Err(err) = result {
                tracing::warn!(error = %err, "tool task did not finish cleanly");
            }
        }
        tracing::info!(
            ticks = report.ticks,
            skipped = report.skipped,
            tool_calls = report.tool_calls,
            "orb driver stopped"
        );
        report
    }

    fn spawn_tool_call(&self, call: ToolCall) -> JoinHandle<()> {
        let executor = self.executor.clone();
        let completions = self.handle.with_brain(|b| b.completion_sender());
        tokio::spawn(async move {
            let goal_id = call.goal_id;
            tracing::debug!(goal = %goal_id, tool = %call.name, "executing tool call");
            let name = call.name.clone();
            let result = match AssertUnwindSafe(executor.execute(call)).catch_unwind().await {
                Ok(result) => result,
                Err(_) => {
                    tracing::error!(goal = %goal_id, tool = %name, "tool executor panicked");
                    Err(ToolError::Failed(format!("`{name}` panicked")))
                }
            };
            // The brain may already be gone at shutdown.
            let _ = completions.send(ToolCompletion { goal_id, result });
        })
    }
}
