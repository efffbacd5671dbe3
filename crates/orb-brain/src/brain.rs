//! The agent's tick loop and motion integration.

use std::mem;

use orb_core::{
    DeterministicRng, NullTraceSink, SplitMix64, TickContext, TraceEvent, TraceSink, Vec3,
};
use orb_goals::{
    AgentContext, Goal, GoalBehavior, GoalEngine, GoalEngineConfig, GoalId, GoalKind, GoalStatus,
    ObserveTarget, OrbAction,
};
use orb_nav::{MotionStep, OccupancyGrid, PathOptions, Pathfinder};
use orb_perception::memory::PLACE_BLOCK;
use orb_perception::{detect_player_building, Interaction, OrbMemory, Perception, WorldContext};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::state::{mode_for_goal, OrbMode, OrbState};
use crate::tools::{SpeechSink, StateObserver, ToolCall, ToolCompletion};
use crate::{BrainConfig, OrbConfig};

/// `metadata["source"]` of the observe goal added when the player builds nearby.
pub const BUILD_REFLEX_SOURCE: &str = "player_building";

const RNG_STREAM: u64 = 0x0b;

/// Something the player did, reported by the host.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerAction {
    pub kind: String,
    pub position: Option<Vec3>,
    pub data: Option<String>,
}

impl PlayerAction {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            position: None,
            data: None,
        }
    }

    pub fn place_block(position: Vec3) -> Self {
        Self {
            position: Some(position),
            ..Self::new(PLACE_BLOCK)
        }
    }
}

pub struct OrbBrain {
    config: BrainConfig,
    perception: Perception,
    engine: GoalEngine,
    path_options: PathOptions,
    state: OrbState,
    /// Goals removed by the host while active; their exit hook runs next tick.
    retired: Vec<Goal>,
    pending_calls: Vec<ToolCall>,
    in_flight: Option<GoalId>,
    completions_tx: mpsc::UnboundedSender<ToolCompletion>,
    completions_rx: mpsc::UnboundedReceiver<ToolCompletion>,
    speech: Option<Box<dyn SpeechSink>>,
    observer: Option<Box<dyn StateObserver>>,
    trace: Box<dyn TraceSink>,
}

impl std::fmt::Debug for OrbBrain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrbBrain")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("pending_calls", &self.pending_calls.len())
            .field("in_flight", &self.in_flight)
            .finish_non_exhaustive()
    }
}

/// Splits the state into the goal list and a behaviour context over the rest.
fn agent_parts<'a>(
    state: &'a mut OrbState,
    grid: &'a OccupancyGrid,
    rng: &'a mut dyn DeterministicRng,
    config: &'a GoalEngineConfig,
    now_ms: u64,
) -> (&'a mut Vec<Goal>, AgentContext<'a>) {
    let OrbState {
        goals,
        perception,
        memory,
        movement_speed,
        position,
        active_goal,
        ..
    } = state;
    let ctx = AgentContext {
        position: *position,
        perception,
        memory,
        grid,
        rng,
        now_ms,
        active_goal: *active_goal,
        movement_speed,
        config,
    };
    (goals, ctx)
}

fn goal_event(tick: u64, tag: &'static str, goal: &Goal) -> TraceEvent {
    TraceEvent::new(tick, tag).with_detail(format!("{} {}", goal.kind, goal.id))
}

impl OrbBrain {
    pub fn new(config: &OrbConfig) -> Self {
        let mut goals = config.goals.clone();
        goals.default_speed = config.brain.default_speed;
        let memory = OrbMemory::new(config.brain.initial_curiosity)
            .with_interaction_cap(config.brain.interaction_cap);
        let mut state = OrbState::new(
            config.brain.spawn_position,
            config.brain.default_speed,
            memory,
        );
        state.autonomy = config.brain.autonomy;
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();

        Self {
            config: config.brain.clone(),
            perception: Perception::new(config.perception),
            engine: GoalEngine::new(goals),
            path_options: config.pathfinding,
            state,
            retired: Vec::new(),
            pending_calls: Vec::new(),
            in_flight: None,
            completions_tx,
            completions_rx,
            speech: None,
            observer: None,
            trace: Box::new(NullTraceSink),
        }
    }

    pub fn with_speech_sink(mut self, sink: Box<dyn SpeechSink>) -> Self {
        self.speech = Some(sink);
        self
    }

    pub fn with_state_observer(mut self, observer: Box<dyn StateObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn with_trace_sink(mut self, sink: Box<dyn TraceSink>) -> Self {
        self.trace = sink;
        self
    }

    /// Overrides the behaviour for one goal kind.
    pub fn register_behavior(&mut self, kind: GoalKind, behavior: Box<dyn GoalBehavior>) {
        self.engine.register(kind, behavior);
    }

    pub fn config(&self) -> &BrainConfig {
        &self.config
    }

    pub fn engine(&self) -> &GoalEngine {
        &self.engine
    }

    /// Snapshot copy of the full state.
    pub fn state(&self) -> OrbState {
        self.state.clone()
    }

    pub fn state_ref(&self) -> &OrbState {
        &self.state
    }

    pub fn position(&self) -> Vec3 {
        self.state.position
    }

    pub fn active_goal(&self) -> Option<&Goal> {
        self.state.active()
    }

    // --- goal management -------------------------------------------------

    pub fn add_goal(&mut self, goal: Goal) -> GoalId {
        let id = goal.id;
        debug!(goal = %id, kind = %goal.kind, priority = goal.priority, "goal added");
        self.state.goals.push(goal);
        id
    }

    /// Removes a goal. If it was active, its exit hook runs on the next tick.
    /// A placement still in flight for it no longer blocks other goals.
    pub fn remove_goal(&mut self, id: GoalId) -> Option<Goal> {
        let idx = self.state.goals.iter().position(|g| g.id == id)?;
        let goal = self.state.goals.remove(idx);
        if self.in_flight == Some(id) {
            self.in_flight = None;
        }
        if self.state.active_goal == Some(id) {
            self.state.active_goal = None;
            self.retired.push(goal.clone());
        }
        Some(goal)
    }

    pub fn clear_goals(&mut self) {
        if let Some(active) = self.state.active_goal.take() {
            if let Some(goal) = self.state.goal(active) {
                self.retired.push(goal.clone());
            }
        }
        self.state.goals.clear();
        self.in_flight = None;
    }

    /// Turning autonomy off stops motion immediately. Tool calls already in
    /// flight still complete.
    pub fn set_autonomy(&mut self, enabled: bool) {
        self.state.autonomy = enabled;
        if !enabled {
            self.state.path.clear();
            self.state.mode = OrbMode::Idle;
        }
        info!(enabled, "autonomy toggled");
    }

    pub fn sync_position(&mut self, position: Vec3) {
        self.state.position = position;
    }

    pub fn take_utterance(&mut self) -> Option<String> {
        self.state.pending_utterance.take()
    }

    // --- tool plumbing ----------------------------------------------------

    /// Tool calls issued since the last drain, oldest first.
    pub fn drain_tool_calls(&mut self) -> Vec<ToolCall> {
        mem::take(&mut self.pending_calls)
    }

    /// Sender for posting [`ToolCompletion`]s; they are applied at the start of
    /// the next tick.
    pub fn completion_sender(&self) -> mpsc::UnboundedSender<ToolCompletion> {
        self.completions_tx.clone()
    }

    pub fn has_tool_call_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Applies every completion posted so far. Returns how many were applied.
    pub fn drain_completions(&mut self, tick: u64) -> usize {
        let mut applied = 0;
        while let Ok(completion) = self.completions_rx.try_recv() {
            self.apply_tool_completion(tick, completion);
            applied += 1;
        }
        applied
    }

    pub fn apply_tool_completion(&mut self, tick: u64, completion: ToolCompletion) {
        // A late completion for a removed goal must not free another goal's slot.
        if self.in_flight == Some(completion.goal_id) {
            self.in_flight = None;
        }
        match completion.result {
            Ok(output) => {
                let Some(goal) = self.state.goal_mut(completion.goal_id) else {
                    debug!(goal = %completion.goal_id, "completion for a goal that is gone");
                    return;
                };
                let total = goal.total_blocks();
                if total == 0 {
                    return;
                }
                let done = goal.next_block_index() + output.blocks_placed;
                goal.progress = (done as f32 / total as f32).min(1.0);
                debug!(
                    goal = %goal.id,
                    placed = output.blocks_placed,
                    progress = goal.progress,
                    "build progressed"
                );
                self.trace.emit(
                    TraceEvent::new(tick, "tool.complete")
                        .with_a(output.blocks_placed as u64)
                        .with_detail(completion.goal_id.to_string()),
                );
            }
            Err(err) => {
                warn!(goal = %completion.goal_id, error = %err, "tool call failed");
                self.trace.emit(
                    TraceEvent::new(tick, "tool.failed").with_detail(err.to_string()),
                );
            }
        }
    }

    // --- external events --------------------------------------------------

    /// Logs a player action. A block placed within reach also adds a
    /// short-lived observe goal unless one from an earlier placement is live.
    pub fn on_player_action(&mut self, action: PlayerAction, now_ms: u64) {
        let mut interaction = Interaction::new(action.kind.clone(), now_ms);
        interaction.position = action.position;
        interaction.data = action.data;
        self.state.memory.record_interaction(interaction);

        if action.kind != PLACE_BLOCK {
            return;
        }
        let Some(at) = action.position else { return };
        if at.distance(self.state.position) > self.config.build_reflex_radius {
            return;
        }
        let already_watching = self.state.goals.iter().any(|g| {
            g.kind == GoalKind::Observe
                && g.is_live(now_ms)
                && g.metadata.get("source").and_then(|v| v.as_str()) == Some(BUILD_REFLEX_SOURCE)
        });
        if already_watching {
            return;
        }

        let focus = detect_player_building(&self.state.memory, now_ms).unwrap_or(at);
        let goal = Goal::new(GoalKind::Observe, self.config.build_reflex_priority, now_ms)
            .with_description("watch the player build")
            .with_target_position(focus)
            .expiring_at(now_ms + self.config.build_reflex_expiry_ms)
            .with_metadata("source", BUILD_REFLEX_SOURCE);
        info!(goal = %goal.id, "player is building nearby");
        self.state.goals.push(goal);
    }

    // --- motion -------------------------------------------------------------

    /// Advances along the current path by `dt` seconds.
    pub fn move_along_path(&mut self, dt: f32) -> MotionStep {
        let step = self.state.path.advance(self.state.position, dt);
        self.state.position = step.position;
        step
    }

    // --- cognition ------------------------------------------------------------

    /// Runs one perceive, evaluate, decide, act and learn cycle and returns
    /// the action taken. Does nothing while autonomy is off.
    pub fn tick(&mut self, ctx: &TickContext, world: &dyn WorldContext) -> OrbAction {
        if !self.state.autonomy {
            return OrbAction::None;
        }
        let now = ctx.now_ms;
        let mut rng = TickContext {
            seed: ctx.seed ^ self.config.seed,
            ..*ctx
        }
        .rng_for_stream(RNG_STREAM);

        self.state.tick_count += 1;
        self.state.last_tick_ms = Some(now);
        self.state.mode = OrbMode::Thinking;

        self.drain_completions(ctx.tick);

        // Perceive.
        self.state.perception = self.perception.perceive(self.state.position, world);
        self.state.last_perception_ms = Some(now);

        let grid = world.grid();
        self.evaluate(ctx.tick, now, grid, &mut rng);
        let action = self.decide(ctx.tick, now, grid, &mut rng);
        self.act(&action, ctx.tick, now, grid);
        self.learn(now);

        if let Some(observer) = self.observer.as_mut() {
            observer.on_state(&self.state);
        }
        action
    }

    fn evaluate(&mut self, tick: u64, now: u64, grid: &OccupancyGrid, rng: &mut SplitMix64) {
        let engine = &self.engine;
        let state = &mut self.state;
        let trace = &mut self.trace;

        for mut goal in mem::take(&mut self.retired) {
            let (_, mut agent) = agent_parts(state, grid, rng, engine.config(), now);
            if let Some(behavior) = engine.behavior(goal.kind) {
                behavior.on_deactivate(&mut goal, &mut agent, false);
            }
            trace.emit(goal_event(tick, "goal.deactivate", &goal));
        }

        if state.goals.is_empty() {
            state.goals = engine.default_goals(&state.memory, now);
            debug!(count = state.goals.len(), "materialised default goals");
        }

        let (live, dropped): (Vec<Goal>, Vec<Goal>) =
            mem::take(&mut state.goals).into_iter().partition(|g| g.is_live(now));
        for mut goal in dropped {
            if state.active_goal != Some(goal.id) {
                continue;
            }
            state.active_goal = None;
            let (_, mut agent) = agent_parts(state, grid, rng, engine.config(), now);
            if let Some(behavior) = engine.behavior(goal.kind) {
                behavior.on_deactivate(&mut goal, &mut agent, false);
            }
            debug!(goal = %goal.id, kind = %goal.kind, "active goal expired");
            trace.emit(goal_event(tick, "goal.deactivate", &goal));
        }

        state.goals = engine.evaluate_goals(live, &state.perception, &state.memory, now);
        let next = engine.select_active(&state.goals);

        if next != state.active_goal {
            if let Some(prev) = state.active_goal {
                let (goals, mut agent) = agent_parts(state, grid, rng, engine.config(), now);
                if let Some(goal) = goals.iter_mut().find(|g| g.id == prev) {
                    goal.status = GoalStatus::Pending;
                    if let Some(behavior) = engine.behavior(goal.kind) {
                        behavior.on_deactivate(goal, &mut agent, false);
                    }
                    trace.emit(goal_event(tick, "goal.deactivate", goal));
                }
            }

            state.active_goal = next;
            if let Some(id) = next {
                let (goals, mut agent) = agent_parts(state, grid, rng, engine.config(), now);
                if let Some(goal) = goals.iter_mut().find(|g| g.id == id) {
                    goal.status = GoalStatus::Active;
                    if let Some(behavior) = engine.behavior(goal.kind) {
                        behavior.on_activate(goal, &mut agent);
                    }
                    info!(goal = %goal.id, kind = %goal.kind, "goal activated");
                    trace.emit(goal_event(tick, "goal.activate", goal));
                }
            }
        }

        state.mode = state
            .active()
            .map(|g| mode_for_goal(g.kind))
            .unwrap_or(OrbMode::Idle);
    }

    fn decide(
        &mut self,
        tick: u64,
        now: u64,
        grid: &OccupancyGrid,
        rng: &mut SplitMix64,
    ) -> OrbAction {
        let engine = &self.engine;
        let state = &mut self.state;
        let trace = &mut self.trace;

        let Some(active) = state.active_goal else {
            return OrbAction::None;
        };

        let (action, completed) = {
            let (goals, mut agent) = agent_parts(state, grid, rng, engine.config(), now);
            match goals.iter_mut().find(|g| g.id == active) {
                None => (OrbAction::None, false),
                Some(goal) => match engine.behavior(goal.kind) {
                    None => {
                        warn!(kind = %goal.kind, "no behaviour registered");
                        (OrbAction::None, false)
                    }
                    Some(behavior) if !behavior.should_continue(goal, &agent) => {
                        goal.status = GoalStatus::Completed;
                        goal.progress = 1.0;
                        behavior.on_deactivate(goal, &mut agent, true);
                        info!(goal = %goal.id, kind = %goal.kind, "goal completed");
                        trace.emit(goal_event(tick, "goal.complete", goal));
                        (OrbAction::None, true)
                    }
                    Some(behavior) => (behavior.tick(goal, &mut agent), false),
                },
            }
        };
        if completed {
            state.active_goal = None;
        }
        action
    }

    fn act(&mut self, action: &OrbAction, tick: u64, now: u64, grid: &OccupancyGrid) {
        match action {
            OrbAction::Move { target, speed } => self.execute_move(*target, *speed, tick, grid),
            OrbAction::Build { blocks } => {
                let Some(goal_id) = self.state.active_goal else {
                    return;
                };
                if let Some(busy) = self.in_flight {
                    debug!(goal = %busy, "placement still in flight, dropping build");
                    self.trace.emit(TraceEvent::new(tick, "action.build_dropped"));
                    return;
                }
                self.pending_calls.push(ToolCall::place_blocks(goal_id, blocks.clone()));
                self.in_flight = Some(goal_id);
                self.state.mode = OrbMode::Acting;
            }
            OrbAction::Speak { message } => {
                self.state.mode = OrbMode::Speaking;
                self.state.pending_utterance = Some(message.clone());
                self.state.last_speech_ms = Some(now);
                if let Some(speech) = self.speech.as_mut() {
                    speech.speak(message);
                }
            }
            OrbAction::Observe { target } => {
                self.state.mode = OrbMode::Scanning;
                if let ObserveTarget::Position(at) = target {
                    self.state.look_target = Some(*at);
                }
            }
            OrbAction::SetGoal { patch } => {
                // Merged in place: the goal keeps its id even when its kind
                // changes (gather handing over to explore), so expiry and
                // anything else keyed by id carries over to the new kind.
                let Some(goal) = self.state.active_goal.and_then(|id| self.state.goal_mut(id))
                else {
                    return;
                };
                goal.apply(patch.clone());
                debug!(goal = %goal.id, kind = %goal.kind, "active goal updated");
            }
            OrbAction::Wait { .. } | OrbAction::None => {}
        }
        if !action.is_none() {
            self.trace
                .emit(TraceEvent::new(tick, format!("action.{}", action.name())));
        }
    }

    fn execute_move(&mut self, target: Vec3, speed: Option<f32>, tick: u64, grid: &OccupancyGrid) {
        if !target.is_finite() {
            warn!(?target, "ignoring move to a non-finite target");
            return;
        }
        let speed = speed.unwrap_or(self.state.movement_speed);
        let stale = self
            .state
            .path
            .final_waypoint()
            .map_or(true, |end| end.distance(target) > self.config.replan_threshold);

        if stale {
            let from = self.state.position;
            let search = Pathfinder::new(grid).search(from, target, &self.path_options);
            if search.is_found() && !search.path.is_empty() {
                let waypoints = search.path.len() as u64;
                self.state.path.set_path(search.path, speed);
                self.trace.emit(
                    TraceEvent::new(tick, "path.planned")
                        .with_a(waypoints)
                        .with_b(search.iterations as u64),
                );
            } else if from.distance(target) < self.config.direct_fallback_distance {
                self.state.path.set_path(vec![target], speed);
                self.trace.emit(TraceEvent::new(tick, "path.direct"));
            } else {
                debug!(outcome = ?search.outcome, ?target, "no path to move target");
                self.trace.emit(
                    TraceEvent::new(tick, "path.failed").with_detail(format!("{:?}", search.outcome)),
                );
            }
        }

        if matches!(self.state.mode, OrbMode::Idle | OrbMode::Thinking) {
            self.state.mode = OrbMode::Acting;
        }
    }

    fn learn(&mut self, now: u64) {
        let config = &self.config;
        let state = &mut self.state;

        state.memory.record_visit(state.position, now);

        let moving = state.path.is_moving();
        let active_kind = state.active().map(|g| g.kind);
        if moving && active_kind == Some(GoalKind::Explore) {
            state
                .memory
                .adjust_curiosity(-config.curiosity_decay, config.curiosity_floor);
        } else {
            state.memory.adjust_curiosity(config.curiosity_growth, 0.0);
        }
        if moving {
            state.memory.adjust_energy(-config.energy_drain);
        } else {
            state.memory.adjust_energy(config.energy_recovery);
        }

        state.memory.update_mood(
            state.perception.player.distance,
            active_kind == Some(GoalKind::Idle),
        );

        if !moving && state.mode != OrbMode::Speaking {
            state.mode = OrbMode::Idle;
        }
    }
}
