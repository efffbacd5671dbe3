use orb_core::{DeterministicRng, Vec3};
use orb_nav::OccupancyGrid;
use orb_perception::{OrbMemory, PerceptionData};

use crate::{Goal, GoalEngineConfig, GoalId, OrbAction};

/// Everything a behaviour may read or adjust while deciding.
pub struct AgentContext<'a> {
    pub position: Vec3,
    pub perception: &'a PerceptionData,
    pub memory: &'a mut OrbMemory,
    pub grid: &'a OccupancyGrid,
    pub rng: &'a mut dyn DeterministicRng,
    pub now_ms: u64,
    pub active_goal: Option<GoalId>,
    /// Speed used for moves that do not name one.
    pub movement_speed: &'a mut f32,
    pub config: &'a GoalEngineConfig,
}

/// Per-kind goal logic.
///
/// `tick` may update the goal it is given (for example to remember a chosen
/// target) but reports everything else through the returned action.
pub trait GoalBehavior: Send + Sync {
    fn tick(&self, goal: &mut Goal, ctx: &mut AgentContext<'_>) -> OrbAction;

    fn should_continue(&self, goal: &Goal, ctx: &AgentContext<'_>) -> bool;

    fn on_activate(&self, _goal: &mut Goal, _ctx: &mut AgentContext<'_>) {}

    fn on_deactivate(&self, _goal: &mut Goal, _ctx: &mut AgentContext<'_>, _completed: bool) {}
}
