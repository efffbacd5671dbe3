use orb_core::Vec3;

use crate::{AgentContext, Goal, GoalBehavior, OrbAction};

/// Fallback goal: mostly waits, occasionally drifts a little.
#[derive(Debug, Default)]
pub struct IdleBehavior;

impl GoalBehavior for IdleBehavior {
    fn tick(&self, _goal: &mut Goal, ctx: &mut AgentContext<'_>) -> OrbAction {
        if !ctx.rng.chance(ctx.config.idle_drift_chance) {
            return OrbAction::Wait {
                duration_ms: ctx.config.idle_wait_ms,
            };
        }
        let mut axis = || ctx.rng.next_sign() * ctx.rng.next_range(1.0, 2.0);
        let drift = Vec3::new(axis(), axis(), axis());
        OrbAction::move_to(ctx.position + drift)
    }

    fn should_continue(&self, _goal: &Goal, _ctx: &AgentContext<'_>) -> bool {
        true
    }
}
