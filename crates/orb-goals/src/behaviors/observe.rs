use orb_core::Vec3;

use crate::{AgentContext, Goal, GoalBehavior, GoalKind, OrbAction};

/// Watches the player from a comfortable distance.
#[derive(Debug, Default)]
pub struct ObserveBehavior;

impl GoalBehavior for ObserveBehavior {
    fn tick(&self, _goal: &mut Goal, ctx: &mut AgentContext<'_>) -> OrbAction {
        let config = ctx.config;
        let player = ctx.perception.player.position;
        let distance = ctx.position.distance(player);

        if (config.observe_min_distance..=config.observe_max_distance).contains(&distance) {
            return OrbAction::observe_position(player);
        }

        let mut away = (ctx.position - player).normalize_or_zero();
        if away == Vec3::ZERO {
            away = Vec3::new(1.0, 0.0, 0.0);
        }
        OrbAction::move_to(player + away * config.observe_distance)
    }

    fn should_continue(&self, goal: &Goal, _ctx: &AgentContext<'_>) -> bool {
        goal.kind == GoalKind::Observe
    }
}
