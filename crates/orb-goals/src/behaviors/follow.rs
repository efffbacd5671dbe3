use orb_core::Vec3;

use crate::{AgentContext, Goal, GoalBehavior, OrbAction};

/// Trails the player from behind, slightly above eye level.
#[derive(Debug, Default)]
pub struct FollowPlayerBehavior;

impl FollowPlayerBehavior {
    fn station(ctx: &AgentContext<'_>) -> Vec3 {
        let player = &ctx.perception.player;
        let mut back = -player.look_direction.horizontal().normalize_or_zero();
        if back == Vec3::ZERO {
            back = (ctx.position - player.position).horizontal().normalize_or_zero();
        }
        if back == Vec3::ZERO {
            back = Vec3::new(1.0, 0.0, 0.0);
        }
        player.position
            + back * ctx.config.follow_offset
            + Vec3::new(0.0, ctx.config.follow_height, 0.0)
    }
}

impl GoalBehavior for FollowPlayerBehavior {
    fn tick(&self, _goal: &mut Goal, ctx: &mut AgentContext<'_>) -> OrbAction {
        let distance = ctx.perception.player.distance;
        if distance > ctx.config.follow_far || distance < ctx.config.follow_near {
            OrbAction::move_to(Self::station(ctx))
        } else {
            OrbAction::None
        }
    }

    fn should_continue(&self, goal: &Goal, ctx: &AgentContext<'_>) -> bool {
        ctx.active_goal == Some(goal.id)
    }

    fn on_activate(&self, _goal: &mut Goal, ctx: &mut AgentContext<'_>) {
        *ctx.movement_speed = ctx.config.follow_speed;
    }

    fn on_deactivate(&self, _goal: &mut Goal, ctx: &mut AgentContext<'_>, _completed: bool) {
        *ctx.movement_speed = ctx.config.default_speed;
    }
}
