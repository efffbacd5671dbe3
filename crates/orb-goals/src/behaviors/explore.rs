use std::f32::consts::TAU;

use orb_core::Vec3;
use orb_perception::find_unexplored_direction;

use crate::{AgentContext, Goal, GoalBehavior, OrbAction};

/// Heads for the least-visited nearby region, remembering the pick as the
/// goal's target until it is reached.
#[derive(Debug, Default)]
pub struct ExploreBehavior;

impl GoalBehavior for ExploreBehavior {
    fn tick(&self, goal: &mut Goal, ctx: &mut AgentContext<'_>) -> OrbAction {
        let config = ctx.config;
        if let Some(target) = goal.target_position {
            if ctx.position.distance(target) > config.explore_arrive_distance {
                return OrbAction::move_to(target);
            }
        }

        let target = match find_unexplored_direction(ctx.position, ctx.memory, ctx.grid) {
            Some(target) => target,
            None => {
                let angle = ctx.rng.next_range(0.0, TAU);
                let distance = ctx
                    .rng
                    .next_range(config.explore_min_distance, config.explore_max_distance);
                let jitter = ctx
                    .rng
                    .next_range(-config.explore_vertical_jitter, config.explore_vertical_jitter);
                ctx.position + Vec3::new(angle.cos() * distance, jitter, angle.sin() * distance)
            }
        };
        goal.target_position = Some(target);
        OrbAction::move_to(target)
    }

    fn should_continue(&self, _goal: &Goal, ctx: &AgentContext<'_>) -> bool {
        ctx.memory.curiosity() > ctx.config.explore_min_curiosity
    }
}
