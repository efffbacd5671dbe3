use orb_core::Vec3;

use crate::{AgentContext, Goal, GoalBehavior, GoalKind, GoalPatch, GoalStatus, OrbAction};

#[derive(Debug, Default)]
pub struct GatherBehavior;

impl GoalBehavior for GatherBehavior {
    fn tick(&self, _goal: &mut Goal, ctx: &mut AgentContext<'_>) -> OrbAction {
        let Some(resource) = ctx.perception.nearest_block_matching(|b| b.is_resource()) else {
            // Nothing to harvest in range: turn this goal into an exploration.
            return OrbAction::SetGoal {
                patch: GoalPatch {
                    description: Some("explore for resources".to_string()),
                    ..GoalPatch::kind(GoalKind::Explore)
                },
            };
        };

        let block = resource.position.center();
        let approach = block + Vec3::Y;
        if ctx.position.distance(approach) > ctx.config.gather_reach {
            OrbAction::move_to(approach)
        } else {
            OrbAction::observe_position(block)
        }
    }

    fn should_continue(&self, goal: &Goal, _ctx: &AgentContext<'_>) -> bool {
        goal.status == GoalStatus::Active
    }
}
