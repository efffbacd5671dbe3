use orb_core::Vec3;

use crate::{AgentContext, Goal, GoalBehavior, OrbAction};

/// Places `target_blocks` one at a time, in order.
///
/// Progress is advanced by the brain when a placement is confirmed, never here.
#[derive(Debug, Default)]
pub struct BuildBehavior;

impl GoalBehavior for BuildBehavior {
    fn tick(&self, goal: &mut Goal, ctx: &mut AgentContext<'_>) -> OrbAction {
        let Some(blocks) = goal.target_blocks.as_ref() else {
            return OrbAction::None;
        };
        let Some(next) = blocks.get(goal.next_block_index()) else {
            return OrbAction::None;
        };

        let site = next.position.center();
        if ctx.position.distance(site) > ctx.config.build_reach {
            return OrbAction::move_to(site + Vec3::new(0.0, 2.0, 0.0));
        }
        OrbAction::Build {
            blocks: vec![*next],
        }
    }

    fn should_continue(&self, goal: &Goal, _ctx: &AgentContext<'_>) -> bool {
        goal.progress < 1.0
    }
}
