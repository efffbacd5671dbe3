use crate::{AgentContext, Goal, GoalBehavior, OrbAction};

#[derive(Debug, Default)]
pub struct InvestigateBehavior;

impl GoalBehavior for InvestigateBehavior {
    fn tick(&self, goal: &mut Goal, ctx: &mut AgentContext<'_>) -> OrbAction {
        let Some(target) = goal.target_position else {
            return OrbAction::None;
        };
        if ctx.position.distance(target) > ctx.config.investigate_reach {
            OrbAction::move_to(target)
        } else {
            OrbAction::observe_position(target)
        }
    }

    fn should_continue(&self, goal: &Goal, ctx: &AgentContext<'_>) -> bool {
        goal.target_position.is_some_and(|t| {
            ctx.position.distance(t) > ctx.config.investigate_done_distance
        })
    }

    fn on_deactivate(&self, goal: &mut Goal, ctx: &mut AgentContext<'_>, completed: bool) {
        if completed {
            let at = goal.target_position.unwrap_or(ctx.position);
            ctx.memory.record_visit(at, ctx.now_ms);
        }
    }
}
