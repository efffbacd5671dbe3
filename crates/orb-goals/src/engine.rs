//! Goal prioritisation and the behaviour registry.

use std::collections::HashMap;

use orb_perception::{OrbMemory, PerceptionData};

use crate::behaviors::{
    BuildBehavior, ExploreBehavior, FollowPlayerBehavior, GatherBehavior, IdleBehavior,
    InvestigateBehavior, ObserveBehavior,
};
use crate::{Goal, GoalBehavior, GoalId, GoalKind, GoalStatus, MAX_PRIORITY};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Thresholds for prioritisation and for every built-in behaviour.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GoalEngineConfig {
    // Prioritisation.
    pub follow_boost_distance: f32,
    pub explore_boost_curiosity: f32,
    pub default_explore_curiosity: f32,
    pub idle_priority: u8,
    pub explore_priority: u8,
    pub observe_priority: u8,

    // Movement.
    pub default_speed: f32,
    pub follow_speed: f32,
    pub follow_offset: f32,
    pub follow_height: f32,
    pub follow_far: f32,
    pub follow_near: f32,

    pub explore_arrive_distance: f32,
    pub explore_min_distance: f32,
    pub explore_max_distance: f32,
    pub explore_vertical_jitter: f32,
    pub explore_min_curiosity: f32,

    pub build_reach: f32,
    pub gather_reach: f32,

    pub observe_min_distance: f32,
    pub observe_max_distance: f32,
    pub observe_distance: f32,

    pub idle_drift_chance: f32,
    pub idle_wait_ms: u64,

    pub investigate_reach: f32,
    pub investigate_done_distance: f32,
}

impl Default for GoalEngineConfig {
    fn default() -> Self {
        Self {
            follow_boost_distance: 15.0,
            explore_boost_curiosity: 0.7,
            default_explore_curiosity: 0.5,
            idle_priority: 1,
            explore_priority: 3,
            observe_priority: 4,

            default_speed: 5.0,
            follow_speed: 8.0,
            follow_offset: 5.0,
            follow_height: 2.0,
            follow_far: 7.0,
            follow_near: 4.0,

            explore_arrive_distance: 2.0,
            explore_min_distance: 15.0,
            explore_max_distance: 30.0,
            explore_vertical_jitter: 3.0,
            explore_min_curiosity: 0.3,

            build_reach: 4.0,
            gather_reach: 3.0,

            observe_min_distance: 6.0,
            observe_max_distance: 11.0,
            observe_distance: 8.0,

            idle_drift_chance: 0.1,
            idle_wait_ms: 1_000,

            investigate_reach: 3.0,
            investigate_done_distance: 2.0,
        }
    }
}

/// Picks the goal to pursue and owns one behaviour per [`GoalKind`].
pub struct GoalEngine {
    config: GoalEngineConfig,
    behaviors: HashMap<GoalKind, Box<dyn GoalBehavior>>,
}

impl Default for GoalEngine {
    fn default() -> Self {
        Self::new(GoalEngineConfig::default())
    }
}

impl std::fmt::Debug for GoalEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut kinds: Vec<_> = self.behaviors.keys().collect();
        kinds.sort();
        f.debug_struct("GoalEngine")
            .field("config", &self.config)
            .field("behaviors", &kinds)
            .finish()
    }
}

impl GoalEngine {
    pub fn new(config: GoalEngineConfig) -> Self {
        let mut engine = Self {
            config,
            behaviors: HashMap::new(),
        };
        engine.register(GoalKind::FollowPlayer, Box::new(FollowPlayerBehavior));
        engine.register(GoalKind::Explore, Box::new(ExploreBehavior));
        engine.register(GoalKind::Build, Box::new(BuildBehavior));
        engine.register(GoalKind::Gather, Box::new(GatherBehavior));
        engine.register(GoalKind::Observe, Box::new(ObserveBehavior));
        engine.register(GoalKind::Idle, Box::new(IdleBehavior));
        engine.register(GoalKind::Investigate, Box::new(InvestigateBehavior));
        engine
    }

    pub fn config(&self) -> &GoalEngineConfig {
        &self.config
    }

    /// Replaces the behaviour used for `kind`.
    pub fn register(&mut self, kind: GoalKind, behavior: Box<dyn GoalBehavior>) {
        self.behaviors.insert(kind, behavior);
    }

    pub fn behavior(&self, kind: GoalKind) -> Option<&dyn GoalBehavior> {
        self.behaviors.get(&kind).map(|b| b.as_ref())
    }

    /// Drops finished and expired goals, recomputes each survivor's
    /// `effective_priority` from its base priority, and stable-sorts the list
    /// highest first.
    pub fn evaluate_goals(
        &self,
        goals: Vec<Goal>,
        perception: &PerceptionData,
        memory: &OrbMemory,
        now_ms: u64,
    ) -> Vec<Goal> {
        let before = goals.len();
        let mut goals: Vec<Goal> = goals.into_iter().filter(|g| g.is_live(now_ms)).collect();
        if goals.len() < before {
            tracing::trace!(dropped = before - goals.len(), "pruned finished or expired goals");
        }
        for goal in &mut goals {
            let nudge = self.priority_nudge(goal.kind, perception, memory);
            let base = goal.priority.min(MAX_PRIORITY) as i32;
            goal.effective_priority = (base + nudge).clamp(0, MAX_PRIORITY as i32) as u8;
        }
        goals.sort_by(|a, b| b.effective_priority.cmp(&a.effective_priority));
        goals
    }

    fn priority_nudge(
        &self,
        kind: GoalKind,
        perception: &PerceptionData,
        memory: &OrbMemory,
    ) -> i32 {
        let config = &self.config;
        match kind {
            GoalKind::FollowPlayer if perception.player.distance > config.follow_boost_distance => 2,
            GoalKind::Explore if memory.curiosity() > config.explore_boost_curiosity => 1,
            GoalKind::Observe if perception.player.visible => 1,
            GoalKind::Idle if !perception.terrain_features.is_empty() => -2,
            _ => 0,
        }
    }

    /// Goals materialised when the agent has none.
    pub fn default_goals(&self, memory: &OrbMemory, now_ms: u64) -> Vec<Goal> {
        let mut goals = vec![Goal::new(GoalKind::Idle, self.config.idle_priority, now_ms)
            .with_description("idle around")];
        if memory.curiosity() > self.config.default_explore_curiosity {
            goals.push(
                Goal::new(GoalKind::Explore, self.config.explore_priority, now_ms)
                    .with_description("explore the surroundings"),
            );
        }
        goals.push(
            Goal::new(GoalKind::Observe, self.config.observe_priority, now_ms)
                .with_description("watch the player"),
        );
        goals
    }

    /// First goal in evaluated order that may run.
    pub fn select_active(&self, goals: &[Goal]) -> Option<GoalId> {
        goals
            .iter()
            .find(|g| matches!(g.status, GoalStatus::Pending | GoalStatus::Active))
            .map(|g| g.id)
    }
}
