#![allow(dead_code)]

use orb_core::{SplitMix64, Vec3};
use orb_goals::{AgentContext, GoalEngineConfig, GoalId};
use orb_nav::{GridBounds, OccupancyGrid};
use orb_perception::{OrbMemory, PerceptionData};

/// Owns everything an [`AgentContext`] borrows.
pub struct Fixture {
    pub perception: PerceptionData,
    pub memory: OrbMemory,
    pub grid: OccupancyGrid,
    pub rng: SplitMix64,
    pub speed: f32,
    pub config: GoalEngineConfig,
    pub active_goal: Option<GoalId>,
    pub now_ms: u64,
}

impl Default for Fixture {
    fn default() -> Self {
        Self {
            perception: PerceptionData::default(),
            memory: OrbMemory::new(0.6),
            grid: OccupancyGrid::new(GridBounds::default()),
            rng: SplitMix64::new(7),
            speed: 5.0,
            config: GoalEngineConfig::default(),
            active_goal: None,
            now_ms: 1_000,
        }
    }
}

impl Fixture {
    pub fn ctx(&mut self, position: Vec3) -> AgentContext<'_> {
        AgentContext {
            position,
            perception: &self.perception,
            memory: &mut self.memory,
            grid: &self.grid,
            rng: &mut self.rng,
            now_ms: self.now_ms,
            active_goal: self.active_goal,
            movement_speed: &mut self.speed,
            config: &self.config,
        }
    }

    pub fn place_player(&mut self, player: Vec3, orb: Vec3) {
        self.perception.player.position = player;
        self.perception.player.distance = orb.distance(player);
        self.perception.player.visible = true;
    }
}
