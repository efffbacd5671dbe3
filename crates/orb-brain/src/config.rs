//! Agent configuration, loaded from YAML.

use std::path::Path;

use anyhow::{Context, Result};
use orb_core::Vec3;
use orb_goals::GoalEngineConfig;
use orb_nav::{GridBounds, PathOptions};
use orb_perception::PerceptionConfig;
use serde::{Deserialize, Serialize};

/// Everything needed to stand up an agent and its world.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbConfig {
    pub brain: BrainConfig,
    pub perception: PerceptionConfig,
    pub goals: GoalEngineConfig,
    pub pathfinding: PathOptions,
    pub world: GridBounds,
}

impl OrbConfig {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        let config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;
        Ok(config)
    }

    /// Loads `path` when given and present, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) if path.exists() => Self::load(path),
            Some(path) => {
                tracing::warn!(path = %path.display(), "config file not found, using defaults");
                Ok(Self::default())
            }
            None => Ok(Self::default()),
        }
    }
}

/// Control-loop tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrainConfig {
    /// Interval between cognition ticks.
    pub behavior_tick_rate_ms: u64,
    /// Interval between motion integration steps in the driver.
    pub frame_interval_ms: u64,
    pub spawn_position: Vec3,
    pub autonomy: bool,
    pub seed: u64,

    /// Speed for moves that name none.
    pub default_speed: f32,
    /// A move target further than this from the current path end triggers a replan.
    pub replan_threshold: f32,
    /// Failed searches fall back to a straight line only below this distance.
    pub direct_fallback_distance: f32,

    pub interaction_cap: usize,
    pub build_reflex_radius: f32,
    pub build_reflex_priority: u8,
    pub build_reflex_expiry_ms: u64,

    pub initial_curiosity: f32,
    pub curiosity_decay: f32,
    pub curiosity_floor: f32,
    pub curiosity_growth: f32,
    pub energy_drain: f32,
    pub energy_recovery: f32,
}

impl Default for BrainConfig {
    fn default() -> Self {
        Self {
            behavior_tick_rate_ms: 500,
            frame_interval_ms: 16,
            spawn_position: Vec3::new(0.0, 5.0, 0.0),
            autonomy: true,
            seed: 0,

            default_speed: 5.0,
            replan_threshold: 2.0,
            direct_fallback_distance: 10.0,

            interaction_cap: 50,
            build_reflex_radius: 20.0,
            build_reflex_priority: 6,
            build_reflex_expiry_ms: 60_000,

            initial_curiosity: 0.6,
            curiosity_decay: 0.01,
            curiosity_floor: 0.1,
            curiosity_growth: 0.005,
            energy_drain: 0.002,
            energy_recovery: 0.001,
        }
    }
}
