//! Sensing for the Orb agent: the host world interface, per-tick perception
//! snapshots and the memory that persists between ticks.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod memory;
pub mod perception;
pub mod snapshot;
pub mod world;

pub use memory::{Interaction, Mood, OrbMemory, RegionKey, RegionVisit};
pub use perception::{
    check_line_of_sight, detect_player_building, find_unexplored_direction,
    is_near_interesting_feature, Perception, PerceptionConfig,
};
pub use snapshot::{
    FeatureKind, NearbyBlock, NearbyEntity, PerceptionData, PlayerPerception, TerrainFeature,
};
pub use world::{BlockInfo, EntityInfo, EntityKind, PlayerInfo, SandboxWorld, WorldContext};
