use orb_core::{BlockType, IVec3, Vec3};

use crate::EntityKind;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NearbyBlock {
    pub position: IVec3,
    pub block: BlockType,
    pub distance: f32,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NearbyEntity {
    pub id: String,
    pub kind: EntityKind,
    pub position: Vec3,
    pub distance: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PlayerPerception {
    pub position: Vec3,
    pub distance: f32,
    pub visible: bool,
    pub look_direction: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum FeatureKind {
    Cliff,
    Water,
    Tree,
    FlatArea,
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TerrainFeature {
    pub kind: FeatureKind,
    pub position: Vec3,
    pub distance: f32,
}

/// Everything the agent knows about its surroundings for one tick.
///
/// Lists are sorted by ascending distance. A new snapshot replaces the old one
/// wholesale; nothing mutates it after [`crate::Perception::perceive`] returns.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PerceptionData {
    pub nearby_blocks: Vec<NearbyBlock>,
    pub nearby_entities: Vec<NearbyEntity>,
    pub player: PlayerPerception,
    pub terrain_features: Vec<TerrainFeature>,
    pub time_of_day: f32,
}

impl PerceptionData {
    pub fn nearest_block_matching(&self, mut pred: impl FnMut(BlockType) -> bool) -> Option<&NearbyBlock> {
        self.nearby_blocks.iter().find(|b| pred(b.block))
    }

    pub fn entity(&self, id: &str) -> Option<&NearbyEntity> {
        self.nearby_entities.iter().find(|e| e.id == id)
    }
}
