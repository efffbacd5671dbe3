#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Opaque block type identifier owned by the host's world/item layer.
///
/// Only the ids the agent reasons about are named here; every other value is
/// passed through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct BlockType(pub u8);

impl BlockType {
    pub const AIR: Self = Self(0);
    pub const GRASS: Self = Self(1);
    pub const DIRT: Self = Self(2);
    pub const STONE: Self = Self(3);
    pub const WOOD: Self = Self(4);
    pub const LEAF: Self = Self(5);
    pub const WATER: Self = Self(6);

    pub fn id(self) -> u8 {
        self.0
    }

    pub fn is_air(self) -> bool {
        self == Self::AIR
    }

    /// Block types the agent can harvest.
    pub fn is_resource(self) -> bool {
        matches!(self, Self::WOOD | Self::LEAF | Self::STONE)
    }
}

impl From<u8> for BlockType {
    fn from(value: u8) -> Self {
        Self(value)
    }
}
