//! Host-world interface consumed by perception and the brain.

use std::collections::HashMap;

use orb_core::{BlockType, IVec3, Vec3};
use orb_nav::{GridBounds, OccupancyGrid};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PlayerInfo {
    /// Eye position of the flying camera.
    pub position: Vec3,
    pub look_direction: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BlockInfo {
    pub position: IVec3,
    pub block: BlockType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum EntityKind {
    Orb,
    Player,
    Mob,
    Item,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EntityInfo {
    pub id: String,
    pub kind: EntityKind,
    pub position: Vec3,
}

/// Read-only view of the world the agent lives in.
///
/// The occupancy grid is the authority for solidity; `block_at` and
/// `blocks_in_area` additionally report block types.
pub trait WorldContext {
    fn grid(&self) -> &OccupancyGrid;

    fn player(&self) -> PlayerInfo;

    /// Normalised time of day in `[0, 1)`.
    fn time_of_day(&self) -> f32;

    fn block_at(&self, cell: IVec3) -> Option<BlockType>;

    /// Every non-air block whose cell centre lies within `radius` of `center`.
    fn blocks_in_area(&self, center: Vec3, radius: f32) -> Vec<BlockInfo>;

    fn entities(&self) -> Vec<EntityInfo>;

    fn has_block(&self, cell: IVec3) -> bool {
        self.grid().has_cell(cell)
    }
}

/// In-memory world: dense occupancy plus a sparse type map keyed by packed cell.
#[derive(Debug, Clone, Default)]
pub struct SandboxWorld {
    grid: OccupancyGrid,
    blocks: HashMap<u64, BlockType>,
    player: PlayerInfo,
    entities: Vec<EntityInfo>,
    time_of_day: f32,
}

impl SandboxWorld {
    pub fn new(bounds: GridBounds) -> Self {
        Self {
            grid: OccupancyGrid::new(bounds),
            blocks: HashMap::new(),
            player: PlayerInfo::default(),
            entities: Vec::new(),
            time_of_day: 0.5,
        }
    }

    /// Writes one block. `AIR` removes; out-of-bounds cells are ignored.
    pub fn set_block(&mut self, cell: IVec3, block: BlockType) {
        if !self.grid.in_bounds(cell) {
            return;
        }
        if block.is_air() {
            self.remove_block(cell);
            return;
        }
        self.grid.set_cell(cell);
        self.blocks.insert(cell.pack(), block);
    }

    pub fn remove_block(&mut self, cell: IVec3) {
        self.grid.remove_cell(cell);
        self.blocks.remove(&cell.pack());
    }

    /// Writes a batch and returns how many in-bounds cells were touched.
    pub fn place_blocks<'a, I>(&mut self, blocks: I) -> usize
    where
        I: IntoIterator<Item = &'a BlockInfo>,
    {
        let mut placed = 0;
        for info in blocks {
            if self.grid.in_bounds(info.position) {
                self.set_block(info.position, info.block);
                placed += 1;
            }
        }
        placed
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    pub fn set_player(&mut self, position: Vec3, look_direction: Vec3) {
        self.player = PlayerInfo {
            position,
            look_direction,
        };
    }

    pub fn set_time_of_day(&mut self, time: f32) {
        self.time_of_day = time.rem_euclid(1.0);
    }

    pub fn add_entity(&mut self, entity: EntityInfo) {
        self.entities.retain(|e| e.id != entity.id);
        self.entities.push(entity);
    }

    pub fn remove_entity(&mut self, id: &str) {
        self.entities.retain(|e| e.id != id);
    }

    pub fn reset(&mut self) {
        self.grid.clear();
        self.blocks.clear();
        self.entities.clear();
    }
}

impl WorldContext for SandboxWorld {
    fn grid(&self) -> &OccupancyGrid {
        &self.grid
    }

    fn player(&self) -> PlayerInfo {
        self.player
    }

    fn time_of_day(&self) -> f32 {
        self.time_of_day
    }

    fn block_at(&self, cell: IVec3) -> Option<BlockType> {
        self.blocks.get(&cell.pack()).copied()
    }

    fn blocks_in_area(&self, center: Vec3, radius: f32) -> Vec<BlockInfo> {
        if !center.is_finite() || radius < 0.0 {
            return Vec::new();
        }
        let radius_sq = radius * radius;
        let mut out: Vec<(u64, BlockInfo)> = self
            .blocks
            .iter()
            .filter_map(|(&key, &block)| {
                let position = IVec3::unpack(key);
                let d = position.center() - center;
                (d.dot(d) <= radius_sq).then_some((key, BlockInfo { position, block }))
            })
            .collect();
        // Map iteration order is unspecified; keep results reproducible.
        out.sort_unstable_by_key(|(key, _)| *key);
        out.into_iter().map(|(_, info)| info).collect()
    }

    fn entities(&self) -> Vec<EntityInfo> {
        self.entities.clone()
    }
}
