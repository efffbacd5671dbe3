//! Builds [`PerceptionData`] snapshots and answers a few spatial questions
//! about them.

use std::collections::BTreeMap;

use orb_core::{BlockType, Vec3};
use orb_nav::OccupancyGrid;

use crate::memory::PLACE_BLOCK;
use crate::snapshot::{
    FeatureKind, NearbyBlock, NearbyEntity, PerceptionData, PlayerPerception, TerrainFeature,
};
use crate::{EntityKind, OrbMemory, WorldContext};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Distance of the candidate points scanned by [`find_unexplored_direction`].
pub const EXPLORATION_DISTANCE: f32 = 20.0;
/// Look-back window for [`detect_player_building`].
pub const BUILDING_WINDOW_MS: u64 = 30_000;
pub const BUILDING_MIN_PLACEMENTS: usize = 3;

const CLIFF_VARIATION: i32 = 10;
const WATER_MIN_BLOCKS: usize = 4;
const FLAT_MAX_VARIATION: i32 = 2;
const FLAT_MIN_BLOCKS: usize = 10;

/// Compass order used when scanning for unexplored ground.
const DIRECTIONS: [(f32, f32); 8] = [
    (1.0, 0.0),
    (1.0, 1.0),
    (0.0, 1.0),
    (-1.0, 1.0),
    (-1.0, 0.0),
    (-1.0, -1.0),
    (0.0, -1.0),
    (1.0, -1.0),
];

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PerceptionConfig {
    pub perception_radius: f32,
    pub max_blocks_to_track: usize,
    pub max_terrain_features: usize,
    /// X/Z edge length of a terrain-analysis bucket.
    pub feature_region_size: i32,
}

impl Default for PerceptionConfig {
    fn default() -> Self {
        Self {
            perception_radius: 30.0,
            max_blocks_to_track: 100,
            max_terrain_features: 10,
            feature_region_size: 5,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Perception {
    config: PerceptionConfig,
}

impl Perception {
    pub fn new(config: PerceptionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PerceptionConfig {
        &self.config
    }

    pub fn perceive(&self, orb_position: Vec3, world: &dyn WorldContext) -> PerceptionData {
        let radius = self.config.perception_radius;
        let player_info = world.player();

        let player = PlayerPerception {
            position: player_info.position,
            distance: orb_position.distance(player_info.position),
            visible: check_line_of_sight(world.grid(), orb_position, player_info.position),
            look_direction: player_info.look_direction,
        };

        let mut nearby_blocks: Vec<NearbyBlock> = world
            .blocks_in_area(orb_position, radius)
            .into_iter()
            .map(|info| NearbyBlock {
                position: info.position,
                block: info.block,
                distance: orb_position.distance(info.position.center()),
            })
            .collect();
        nearby_blocks.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        nearby_blocks.truncate(self.config.max_blocks_to_track);

        let mut nearby_entities: Vec<NearbyEntity> = world
            .entities()
            .into_iter()
            .filter(|e| e.kind != EntityKind::Orb)
            .filter_map(|e| {
                let distance = orb_position.distance(e.position);
                (distance <= radius).then_some(NearbyEntity {
                    id: e.id,
                    kind: e.kind,
                    position: e.position,
                    distance,
                })
            })
            .collect();
        nearby_entities.sort_by(|a, b| a.distance.total_cmp(&b.distance));

        let terrain_features = self.analyze_terrain(orb_position, &nearby_blocks);

        tracing::trace!(
            blocks = nearby_blocks.len(),
            entities = nearby_entities.len(),
            features = terrain_features.len(),
            player_visible = player.visible,
            "perceived surroundings"
        );

        PerceptionData {
            nearby_blocks,
            nearby_entities,
            player,
            terrain_features,
            time_of_day: world.time_of_day(),
        }
    }

    fn analyze_terrain(&self, orb_position: Vec3, blocks: &[NearbyBlock]) -> Vec<TerrainFeature> {
        #[derive(Default)]
        struct Bucket {
            min_y: i32,
            max_y: i32,
            count: usize,
            water: usize,
            wood: bool,
            leaf: bool,
        }

        let size = self.config.feature_region_size.max(1);
        let mut buckets: BTreeMap<(i32, i32), Bucket> = BTreeMap::new();
        for block in blocks {
            let key = (block.position.x.div_euclid(size), block.position.z.div_euclid(size));
            let bucket = buckets.entry(key).or_insert_with(|| Bucket {
                min_y: block.position.y,
                max_y: block.position.y,
                ..Bucket::default()
            });
            bucket.min_y = bucket.min_y.min(block.position.y);
            bucket.max_y = bucket.max_y.max(block.position.y);
            bucket.count += 1;
            match block.block {
                BlockType::WATER => bucket.water += 1,
                BlockType::WOOD => bucket.wood = true,
                BlockType::LEAF => bucket.leaf = true,
                _ => {}
            }
        }

        let half = size as f32 * 0.5;
        let mut features: Vec<TerrainFeature> = buckets
            .into_iter()
            .filter_map(|((bx, bz), b)| {
                let variation = b.max_y - b.min_y;
                let kind = if variation > CLIFF_VARIATION {
                    FeatureKind::Cliff
                } else if b.water >= WATER_MIN_BLOCKS {
                    FeatureKind::Water
                } else if b.wood && b.leaf {
                    FeatureKind::Tree
                } else if variation < FLAT_MAX_VARIATION && b.count > FLAT_MIN_BLOCKS {
                    FeatureKind::FlatArea
                } else {
                    return None;
                };
                let position = Vec3::new(
                    (bx * size) as f32 + half,
                    b.max_y as f32,
                    (bz * size) as f32 + half,
                );
                Some(TerrainFeature {
                    kind,
                    position,
                    distance: orb_position.distance(position),
                })
            })
            .collect();
        features.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        features.truncate(self.config.max_terrain_features);
        features
    }
}

/// Coarse visibility test sampling the grid once per world unit.
///
/// Endpoints are not sampled, so an eye inside a block still sees out.
pub fn check_line_of_sight(grid: &OccupancyGrid, from: Vec3, to: Vec3) -> bool {
    if !from.is_finite() || !to.is_finite() {
        return false;
    }
    let delta = to - from;
    let distance = delta.length();
    let dir = delta.normalize_or_zero();
    let mut t = 1.0;
    while t < distance {
        if grid.has_block_at(from + dir * t) {
            return false;
        }
        t += 1.0;
    }
    true
}

/// Picks the least-visited of eight horizontal directions, returning a point
/// [`EXPLORATION_DISTANCE`] away.
///
/// Unvisited regions win, then the lowest visit count, then the oldest visit;
/// remaining ties go to the earliest direction in compass order. Candidates
/// inside solid cells or outside the grid are skipped.
pub fn find_unexplored_direction(
    position: Vec3,
    memory: &OrbMemory,
    grid: &OccupancyGrid,
) -> Option<Vec3> {
    let mut best: Option<((u32, u64), Vec3)> = None;
    for (dx, dz) in DIRECTIONS {
        let dir = Vec3::new(dx, 0.0, dz).normalize_or_zero();
        let candidate = position + dir * EXPLORATION_DISTANCE;
        if !grid.in_bounds(candidate.floor()) || grid.has_block_at(candidate) {
            continue;
        }
        let rank = memory
            .visit_at(candidate)
            .map(|v| (v.count, v.last_visit_ms))
            .unwrap_or((0, 0));
        if best.map_or(true, |(r, _)| rank < r) {
            best = Some((rank, candidate));
        }
    }
    best.map(|(_, candidate)| candidate)
}

pub fn is_near_interesting_feature(position: Vec3, data: &PerceptionData, radius: f32) -> bool {
    data.terrain_features
        .iter()
        .any(|f| f.position.distance(position) <= radius)
}

/// Centroid of recent block placements when the player appears to be building.
pub fn detect_player_building(memory: &OrbMemory, now_ms: u64) -> Option<Vec3> {
    let since = now_ms.saturating_sub(BUILDING_WINDOW_MS);
    let positions: Vec<Vec3> = memory
        .interactions()
        .filter(|i| i.kind == PLACE_BLOCK && i.timestamp_ms >= since)
        .filter_map(|i| i.position)
        .collect();
    if positions.len() < BUILDING_MIN_PLACEMENTS {
        return None;
    }
    let sum = positions.iter().fold(Vec3::ZERO, |acc, p| acc + *p);
    Some(sum * (1.0 / positions.len() as f32))
}
