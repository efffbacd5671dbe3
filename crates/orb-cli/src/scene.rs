//! Procedural sandbox the simulation runs in.

use orb_core::{BlockType, DeterministicRng, IVec3, SplitMix64, Vec3};
use orb_nav::GridBounds;
use orb_perception::{BlockInfo, SandboxWorld};

/// Height of the top floor layer.
pub const FLOOR_Y: i32 = 0;

/// Stone floor under a grass top layer, a scatter of trees and a pond.
pub fn build_scene(bounds: GridBounds, seed: u64, trees: usize) -> SandboxWorld {
    let mut world = SandboxWorld::new(bounds);
    let (min, max) = (bounds.min, bounds.max);

    for x in min.x..max.x {
        for z in min.z..max.z {
            world.set_block(IVec3::new(x, FLOOR_Y - 1, z), BlockType::STONE);
            world.set_block(IVec3::new(x, FLOOR_Y, z), BlockType::GRASS);
        }
    }

    // Pond in the middle of the +x,+z quadrant.
    let pond = IVec3::new(max.x / 2, FLOOR_Y, max.z / 2);
    for dx in -2..=2 {
        for dz in -2..=2 {
            world.set_block(pond.offset(dx, 0, dz), BlockType::WATER);
        }
    }

    let mut rng = SplitMix64::new(seed);
    let span_x = (max.x - min.x - 4).max(1) as u64;
    let span_z = (max.z - min.z - 4).max(1) as u64;
    for _ in 0..trees {
        let x = min.x + 2 + (rng.next_u64() % span_x) as i32;
        let z = min.z + 2 + (rng.next_u64() % span_z) as i32;
        let height = 3 + (rng.next_u64() % 3) as i32;
        plant_tree(&mut world, IVec3::new(x, FLOOR_Y + 1, z), height);
    }
    world
}

fn plant_tree(world: &mut SandboxWorld, base: IVec3, height: i32) {
    for y in 0..height {
        world.set_block(base.offset(0, y, 0), BlockType::WOOD);
    }
    let crown = base.offset(0, height, 0);
    for dx in -1..=1 {
        for dz in -1..=1 {
            for dy in -1..=0 {
                let cell = crown.offset(dx, dy, dz);
                if (dx, dz) != (0, 0) || dy == 0 {
                    world.set_block(cell, BlockType::LEAF);
                }
            }
        }
    }
}

/// A small marker tower next to `origin`, bottom up.
pub fn tower(origin: Vec3, height: i32) -> Vec<BlockInfo> {
    let base = origin.floor().offset(2, 0, 0);
    (0..height)
        .map(|y| BlockInfo {
            position: base.offset(0, y, 0),
            block: BlockType::STONE,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use orb_perception::WorldContext;

    #[test]
    fn scene_has_floor_water_and_trees() {
        let bounds = GridBounds::new(IVec3::new(-16, -4, -16), IVec3::new(16, 16, 16));
        let world = build_scene(bounds, 3, 4);
        assert_eq!(world.block_at(IVec3::new(-10, FLOOR_Y, 5)), Some(BlockType::GRASS));
        assert_eq!(world.block_at(IVec3::new(8, FLOOR_Y, 8)), Some(BlockType::WATER));
        let wood = world
            .blocks_in_area(Vec3::ZERO, 40.0)
            .iter()
            .filter(|b| b.block == BlockType::WOOD)
            .count();
        assert!(wood > 0);
    }

    #[test]
    fn tower_stacks_upward() {
        let blocks = tower(Vec3::new(0.5, 1.5, 0.5), 3);
        let ys: Vec<i32> = blocks.iter().map(|b| b.position.y).collect();
        assert_eq!(ys, vec![1, 2, 3]);
        assert!(blocks.iter().all(|b| b.position.x == 2));
    }
}
