//! Dense occupancy grid for the voxel world.
//!
//! One byte per cell, indexed by `x + z * size_x + y * size_x * size_z`
//! relative to the bounds' minimum corner. Out-of-bounds reads report "empty"
//! and out-of-bounds writes are no-ops: the world edge behaves like void.

use orb_core::{IVec3, Vec3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Shrinks the vertical collision span so a body resting exactly on a block
/// face does not register the block it stands on.
const COLLISION_EPSILON: f32 = 0.001;
/// Horizontal offset of the four corner probes used by [`OccupancyGrid::is_on_ground`].
const GROUND_PROBE_OFFSET: f32 = 0.3;
/// How far below the feet the ground probes sample.
const GROUND_PROBE_DEPTH: f32 = 0.1;

/// Half-open integer extents `[min, max)` of the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GridBounds {
    pub min: IVec3,
    pub max: IVec3,
}

impl Default for GridBounds {
    fn default() -> Self {
        Self {
            min: IVec3::new(-128, -32, -128),
            max: IVec3::new(128, 32, 128),
        }
    }
}

impl GridBounds {
    pub fn new(min: IVec3, max: IVec3) -> Self {
        assert!(
            min.x < max.x && min.y < max.y && min.z < max.z,
            "grid bounds must be non-empty"
        );
        Self { min, max }
    }

    /// Bounds of a `size`-wide cube starting at the origin.
    pub fn cube(size: i32) -> Self {
        Self::new(IVec3::ZERO, IVec3::new(size, size, size))
    }

    pub fn contains(&self, cell: IVec3) -> bool {
        cell.x >= self.min.x
            && cell.y >= self.min.y
            && cell.z >= self.min.z
            && cell.x < self.max.x
            && cell.y < self.max.y
            && cell.z < self.max.z
    }

    pub fn size(&self) -> (usize, usize, usize) {
        (
            (self.max.x - self.min.x) as usize,
            (self.max.y - self.min.y) as usize,
            (self.max.z - self.min.z) as usize,
        )
    }

    pub fn cell_count(&self) -> usize {
        let (sx, sy, sz) = self.size();
        sx * sy * sz
    }
}

/// Diagnostic counters for an [`OccupancyGrid`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GridStats {
    pub occupied: usize,
    pub total_cells: usize,
    pub memory_bytes: usize,
}

#[derive(Debug, Clone)]
pub struct OccupancyGrid {
    bounds: GridBounds,
    size_x: usize,
    size_z: usize,
    cells: Vec<u8>,
    occupied: usize,
}

impl Default for OccupancyGrid {
    fn default() -> Self {
        Self::new(GridBounds::default())
    }
}

impl OccupancyGrid {
    pub fn new(bounds: GridBounds) -> Self {
        let (size_x, _, size_z) = bounds.size();
        Self {
            bounds,
            size_x,
            size_z,
            cells: vec![0; bounds.cell_count()],
            occupied: 0,
        }
    }

    pub fn bounds(&self) -> GridBounds {
        self.bounds
    }

    pub fn in_bounds(&self, cell: IVec3) -> bool {
        self.bounds.contains(cell)
    }

    fn idx(&self, cell: IVec3) -> Option<usize> {
        if !self.in_bounds(cell) {
            return None;
        }
        let x = (cell.x - self.bounds.min.x) as usize;
        let y = (cell.y - self.bounds.min.y) as usize;
        let z = (cell.z - self.bounds.min.z) as usize;
        Some(x + z * self.size_x + y * self.size_x * self.size_z)
    }

    fn write(&mut self, cell: IVec3, value: u8) {
        let Some(idx) = self.idx(cell) else { return };
        let prev = self.cells[idx];
        if prev == value {
            return;
        }
        self.cells[idx] = value;
        if value == 0 {
            self.occupied -= 1;
        } else {
            self.occupied += 1;
        }
    }

    pub fn set_block(&mut self, x: i32, y: i32, z: i32) {
        self.write(IVec3::new(x, y, z), 1);
    }

    pub fn remove_block(&mut self, x: i32, y: i32, z: i32) {
        self.write(IVec3::new(x, y, z), 0);
    }

    pub fn set_cell(&mut self, cell: IVec3) {
        self.write(cell, 1);
    }

    pub fn remove_cell(&mut self, cell: IVec3) {
        self.write(cell, 0);
    }

    pub fn set_blocks<I>(&mut self, cells: I)
    where
        I: IntoIterator<Item = IVec3>,
    {
        for cell in cells {
            self.write(cell, 1);
        }
    }

    pub fn remove_blocks<I>(&mut self, cells: I)
    where
        I: IntoIterator<Item = IVec3>,
    {
        for cell in cells {
            self.write(cell, 0);
        }
    }

    pub fn has_block(&self, x: i32, y: i32, z: i32) -> bool {
        self.has_cell(IVec3::new(x, y, z))
    }

    pub fn has_cell(&self, cell: IVec3) -> bool {
        self.idx(cell).map(|idx| self.cells[idx] != 0).unwrap_or(false)
    }

    /// Occupancy of the cell containing `point`.
    pub fn has_block_at(&self, point: Vec3) -> bool {
        if !point.is_finite() {
            return false;
        }
        self.has_cell(point.floor())
    }

    /// Empties every cell (world reset).
    pub fn clear(&mut self) {
        self.cells.fill(0);
        self.occupied = 0;
    }

    pub fn stats(&self) -> GridStats {
        GridStats {
            occupied: self.occupied,
            total_cells: self.cells.len(),
            memory_bytes: self.cells.len() * std::mem::size_of::<u8>(),
        }
    }

    /// Axis-aligned box test for an upright body whose `position` is at eye level.
    ///
    /// The box spans `feet + ε .. feet + height - ε` vertically (with
    /// `feet = position.y - eye_offset`) and `±radius` horizontally. Returns
    /// `true` if any covered cell is occupied.
    pub fn check_collision(&self, position: Vec3, radius: f32, height: f32, eye_offset: f32) -> bool {
        if !position.is_finite() {
            return false;
        }
        let feet = position.y - eye_offset;

        let min_x = (position.x - radius).floor() as i32;
        let max_x = (position.x + radius).floor() as i32;
        let min_y = (feet + COLLISION_EPSILON).floor() as i32;
        let max_y = (feet + height - COLLISION_EPSILON).floor() as i32;
        let min_z = (position.z - radius).floor() as i32;
        let max_z = (position.z + radius).floor() as i32;

        for y in min_y..=max_y {
            for z in min_z..=max_z {
                for x in min_x..=max_x {
                    if self.has_block(x, y, z) {
                        return true;
                    }
                }
            }
        }
        false
    }

    /// Samples the centre and four corners just below the feet.
    pub fn is_on_ground(&self, position: Vec3, eye_offset: f32) -> bool {
        if !position.is_finite() {
            return false;
        }
        let below = ((position.y - eye_offset) - GROUND_PROBE_DEPTH).floor() as i32;
        let o = GROUND_PROBE_OFFSET;
        let probes = [
            (0.0, 0.0),
            (o, o),
            (o, -o),
            (-o, o),
            (-o, -o),
        ];
        probes.iter().any(|&(dx, dz)| {
            self.has_block(
                (position.x + dx).floor() as i32,
                below,
                (position.z + dz).floor() as i32,
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn occupied_counter_tracks_transitions() {
        let mut grid = OccupancyGrid::new(GridBounds::cube(4));
        grid.set_block(1, 1, 1);
        grid.set_block(1, 1, 1);
        grid.set_block(2, 1, 1);
        grid.remove_block(3, 3, 3);
        assert_eq!(grid.stats().occupied, 2);

        grid.remove_block(1, 1, 1);
        assert_eq!(grid.stats().occupied, 1);

        grid.clear();
        assert_eq!(grid.stats().occupied, 0);
    }

    #[test]
    fn index_layout_is_unique_per_cell() {
        let grid = OccupancyGrid::new(GridBounds::new(IVec3::new(-2, -1, -3), IVec3::new(2, 1, 3)));
        let mut seen = std::collections::BTreeSet::new();
        for y in -1..1 {
            for z in -3..3 {
                for x in -2..2 {
                    let idx = grid.idx(IVec3::new(x, y, z)).expect("in bounds");
                    assert!(seen.insert(idx));
                }
            }
        }
        assert_eq!(seen.len(), grid.stats().total_cells);
    }
}
