//! A* search over the occupancy grid for a flying agent.
//!
//! Only solid cells are obstacles. Search runs over 26 (or 6) neighbours with
//! Euclidean step costs and a Manhattan heuristic, refuses diagonal moves that
//! would clip a solid edge, and optionally shortens the result by greedy
//! line-of-sight string pulling.

use core::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

use orb_core::{IVec3, Vec3};

use crate::OccupancyGrid;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Samples per world unit when testing line of sight between waypoints.
const LOS_SAMPLES_PER_UNIT: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PathOptions {
    pub max_iterations: usize,
    /// `true`: 26-neighbour search, `false`: 6-neighbour search.
    pub allow_diagonals: bool,
    pub smooth_path: bool,
    /// Informational; every search is a flying search.
    pub flying_mode: bool,
}

impl Default for PathOptions {
    fn default() -> Self {
        Self {
            max_iterations: 2000,
            allow_diagonals: true,
            smooth_path: true,
            flying_mode: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SearchOutcome {
    Found,
    StartBlocked,
    EndBlocked,
    OutOfBounds,
    /// Open set ran dry: the target is unreachable.
    Exhausted,
    IterationLimit,
}

/// Full result of a search, including diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct PathSearch {
    pub outcome: SearchOutcome,
    /// Cell-centre waypoints straight out of the search.
    pub raw: Vec<Vec3>,
    /// `raw` after smoothing (identical to `raw` when smoothing is off).
    pub path: Vec<Vec3>,
    /// Nodes expanded.
    pub iterations: usize,
    /// Summed move cost of `raw`.
    pub cost: f32,
}

impl PathSearch {
    fn failed(outcome: SearchOutcome, iterations: usize) -> Self {
        Self {
            outcome,
            raw: Vec::new(),
            path: Vec::new(),
            iterations,
            cost: 0.0,
        }
    }

    pub fn is_found(&self) -> bool {
        self.outcome == SearchOutcome::Found
    }
}

#[derive(Debug)]
struct OpenNode {
    f: f32,
    g: f32,
    cell: IVec3,
    tie: u64,
}

impl PartialEq for OpenNode {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenNode {}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering to make BinaryHeap behave like a min-heap.
        other
            .f
            .total_cmp(&self.f)
            .then_with(|| other.g.total_cmp(&self.g))
            .then_with(|| other.tie.cmp(&self.tie))
    }
}

const AXIS_OFFSETS: [(i32, i32, i32); 6] = [
    (1, 0, 0),
    (-1, 0, 0),
    (0, 1, 0),
    (0, -1, 0),
    (0, 0, 1),
    (0, 0, -1),
];

fn all_offsets() -> Vec<(i32, i32, i32)> {
    let mut out = Vec::with_capacity(26);
    for dy in -1..=1 {
        for dz in -1..=1 {
            for dx in -1..=1 {
                if (dx, dy, dz) != (0, 0, 0) {
                    out.push((dx, dy, dz));
                }
            }
        }
    }
    out
}

fn manhattan(a: IVec3, b: IVec3) -> f32 {
    ((a.x - b.x).abs() + (a.y - b.y).abs() + (a.z - b.z).abs()) as f32
}

fn step_cost(dx: i32, dy: i32, dz: i32) -> f32 {
    ((dx * dx + dy * dy + dz * dz) as f32).sqrt()
}

/// Read-only search view over an [`OccupancyGrid`].
#[derive(Debug, Clone, Copy)]
pub struct Pathfinder<'g> {
    grid: &'g OccupancyGrid,
}

impl<'g> Pathfinder<'g> {
    pub fn new(grid: &'g OccupancyGrid) -> Self {
        Self { grid }
    }

    pub fn grid(&self) -> &'g OccupancyGrid {
        self.grid
    }

    /// Waypoints from `start` to `end`, or an empty list when no path exists.
    pub fn find_path(&self, start: Vec3, end: Vec3, options: &PathOptions) -> Vec<Vec3> {
        self.search(start, end, options).path
    }

    pub fn search(&self, start: Vec3, end: Vec3, options: &PathOptions) -> PathSearch {
        if !start.is_finite() || !end.is_finite() {
            return PathSearch::failed(SearchOutcome::OutOfBounds, 0);
        }
        let start_cell = start.floor();
        let goal_cell = end.floor();

        if !self.grid.in_bounds(start_cell) || !self.grid.in_bounds(goal_cell) {
            tracing::debug!(?start_cell, ?goal_cell, "path endpoint outside grid");
            return PathSearch::failed(SearchOutcome::OutOfBounds, 0);
        }
        if self.grid.has_cell(start_cell) {
            tracing::debug!(?start_cell, "path start is inside a block");
            return PathSearch::failed(SearchOutcome::StartBlocked, 0);
        }
        if self.grid.has_cell(goal_cell) {
            tracing::debug!(?goal_cell, "path end is inside a block");
            return PathSearch::failed(SearchOutcome::EndBlocked, 0);
        }

        let offsets: Vec<(i32, i32, i32)> = if options.allow_diagonals {
            all_offsets()
        } else {
            AXIS_OFFSETS.to_vec()
        };

        let mut open = BinaryHeap::<OpenNode>::new();
        let mut closed: HashSet<u64> = HashSet::new();
        let mut g_score: HashMap<u64, f32> = HashMap::new();
        let mut came_from: HashMap<u64, IVec3> = HashMap::new();
        let mut tie: u64 = 0;

        g_score.insert(start_cell.pack(), 0.0);
        open.push(OpenNode {
            f: manhattan(start_cell, goal_cell),
            g: 0.0,
            cell: start_cell,
            tie,
        });
        tie += 1;

        let mut iterations = 0usize;
        while let Some(node) = open.pop() {
            let key = node.cell.pack();
            if !closed.insert(key) {
                // Stale heap entry.
                continue;
            }

            if node.cell == goal_cell {
                let cells = reconstruct(&came_from, goal_cell);
                let raw: Vec<Vec3> = cells.iter().map(|c| c.center()).collect();
                let path = if options.smooth_path {
                    self.smooth_path(&raw)
                } else {
                    raw.clone()
                };
                return PathSearch {
                    outcome: SearchOutcome::Found,
                    raw,
                    path,
                    iterations,
                    cost: node.g,
                };
            }

            if iterations >= options.max_iterations {
                tracing::warn!(
                    iterations,
                    ?start_cell,
                    ?goal_cell,
                    "path search hit iteration limit"
                );
                return PathSearch::failed(SearchOutcome::IterationLimit, iterations);
            }
            iterations += 1;

            for &(dx, dy, dz) in &offsets {
                let n = node.cell.offset(dx, dy, dz);
                if !self.grid.in_bounds(n) {
                    continue;
                }
                let n_key = n.pack();
                if closed.contains(&n_key) || self.grid.has_cell(n) {
                    continue;
                }
                if !self.diagonal_clear(node.cell, dx, dy, dz) {
                    continue;
                }

                let tentative_g = node.g + step_cost(dx, dy, dz);
                let best = g_score.get(&n_key).copied().unwrap_or(f32::INFINITY);
                if tentative_g >= best {
                    continue;
                }

                g_score.insert(n_key, tentative_g);
                came_from.insert(n_key, node.cell);
                open.push(OpenNode {
                    f: tentative_g + manhattan(n, goal_cell),
                    g: tentative_g,
                    cell: n,
                    tie,
                });
                tie += 1;
            }
        }

        tracing::warn!(iterations, ?start_cell, ?goal_cell, "no path: open set exhausted");
        PathSearch::failed(SearchOutcome::Exhausted, iterations)
    }

    /// A move along two or three axes is only allowed when every single-axis
    /// component of it is free, so the agent never squeezes past a solid edge.
    fn diagonal_clear(&self, from: IVec3, dx: i32, dy: i32, dz: i32) -> bool {
        let changed = (dx != 0) as u8 + (dy != 0) as u8 + (dz != 0) as u8;
        if changed < 2 {
            return true;
        }
        (dx == 0 || !self.grid.has_cell(from.offset(dx, 0, 0)))
            && (dy == 0 || !self.grid.has_cell(from.offset(0, dy, 0)))
            && (dz == 0 || !self.grid.has_cell(from.offset(0, 0, dz)))
    }

    /// Samples the segment at two points per unit; any sample inside a block
    /// breaks line of sight.
    pub fn has_line_of_sight(&self, from: Vec3, to: Vec3) -> bool {
        let distance = from.distance(to);
        let steps = ((distance * LOS_SAMPLES_PER_UNIT).ceil() as usize).max(1);
        (0..=steps).all(|i| {
            let t = i as f32 / steps as f32;
            !self.grid.has_block_at(from.lerp(to, t))
        })
    }

    /// Greedy string pulling: from each kept waypoint jump to the farthest
    /// later waypoint that is directly visible.
    pub fn smooth_path(&self, path: &[Vec3]) -> Vec<Vec3> {
        if path.len() <= 2 {
            return path.to_vec();
        }

        let mut out = vec![path[0]];
        let mut i = 0;
        while i < path.len() - 1 {
            let mut next = i + 1;
            for j in (i + 2..path.len()).rev() {
                if self.has_line_of_sight(path[i], path[j]) {
                    next = j;
                    break;
                }
            }
            out.push(path[next]);
            i = next;
        }
        out
    }

    /// Closest free cell centre to `target`, scanning outward one cubic shell
    /// at a time and only visiting each shell's surface.
    pub fn find_nearest_traversable(&self, target: Vec3, search_radius: i32) -> Option<Vec3> {
        if !target.is_finite() {
            return None;
        }
        let center = target.floor();
        if self.is_traversable(center) {
            return Some(center.center());
        }

        for r in 1..=search_radius.max(0) {
            let mut best: Option<(f32, IVec3)> = None;
            for dy in -r..=r {
                for dz in -r..=r {
                    for dx in -r..=r {
                        if dx.abs() != r && dy.abs() != r && dz.abs() != r {
                            continue;
                        }
                        let cell = center.offset(dx, dy, dz);
                        if !self.is_traversable(cell) {
                            continue;
                        }
                        let d = cell.center().distance(target);
                        if best.map_or(true, |(bd, _)| d < bd) {
                            best = Some((d, cell));
                        }
                    }
                }
            }
            if let Some((_, cell)) = best {
                return Some(cell.center());
            }
        }
        None
    }

    fn is_traversable(&self, cell: IVec3) -> bool {
        self.grid.in_bounds(cell) && !self.grid.has_cell(cell)
    }

    /// `true` while no waypoint has been filled in since the path was planned.
    pub fn is_path_valid(&self, path: &[Vec3]) -> bool {
        path.iter().all(|p| !self.grid.has_block_at(*p))
    }
}

/// Total polyline length.
pub fn path_length(path: &[Vec3]) -> f32 {
    path.windows(2).map(|w| w[0].distance(w[1])).sum()
}

fn reconstruct(came_from: &HashMap<u64, IVec3>, goal: IVec3) -> Vec<IVec3> {
    let mut out = vec![goal];
    let mut current = goal;
    while let Some(prev) = came_from.get(&current.pack()).copied() {
        current = prev;
        out.push(current);
    }
    out.reverse();
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_cover_full_neighbourhood() {
        let offsets = all_offsets();
        assert_eq!(offsets.len(), 26);
        let unique: HashSet<_> = offsets.iter().collect();
        assert_eq!(unique.len(), 26);
    }

    #[test]
    fn step_costs_match_axis_count() {
        assert_eq!(step_cost(1, 0, 0), 1.0);
        assert!((step_cost(1, 0, -1) - 2f32.sqrt()).abs() < 1e-6);
        assert!((step_cost(-1, 1, 1) - 3f32.sqrt()).abs() < 1e-6);
    }

    #[test]
    fn heap_pops_lowest_f_first() {
        let mut heap = BinaryHeap::new();
        for (tie, f) in [5.0f32, 1.0, 3.0].into_iter().enumerate() {
            heap.push(OpenNode {
                f,
                g: 0.0,
                cell: IVec3::ZERO,
                tie: tie as u64,
            });
        }
        let order: Vec<f32> = std::iter::from_fn(|| heap.pop().map(|n| n.f)).collect();
        assert_eq!(order, vec![1.0, 3.0, 5.0]);
    }
}
