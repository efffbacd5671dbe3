//! Collision resolution for upright bodies moving through the occupancy grid.
//!
//! Used by the flying-camera player controller: the host proposes a
//! displacement for the frame and gets back the furthest position reachable
//! without entering a solid cell, resolved one axis at a time.

use orb_core::Vec3;

use crate::OccupancyGrid;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Largest distance moved per sub-step, so fast bodies cannot tunnel through a block.
const MAX_SUBSTEP: f32 = 0.5;
/// Longest displacement resolved per call; larger deltas are scaled down to it.
pub const MAX_DISPLACEMENT: f32 = 64.0;
/// Bisection rounds used to move flush against a blocking face.
const CONTACT_ITERATIONS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CollisionBody {
    pub radius: f32,
    pub height: f32,
    /// Distance from the feet up to the tracked position (the eyes).
    pub eye_offset: f32,
}

impl Default for CollisionBody {
    fn default() -> Self {
        Self {
            radius: 0.3,
            height: 1.8,
            eye_offset: 1.6,
        }
    }
}

impl CollisionBody {
    pub fn collides(&self, grid: &OccupancyGrid, position: Vec3) -> bool {
        grid.check_collision(position, self.radius, self.height, self.eye_offset)
    }

    pub fn on_ground(&self, grid: &OccupancyGrid, position: Vec3) -> bool {
        grid.is_on_ground(position, self.eye_offset)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MotionResolution {
    pub position: Vec3,
    pub blocked_x: bool,
    pub blocked_y: bool,
    pub blocked_z: bool,
    pub on_ground: bool,
}

impl MotionResolution {
    pub fn blocked(&self) -> bool {
        self.blocked_x || self.blocked_y || self.blocked_z
    }
}

/// Moves `body` from `position` by `delta`, stopping each axis at the first
/// solid cell. Axes resolve in X, Y, Z order within each sub-step.
///
/// A body that already overlaps solid cells moves freely so it can escape.
/// Deltas longer than [`MAX_DISPLACEMENT`] on any axis are scaled down first.
pub fn resolve_motion(
    grid: &OccupancyGrid,
    body: &CollisionBody,
    position: Vec3,
    delta: Vec3,
) -> MotionResolution {
    if !position.is_finite() || !delta.is_finite() {
        return MotionResolution {
            position,
            blocked_x: false,
            blocked_y: false,
            blocked_z: false,
            on_ground: false,
        };
    }

    let largest = delta.x.abs().max(delta.y.abs()).max(delta.z.abs());
    let (delta, largest) = if largest > MAX_DISPLACEMENT {
        (delta * (MAX_DISPLACEMENT / largest), MAX_DISPLACEMENT)
    } else {
        (delta, largest)
    };

    if body.collides(grid, position) {
        let moved = position + delta;
        return MotionResolution {
            position: moved,
            blocked_x: false,
            blocked_y: false,
            blocked_z: false,
            on_ground: body.on_ground(grid, moved),
        };
    }

    let steps = ((largest / MAX_SUBSTEP).ceil() as usize).max(1);
    let step = delta * (1.0 / steps as f32);

    let mut current = position;
    let (mut blocked_x, mut blocked_y, mut blocked_z) = (false, false, false);

    for _ in 0..steps {
        if !blocked_x && step.x != 0.0 {
            let (next, hit) = sweep_axis(grid, body, current, Vec3::new(step.x, 0.0, 0.0));
            current = next;
            blocked_x = hit;
        }
        if !blocked_y && step.y != 0.0 {
            let (next, hit) = sweep_axis(grid, body, current, Vec3::new(0.0, step.y, 0.0));
            current = next;
            blocked_y = hit;
        }
        if !blocked_z && step.z != 0.0 {
            let (next, hit) = sweep_axis(grid, body, current, Vec3::new(0.0, 0.0, step.z));
            current = next;
            blocked_z = hit;
        }
    }

    MotionResolution {
        position: current,
        blocked_x,
        blocked_y,
        blocked_z,
        on_ground: body.on_ground(grid, current),
    }
}

/// Applies one single-axis sub-step. On contact, bisects the step so the body
/// ends up flush against the blocking face instead of a sub-step short of it.
fn sweep_axis(grid: &OccupancyGrid, body: &CollisionBody, from: Vec3, step: Vec3) -> (Vec3, bool) {
    let full = from + step;
    if !body.collides(grid, full) {
        return (full, false);
    }

    let (mut lo, mut hi) = (0.0f32, 1.0f32);
    for _ in 0..CONTACT_ITERATIONS {
        let mid = 0.5 * (lo + hi);
        if body.collides(grid, from + step * mid) {
            hi = mid;
        } else {
            lo = mid;
        }
    }
    (from + step * lo, true)
}
