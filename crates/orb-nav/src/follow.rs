use orb_core::Vec3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Movement speed used when a caller does not specify one.
pub const DEFAULT_SPEED: f32 = 5.0;

/// Outcome of one motion integration step.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MotionStep {
    pub position: Vec3,
    pub moving: bool,
}

/// Waypoint list plus cursor, advanced once per rendered frame.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PathFollower {
    waypoints: Vec<Vec3>,
    index: usize,
    moving: bool,
    speed: f32,
}

impl Default for PathFollower {
    fn default() -> Self {
        Self::new(DEFAULT_SPEED)
    }
}

impl PathFollower {
    pub fn new(speed: f32) -> Self {
        Self {
            waypoints: Vec::new(),
            index: 0,
            moving: false,
            speed,
        }
    }

    /// Replaces the current path and restarts from its first waypoint.
    pub fn set_path(&mut self, waypoints: Vec<Vec3>, speed: f32) {
        self.moving = !waypoints.is_empty();
        self.waypoints = waypoints;
        self.index = 0;
        self.speed = speed;
    }

    /// Drops the path and stops.
    pub fn clear(&mut self) {
        self.waypoints.clear();
        self.index = 0;
        self.moving = false;
    }

    pub fn is_moving(&self) -> bool {
        self.moving
    }

    pub fn waypoints(&self) -> &[Vec3] {
        &self.waypoints
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed;
    }

    pub fn current_waypoint(&self) -> Option<Vec3> {
        self.waypoints.get(self.index).copied()
    }

    pub fn final_waypoint(&self) -> Option<Vec3> {
        self.waypoints.last().copied()
    }

    /// Moves `position` toward the current waypoint by `speed * dt`.
    ///
    /// When the waypoint is within reach this frame the position snaps onto
    /// it exactly and the cursor advances; passing the last waypoint stops the
    /// follower and clears the path.
    pub fn advance(&mut self, position: Vec3, dt: f32) -> MotionStep {
        if !self.moving || self.waypoints.is_empty() {
            return MotionStep {
                position,
                moving: false,
            };
        }
        let Some(target) = self.current_waypoint() else {
            self.clear();
            return MotionStep {
                position,
                moving: false,
            };
        };

        let step = self.speed.max(0.0) * dt.max(0.0);
        let to_target = target - position;
        let distance = to_target.length();

        if distance <= step {
            self.index += 1;
            if self.index >= self.waypoints.len() {
                self.clear();
            }
            return MotionStep {
                position: target,
                moving: self.moving,
            };
        }

        MotionStep {
            position: position + to_target * (step / distance),
            moving: true,
        }
    }
}
