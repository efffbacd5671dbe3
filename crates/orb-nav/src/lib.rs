//! Voxel occupancy, collision queries and pathfinding for a flying agent.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod follow;
pub mod grid;
pub mod pathfinder;
pub mod physics;

pub use follow::{MotionStep, PathFollower};
pub use grid::{GridBounds, GridStats, OccupancyGrid};
pub use pathfinder::{path_length, PathOptions, PathSearch, Pathfinder, SearchOutcome};
pub use physics::{CollisionBody, MotionResolution};
