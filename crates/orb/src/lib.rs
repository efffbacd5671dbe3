//! Umbrella crate that re-exports the `orb-*` building blocks.
//!
//! Layering, bottom up: [`core`] (math, blocks, RNG, trace), [`nav`]
//! (occupancy grid, A* and motion), [`perception`] (world snapshots and
//! memory), [`goals`] (goal model and per-kind behaviours) and [`brain`]
//! (the tick loop and its tokio driver).

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

#[cfg(feature = "core")]
#[cfg_attr(docsrs, doc(cfg(feature = "core")))]
pub use orb_core as core;

#[cfg(feature = "nav")]
#[cfg_attr(docsrs, doc(cfg(feature = "nav")))]
pub use orb_nav as nav;

#[cfg(feature = "perception")]
#[cfg_attr(docsrs, doc(cfg(feature = "perception")))]
pub use orb_perception as perception;

#[cfg(feature = "goals")]
#[cfg_attr(docsrs, doc(cfg(feature = "goals")))]
pub use orb_goals as goals;

#[cfg(feature = "brain")]
#[cfg_attr(docsrs, doc(cfg(feature = "brain")))]
pub use orb_brain as brain;

/// The types most hosts need.
#[cfg(feature = "brain")]
pub mod prelude {
    pub use orb_brain::{OrbBrain, OrbConfig, OrbDriver, OrbHandle, OrbMode, OrbState};
    pub use orb_core::{BlockType, IVec3, TickContext, Vec3};
    pub use orb_goals::{Goal, GoalKind, OrbAction};
    pub use orb_perception::{BlockInfo, SandboxWorld, WorldContext};
}

#[cfg(all(test, feature = "full"))]
mod tests {
    use super::prelude::*;

    #[test]
    fn prelude_is_enough_to_run_a_tick() {
        let world = SandboxWorld::new(crate::nav::GridBounds::cube(32));
        let mut config = OrbConfig::default();
        config.brain.spawn_position = Vec3::new(16.0, 16.0, 16.0);
        let mut brain = OrbBrain::new(&config);
        brain.add_goal(Goal::new(GoalKind::Idle, 3, 0));

        brain.tick(&TickContext::new(0, 0), &world);

        assert_eq!(brain.state_ref().tick_count, 1);
        assert!(brain.active_goal().is_some());
    }

    #[test]
    fn state_serializes_for_hosts() {
        let brain = OrbBrain::new(&OrbConfig::default());
        let json = serde_json::to_value(brain.state()).unwrap();
        assert_eq!(json["mode"], "idle");
    }
}
