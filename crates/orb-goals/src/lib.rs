//! Goals for the Orb agent: what it wants, how each kind of goal turns into a
//! per-tick action, and which goal wins each tick.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod action;
pub mod behavior;
pub mod behaviors;
pub mod engine;
pub mod goal;

pub use action::{ObserveTarget, OrbAction};
pub use behavior::{AgentContext, GoalBehavior};
pub use engine::{GoalEngine, GoalEngineConfig};
pub use goal::{Goal, GoalId, GoalKind, GoalPatch, GoalStatus, MAX_PRIORITY};
