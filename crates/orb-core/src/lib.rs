//! Engine-agnostic primitives shared by the Orb agent crates.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod block;
pub mod math;
pub mod rng;
pub mod tick;
pub mod trace;

pub use block::BlockType;
pub use math::{IVec3, Vec3};
pub use rng::{DeterministicRng, SplitMix64};
pub use tick::TickContext;
pub use trace::{NullTraceSink, TraceEvent, TraceLog, TraceSink, VecTraceSink};
