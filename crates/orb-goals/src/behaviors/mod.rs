//! Built-in behaviour for each [`crate::GoalKind`].

mod build;
mod explore;
mod follow;
mod gather;
mod idle;
mod investigate;
mod observe;

pub use build::BuildBehavior;
pub use explore::ExploreBehavior;
pub use follow::FollowPlayerBehavior;
pub use gather::GatherBehavior;
pub use idle::IdleBehavior;
pub use investigate::InvestigateBehavior;
pub use observe::ObserveBehavior;
