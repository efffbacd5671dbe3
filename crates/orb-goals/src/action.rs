use orb_core::Vec3;
use orb_perception::BlockInfo;

use crate::GoalPatch;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ObserveTarget {
    Position(Vec3),
    Entity(String),
}

/// The single thing a goal behaviour asks the agent to do this tick.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "snake_case"))]
pub enum OrbAction {
    Move {
        target: Vec3,
        speed: Option<f32>,
    },
    Build {
        blocks: Vec<BlockInfo>,
    },
    Speak {
        message: String,
    },
    Observe {
        target: ObserveTarget,
    },
    Wait {
        duration_ms: u64,
    },
    SetGoal {
        patch: GoalPatch,
    },
    #[default]
    None,
}

impl OrbAction {
    pub fn move_to(target: Vec3) -> Self {
        OrbAction::Move {
            target,
            speed: None,
        }
    }

    pub fn observe_position(target: Vec3) -> Self {
        OrbAction::Observe {
            target: ObserveTarget::Position(target),
        }
    }

    /// Short tag used in logs and trace events.
    pub fn name(&self) -> &'static str {
        match self {
            OrbAction::Move { .. } => "move",
            OrbAction::Build { .. } => "build",
            OrbAction::Speak { .. } => "speak",
            OrbAction::Observe { .. } => "observe",
            OrbAction::Wait { .. } => "wait",
            OrbAction::SetGoal { .. } => "set_goal",
            OrbAction::None => "none",
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, OrbAction::None)
    }
}
