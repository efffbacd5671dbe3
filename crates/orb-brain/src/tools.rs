//! Seams to the host: tool execution, speech output and state observation.

use async_trait::async_trait;
use orb_goals::GoalId;
use orb_perception::BlockInfo;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

use crate::OrbState;

/// Tool the brain calls to place blocks at absolute world cells.
pub const PLACE_BLOCKS_TOOL: &str = "placeBlocksAbsolute";

/// One request for a host-side effect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Goal whose progress the result feeds.
    pub goal_id: GoalId,
    pub name: String,
    pub blocks: Vec<BlockInfo>,
}

impl ToolCall {
    pub fn place_blocks(goal_id: GoalId, blocks: Vec<BlockInfo>) -> Self {
        Self {
            goal_id,
            name: PLACE_BLOCKS_TOOL.to_string(),
            blocks,
        }
    }

    /// Wire form of the request, built from `blocks`.
    pub fn args(&self) -> serde_json::Value {
        json!({
            "blocks": self
                .blocks
                .iter()
                .map(|b| json!({
                    "x": b.position.x,
                    "y": b.position.y,
                    "z": b.position.z,
                    "type": b.block.id(),
                }))
                .collect::<Vec<_>>(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ToolOutput {
    pub blocks_placed: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolError {
    #[error("tool `{0}` is not available")]
    Unavailable(String),

    #[error("tool rejected the request: {0}")]
    Rejected(String),

    #[error("tool execution failed: {0}")]
    Failed(String),
}

/// Result of a [`ToolCall`], posted back to the brain for the next tick.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCompletion {
    pub goal_id: GoalId,
    pub result: Result<ToolOutput, ToolError>,
}

#[async_trait]
pub trait ToolExecutor: Send + Sync {
    async fn execute(&self, call: ToolCall) -> Result<ToolOutput, ToolError>;
}

pub trait SpeechSink: Send {
    fn speak(&mut self, message: &str);
}

/// Receives a snapshot after every tick.
pub trait StateObserver: Send {
    fn on_state(&mut self, state: &OrbState);
}
