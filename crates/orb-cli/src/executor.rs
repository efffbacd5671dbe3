//! Tool execution against the shared sandbox.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use orb_brain::{SpeechSink, ToolCall, ToolError, ToolExecutor, ToolOutput, PLACE_BLOCKS_TOOL};
use orb_perception::SandboxWorld;
use tokio::sync::RwLock;

/// Applies `placeBlocksAbsolute` calls to the sandbox after a simulated
/// round-trip delay.
pub struct SandboxExecutor {
    world: Arc<RwLock<SandboxWorld>>,
    latency: Duration,
}

impl SandboxExecutor {
    pub fn new(world: Arc<RwLock<SandboxWorld>>, latency: Duration) -> Self {
        Self { world, latency }
    }
}

#[async_trait]
impl ToolExecutor for SandboxExecutor {
    async fn execute(&self, call: ToolCall) -> Result<ToolOutput, ToolError> {
        if call.name != PLACE_BLOCKS_TOOL {
            return Err(ToolError::Unavailable(call.name));
        }
        if call.blocks.is_empty() {
            return Err(ToolError::Rejected("no blocks in request".into()));
        }
        tokio::time::sleep(self.latency).await;

        let placed = self.world.write().await.place_blocks(&call.blocks);
        if placed == 0 {
            return Err(ToolError::Rejected("every block is outside the world".into()));
        }
        tracing::debug!(placed, "blocks placed");
        Ok(ToolOutput {
            blocks_placed: placed,
        })
    }
}

/// Speech goes to the log.
pub struct LogSpeech;

impl SpeechSink for LogSpeech {
    fn speak(&mut self, message: &str) {
        tracing::info!(%message, "orb says");
    }
}
