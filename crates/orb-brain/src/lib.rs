//! The Orb agent's control loop.
//!
//! [`OrbBrain`] owns the agent state and runs one perceive, evaluate, decide,
//! act and learn cycle per [`OrbBrain::tick`]. Motion along the planned path
//! is integrated separately through [`OrbBrain::move_along_path`] at frame
//! rate. [`OrbDriver`] wires both onto tokio timers and executes tool calls
//! off the tick.

#![forbid(unsafe_code)]

pub mod brain;
pub mod config;
pub mod driver;
pub mod state;
pub mod tools;

pub use brain::{OrbBrain, PlayerAction, BUILD_REFLEX_SOURCE};
pub use config::{BrainConfig, OrbConfig};
pub use driver::{DriverReport, OrbDriver, OrbHandle, TickGuard, TickOutcome};
pub use state::{mode_for_goal, OrbMode, OrbState};
pub use tools::{
    SpeechSink, StateObserver, ToolCall, ToolCompletion, ToolError, ToolExecutor, ToolOutput,
    PLACE_BLOCKS_TOOL,
};
