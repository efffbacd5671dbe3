#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use orb_brain::{OrbBrain, OrbConfig, SpeechSink};
use orb_core::{BlockType, IVec3, TickContext, TraceEvent, TraceSink, Vec3};
use orb_nav::GridBounds;
use orb_perception::{BlockInfo, SandboxWorld};

pub const TICK_MS: u64 = 500;

/// Open world with the default bounds and nothing in it.
pub fn empty_world() -> SandboxWorld {
    SandboxWorld::new(GridBounds::default())
}

pub fn brain() -> OrbBrain {
    OrbBrain::new(&OrbConfig::default())
}

pub fn tick_ctx(tick: u64) -> TickContext {
    TickContext::new(tick, 1_000 + tick * TICK_MS).with_seed(11)
}

pub fn spawn() -> Vec3 {
    OrbConfig::default().brain.spawn_position
}

/// A short stone wall right under the spawn point.
pub fn wall_under_spawn(len: i32) -> Vec<BlockInfo> {
    (0..len)
        .map(|x| BlockInfo {
            position: IVec3::new(x, 4, 0),
            block: BlockType::STONE,
        })
        .collect()
}

/// Trace sink whose events stay readable after the brain takes ownership.
#[derive(Clone, Default)]
pub struct SharedTrace(pub Arc<Mutex<Vec<TraceEvent>>>);

impl SharedTrace {
    pub fn count(&self, tag: &str) -> usize {
        self.0.lock().unwrap().iter().filter(|e| e.tag == tag).count()
    }
}

impl TraceSink for SharedTrace {
    fn emit(&mut self, event: TraceEvent) {
        self.0.lock().unwrap().push(event);
    }
}

#[derive(Clone, Default)]
pub struct SharedSpeech(pub Arc<Mutex<Vec<String>>>);

impl SpeechSink for SharedSpeech {
    fn speak(&mut self, message: &str) {
        self.0.lock().unwrap().push(message.to_string());
    }
}
