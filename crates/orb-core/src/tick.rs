use crate::{rng, SplitMix64};

/// Clock and seed handed to every cognition tick.
///
/// `now_ms` is a monotonic millisecond timestamp chosen by the host; goals,
/// memory and interaction logs all measure time against it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickContext {
    pub tick: u64,
    pub now_ms: u64,
    pub seed: u64,
}

impl TickContext {
    pub fn new(tick: u64, now_ms: u64) -> Self {
        Self {
            tick,
            now_ms,
            seed: 0,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn rng_for_stream(&self, stream: u64) -> SplitMix64 {
        SplitMix64::new(rng::derive_seed(self.seed ^ self.tick, stream))
    }
}
