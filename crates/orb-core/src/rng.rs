//! Seeded randomness for behaviours.
//!
//! Every random choice an agent makes draws from a stream derived from the
//! tick seed, so a run replays identically. Not cryptographic.

pub trait DeterministicRng {
    fn next_u64(&mut self) -> u64;

    /// Uniform in `[0, 1)` from the top 24 bits of a draw.
    fn next_f32_unit(&mut self) -> f32 {
        (self.next_u64() >> 40) as f32 / (1u32 << 24) as f32
    }

    fn next_bool(&mut self) -> bool {
        self.next_u64() >> 63 == 1
    }

    /// Uniform value in `[lo, hi)`.
    fn next_range(&mut self, lo: f32, hi: f32) -> f32 {
        lo + (hi - lo) * self.next_f32_unit()
    }

    /// `true` with probability `p`.
    fn chance(&mut self, p: f32) -> bool {
        self.next_f32_unit() < p
    }

    /// `+1.0` or `-1.0`.
    fn next_sign(&mut self) -> f32 {
        if self.next_bool() {
            1.0
        } else {
            -1.0
        }
    }
}

/// Steele, Lea and Flood's SplitMix64 generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitMix64 {
    state: u64,
}

impl SplitMix64 {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    fn step(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E3779B97F4A7C15);
        mix64(self.state)
    }
}

impl DeterministicRng for SplitMix64 {
    fn next_u64(&mut self) -> u64 {
        self.step()
    }
}

pub fn mix64(mut x: u64) -> u64 {
    x ^= x >> 30;
    x = x.wrapping_mul(0xBF58476D1CE4E5B9);
    x ^= x >> 27;
    x = x.wrapping_mul(0x94D049BB133111EB);
    x ^ (x >> 31)
}

/// Derives an independent stream seed from a global seed.
pub fn derive_seed(global_seed: u64, stream: u64) -> u64 {
    mix64(global_seed ^ mix64(stream.wrapping_add(0x9E3779B97F4A7C15)))
}
