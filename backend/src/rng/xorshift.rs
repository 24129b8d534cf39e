//! xorshift64* seed generator
//!
//! Same configured seed → same sequence of per-episode simulator seeds.

use serde::{Deserialize, Serialize};

/// Largest seed handed to the simulator (exclusive). SUMO parses `--seed` as
/// a signed 32-bit integer.
const MAX_SIMULATOR_SEED: u64 = i32::MAX as u64;

/// Deterministic generator of simulator seeds using xorshift64*
///
/// # Example
/// ```
/// use traffic_signal_core_rs::SeedRng;
///
/// let mut a = SeedRng::new(7);
/// let mut b = SeedRng::new(7);
/// assert_eq!(a.next_seed(), b.next_seed());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedRng {
    state: u64,
}

impl SeedRng {
    /// Create a generator from the configured seed
    pub fn new(seed: u64) -> Self {
        // xorshift never leaves the all-zero state
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Next raw 64-bit value
    pub fn next(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545F4914F6CDD1D)
    }

    /// Next simulator seed in `[0, i32::MAX)`
    pub fn next_seed(&mut self) -> u32 {
        (self.next() % MAX_SIMULATOR_SEED) as u32
    }

    /// Current internal state
    pub fn get_state(&self) -> u64 {
        self.state
    }
}
