use std::time::{SystemTime, UNIX_EPOCH};

/// Source of randomness for the scribble generator.
///
/// Injected so callers (and tests) decide whether a scribble is reproducible.
pub trait RandomSource {
    fn next_u64(&mut self) -> u64;

    /// Uniform integer in `[min, max]` (inclusive).
    fn range_i32(&mut self, min: i32, max: i32) -> i32 {
        if max <= min {
            return min;
        }
        let span = (max as i64 - min as i64 + 1) as u64;
        // High bits of an LCG are the well-mixed ones
        let value = (self.next_u64() >> 32) % span;
        (min as i64 + value as i64) as i32
    }
}

/// 64-bit linear congruential generator (Knuth's MMIX constants).
#[derive(Debug, Clone)]
pub struct Lcg {
    state: u64,
}

impl Lcg {
    pub fn new(seed: u64) -> Self {
        Lcg {
            state: seed.wrapping_add(1),
        }
    }

    /// Seeds from the wall clock and process id.
    pub fn from_entropy() -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0);
        Lcg::new(nanos ^ ((std::process::id() as u64) << 32))
    }
}

impl RandomSource for Lcg {
    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.state
    }
}
