//! Deterministic PRNG for simulation use (liveries, smoke).
//!
//! Uses the SplitMix64 algorithm: fast, 8 bytes of state, and trivially
//! serializable so a run can be replayed from its seed.

use crate::fixed::Fixed64;

/// SplitMix64 pseudo-random number generator.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SimRng {
    state: u64,
}

impl SimRng {
    /// Create a new RNG with the given seed.
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Generate the next `u64` in the sequence.
    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Returns `true` with the given probability (Fixed64 in [0, 1]).
    ///
    /// - probability <= 0 always returns false
    /// - probability >= 1 always returns true
    pub fn chance(&mut self, probability: Fixed64) -> bool {
        if probability <= Fixed64::ZERO {
            return false;
        }
        if probability >= Fixed64::ONE {
            return true;
        }
        // For p in (0,1) the raw Q32.32 bits are the fraction scaled to
        // [0, 2^32); compare against a uniform u32.
        let upper = self.next_u64() >> 32;
        upper < probability.to_bits() as u64
    }

    /// Uniform integer in `[0, n)`. Returns 0 when `n` is 0.
    pub fn below(&mut self, n: u32) -> u32 {
        if n == 0 {
            return 0;
        }
        (((self.next_u64() >> 32) * u64::from(n)) >> 32) as u32
    }

    /// Uniform float between `lo` and `hi`. Cosmetic values only.
    pub fn range_f32(&mut self, lo: f32, hi: f32) -> f32 {
        let unit = (self.next_u64() >> 40) as f32 / (1u64 << 24) as f32;
        lo + (hi - lo) * unit
    }

    /// Get the internal state (for hashing/serialization).
    pub fn state(&self) -> u64 {
        self.state
    }
}
