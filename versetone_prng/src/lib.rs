// Portable pseudo-random number generator for the versetone crates.
//
// Implements xoshiro256++ (Blackman & Vigna, 2019) with SplitMix64 seeding.
// Every random decision in a generation session (tempo jitter, sentence
// pauses, probabilistic note truncation) draws from a `VerseRng` owned by
// that session, never from a process-wide generator.
//
// Sessions are unseeded by default: `VerseRng::from_entropy()` takes its
// seed from the operating system through `rand`, so two runs produce
// different timing. Tests and `--seed` runs use `VerseRng::new(seed)`
// instead, which yields identical output for identical seeds on every
// platform. The core generator uses integer arithmetic only.

use serde::{Deserialize, Serialize};

/// Xoshiro256++ PRNG.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VerseRng {
    s: [u64; 4],
}

impl VerseRng {
    /// Create a new PRNG seeded from a `u64`.
    ///
    /// Uses SplitMix64 to expand the seed into the 256-bit internal state.
    /// Two generators created with the same seed produce identical output.
    pub fn new(seed: u64) -> Self {
        let mut sm = seed;
        Self {
            s: [
                splitmix64(&mut sm),
                splitmix64(&mut sm),
                splitmix64(&mut sm),
                splitmix64(&mut sm),
            ],
        }
    }

    /// Create a generator seeded from OS entropy.
    pub fn from_entropy() -> Self {
        Self::new(rand::random::<u64>())
    }

    /// Generate the next `u64` in the sequence.
    pub fn next_u64(&mut self) -> u64 {
        let result = (self.s[0].wrapping_add(self.s[3]))
            .rotate_left(23)
            .wrapping_add(self.s[0]);

        let t = self.s[1] << 17;

        self.s[2] ^= self.s[0];
        self.s[3] ^= self.s[1];
        self.s[1] ^= self.s[2];
        self.s[0] ^= self.s[3];

        self.s[2] ^= t;
        self.s[3] = self.s[3].rotate_left(45);

        result
    }

    /// Generate a uniform `f64` in [0, 1) from the upper 53 bits.
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Generate a uniform random integer in `[low, high)`.
    ///
    /// Uses rejection sampling to avoid modulo bias.
    /// Panics if `low >= high`.
    pub fn range_i64(&mut self, low: i64, high: i64) -> i64 {
        assert!(low < high, "range_i64: low must be less than high");
        let range = high.abs_diff(low);
        if range.is_power_of_two() {
            return low.wrapping_add((self.next_u64() & (range - 1)) as i64);
        }
        let threshold = range.wrapping_neg() % range;
        loop {
            let r = self.next_u64();
            if r >= threshold {
                return low.wrapping_add((r % range) as i64);
            }
        }
    }

    /// Uniform integer in `[base, base + spread)`.
    ///
    /// A non-positive spread always yields `base`, matching a zero-width
    /// random term.
    pub fn spread(&mut self, base: i64, spread: i64) -> i64 {
        if spread <= 0 {
            return base;
        }
        self.range_i64(base, base + spread)
    }

    /// Return `true` with probability `p`.
    ///
    /// `p <= 0.0` always returns false, `p >= 1.0` always returns true.
    pub fn random_bool(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }
}

/// SplitMix64, used only for seeding xoshiro256++ from a single `u64`.
fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}
