//! Seeded random number generation.
//!
//! All randomness in the simulation flows through [`BattleRng`], a ChaCha8
//! stream seeded at battle start. The generator state serializes with the
//! rest of the battle, so a restored battle continues the same stream.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Deterministic RNG for target selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BattleRng {
    inner: ChaCha8Rng,
}

impl BattleRng {
    /// Create a generator from a seed. Equal seeds produce equal streams.
    #[must_use]
    pub fn from_seed(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Uniform index into a slice of the given length. Returns 0 for an
    /// empty slice; callers check emptiness before indexing.
    pub fn gen_index(&mut self, len: usize) -> usize {
        if len == 0 {
            0
        } else {
            self.inner.gen_range(0..len)
        }
    }

    /// Pick a uniform random element of a slice.
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            None
        } else {
            let index = self.gen_index(items.len());
            Some(&items[index])
        }
    }
}
