//! Deterministic random number generation.
//!
//! Every random decision in a game (deck shuffles, the special-event draw,
//! the forest-location draw) flows through the state's single `GameRng`, so a
//! game is fully determined by its seed and input sequence. The generator's
//! position is captured in the serialized state, which is what makes a
//! restored game continue the identical stream.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Seeded RNG owned by a `GameState`.
///
/// Uses ChaCha8: fast, high-quality, and with an O(1) serializable position.
#[derive(Clone, Debug)]
pub struct GameRng {
    inner: ChaCha8Rng,
    seed: u64,
}

impl GameRng {
    /// Create a generator from a seed.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// Generate a random index in `0..len`.
    pub fn gen_index(&mut self, len: usize) -> usize {
        self.inner.gen_range(0..len)
    }

    /// Shuffle a slice in place.
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        use rand::seq::SliceRandom;
        slice.shuffle(&mut self.inner);
    }

    /// Choose a random element from a slice.
    #[must_use]
    pub fn choose<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        use rand::seq::SliceRandom;
        slice.choose(&mut self.inner)
    }

    /// Capture the current position for serialization.
    #[must_use]
    pub fn snapshot(&self) -> GameRngSnapshot {
        GameRngSnapshot {
            seed: self.seed,
            word_pos: self.inner.get_word_pos(),
        }
    }

    /// Rebuild a generator from a captured position.
    #[must_use]
    pub fn restore(snapshot: &GameRngSnapshot) -> Self {
        let mut inner = ChaCha8Rng::seed_from_u64(snapshot.seed);
        inner.set_word_pos(snapshot.word_pos);
        Self {
            inner,
            seed: snapshot.seed,
        }
    }
}

/// Serializable RNG position.
///
/// The ChaCha word position makes the capture O(1) regardless of how many
/// values have been generated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRngSnapshot {
    pub seed: u64,
    pub word_pos: u128,
}
