use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Number of verses in the whole text; absolute indices run `1..=TOTAL_VERSES`.
pub const TOTAL_VERSES: u32 = 6236;

/// Source of the verse index for `/random-verse`.
pub trait VerseSelector: Send + Sync {
    /// Pick an absolute verse index in `1..=TOTAL_VERSES`.
    fn pick(&self) -> u32;
}

/// Uniform pick from the thread-local RNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomVerseSelector;

impl VerseSelector for RandomVerseSelector {
    fn pick(&self) -> u32 {
        rand::thread_rng().gen_range(1..=TOTAL_VERSES)
    }
}

/// Same index on every call for a given seed.
#[derive(Debug, Clone, Copy)]
pub struct SeededVerseSelector {
    pub seed: u64,
}

impl SeededVerseSelector {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl VerseSelector for SeededVerseSelector {
    fn pick(&self) -> u32 {
        StdRng::seed_from_u64(self.seed).gen_range(1..=TOTAL_VERSES)
    }
}
