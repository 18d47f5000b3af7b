use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::RandomSource;

/// Process-wide default source, seeded from OS entropy. Ignores context labels.
#[derive(Clone, Debug)]
pub struct EntropyRng {
    inner: StdRng,
}

impl EntropyRng {
    pub fn new() -> Self {
        Self {
            inner: StdRng::from_entropy(),
        }
    }

    /// Seeded variant for callers that want `rand`'s stream instead of OND.
    pub fn seeded(seed: u64) -> Self {
        Self {
            inner: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for EntropyRng {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomSource for EntropyRng {
    fn next_f64(&mut self, _ctx: &[u8]) -> f64 {
        self.inner.gen::<f64>()
    }
}
