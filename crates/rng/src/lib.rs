mod entropy;
mod ond;

pub use entropy::EntropyRng;
pub use ond::ONDRng;

/// Source of uniform draws in `[0, 1]`.
///
/// Every draw carries a short context label. Deterministic sources mix the
/// label into the output so that two call sites never share a stream position
/// by accident; entropy-backed sources may ignore it.
pub trait RandomSource {
    fn next_f64(&mut self, ctx: &[u8]) -> f64;

    /// Standard normal draw (Box-Muller).
    fn next_gaussian(&mut self, ctx: &[u8]) -> f64 {
        let u1 = self.next_f64(ctx).max(f64::MIN_POSITIVE);
        let u2 = self.next_f64(ctx);
        (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
    }

    /// Normal draw with the given mean and standard deviation.
    fn next_normal(&mut self, mean: f64, std_dev: f64, ctx: &[u8]) -> f64 {
        mean + std_dev * self.next_gaussian(ctx)
    }

    /// `true` with probability `p`.
    fn next_bernoulli(&mut self, p: f64, ctx: &[u8]) -> bool {
        p > 0.0 && self.next_f64(ctx) < p
    }

    /// Uniform index in `0..n`. Returns 0 for `n == 0`.
    fn next_index(&mut self, n: usize, ctx: &[u8]) -> usize {
        if n == 0 {
            return 0;
        }
        let i = (self.next_f64(ctx) * n as f64) as usize;
        i.min(n - 1)
    }
}

impl<R: RandomSource + ?Sized> RandomSource for Box<R> {
    fn next_f64(&mut self, ctx: &[u8]) -> f64 {
        (**self).next_f64(ctx)
    }
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    fn next_f64(&mut self, ctx: &[u8]) -> f64 {
        (**self).next_f64(ctx)
    }
}

/// Fisher-Yates shuffle driven by a [`RandomSource`].
pub fn shuffle<T, R: RandomSource + ?Sized>(items: &mut [T], rng: &mut R, ctx: &[u8]) {
    for i in (1..items.len()).rev() {
        let j = rng.next_index(i + 1, ctx);
        items.swap(i, j);
    }
}
