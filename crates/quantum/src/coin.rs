use std::fmt;
use std::ops::Range;

use lattice::StateTensor;
use serde::{Deserialize, Serialize};

use crate::gates::{conjugate_hadamard, hadamard, Coin};

/// Which matrix `apply_coin` uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoinType {
    #[default]
    Hadamard,
    /// [[1, -1], [1, 1]] / sqrt(2).
    Conjugate,
    /// Whatever is registered as the custom coin.
    Custom,
}

/// Registered custom coin.
#[derive(Default)]
pub enum CustomCoin {
    #[default]
    None,
    Fixed(Coin),
    /// Derived from the walk's step counter every time it is used.
    TimeDependent(Box<dyn Fn(u64) -> Coin + Send>),
}

impl CustomCoin {
    pub fn resolve(&self, step: u64) -> Option<Coin> {
        match self {
            CustomCoin::None => None,
            CustomCoin::Fixed(u) => Some(*u),
            CustomCoin::TimeDependent(f) => Some(f(step)),
        }
    }

    pub fn is_set(&self) -> bool {
        !matches!(self, CustomCoin::None)
    }
}

impl fmt::Debug for CustomCoin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CustomCoin::None => f.write_str("None"),
            CustomCoin::Fixed(u) => f.debug_tuple("Fixed").field(u).finish(),
            CustomCoin::TimeDependent(_) => f.write_str("TimeDependent(..)"),
        }
    }
}

impl CoinType {
    /// Matrix for the built-in coins; `None` for `Custom`.
    pub fn builtin(self) -> Option<Coin> {
        match self {
            CoinType::Hadamard => Some(hadamard()),
            CoinType::Conjugate => Some(conjugate_hadamard()),
            CoinType::Custom => None,
        }
    }
}

/// Apply `u` to every particle's register.
///
/// For particle `p` the coin sub-vector at each position is the amplitude
/// pair of configurations `c` and `c | 1 << p` (bit `p` clear in `c`). The
/// full operation is `u ⊗ u ⊗ ... ⊗ u` on the configuration axis.
pub fn apply_coin(psi: &mut StateTensor, num_particles: usize, u: &Coin) {
    apply_rows(psi, 0..num_particles, |_| u, |_| u);
}

/// Parity-selected coin: the output amplitude of configuration `c` is taken
/// from the row of `even` when `c` is even and from `odd` otherwise.
///
/// For particle 0 the two members of a pair differ in parity, so the result
/// mixes rows of both coins and is not unitary in general.
pub fn apply_multi_coin(psi: &mut StateTensor, num_particles: usize, even: &Coin, odd: &Coin) {
    let pick = |c: usize| if c % 2 == 0 { even } else { odd };
    apply_rows(psi, 0..num_particles, pick, pick);
}

/// Apply a single particle's coin. Used for the X/Z corrections.
pub fn apply_particle_coin(psi: &mut StateTensor, particle: usize, u: &Coin) {
    apply_rows(psi, particle..particle + 1, |_| u, |_| u);
}

fn apply_rows<'a, F, G>(psi: &mut StateTensor, particles: Range<usize>, low: F, high: G)
where
    F: Fn(usize) -> &'a Coin,
    G: Fn(usize) -> &'a Coin,
{
    let len = psi.slice_len();
    for p in particles {
        let bit = 1usize << p;
        for c0 in 0..psi.configs() {
            if c0 & bit != 0 {
                continue;
            }
            let c1 = c0 | bit;
            let r0 = low(c0)[0];
            let r1 = high(c1)[1];
            let (a, b) = psi.slice_pair_mut(c0, c1);
            for k in 0..len {
                let (x0, x1) = (a[k], b[k]);
                a[k] = r0[0] * x0 + r0[1] * x1;
                b[k] = r1[0] * x0 + r1[1] * x1;
            }
        }
    }
}
