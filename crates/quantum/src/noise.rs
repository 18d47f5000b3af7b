use lattice::{StateTensor, C64};
use rng::RandomSource;

use crate::error::{WalkError, WalkResult};

/// Standard deviation of the phase kick in `simulate_decoherence`.
pub const PHASE_NOISE_STD: f64 = 0.1;
/// Scale of the exponential amplitude damping in `simulate_decoherence`.
pub const DAMPING_SCALE: f64 = 0.05;

fn check_rate(rate: f64) -> WalkResult<()> {
    if !(0.0..=1.0).contains(&rate) {
        return Err(WalkError::InvalidArgument(format!(
            "decoherence rate must be in [0, 1], got {}",
            rate
        )));
    }
    Ok(())
}

/// Masked Gaussian noise per configuration slice, then per-slice rescaling.
///
/// Every element of every slice is kicked by `N(0, 1)` with probability
/// `rate`. Each slice is then rescaled so that its squared magnitude equals
/// its share of the pre-noise total, which leaves the tensor unit-norm.
/// Slices that were empty stay empty: decoherence never populates a
/// configuration that had no amplitude, and the noise drawn for it is dropped.
pub fn apply_decoherence<R>(psi: &mut StateTensor, rate: f64, rng: &mut R) -> WalkResult<()>
where
    R: RandomSource + ?Sized,
{
    check_rate(rate)?;
    let total = psi.norm_sqr();
    if total == 0.0 || !total.is_finite() {
        return Err(WalkError::Normalization(format!(
            "state norm before decoherence is {}",
            total
        )));
    }

    let mut next = psi.clone();
    for c in 0..psi.configs() {
        let share = psi.slice_norm_sqr(c) / total;
        for v in next.slice_mut(c) {
            let hit = rng.next_bernoulli(rate, b"DECOHERENCE_MASK");
            let kick = rng.next_gaussian(b"DECOHERENCE_NOISE");
            if hit {
                *v += kick;
            }
        }

        if share == 0.0 {
            next.scale_slice(c, C64::new(0.0, 0.0));
            continue;
        }

        let after = next.slice_norm_sqr(c);
        if after == 0.0 || !after.is_finite() {
            return Err(WalkError::Normalization(format!(
                "slice {} has norm {} after noise injection",
                c, after
            )));
        }
        next.scale_slice(c, C64::new((share / after).sqrt(), 0.0));
    }

    *psi = next;
    Ok(())
}

/// Bernoulli-gated multiplicative noise per slice, then one global
/// renormalization.
///
/// With probability `rate` a slice is multiplied by `exp(i·N(0, 0.1))` and by
/// the damping factor `exp(-0.05·U)`, `U` uniform in `[0, 1]`.
pub fn simulate_decoherence<R>(psi: &mut StateTensor, rate: f64, rng: &mut R) -> WalkResult<()>
where
    R: RandomSource + ?Sized,
{
    check_rate(rate)?;

    let mut next = psi.clone();
    for c in 0..psi.configs() {
        if !rng.next_bernoulli(rate, b"DEPHASE_GATE") {
            continue;
        }
        let phase = rng.next_normal(0.0, PHASE_NOISE_STD, b"DEPHASE_PHASE");
        let damping = (-rng.next_f64(b"DEPHASE_DAMP") * DAMPING_SCALE).exp();
        next.scale_slice(c, C64::from_polar(damping, phase));
    }

    next.normalize()?;
    *psi = next;
    Ok(())
}
