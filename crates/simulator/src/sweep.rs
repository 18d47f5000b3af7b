use log::info;
use quantum::{Distribution, WalkConfig, WalkError, WalkResult};

use crate::ensemble::ensemble_distribution;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepRow {
    pub rate: f64,
    /// Shannon entropy of the ensemble distribution, in bits.
    pub entropy: f64,
    /// Probability of being found back at position 0.
    pub origin: f64,
    pub spread: f64,
}

/// Root-mean-square periodic distance from position 0, measured per axis
/// as `min(x, n - x)`.
pub fn spread(dist: &Distribution) -> f64 {
    let mut second_moment = 0.0;
    for (flat, &p) in dist.values.iter().enumerate() {
        let mut rest = flat;
        let mut r2 = 0.0;
        for &n in dist.shape.iter().rev() {
            let x = rest % n;
            rest /= n;
            let d = x.min(n - x) as f64;
            r2 += d * d;
        }
        second_moment += p * r2;
    }
    second_moment.sqrt()
}

pub fn decoherence_sweep(
    config: &WalkConfig,
    rates: &[f64],
    steps: usize,
    trajectories: usize,
    seed: &str,
) -> WalkResult<Vec<SweepRow>> {
    if rates.is_empty() {
        return Err(WalkError::InvalidArgument(
            "sweep needs at least one decoherence rate".into(),
        ));
    }

    let mut rows = Vec::with_capacity(rates.len());
    for &rate in rates {
        let cfg = config.clone().with_decoherence_rate(rate);
        let dist = ensemble_distribution(&cfg, steps, trajectories, seed)?;
        let row = SweepRow {
            rate,
            entropy: dist.entropy(),
            origin: dist.values.first().copied().unwrap_or(0.0),
            spread: spread(&dist),
        };
        info!(
            "rate={:.4}  H={:.4}  P(0)={:.4}  spread={:.4}",
            row.rate, row.entropy, row.origin, row.spread
        );
        rows.push(row);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spread_wraps_around() {
        let dist = Distribution {
            shape: vec![8],
            values: vec![0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0],
        };
        assert!((spread(&dist) - 1.0).abs() < 1e-12);

        let grid = Distribution {
            shape: vec![4, 4],
            values: {
                let mut v = vec![0.0; 16];
                v[4 + 1] = 1.0;
                v
            },
        };
        assert!((spread(&grid) - 2f64.sqrt()).abs() < 1e-12);
    }
}
