use std::collections::BTreeMap;
use std::str::FromStr;

use lattice::{StateTensor, C64};
use rng::RandomSource;
use serde::{Deserialize, Serialize};

use crate::error::{WalkError, WalkResult};
use crate::gates::bell_transform;

/// Probabilities laid out row-major over `shape`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Distribution {
    pub shape: Vec<usize>,
    pub values: Vec<f64>,
}

impl Distribution {
    pub fn total(&self) -> f64 {
        self.values.iter().sum()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// First index holding the largest value.
    pub fn argmax(&self) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (i, &v) in self.values.iter().enumerate() {
            match best {
                Some((_, b)) if v <= b => {}
                _ => best = Some((i, v)),
            }
        }
        best.map(|(i, _)| i)
    }

    /// Shannon entropy in bits over the non-zero entries.
    pub fn entropy(&self) -> f64 {
        self.values
            .iter()
            .filter(|&&p| p > 0.0)
            .map(|&p| -p * p.log2())
            .sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Basis {
    Computational,
    Bell,
}

impl FromStr for Basis {
    type Err = WalkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "computational" => Ok(Basis::Computational),
            "bell" => Ok(Basis::Bell),
            other => Err(WalkError::InvalidArgument(format!(
                "unknown measurement basis '{}'",
                other
            ))),
        }
    }
}

/// Per-position probability: squared magnitude summed over configurations.
pub fn measure(psi: &StateTensor) -> Distribution {
    let mut values = vec![0.0f64; psi.slice_len()];
    for c in 0..psi.configs() {
        for (p, v) in psi.slice(c).iter().enumerate() {
            values[p] += v.norm_sqr();
        }
    }
    Distribution {
        shape: psi.position_shape().to_vec(),
        values,
    }
}

/// `Computational` is [`measure`]. `Bell` applies the 4x4 Bell change to
/// consecutive blocks of four in the flattened tensor and returns the
/// squared magnitudes with the full tensor shape (configurations first).
pub fn measure_in_basis(psi: &StateTensor, basis: Basis) -> WalkResult<Distribution> {
    match basis {
        Basis::Computational => Ok(measure(psi)),
        Basis::Bell => {
            if psi.len() % 4 != 0 {
                return Err(WalkError::BasisMismatch(format!(
                    "bell transform needs a flattened size divisible by 4, got {}",
                    psi.len()
                )));
            }
            let u = bell_transform();
            let mut values = Vec::with_capacity(psi.len());
            for block in psi.data.chunks(4) {
                for row in &u {
                    let mut acc = C64::new(0.0, 0.0);
                    for (w, x) in row.iter().zip(block) {
                        acc += w * x;
                    }
                    values.push(acc.norm_sqr());
                }
            }
            let mut shape = vec![psi.configs()];
            shape.extend_from_slice(psi.position_shape());
            Ok(Distribution { shape, values })
        }
    }
}

/// Draw one flat position per configuration slice from that slice's own
/// normalized distribution. Empty slices are left out of the result.
pub fn entanglement_based_measurement<R>(psi: &StateTensor, rng: &mut R) -> BTreeMap<usize, usize>
where
    R: RandomSource + ?Sized,
{
    let mut out = BTreeMap::new();
    for c in 0..psi.configs() {
        let probs: Vec<f64> = psi.slice(c).iter().map(|v| v.norm_sqr()).collect();
        if let Some(outcome) = sample_categorical(&probs, rng, b"SLICE_SAMPLE") {
            out.insert(c, outcome);
        }
    }
    out
}

/// Inverse-CDF draw from unnormalized weights. `None` if all weights are zero.
pub fn sample_categorical<R>(weights: &[f64], rng: &mut R, ctx: &[u8]) -> Option<usize>
where
    R: RandomSource + ?Sized,
{
    let total: f64 = weights.iter().sum();
    if total <= 0.0 || !total.is_finite() {
        return None;
    }

    let mut x = rng.next_f64(ctx) * total;
    let mut last_nonzero = 0;
    for (idx, &p) in weights.iter().enumerate() {
        if p <= 0.0 {
            continue;
        }
        last_nonzero = idx;
        if x < p {
            return Some(idx);
        }
        x -= p;
    }
    Some(last_nonzero)
}
