//! Auxiliary state dynamics: memory, pairwise interactions, phase control,
//! interference management and measurement feedback.

use std::collections::VecDeque;

use lattice::{StateTensor, C64};
use serde::{Deserialize, Serialize};

use crate::error::{WalkError, WalkResult};
use crate::measurement::measure;

/// Probability above which a position counts as "high" for interference.
pub const INTERFERENCE_THRESHOLD: f64 = 0.1;
/// Probability above which `measurement_driven_walk` flips coins.
pub const FEEDBACK_THRESHOLD: f64 = 0.05;

/// Fixed-size window of past amplitude snapshots, oldest evicted first.
#[derive(Debug, Clone)]
pub struct MemoryBuffer {
    window: usize,
    states: VecDeque<Vec<C64>>,
}

impl MemoryBuffer {
    pub fn new(window: usize) -> Self {
        Self {
            window: window.max(1),
            states: VecDeque::with_capacity(window.max(1)),
        }
    }

    pub fn push(&mut self, state: Vec<C64>) {
        if self.states.len() == self.window {
            self.states.pop_front();
        }
        self.states.push_back(state);
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn clear(&mut self) {
        self.states.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &[C64]> {
        self.states.iter().map(Vec::as_slice)
    }
}

/// Blend the current state with the remembered ones:
/// `ψ ← (1 - s)·ψ + s·Σ past`, then renormalize. The pre-update state is
/// remembered afterwards. The first call only records.
pub fn integrate_memory_effects(
    psi: &mut StateTensor,
    memory: &mut MemoryBuffer,
    strength: f64,
) -> WalkResult<()> {
    if !(0.0..=1.0).contains(&strength) {
        return Err(WalkError::InvalidArgument(format!(
            "memory strength must be in [0, 1], got {}",
            strength
        )));
    }
    if memory.is_empty() {
        memory.push(psi.data.clone());
        return Ok(());
    }

    let mut next = psi.clone();
    for v in &mut next.data {
        *v *= 1.0 - strength;
    }
    for past in memory.iter() {
        if past.len() != next.len() {
            return Err(WalkError::InvalidArgument(format!(
                "remembered state has {} amplitudes, current has {}",
                past.len(),
                next.len()
            )));
        }
        for (v, p) in next.data.iter_mut().zip(past) {
            *v += p * strength;
        }
    }
    next.normalize()?;

    memory.push(std::mem::replace(psi, next).data);
    Ok(())
}

/// For each particle pair `i < j`, multiply both single-excitation slices by
/// `exp(i·φ)` with `φ = s · Σ ψ[1<<i]·conj(ψ[1<<j])`. The exponent is
/// complex, so this also rescales; the tensor is renormalized at the end.
pub fn simulate_particle_interactions(
    psi: &mut StateTensor,
    num_particles: usize,
    strength: f64,
) -> WalkResult<()> {
    let mut next = psi.clone();
    let i_unit = C64::new(0.0, 1.0);
    for i in 0..num_particles {
        for j in i + 1..num_particles {
            let (ci, cj) = (1usize << i, 1usize << j);
            let phase: C64 = next.overlap(cj, ci) * strength;
            let factor = (i_unit * phase).exp();
            next.scale_slice(ci, factor);
            next.scale_slice(cj, factor);
        }
    }
    if !next.is_finite() {
        return Err(WalkError::Normalization(
            "particle interaction produced non-finite amplitudes".into(),
        ));
    }
    next.normalize()?;
    *psi = next;
    Ok(())
}

/// For `t in 0..time_steps`, multiply every amplitude by `exp(i·control(t))`.
pub fn control_entanglement_temporally<F>(
    psi: &mut StateTensor,
    control: F,
    time_steps: usize,
) -> WalkResult<()>
where
    F: Fn(usize) -> f64,
{
    let mut total = 0.0;
    for t in 0..time_steps {
        let c = control(t);
        if !c.is_finite() {
            return Err(WalkError::InvalidArgument(format!(
                "control function returned {} at step {}",
                c, t
            )));
        }
        total += c;
    }
    psi.scale(C64::from_polar(1.0, total));
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterferenceStrategy {
    /// Invert the phase at every high-probability position.
    Destructive,
    /// Leave the state alone.
    Passive,
}

/// Returns the number of positions whose phase was inverted.
pub fn manage_quantum_interference(psi: &mut StateTensor, strategy: InterferenceStrategy) -> usize {
    if strategy == InterferenceStrategy::Passive {
        return 0;
    }
    let probs = measure(psi);
    let hot: Vec<usize> = positions_above(&probs.values, INTERFERENCE_THRESHOLD);
    for c in 0..psi.configs() {
        let slice = psi.slice_mut(c);
        for &p in &hot {
            slice[p] = -slice[p];
        }
    }
    hot.len()
}

/// At every position with probability above [`FEEDBACK_THRESHOLD`], flip every
/// particle's coin: configuration `c` trades amplitude with its bitwise
/// complement. Returns the number of positions touched.
pub fn measurement_driven_walk(psi: &mut StateTensor) -> usize {
    let probs = measure(psi);
    let hot = positions_above(&probs.values, FEEDBACK_THRESHOLD);
    let mask = psi.configs() - 1;
    for c in 0..psi.configs() {
        let partner = c ^ mask;
        if partner <= c {
            continue;
        }
        let (a, b) = psi.slice_pair_mut(c, partner);
        for &p in &hot {
            std::mem::swap(&mut a[p], &mut b[p]);
        }
    }
    hot.len()
}

fn positions_above(values: &[f64], threshold: f64) -> Vec<usize> {
    values
        .iter()
        .enumerate()
        .filter(|&(_, &p)| p > threshold)
        .map(|(i, _)| i)
        .collect()
}
