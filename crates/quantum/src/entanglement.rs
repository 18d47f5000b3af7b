//! Ad hoc entangling operators on the configuration slices.
//!
//! None of these are derived from a physical model; each one implements a
//! fixed arithmetic recipe on slice overlaps and single-excitation slices
//! (`1 << particle`). All of them work on a scratch copy and write back only
//! once the final renormalization succeeded.

use std::convert::Infallible;
use std::str::FromStr;

use lattice::{StateTensor, C64};
use log::{debug, warn};

use crate::coin::apply_particle_coin;
use crate::config::UnknownOperationPolicy;
use crate::error::{WalkError, WalkResult};
use crate::gates::{pauli_x, pauli_z};
use crate::measurement::{measure, measure_in_basis, Basis};

/// Overlap magnitude above which `propagate_entanglement` couples two slices.
pub const OVERLAP_THRESHOLD: f64 = 0.1;

/// Probability tolerance for the majority comparison in error correction.
const MAJORITY_TOLERANCE: f64 = 1e-12;

fn check_particle(p: usize, num_particles: usize) -> WalkResult<()> {
    if p >= num_particles {
        return Err(WalkError::InvalidArgument(format!(
            "particle index {} out of range for {} particles",
            p, num_particles
        )));
    }
    Ok(())
}

fn particle_pair(particles: &[usize], num_particles: usize) -> WalkResult<(usize, usize)> {
    let &[a, b] = particles else {
        return Err(WalkError::InvalidArgument(format!(
            "entanglement needs exactly two particles, got {}",
            particles.len()
        )));
    };
    check_particle(a, num_particles)?;
    check_particle(b, num_particles)?;
    if a == b {
        return Err(WalkError::InvalidArgument(format!(
            "cannot entangle particle {} with itself",
            a
        )));
    }
    Ok((a, b))
}

fn couple(psi: &mut StateTensor, a: usize, b: usize) {
    let (ca, cb) = (1usize << a, 1usize << b);
    let (x, y) = psi.slice_pair_mut(ca, cb);
    for (u, v) in x.iter_mut().zip(y.iter_mut()) {
        let (old_u, old_v) = (*u, *v);
        *u = old_u + old_v;
        *v = old_v + old_u;
    }
}

/// Controlled-swap-like coupling: each of the two single-excitation slices
/// gains a copy of the other, then the tensor is renormalized.
pub fn generate_entanglement(
    psi: &mut StateTensor,
    num_particles: usize,
    particles: &[usize],
) -> WalkResult<()> {
    let (a, b) = particle_pair(particles, num_particles)?;
    let mut next = psi.clone();
    couple(&mut next, a, b);
    next.normalize()?;
    *psi = next;
    debug!("entangled particles {} and {}", a, b);
    Ok(())
}

/// For every ordered pair of distinct slices whose overlap exceeds
/// [`OVERLAP_THRESHOLD`] in magnitude, rotate the first by `+arg(overlap)`
/// and the second by `-arg(overlap)`, renormalizing both. Pairs are visited
/// in order and see earlier updates. Ends with a global renormalization.
pub fn propagate_entanglement(psi: &mut StateTensor) -> WalkResult<()> {
    let mut next = psi.clone();
    let configs = next.configs();
    let mut coupled = 0usize;

    for idx in 0..configs {
        for partner in (0..configs).filter(|&p| p != idx) {
            let overlap = next.overlap(idx, partner);
            if overlap.norm() <= OVERLAP_THRESHOLD {
                continue;
            }
            let phase = overlap.arg();
            next.scale_slice(idx, C64::from_polar(1.0, phase));
            next.scale_slice(partner, C64::from_polar(1.0, -phase));
            next.normalize_slice(idx)?;
            next.normalize_slice(partner)?;
            coupled += 1;
        }
    }

    next.normalize()?;
    *psi = next;
    debug!("propagated entanglement across {} slice pairs", coupled);
    Ok(())
}

/// For every unordered slice pair, scale both slices by
/// `filter(|overlap|)`, then renormalize globally.
pub fn entanglement_filtering<F>(psi: &mut StateTensor, filter: F) -> WalkResult<()>
where
    F: Fn(f64) -> f64,
{
    let mut next = psi.clone();
    let configs = next.configs();

    for idx in 0..configs {
        for partner in idx + 1..configs {
            let strength = next.overlap(idx, partner).norm();
            let factor = filter(strength);
            if !factor.is_finite() {
                return Err(WalkError::InvalidArgument(format!(
                    "filter returned {} for overlap {}",
                    factor, strength
                )));
            }
            let factor = C64::new(factor, 0.0);
            next.scale_slice(idx, factor);
            next.scale_slice(partner, factor);
        }
    }

    next.normalize()?;
    *psi = next;
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationType {
    /// Additive coupling: target slice += phase · control slice.
    Cnot,
    /// Exchange two slices.
    Swap,
    Unknown(String),
}

impl FromStr for OperationType {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "CNOT" => OperationType::Cnot,
            "SWAP" => OperationType::Swap,
            other => OperationType::Unknown(other.to_string()),
        })
    }
}

/// One entry of a control sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlOp {
    /// `(control, target)` for CNOT, the two exchanged particles for SWAP.
    pub particles: (usize, usize),
    pub operation: OperationType,
    pub phase: C64,
}

impl ControlOp {
    pub fn cnot(control: usize, target: usize, phase: C64) -> Self {
        Self {
            particles: (control, target),
            operation: OperationType::Cnot,
            phase,
        }
    }

    pub fn swap(a: usize, b: usize) -> Self {
        Self {
            particles: (a, b),
            operation: OperationType::Swap,
            phase: C64::new(1.0, 0.0),
        }
    }

    /// Entry from an operation name; the phase defaults to 1.
    pub fn named(a: usize, b: usize, name: &str, phase: Option<C64>) -> Self {
        let operation = match name.parse() {
            Ok(op) => op,
            Err(never) => match never {},
        };
        Self {
            particles: (a, b),
            operation,
            phase: phase.unwrap_or(C64::new(1.0, 0.0)),
        }
    }
}

/// Apply a control sequence in order, then renormalize. Returns the number
/// of entries that were applied.
///
/// The whole sequence is validated first: out-of-range particles always
/// fail, unknown operations fail only under [`UnknownOperationPolicy::Fail`].
pub fn dynamic_entanglement_generation(
    psi: &mut StateTensor,
    num_particles: usize,
    sequence: &[ControlOp],
    policy: UnknownOperationPolicy,
) -> WalkResult<usize> {
    for op in sequence {
        let (a, b) = op.particles;
        check_particle(a, num_particles)?;
        check_particle(b, num_particles)?;
        if !(op.phase.re.is_finite() && op.phase.im.is_finite()) {
            return Err(WalkError::InvalidArgument(format!(
                "non-finite phase {} in control sequence",
                op.phase
            )));
        }
        if let (OperationType::Unknown(name), UnknownOperationPolicy::Fail) =
            (&op.operation, policy)
        {
            return Err(WalkError::InvalidArgument(format!(
                "unknown control operation '{}'",
                name
            )));
        }
    }

    let mut next = psi.clone();
    let mut applied = 0usize;
    for op in sequence {
        let (a, b) = op.particles;
        let (ca, cb) = (1usize << a, 1usize << b);
        match &op.operation {
            OperationType::Cnot => {
                if ca == cb {
                    next.scale_slice(ca, op.phase + 1.0);
                } else {
                    let (control, target) = next.slice_pair_mut(ca, cb);
                    for (t, c) in target.iter_mut().zip(control.iter()) {
                        *t += c * op.phase;
                    }
                }
            }
            OperationType::Swap => next.swap_slices(ca, cb),
            OperationType::Unknown(name) => {
                warn!("ignoring unknown control operation '{}'", name);
                continue;
            }
        }
        applied += 1;
    }

    next.normalize()?;
    *psi = next;
    Ok(applied)
}

/// Three-particle repetition-style heuristic: couple 0-1 and 1-2, flip
/// particle 1, then flip it back if the probabilities at positions 0 and 2
/// agree. Returns whether the corrective flip was applied.
pub fn quantum_error_correction_scheme(
    psi: &mut StateTensor,
    num_particles: usize,
) -> WalkResult<bool> {
    if num_particles < 3 {
        return Err(WalkError::InvalidArgument(format!(
            "error correction needs 3 particles, got {}",
            num_particles
        )));
    }
    if psi.slice_len() < 3 {
        return Err(WalkError::InvalidArgument(format!(
            "error correction compares positions 0 and 2, only {} positions",
            psi.slice_len()
        )));
    }

    let mut next = psi.clone();
    generate_entanglement(&mut next, num_particles, &[0, 1])?;
    generate_entanglement(&mut next, num_particles, &[1, 2])?;
    apply_particle_coin(&mut next, 1, &pauli_x());

    let probs = measure(&next);
    let corrected = (probs.values[0] - probs.values[2]).abs() <= MAJORITY_TOLERANCE;
    if corrected {
        apply_particle_coin(&mut next, 1, &pauli_x());
    }

    *psi = next;
    debug!("error correction ran, corrective flip applied: {}", corrected);
    Ok(corrected)
}

/// Corrections applied by [`quantum_teleportation_protocol`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TeleportationOutcome {
    pub x_applied: bool,
    pub z_applied: bool,
}

/// Couple sender and receiver, read the Bell-basis distribution and apply X
/// (resp. Z) to the receiver when the flat Bell entry at the sender's
/// (resp. receiver's) index exceeds 0.5.
pub fn quantum_teleportation_protocol(
    psi: &mut StateTensor,
    num_particles: usize,
    sender: usize,
    receiver: usize,
) -> WalkResult<TeleportationOutcome> {
    let mut next = psi.clone();
    generate_entanglement(&mut next, num_particles, &[sender, receiver])?;

    let bell = measure_in_basis(&next, Basis::Bell)?;
    let bit = |i: usize| bell.values.get(i).is_some_and(|&p| p > 0.5);
    let outcome = TeleportationOutcome {
        x_applied: bit(sender),
        z_applied: bit(receiver),
    };

    if outcome.x_applied {
        apply_particle_coin(&mut next, receiver, &pauli_x());
    }
    if outcome.z_applied {
        apply_particle_coin(&mut next, receiver, &pauli_z());
    }

    *psi = next;
    Ok(outcome)
}
