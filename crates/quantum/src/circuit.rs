//! Boundary to an external circuit/noise simulator.
//!
//! The walk only encodes a small circuit description and a noise model, and
//! validates the bitstring counts that come back.

use std::collections::BTreeMap;

use lattice::StateTensor;
use serde::{Deserialize, Serialize};

use crate::error::{WalkError, WalkResult};

pub type Counts = BTreeMap<String, u64>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircuitSpec {
    pub num_qubits: usize,
    /// Qubits that receive a Hadamard gate.
    pub hadamard: Vec<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoiseKind {
    Depolarizing,
    AmplitudeDamping,
    Dephasing,
}

/// Walk stage an error channel is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoiseStage {
    #[serde(rename = "apply_coin")]
    Coin,
    #[serde(rename = "shift")]
    Shift,
    #[serde(rename = "measure")]
    Measure,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoiseChannelSpec {
    pub kind: NoiseKind,
    /// Error probability (depolarizing) or damping parameter.
    pub parameter: f64,
    pub qubits: usize,
    pub stage: NoiseStage,
}

impl NoiseChannelSpec {
    pub fn for_kind(kind: NoiseKind) -> Self {
        match kind {
            NoiseKind::Depolarizing => Self {
                kind,
                parameter: 0.01,
                qubits: 2,
                stage: NoiseStage::Coin,
            },
            NoiseKind::AmplitudeDamping => Self {
                kind,
                parameter: 0.05,
                qubits: 1,
                stage: NoiseStage::Shift,
            },
            NoiseKind::Dephasing => Self {
                kind,
                parameter: 0.02,
                qubits: 1,
                stage: NoiseStage::Measure,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NoiseModelSpec {
    pub channels: Vec<NoiseChannelSpec>,
}

impl NoiseModelSpec {
    pub fn from_kinds(kinds: &[NoiseKind]) -> Self {
        Self {
            channels: kinds.iter().map(|&k| NoiseChannelSpec::for_kind(k)).collect(),
        }
    }
}

/// Executes a circuit under a noise model and reports outcome counts.
pub trait CircuitBackend {
    fn execute(&mut self, circuit: &CircuitSpec, noise: &NoiseModelSpec) -> Result<Counts, String>;
}

/// One qubit per particle; qubit `i` gets a Hadamard when the real part of
/// its seed amplitude (configuration `1 << i`, first-axis position `i`) is
/// positive.
pub fn construct_quantum_circuit(psi: &StateTensor, num_particles: usize) -> CircuitSpec {
    let first = psi.position_shape().first().copied().unwrap_or(0);
    let stride = if psi.position_shape().is_empty() {
        1
    } else {
        psi.axis_stride(0)
    };
    let hadamard = (0..num_particles)
        .filter(|&i| i < first && psi.get(1 << i, i * stride).re > 0.0)
        .collect();
    CircuitSpec {
        num_qubits: num_particles,
        hadamard,
    }
}

/// Run the circuit through `backend` and check that every outcome is a
/// bitstring of the right width.
pub fn simulate_noise_effects<B>(
    psi: &StateTensor,
    num_particles: usize,
    kinds: &[NoiseKind],
    backend: &mut B,
) -> WalkResult<Counts>
where
    B: CircuitBackend + ?Sized,
{
    let circuit = construct_quantum_circuit(psi, num_particles);
    let noise = NoiseModelSpec::from_kinds(kinds);
    let counts = backend
        .execute(&circuit, &noise)
        .map_err(WalkError::Backend)?;
    decode_counts(counts, circuit.num_qubits)
}

pub fn decode_counts(counts: Counts, num_qubits: usize) -> WalkResult<Counts> {
    for key in counts.keys() {
        let well_formed = key.len() == num_qubits && key.chars().all(|c| c == '0' || c == '1');
        if !well_formed {
            return Err(WalkError::Backend(format!(
                "outcome '{}' is not a {}-bit string",
                key, num_qubits
            )));
        }
    }
    Ok(counts)
}
