use lattice::TopologyKind;
use serde::{Deserialize, Serialize};

use crate::coin::CoinType;
use crate::error::{WalkError, WalkResult};

/// Upper bound on particles; the configuration axis has `2^n` entries.
pub const MAX_PARTICLES: usize = 20;

/// What `dynamic_entanglement_generation` does with operation names it does
/// not recognise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownOperationPolicy {
    /// Skip the entry and log a warning.
    #[default]
    Ignore,
    /// Reject the whole sequence before touching the state.
    Fail,
}

/// Construction parameters for a [`crate::QuantumWalk`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalkConfig {
    /// Positions per axis (line/grid) or node count (network).
    pub num_positions: usize,
    pub num_particles: usize,
    /// Number of position axes for line/grid topologies.
    pub dimension: usize,
    pub topology: TopologyKind,
    pub coin: CoinType,
    /// Noise rate used by `step()`.
    pub decoherence_rate: f64,
    /// Degree of the random regular graph built for `network`.
    pub network_degree: usize,
    /// Number of past states kept by `integrate_memory_effects`.
    pub memory_window: usize,
    pub unknown_operation: UnknownOperationPolicy,
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self {
            num_positions: 8,
            num_particles: 2,
            dimension: 1,
            topology: TopologyKind::Line,
            coin: CoinType::Hadamard,
            decoherence_rate: 0.01,
            network_degree: 3,
            memory_window: 8,
            unknown_operation: UnknownOperationPolicy::Ignore,
        }
    }
}

impl WalkConfig {
    pub fn new(num_positions: usize, num_particles: usize) -> Self {
        Self {
            num_positions,
            num_particles,
            ..Self::default()
        }
    }

    pub fn with_dimension(mut self, dimension: usize) -> Self {
        self.dimension = dimension;
        self
    }

    pub fn with_topology(mut self, topology: TopologyKind) -> Self {
        self.topology = topology;
        self
    }

    pub fn with_coin(mut self, coin: CoinType) -> Self {
        self.coin = coin;
        self
    }

    pub fn with_decoherence_rate(mut self, rate: f64) -> Self {
        self.decoherence_rate = rate;
        self
    }

    pub fn with_memory_window(mut self, window: usize) -> Self {
        self.memory_window = window;
        self
    }

    pub fn with_unknown_operation(mut self, policy: UnknownOperationPolicy) -> Self {
        self.unknown_operation = policy;
        self
    }

    pub fn validate(&self) -> WalkResult<()> {
        if self.num_positions == 0 {
            return Err(WalkError::InvalidArgument(
                "num_positions must be positive".into(),
            ));
        }
        if self.num_particles == 0 || self.num_particles > MAX_PARTICLES {
            return Err(WalkError::InvalidArgument(format!(
                "num_particles must be in [1, {}], got {}",
                MAX_PARTICLES, self.num_particles
            )));
        }
        if self.num_particles > self.num_positions {
            return Err(WalkError::InvalidArgument(format!(
                "{} particles need at least as many positions, got {}",
                self.num_particles, self.num_positions
            )));
        }
        if self.dimension == 0 {
            return Err(WalkError::InvalidArgument(
                "dimension must be positive".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.decoherence_rate) {
            return Err(WalkError::InvalidArgument(format!(
                "decoherence_rate must be in [0, 1], got {}",
                self.decoherence_rate
            )));
        }
        if self.memory_window == 0 {
            return Err(WalkError::InvalidArgument(
                "memory_window must be positive".into(),
            ));
        }
        Ok(())
    }
}
