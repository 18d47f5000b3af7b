//! Discrete-time quantum walk of entangled particles.
//!
//! The state is a dense tensor with one configuration axis (`2^n` joint coin
//! states) and the position axes of the topology. [`QuantumWalk`] owns it and
//! drives the coin, shift and decoherence engines; the remaining modules are
//! free functions over [`lattice::StateTensor`] that the walk delegates to.

pub mod circuit;
pub mod coin;
pub mod config;
pub mod decision;
pub mod dynamics;
pub mod entanglement;
pub mod error;
pub mod gates;
pub mod measurement;
pub mod noise;
pub mod shift;
pub mod visualize;
mod walk;

pub use coin::{CoinType, CustomCoin};
pub use config::{UnknownOperationPolicy, WalkConfig};
pub use entanglement::{ControlOp, OperationType};
pub use error::{WalkError, WalkResult};
pub use measurement::{Basis, Distribution};
pub use walk::{OptimizationGoal, QuantumWalk};
