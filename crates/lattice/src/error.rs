use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LatticeError {
    /// Squared magnitude is zero where a normalization was requested.
    #[error("cannot normalize a state with zero norm")]
    ZeroNorm,

    /// NaN or infinity showed up in the amplitudes.
    #[error("state contains non-finite amplitudes")]
    NonFinite,

    #[error("invalid graph: {0}")]
    InvalidGraph(String),

    /// Diagonal seeding needs one position per particle along the first axis.
    #[error("cannot seed {particles} particles on an axis of {positions} positions")]
    SeedOutOfRange { particles: usize, positions: usize },
}

pub type LatticeResult<T> = Result<T, LatticeError>;
