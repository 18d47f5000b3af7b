use lattice::LatticeError;
use thiserror::Error;

/// Failures raised by walk operations. The state is unchanged whenever one
/// of these is returned.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WalkError {
    /// Wrong particle-pair arity, out-of-range indices, bad parameters.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Topology change without the connectivity it needs.
    #[error("invalid topology: {0}")]
    InvalidTopology(String),

    /// Custom-coin operation before any custom coin was registered.
    #[error("no custom coin registered")]
    MissingCoin,

    #[error("basis mismatch: {0}")]
    BasisMismatch(String),

    /// Zero or non-finite squared magnitude at a normalization step.
    #[error("normalization error: {0}")]
    Normalization(String),

    /// The external circuit collaborator failed or returned garbage.
    #[error("circuit backend error: {0}")]
    Backend(String),
}

impl From<LatticeError> for WalkError {
    fn from(err: LatticeError) -> Self {
        match err {
            LatticeError::ZeroNorm | LatticeError::NonFinite => {
                WalkError::Normalization(err.to_string())
            }
            LatticeError::InvalidGraph(msg) => WalkError::InvalidTopology(msg),
            LatticeError::SeedOutOfRange { .. } => WalkError::InvalidArgument(err.to_string()),
        }
    }
}

pub type WalkResult<T> = Result<T, WalkError>;
