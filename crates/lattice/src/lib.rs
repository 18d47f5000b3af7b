pub mod error;
pub mod tensor;
pub mod topology;

pub use error::{LatticeError, LatticeResult};
pub use tensor::{StateTensor, C64};
pub use topology::{Edge, Graph, Topology, TopologyKind};
