//! Error types for command synthesis.

use ct_core::CompId;
use thiserror::Error;

use crate::violation::Violation;

/// Result type for synthesis operations.
pub type SynthResult<T> = Result<T, SynthError>;

/// Errors that stop command synthesis. No partial command is ever returned.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SynthError {
    /// Some components are not attached to the hierarchy yet.
    #[error("Topology is incomplete: {} unconnected component(s)", .0.len())]
    Incomplete(Vec<Violation>),

    /// The order names a component the snapshot doesn't have.
    #[error("Component {comp} is not in the snapshot")]
    UnknownComponent { comp: CompId },

    /// A component came before its parent in the order.
    #[error("Parent of component {comp} has no identifier yet")]
    UnresolvedParent { comp: CompId },

    /// A host bridge has no usable PCI bus number: the derived one is out of
    /// range, or the number is already taken by another host bridge.
    #[error("Host bridge {comp} has no free bus number ({reason})")]
    BusNumber { comp: CompId, reason: String },
}
