//! Graph-specific error types.

use ct_core::{CompId, ConnId, CtError, Id, PortId};
use thiserror::Error;

use crate::kind::ComponentKind;

pub type GraphResult<T> = Result<T, GraphError>;

/// Graph model operation and snapshot construction errors.
///
/// These are caller contract violations; they are returned immediately and
/// never accumulated like connectivity violations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// Unknown component, port or connection id.
    #[error("{what} {id} not found")]
    NotFound { what: &'static str, id: Id },

    /// A connection needs one upstream and one downstream port on different components.
    #[error("Cannot connect ports {a} and {b}: {reason}")]
    InvalidPorts {
        a: PortId,
        b: PortId,
        reason: &'static str,
    },

    /// The port already holds a connection.
    #[error("Port {port} is already used by connection {connection}")]
    PortOccupied { port: PortId, connection: ConnId },

    /// The child is already an ancestor of the parent.
    #[error("Connecting component {parent} to child {child} would create a cycle")]
    WouldCycle { parent: CompId, child: CompId },

    #[error("Invalid {kind} properties: {reason}")]
    InvalidProperty { kind: ComponentKind, reason: String },

    /// Property update tried to change the component kind.
    #[error("Component {comp} is a {expected}, not a {actual}")]
    KindMismatch {
        comp: CompId,
        expected: ComponentKind,
        actual: ComponentKind,
    },

    /// Property update would add or remove ports.
    #[error("Component {comp} cannot change its port layout")]
    PortLayoutChange { comp: CompId },

    /// An id appears twice in raw snapshot parts.
    #[error("Duplicate {what} id {id}")]
    DuplicateId { what: &'static str, id: Id },

    /// A port refers to a component that doesn't exist.
    #[error("Port {port} refers to non-existent component {comp}")]
    DanglingPort { port: PortId, comp: CompId },

    /// A component lists a port that is missing or owned by someone else.
    #[error("Port {port} should belong to component {expected} but references {actual:?}")]
    PortCompMismatch {
        port: PortId,
        expected: CompId,
        actual: Option<CompId>,
    },

    /// A component lists a port under the wrong role.
    #[error("Port {port} is listed as {expected:?} but has role {actual:?}")]
    PortRoleMismatch {
        port: PortId,
        expected: crate::graph::PortRole,
        actual: crate::graph::PortRole,
    },

    /// A connection refers to a port that doesn't exist.
    #[error("Connection {conn} refers to non-existent port {port}")]
    DanglingConnection { conn: ConnId, port: PortId },

    /// ID not found in index map.
    #[error("{what} not found in index map")]
    IdNotFound { what: &'static str },
}

impl From<GraphError> for CtError {
    fn from(err: GraphError) -> Self {
        match err {
            GraphError::NotFound { what, id } => CtError::NotFound {
                what,
                id: id.index(),
            },
            GraphError::InvalidProperty { .. } => CtError::InvalidArg {
                what: err.to_string(),
            },
            GraphError::DuplicateId { .. }
            | GraphError::DanglingPort { .. }
            | GraphError::PortCompMismatch { .. }
            | GraphError::PortRoleMismatch { .. }
            | GraphError::DanglingConnection { .. }
            | GraphError::IdNotFound { .. } => CtError::Invariant {
                what: err.to_string(),
            },
            _ => CtError::InvalidOperation {
                what: err.to_string(),
            },
        }
    }
}
