//! Topology file validation.
//!
//! File-level checks only: the connectivity grammar is the compiler's job and
//! is reported as violations after loading.

use crate::schema::TopologyDef;
use std::collections::HashMap;

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Duplicate ID: {id} in {context}")]
    DuplicateId { id: String, context: String },

    #[error("Missing reference: {id} in {context}")]
    MissingReference { id: String, context: String },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

pub fn validate_topology(topology: &TopologyDef) -> Result<(), ValidationError> {
    if topology.version == 0 || topology.version > crate::LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: topology.version,
        });
    }

    let mut components = HashMap::new();
    for component in &topology.components {
        if components.insert(&component.id, component).is_some() {
            return Err(ValidationError::DuplicateId {
                id: component.id.clone(),
                context: "components".to_string(),
            });
        }
        if let Err(err) = component.props.validate() {
            return Err(ValidationError::InvalidValue {
                field: format!("component '{}'", component.id),
                value: component.props.kind().to_string(),
                reason: err.to_string(),
            });
        }
    }

    for (i, conn) in topology.connections.iter().enumerate() {
        let Some(parent) = components.get(&conn.parent) else {
            return Err(ValidationError::MissingReference {
                id: conn.parent.clone(),
                context: format!("connection {i} parent"),
            });
        };
        let Some(child) = components.get(&conn.child) else {
            return Err(ValidationError::MissingReference {
                id: conn.child.clone(),
                context: format!("connection {i} child"),
            });
        };
        if child.props.port_layout().0 == 0 {
            return Err(ValidationError::InvalidValue {
                field: format!("connection {i} child"),
                value: conn.child.clone(),
                reason: "component has no upstream port".to_string(),
            });
        }

        let (_, downstream) = parent.props.port_layout();
        if conn.port as usize >= downstream {
            return Err(ValidationError::InvalidValue {
                field: format!("connection {i} port"),
                value: conn.port.to_string(),
                reason: format!("'{}' has {downstream} downstream port(s)", conn.parent),
            });
        }
        if conn.parent == conn.child {
            return Err(ValidationError::InvalidValue {
                field: format!("connection {i} child"),
                value: conn.child.clone(),
                reason: "a component cannot be its own parent".to_string(),
            });
        }
    }

    Ok(())
}
