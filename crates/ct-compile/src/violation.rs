//! Connectivity violations reported by the validator.

use core::fmt;

use ct_core::{CompId, ConnId};
use serde::{Deserialize, Serialize};

/// Which rule a violation broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViolationKind {
    /// A parentless component that can never be a hierarchy root.
    Root,
    /// A connection outside the adjacency table or joining the wrong port roles.
    Role,
    /// A port carrying more than one connection.
    FanIn,
    /// A connection closing a loop.
    Cycle,
    /// A non host-bridge component whose upstream port is unconnected.
    Completeness,
}

impl ViolationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ViolationKind::Root => "root",
            ViolationKind::Role => "role",
            ViolationKind::FanIn => "fan-in",
            ViolationKind::Cycle => "cycle",
            ViolationKind::Completeness => "completeness",
        }
    }

    /// Structural violations are reported while editing; completeness only blocks synthesis.
    pub fn is_structural(self) -> bool {
        !matches!(self, ViolationKind::Completeness)
    }
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One rule violation, naming the offending component and connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    pub kind: ViolationKind,
    pub component_id: CompId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_id: Option<ConnId>,
}

impl Violation {
    pub fn component(kind: ViolationKind, component_id: CompId) -> Self {
        Self {
            kind,
            component_id,
            connection_id: None,
        }
    }

    pub fn connection(kind: ViolationKind, component_id: CompId, connection_id: ConnId) -> Self {
        Self {
            kind,
            component_id,
            connection_id: Some(connection_id),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: component {}", self.kind, self.component_id)?;
        if let Some(conn) = self.connection_id {
            write!(f, " (connection {conn})")?;
        }
        Ok(())
    }
}

/// Whether the completeness rule applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationMode {
    /// While the user edits: structural rules only.
    #[default]
    Editing,
    /// Before synthesis: structural rules plus completeness.
    Synthesis,
}

#[cfg(test)]
mod tests {
    use super::*;
    use ct_core::Id;

    #[test]
    fn serializes_in_ui_shape() {
        let v = Violation::component(ViolationKind::Completeness, Id::from_index(3));
        let json = serde_json::to_string(&v).unwrap();
        assert_eq!(json, r#"{"kind":"completeness","componentId":3}"#);

        let v = Violation::connection(ViolationKind::FanIn, Id::from_index(1), Id::from_index(4));
        let json = serde_json::to_string(&v).unwrap();
        assert_eq!(json, r#"{"kind":"fan-in","componentId":1,"connectionId":4}"#);
    }

    #[test]
    fn display_names_ids() {
        let v = Violation::connection(ViolationKind::Cycle, Id::from_index(2), Id::from_index(5));
        assert_eq!(v.to_string(), "cycle: component 2 (connection 5)");
        assert!(ViolationKind::Cycle.is_structural());
        assert!(!ViolationKind::Completeness.is_structural());
    }
}
