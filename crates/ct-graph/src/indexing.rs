//! Stable indexing for the compile passes.
//!
//! Provides bidirectional mappings between sparse domain IDs (CompId, PortId,
//! ConnId) and contiguous pass indices (0..N). IDs are never reused, so after
//! removals the id space has holes; the passes work on dense arrays instead.

use ct_core::{CompId, ConnId, CtResult, PortId};

use crate::error::GraphError;
use crate::graph::{Component, Connection, Port};

/// Index map providing stable, contiguous indices for graph objects.
///
/// Provides O(1) bidirectional lookup between IDs and indices.
#[derive(Debug, Clone, Default)]
pub struct IndexMap {
    /// Contiguous list of component IDs (index -> CompId).
    comp_ids: Vec<CompId>,

    /// Contiguous list of port IDs (index -> PortId).
    port_ids: Vec<PortId>,

    /// Contiguous list of connection IDs (index -> ConnId).
    conn_ids: Vec<ConnId>,

    /// Reverse lookup: CompId -> index.
    /// Sized to max(CompId.index) + 1; None if that ID doesn't exist.
    comp_to_idx: Vec<Option<usize>>,

    /// Reverse lookup: PortId -> index.
    port_to_idx: Vec<Option<usize>>,

    /// Reverse lookup: ConnId -> index.
    conn_to_idx: Vec<Option<usize>>,
}

impl IndexMap {
    /// Build an index map from id-sorted parts.
    pub fn from_parts(components: &[Component], ports: &[Port], connections: &[Connection]) -> Self {
        let comp_ids: Vec<CompId> = components.iter().map(|c| c.id).collect();
        let port_ids: Vec<PortId> = ports.iter().map(|p| p.id).collect();
        let conn_ids: Vec<ConnId> = connections.iter().map(|c| c.id).collect();

        Self {
            comp_to_idx: reverse(&comp_ids),
            port_to_idx: reverse(&port_ids),
            conn_to_idx: reverse(&conn_ids),
            comp_ids,
            port_ids,
            conn_ids,
        }
    }

    /// Number of components in the index.
    pub fn comp_count(&self) -> usize {
        self.comp_ids.len()
    }

    /// Number of ports in the index.
    pub fn port_count(&self) -> usize {
        self.port_ids.len()
    }

    /// Number of connections in the index.
    pub fn conn_count(&self) -> usize {
        self.conn_ids.len()
    }

    /// Get the contiguous index for a component ID.
    pub fn comp_idx(&self, id: CompId) -> CtResult<usize> {
        lookup(&self.comp_to_idx, id)
            .ok_or_else(|| GraphError::IdNotFound { what: "CompId" }.into())
    }

    /// Get the contiguous index for a port ID.
    pub fn port_idx(&self, id: PortId) -> CtResult<usize> {
        lookup(&self.port_to_idx, id)
            .ok_or_else(|| GraphError::IdNotFound { what: "PortId" }.into())
    }

    /// Get the contiguous index for a connection ID.
    pub fn conn_idx(&self, id: ConnId) -> CtResult<usize> {
        lookup(&self.conn_to_idx, id)
            .ok_or_else(|| GraphError::IdNotFound { what: "ConnId" }.into())
    }

    /// Get the component ID for a contiguous index (panics if out of bounds).
    pub fn comp_id(&self, i: usize) -> CompId {
        self.comp_ids[i]
    }

    /// Get the port ID for a contiguous index (panics if out of bounds).
    pub fn port_id(&self, i: usize) -> PortId {
        self.port_ids[i]
    }

    /// Get the connection ID for a contiguous index (panics if out of bounds).
    pub fn conn_id(&self, i: usize) -> ConnId {
        self.conn_ids[i]
    }

    /// All component IDs in index (creation) order.
    pub fn comp_ids(&self) -> &[CompId] {
        &self.comp_ids
    }

    pub fn port_ids(&self) -> &[PortId] {
        &self.port_ids
    }

    pub fn conn_ids(&self) -> &[ConnId] {
        &self.conn_ids
    }
}

fn reverse(ids: &[ct_core::Id]) -> Vec<Option<usize>> {
    // Size to max ID index + 1
    let len = ids.iter().map(|id| id.index() as usize + 1).max().unwrap_or(0);
    let mut to_idx = vec![None; len];
    for (i, id) in ids.iter().enumerate() {
        to_idx[id.index() as usize] = Some(i);
    }
    to_idx
}

fn lookup(to_idx: &[Option<usize>], id: ct_core::Id) -> Option<usize> {
    to_idx.get(id.index() as usize).copied().flatten()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::GraphModel;
    use crate::props::ComponentProps;
    use ct_core::{CtError, Id};

    #[test]
    fn index_map_dense_after_removal() {
        let mut model = GraphModel::new();
        let a = model.add_component(ComponentProps::RootPort).unwrap();
        let b = model.add_component(ComponentProps::RootPort).unwrap();
        let c = model.add_component(ComponentProps::RootPort).unwrap();
        model.remove_component(b).unwrap();

        let snap = model.snapshot();
        let idx = snap.index_map();

        assert_eq!(idx.comp_count(), 2);
        assert_eq!(idx.comp_idx(a).unwrap(), 0);
        assert_eq!(idx.comp_idx(c).unwrap(), 1);
        assert_eq!(idx.comp_id(1), c);
        assert!(idx.comp_idx(b).is_err());
        // Ports of the removed component are gone too.
        assert_eq!(idx.port_count(), 4);
    }

    #[test]
    fn index_map_invalid_id() {
        let idx = IndexMap::default();
        assert_eq!(idx.comp_count(), 0);
        assert!(idx.comp_idx(Id::from_index(999)).is_err());
        assert_eq!(
            idx.conn_idx(Id::from_index(0)),
            Err(CtError::Invariant {
                what: "ConnId not found in index map".to_string()
            })
        );
    }
}
