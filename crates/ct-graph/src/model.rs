//! The mutable editing model.

use std::collections::{BTreeMap, HashMap};

use ct_core::{CompId, ConnId, IdAllocator, PortId};
use tracing::trace;

use crate::error::{GraphError, GraphResult};
use crate::graph::{Component, Connection, Port, PortRole, Snapshot};
use crate::props::ComponentProps;

/// Authoritative editing state for one topology.
///
/// Components, ports and connections are created and destroyed only through
/// this API. Ids come from monotonic allocators, so iteration order is
/// creation order. Call `snapshot()` to hand a consistent view to the
/// compile passes.
#[derive(Debug, Clone, Default)]
pub struct GraphModel {
    components: BTreeMap<CompId, Component>,
    ports: BTreeMap<PortId, Port>,
    connections: BTreeMap<ConnId, Connection>,
    /// Port -> the connection it holds.
    occupancy: HashMap<PortId, ConnId>,
    comp_ids: IdAllocator,
    port_ids: IdAllocator,
    conn_ids: IdAllocator,
}

impl GraphModel {
    /// Create a new empty model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a component; its ports are created upstream first, then downstream by slot.
    pub fn add_component(&mut self, props: ComponentProps) -> GraphResult<CompId> {
        props.validate()?;

        let id = self.comp_ids.next_id();
        let (up, down) = props.port_layout();

        let upstream = (up > 0).then(|| self.new_port(id, PortRole::Upstream, 0));
        let downstream = (0..down)
            .map(|slot| self.new_port(id, PortRole::Downstream, slot as u8))
            .collect();

        trace!(comp = %id, kind = %props.kind(), "add component");
        self.components.insert(
            id,
            Component {
                id,
                props,
                upstream,
                downstream,
            },
        );
        Ok(id)
    }

    fn new_port(&mut self, comp: CompId, role: PortRole, slot: u8) -> PortId {
        let id = self.port_ids.next_id();
        self.ports.insert(
            id,
            Port {
                id,
                comp,
                role,
                slot,
            },
        );
        id
    }

    /// Remove a component, its ports and every connection touching it.
    pub fn remove_component(&mut self, id: CompId) -> GraphResult<()> {
        let comp = self
            .components
            .remove(&id)
            .ok_or(GraphError::NotFound {
                what: "component",
                id,
            })?;

        for port in comp.port_ids() {
            if let Some(conn) = self.occupancy.get(&port).copied() {
                self.drop_connection(conn);
            }
            self.ports.remove(&port);
        }
        trace!(comp = %id, "remove component");
        Ok(())
    }

    /// Replace a component's properties. The kind and port layout are fixed.
    pub fn update_properties(&mut self, id: CompId, props: ComponentProps) -> GraphResult<()> {
        let comp = self.components.get_mut(&id).ok_or(GraphError::NotFound {
            what: "component",
            id,
        })?;
        if comp.kind() != props.kind() {
            return Err(GraphError::KindMismatch {
                comp: id,
                expected: comp.kind(),
                actual: props.kind(),
            });
        }
        props.validate()?;
        if comp.props.port_layout() != props.port_layout() {
            return Err(GraphError::PortLayoutChange { comp: id });
        }
        comp.props = props;
        trace!(comp = %id, "update properties");
        Ok(())
    }

    /// Connect an upstream and a downstream port, in either argument order.
    pub fn connect(&mut self, a: PortId, b: PortId) -> GraphResult<ConnId> {
        let pa = self.port(a)?.clone();
        let pb = self.port(b)?.clone();

        if pa.comp == pb.comp {
            return Err(GraphError::InvalidPorts {
                a,
                b,
                reason: "ports belong to the same component",
            });
        }
        let (parent_port, child_port) = match (pa.role, pb.role) {
            (PortRole::Downstream, PortRole::Upstream) => (pa, pb),
            (PortRole::Upstream, PortRole::Downstream) => (pb, pa),
            _ => {
                return Err(GraphError::InvalidPorts {
                    a,
                    b,
                    reason: "need exactly one upstream and one downstream port",
                });
            }
        };

        // The child must not already sit above the parent.
        let (parent, child) = (parent_port.comp, child_port.comp);
        if self.ancestors(parent).any(|c| c == child) {
            return Err(GraphError::WouldCycle { parent, child });
        }

        for port in [parent_port.id, child_port.id] {
            if let Some(&connection) = self.occupancy.get(&port) {
                return Err(GraphError::PortOccupied { port, connection });
            }
        }

        let conn = Connection {
            id: self.conn_ids.next_id(),
            parent_port: parent_port.id,
            child_port: child_port.id,
        };
        self.occupancy.insert(conn.parent_port, conn.id);
        self.occupancy.insert(conn.child_port, conn.id);
        self.connections.insert(conn.id, conn);
        trace!(conn = %conn.id, %parent, %child, "connect");
        Ok(conn.id)
    }

    /// Remove a connection.
    pub fn disconnect(&mut self, id: ConnId) -> GraphResult<()> {
        if !self.drop_connection(id) {
            return Err(GraphError::NotFound {
                what: "connection",
                id,
            });
        }
        trace!(conn = %id, "disconnect");
        Ok(())
    }

    fn drop_connection(&mut self, id: ConnId) -> bool {
        let Some(conn) = self.connections.remove(&id) else {
            return false;
        };
        self.occupancy.remove(&conn.parent_port);
        self.occupancy.remove(&conn.child_port);
        true
    }

    /// `comp` followed by its ancestors up to the root.
    fn ancestors(&self, comp: CompId) -> impl Iterator<Item = CompId> + '_ {
        std::iter::successors(Some(comp), move |&c| {
            let up = self.components.get(&c)?.upstream?;
            let conn = self.connections.get(self.occupancy.get(&up)?)?;
            self.ports.get(&conn.parent_port).map(|p| p.comp)
        })
        .take(self.components.len() + 1)
    }

    fn port(&self, id: PortId) -> GraphResult<&Port> {
        self.ports
            .get(&id)
            .ok_or(GraphError::NotFound { what: "port", id })
    }

    /// Number of components.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn component(&self, id: CompId) -> Option<&Component> {
        self.components.get(&id)
    }

    /// Components in creation order.
    pub fn components(&self) -> impl Iterator<Item = &Component> {
        self.components.values()
    }

    pub fn connection(&self, id: ConnId) -> Option<&Connection> {
        self.connections.get(&id)
    }

    /// Ports of a component, upstream first.
    pub fn ports_of(&self, id: CompId) -> Vec<&Port> {
        self.components
            .get(&id)
            .map(|c| c.port_ids().filter_map(|p| self.ports.get(&p)).collect())
            .unwrap_or_default()
    }

    pub fn upstream_port(&self, id: CompId) -> Option<PortId> {
        self.components.get(&id)?.upstream
    }

    /// Downstream ports of a component in slot order (empty if unknown).
    pub fn downstream_ports(&self, id: CompId) -> &[PortId] {
        self.components
            .get(&id)
            .map_or(&[], |c| c.downstream.as_slice())
    }

    /// The connection held by a port, if any.
    pub fn connection_at(&self, port: PortId) -> Option<ConnId> {
        self.occupancy.get(&port).copied()
    }

    /// Take an immutable, owned view of the current state.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::assemble(
            self.components.values().cloned().collect(),
            self.ports.values().cloned().collect(),
            self.connections.values().copied().collect(),
        )
    }
}
