//! Core graph data structures and the immutable snapshot.

use ct_core::{CompId, ConnId, PortId};
use serde::{Deserialize, Serialize};

use crate::error::GraphResult;
use crate::indexing::IndexMap;
use crate::kind::ComponentKind;
use crate::props::ComponentProps;
use crate::validate;

/// Role of a port relative to the hierarchy root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PortRole {
    /// Toward the root (the component's parent link).
    Upstream,
    /// Toward the leaves (one child per port).
    Downstream,
}

/// A port belongs to exactly one component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Port {
    pub id: PortId,
    pub comp: CompId,
    pub role: PortRole,
    /// Position among the owning component's ports of the same role.
    pub slot: u8,
}

/// A topology component with its typed ports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    pub id: CompId,
    pub props: ComponentProps,
    pub upstream: Option<PortId>,
    /// Downstream ports in slot order.
    pub downstream: Vec<PortId>,
}

impl Component {
    pub fn kind(&self) -> ComponentKind {
        self.props.kind()
    }

    /// All port ids, upstream first, then downstream by slot.
    pub fn port_ids(&self) -> impl Iterator<Item = PortId> + '_ {
        self.upstream.iter().copied().chain(self.downstream.iter().copied())
    }
}

/// A parent/child link: the parent's downstream port to the child's upstream port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub id: ConnId,
    /// Port on the parent side (a downstream port in a well-formed graph).
    pub parent_port: PortId,
    /// Port on the child side (an upstream port in a well-formed graph).
    pub child_port: PortId,
}

/// An immutable, self-contained view of the topology.
///
/// Snapshots own their data, so one compile pass sees a consistent graph
/// no matter what happens to the `GraphModel` afterwards. Components, ports
/// and connections are stored sorted by id, i.e. in creation order.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub(crate) components: Vec<Component>,
    pub(crate) ports: Vec<Port>,
    pub(crate) connections: Vec<Connection>,
    pub(crate) index: IndexMap,

    /// Offsets for port->connection adjacency: port i's connections are in
    /// port_conns[port_conn_offsets[i]..port_conn_offsets[i+1]].
    pub(crate) port_conn_offsets: Vec<usize>,

    /// Flat list of connection ids incident to ports (sorted by port then connection id).
    pub(crate) port_conns: Vec<ConnId>,
}

impl Snapshot {
    /// Build a snapshot from raw parts.
    ///
    /// Only referential integrity is checked here. Occupancy, roles, the
    /// adjacency table and cycles are reported by the connectivity validator.
    pub fn from_parts(
        mut components: Vec<Component>,
        mut ports: Vec<Port>,
        mut connections: Vec<Connection>,
    ) -> GraphResult<Self> {
        components.sort_by_key(|c| c.id);
        ports.sort_by_key(|p| p.id);
        connections.sort_by_key(|c| c.id);

        validate::validate_structure(&components, &ports, &connections)?;
        Ok(Self::assemble(components, ports, connections))
    }

    /// Assemble from parts already sorted by id and known to be consistent.
    pub(crate) fn assemble(
        components: Vec<Component>,
        ports: Vec<Port>,
        connections: Vec<Connection>,
    ) -> Self {
        let index = IndexMap::from_parts(&components, &ports, &connections);

        // Group connections by port, both ends.
        let mut per_port: Vec<Vec<ConnId>> = vec![Vec::new(); ports.len()];
        for conn in &connections {
            for port in [conn.parent_port, conn.child_port] {
                if let Ok(i) = index.port_idx(port) {
                    per_port[i].push(conn.id);
                }
            }
        }

        let mut port_conn_offsets = Vec::with_capacity(ports.len() + 1);
        let mut port_conns = Vec::new();
        port_conn_offsets.push(0);
        for mut list in per_port {
            list.sort();
            list.dedup();
            port_conns.extend_from_slice(&list);
            port_conn_offsets.push(port_conns.len());
        }

        Self {
            components,
            ports,
            connections,
            index,
            port_conn_offsets,
            port_conns,
        }
    }

    /// All components in creation order.
    pub fn components(&self) -> &[Component] {
        &self.components
    }

    /// All ports in creation order.
    pub fn ports(&self) -> &[Port] {
        &self.ports
    }

    /// All connections in creation order.
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn index_map(&self) -> &IndexMap {
        &self.index
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn component(&self, id: CompId) -> Option<&Component> {
        let i = self.index.comp_idx(id).ok()?;
        self.components.get(i)
    }

    pub fn port(&self, id: PortId) -> Option<&Port> {
        let i = self.index.port_idx(id).ok()?;
        self.ports.get(i)
    }

    pub fn connection(&self, id: ConnId) -> Option<&Connection> {
        let i = self.index.conn_idx(id).ok()?;
        self.connections.get(i)
    }

    /// Connections touching a port at either end, ascending by id.
    pub fn connections_at(&self, port: PortId) -> &[ConnId] {
        let Ok(i) = self.index.port_idx(port) else {
            return &[];
        };
        let start = self.port_conn_offsets[i];
        let end = self.port_conn_offsets[i + 1];
        &self.port_conns[start..end]
    }

    /// Owning component of the parent and child side of a connection.
    pub fn endpoints(&self, conn: &Connection) -> Option<(CompId, CompId)> {
        let parent = self.port(conn.parent_port)?.comp;
        let child = self.port(conn.child_port)?.comp;
        Some((parent, child))
    }

    /// Connections in which `comp` is the parent, ordered by parent port then connection id.
    pub fn child_connections(&self, comp: CompId) -> Vec<&Connection> {
        self.links(comp, |conn, port| conn.parent_port == port)
    }

    /// Connections in which `comp` is the child, ordered by child port then connection id.
    pub fn parent_connections(&self, comp: CompId) -> Vec<&Connection> {
        self.links(comp, |conn, port| conn.child_port == port)
    }

    /// The parent component, if the first parent link exists.
    pub fn parent_of(&self, comp: CompId) -> Option<CompId> {
        let conn = self.parent_connections(comp).into_iter().next()?;
        self.port(conn.parent_port).map(|p| p.comp)
    }

    /// Child components ordered by the parent's port creation order.
    pub fn children_of(&self, comp: CompId) -> Vec<CompId> {
        self.child_connections(comp)
            .into_iter()
            .filter_map(|conn| self.port(conn.child_port).map(|p| p.comp))
            .collect()
    }

    fn links(&self, comp: CompId, side: impl Fn(&Connection, PortId) -> bool) -> Vec<&Connection> {
        let Some(component) = self.component(comp) else {
            return Vec::new();
        };
        let mut ports: Vec<PortId> = component.port_ids().collect();
        ports.sort();
        let mut out = Vec::new();
        for port in ports {
            for &conn_id in self.connections_at(port) {
                if let Some(conn) = self.connection(conn_id)
                    && side(conn, port)
                {
                    out.push(conn);
                }
            }
        }
        out
    }
}
