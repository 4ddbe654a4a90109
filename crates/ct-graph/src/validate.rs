//! Referential integrity checks for raw snapshot parts.

use ct_core::Id;

use crate::error::{GraphError, GraphResult};
use crate::graph::{Component, Connection, Port, PortRole};

/// Validate raw parts (each sorted by id): ids unique, every reference resolves,
/// component port lists agree with the ports' owner and role.
pub(crate) fn validate_structure(
    components: &[Component],
    ports: &[Port],
    connections: &[Connection],
) -> GraphResult<()> {
    check_unique("component", components.iter().map(|c| c.id))?;
    check_unique("port", ports.iter().map(|p| p.id))?;
    check_unique("connection", connections.iter().map(|c| c.id))?;

    let find_port = |id: Id| {
        ports
            .binary_search_by_key(&id, |p| p.id)
            .ok()
            .map(|i| &ports[i])
    };
    let has_comp = |id: Id| components.binary_search_by_key(&id, |c| c.id).is_ok();

    // Check that each port references a valid component
    for port in ports {
        if !has_comp(port.comp) {
            return Err(GraphError::DanglingPort {
                port: port.id,
                comp: port.comp,
            });
        }
    }

    // Each listed port must exist, be owned by this component and carry the listed role
    let mut listed = 0usize;
    for comp in components {
        let roles = comp
            .upstream
            .iter()
            .map(|&p| (p, PortRole::Upstream))
            .chain(comp.downstream.iter().map(|&p| (p, PortRole::Downstream)));
        for (port_id, expected) in roles {
            listed += 1;
            let Some(port) = find_port(port_id) else {
                return Err(GraphError::PortCompMismatch {
                    port: port_id,
                    expected: comp.id,
                    actual: None,
                });
            };
            if port.comp != comp.id {
                return Err(GraphError::PortCompMismatch {
                    port: port_id,
                    expected: comp.id,
                    actual: Some(port.comp),
                });
            }
            if port.role != expected {
                return Err(GraphError::PortRoleMismatch {
                    port: port_id,
                    expected,
                    actual: port.role,
                });
            }
        }
    }

    // Every port should be listed by its owner exactly once
    if listed != ports.len() {
        for port in ports {
            let owner = components
                .binary_search_by_key(&port.comp, |c| c.id)
                .ok()
                .map(|i| &components[i]);
            let count = owner.map_or(0, |c| c.port_ids().filter(|&p| p == port.id).count());
            if count != 1 {
                return Err(GraphError::PortCompMismatch {
                    port: port.id,
                    expected: port.comp,
                    actual: None,
                });
            }
        }
    }

    for conn in connections {
        for port in [conn.parent_port, conn.child_port] {
            if find_port(port).is_none() {
                return Err(GraphError::DanglingConnection {
                    conn: conn.id,
                    port,
                });
            }
        }
    }

    Ok(())
}

fn check_unique(what: &'static str, ids: impl Iterator<Item = Id>) -> GraphResult<()> {
    let mut prev: Option<Id> = None;
    for id in ids {
        if prev == Some(id) {
            return Err(GraphError::DuplicateId { what, id });
        }
        prev = Some(id);
    }
    Ok(())
}
