//! Connectivity validation.
//!
//! Checks a snapshot against the topology grammar. Every rule runs over the
//! whole graph and reports all of its violations; nothing is mutated.

use ct_core::CompId;
use ct_graph::{ComponentKind, PortRole, Snapshot};
use tracing::debug;

use crate::violation::{ValidationMode, Violation, ViolationKind};

/// Validate a snapshot. An empty list means the graph is legal for `mode`.
///
/// Violations come grouped by rule (root, role, fan-in, cycle, completeness),
/// each group sorted by component then connection id.
pub fn validate(snapshot: &Snapshot, mode: ValidationMode) -> Vec<Violation> {
    let mut violations = Vec::new();
    let rules: [fn(&Snapshot) -> Vec<Violation>; 4] =
        [check_roots, check_roles, check_fan_in, check_cycles];
    for rule in rules {
        violations.extend(sorted(rule(snapshot)));
    }
    if mode == ValidationMode::Synthesis {
        violations.extend(sorted(check_completeness(snapshot)));
    }

    debug!(
        components = snapshot.components().len(),
        connections = snapshot.connections().len(),
        violations = violations.len(),
        ?mode,
        "validated topology"
    );
    violations
}

fn sorted(mut v: Vec<Violation>) -> Vec<Violation> {
    v.sort_by_key(|v| (v.component_id, v.connection_id));
    v
}

/// Parentless components must be host bridges. A parentless component with an
/// upstream port is only incomplete; one without any upstream port can never
/// be attached. Host bridges must not expose an upstream port.
pub(crate) fn check_roots(snapshot: &Snapshot) -> Vec<Violation> {
    snapshot
        .components()
        .iter()
        .filter(|c| match c.kind() {
            ComponentKind::HostBridge => c.upstream.is_some(),
            _ => c.upstream.is_none() && snapshot.parent_connections(c.id).is_empty(),
        })
        .map(|c| Violation::component(ViolationKind::Root, c.id))
        .collect()
}

/// Each connection must run from a downstream port to an upstream port and
/// follow the adjacency table. Reported against the child.
pub(crate) fn check_roles(snapshot: &Snapshot) -> Vec<Violation> {
    let mut out = Vec::new();
    for conn in snapshot.connections() {
        let (Some(pp), Some(cp)) = (
            snapshot.port(conn.parent_port),
            snapshot.port(conn.child_port),
        ) else {
            continue;
        };
        let (Some(parent), Some(child)) = (snapshot.component(pp.comp), snapshot.component(cp.comp))
        else {
            continue;
        };

        let roles_ok = pp.role == PortRole::Downstream && cp.role == PortRole::Upstream;
        if !roles_ok || parent.id == child.id || !parent.kind().can_parent(child.kind()) {
            out.push(Violation::connection(ViolationKind::Role, child.id, conn.id));
        }
    }
    out
}

/// Every port holds at most one connection; each extra one is reported.
pub(crate) fn check_fan_in(snapshot: &Snapshot) -> Vec<Violation> {
    let mut out = Vec::new();
    for port in snapshot.ports() {
        for &conn in snapshot.connections_at(port.id).iter().skip(1) {
            out.push(Violation::connection(ViolationKind::FanIn, port.comp, conn));
        }
    }
    out
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    OnStack,
    Done,
}

/// Depth-first search over parent->child edges, host bridges first (creation
/// order), then any component not reached from them. An edge into a component
/// still on the DFS stack closes a cycle.
pub(crate) fn check_cycles(snapshot: &Snapshot) -> Vec<Violation> {
    let index = snapshot.index_map();
    let mut marks = vec![Mark::Unvisited; index.comp_count()];
    let mut out = Vec::new();

    let host_bridges = snapshot
        .components()
        .iter()
        .filter(|c| c.kind() == ComponentKind::HostBridge);
    let starts: Vec<CompId> = host_bridges
        .chain(snapshot.components().iter())
        .map(|c| c.id)
        .collect();

    for start in starts {
        let Ok(si) = index.comp_idx(start) else {
            continue;
        };
        if marks[si] != Mark::Unvisited {
            continue;
        }

        // (component, its child links, next link to follow)
        let mut stack = vec![(start, snapshot.child_connections(start), 0usize)];
        marks[si] = Mark::OnStack;

        while let Some((comp, links, next)) = stack.last_mut() {
            let Some(conn) = links.get(*next).copied() else {
                if let Ok(i) = index.comp_idx(*comp) {
                    marks[i] = Mark::Done;
                }
                stack.pop();
                continue;
            };
            *next += 1;

            let Some(child) = snapshot.port(conn.child_port).map(|p| p.comp) else {
                continue;
            };
            let Ok(ci) = index.comp_idx(child) else {
                continue;
            };
            match marks[ci] {
                Mark::OnStack => {
                    out.push(Violation::connection(ViolationKind::Cycle, child, conn.id));
                }
                Mark::Done => {}
                Mark::Unvisited => {
                    marks[ci] = Mark::OnStack;
                    stack.push((child, snapshot.child_connections(child), 0));
                }
            }
        }
    }
    out
}

/// Every non host-bridge component with an upstream port must have a parent.
pub(crate) fn check_completeness(snapshot: &Snapshot) -> Vec<Violation> {
    snapshot
        .components()
        .iter()
        .filter(|c| c.kind() != ComponentKind::HostBridge && c.upstream.is_some())
        .filter(|c| snapshot.parent_connections(c.id).is_empty())
        .map(|c| Violation::component(ViolationKind::Completeness, c.id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ct_core::Id;
    use ct_graph::{Component, ComponentProps, Connection, GraphModel, Port};

    /// HB -> RP -> SW -> T3, all connected.
    fn chain() -> (GraphModel, [CompId; 4]) {
        let mut m = GraphModel::new();
        let hb = m.add_component(ComponentProps::host_bridge(1)).unwrap();
        let rp = m.add_component(ComponentProps::RootPort).unwrap();
        let sw = m.add_component(ComponentProps::switch(2)).unwrap();
        let t3 = m.add_component(ComponentProps::volatile_type3(512)).unwrap();
        m.connect(m.downstream_ports(hb)[0], m.upstream_port(rp).unwrap()).unwrap();
        m.connect(m.downstream_ports(rp)[0], m.upstream_port(sw).unwrap()).unwrap();
        m.connect(m.downstream_ports(sw)[1], m.upstream_port(t3).unwrap()).unwrap();
        (m, [hb, rp, sw, t3])
    }

    #[test]
    fn valid_chain_has_no_violations() {
        let (m, _) = chain();
        assert!(validate(&m.snapshot(), ValidationMode::Synthesis).is_empty());
    }

    #[test]
    fn empty_graph_is_valid() {
        let m = GraphModel::new();
        assert!(validate(&m.snapshot(), ValidationMode::Synthesis).is_empty());
    }

    #[test]
    fn role_table_is_enforced() {
        let mut m = GraphModel::new();
        let hb = m.add_component(ComponentProps::host_bridge(2)).unwrap();
        let sw = m.add_component(ComponentProps::switch(1)).unwrap();
        let t3 = m.add_component(ComponentProps::volatile_type3(64)).unwrap();
        // host bridge may only parent root ports
        let c1 = m.connect(m.downstream_ports(hb)[0], m.upstream_port(sw).unwrap()).unwrap();
        let c2 = m.connect(m.downstream_ports(hb)[1], m.upstream_port(t3).unwrap()).unwrap();

        let v = validate(&m.snapshot(), ValidationMode::Editing);
        assert_eq!(
            v,
            vec![
                Violation::connection(ViolationKind::Role, sw, c1),
                Violation::connection(ViolationKind::Role, t3, c2),
            ]
        );
    }

    #[test]
    fn completeness_only_in_synthesis_mode() {
        let mut m = GraphModel::new();
        let rp = m.add_component(ComponentProps::RootPort).unwrap();
        let snap = m.snapshot();

        assert!(validate(&snap, ValidationMode::Editing).is_empty());
        assert_eq!(
            validate(&snap, ValidationMode::Synthesis),
            vec![Violation::component(ViolationKind::Completeness, rp)]
        );
    }

    fn comp(id: u32, props: ComponentProps, up: Option<u32>, down: &[u32]) -> Component {
        Component {
            id: Id::from_index(id),
            props,
            upstream: up.map(Id::from_index),
            downstream: down.iter().copied().map(Id::from_index).collect(),
        }
    }

    fn port(id: u32, comp: u32, role: PortRole) -> Port {
        Port {
            id: Id::from_index(id),
            comp: Id::from_index(comp),
            role,
            slot: 0,
        }
    }

    fn link(id: u32, parent_port: u32, child_port: u32) -> Connection {
        Connection {
            id: Id::from_index(id),
            parent_port: Id::from_index(parent_port),
            child_port: Id::from_index(child_port),
        }
    }

    #[test]
    fn fan_in_is_rechecked_on_raw_snapshots() {
        // rp(0): up 0, down 1; sw(1): up 2, down 3; sw(2): up 4, down 5
        let snap = Snapshot::from_parts(
            vec![
                comp(0, ComponentProps::RootPort, Some(0), &[1]),
                comp(1, ComponentProps::switch(1), Some(2), &[3]),
                comp(2, ComponentProps::switch(1), Some(4), &[5]),
            ],
            vec![
                port(0, 0, PortRole::Upstream),
                port(1, 0, PortRole::Downstream),
                port(2, 1, PortRole::Upstream),
                port(3, 1, PortRole::Downstream),
                port(4, 2, PortRole::Upstream),
                port(5, 2, PortRole::Downstream),
            ],
            vec![link(0, 1, 2), link(1, 1, 4)],
        )
        .unwrap();

        let v = validate(&snap, ValidationMode::Editing);
        assert_eq!(
            v,
            vec![Violation::connection(
                ViolationKind::FanIn,
                Id::from_index(0),
                Id::from_index(1)
            )]
        );
    }

    #[test]
    fn detached_loop_is_a_cycle() {
        // Two switches feeding each other, unreachable from any host bridge.
        let snap = Snapshot::from_parts(
            vec![
                comp(0, ComponentProps::switch(1), Some(0), &[1]),
                comp(1, ComponentProps::switch(1), Some(2), &[3]),
            ],
            vec![
                port(0, 0, PortRole::Upstream),
                port(1, 0, PortRole::Downstream),
                port(2, 1, PortRole::Upstream),
                port(3, 1, PortRole::Downstream),
            ],
            vec![link(0, 1, 2), link(1, 3, 0)],
        )
        .unwrap();

        let v = validate(&snap, ValidationMode::Synthesis);
        assert_eq!(
            v,
            vec![Violation::connection(
                ViolationKind::Cycle,
                Id::from_index(0),
                Id::from_index(1)
            )]
        );
    }

    #[test]
    fn component_without_upstream_port_is_a_root_violation() {
        // A "switch" stripped of its upstream port can never be attached.
        let snap = Snapshot::from_parts(
            vec![comp(0, ComponentProps::switch(1), None, &[0])],
            vec![port(0, 0, PortRole::Downstream)],
            vec![],
        )
        .unwrap();

        assert_eq!(
            validate(&snap, ValidationMode::Synthesis),
            vec![Violation::component(ViolationKind::Root, Id::from_index(0))]
        );
    }

    #[test]
    fn host_bridge_with_upstream_port_is_a_root_violation() {
        let snap = Snapshot::from_parts(
            vec![comp(0, ComponentProps::host_bridge(1), Some(0), &[1])],
            vec![
                port(0, 0, PortRole::Upstream),
                port(1, 0, PortRole::Downstream),
            ],
            vec![],
        )
        .unwrap();

        assert_eq!(
            validate(&snap, ValidationMode::Editing),
            vec![Violation::component(ViolationKind::Root, Id::from_index(0))]
        );
    }

    #[test]
    fn wrong_port_roles_are_role_violations() {
        // Connection recorded upstream->upstream.
        let snap = Snapshot::from_parts(
            vec![
                comp(0, ComponentProps::RootPort, Some(0), &[1]),
                comp(1, ComponentProps::RootPort, Some(2), &[3]),
            ],
            vec![
                port(0, 0, PortRole::Upstream),
                port(1, 0, PortRole::Downstream),
                port(2, 1, PortRole::Upstream),
                port(3, 1, PortRole::Downstream),
            ],
            vec![link(0, 0, 2)],
        )
        .unwrap();

        let v = validate(&snap, ValidationMode::Editing);
        assert_eq!(v.len(), 1);
        assert_eq!(v[0].kind, ViolationKind::Role);
    }

    #[test]
    fn validation_does_not_depend_on_previous_runs() {
        let (mut m, [_, rp, ..]) = chain();
        let first = validate(&m.snapshot(), ValidationMode::Synthesis);
        let conn = m.connection_at(m.upstream_port(rp).unwrap()).unwrap();
        m.disconnect(conn).unwrap();
        assert_eq!(validate(&m.snapshot(), ValidationMode::Synthesis).len(), 1);
        assert_eq!(first, validate(&chain().0.snapshot(), ValidationMode::Synthesis));
    }
}
