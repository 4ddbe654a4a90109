//! Dependency sequencing.
//!
//! Produces the order in which components are emitted so that every bus
//! reference points at an identifier assigned earlier. The order is a pure
//! function of the snapshot: creation order breaks every tie.

use ct_core::CompId;
use ct_graph::{ComponentKind, Snapshot};
use tracing::trace;

/// Order components parents-first.
///
/// 1. Host bridges in creation order, each followed depth-first by its
///    subtree; children are visited in the parent's port creation order.
/// 2. Components whose upstream port is unconnected, in creation order, each
///    followed by its subtree.
/// 3. Anything left (only reachable in graphs with cycles), in creation order.
///
/// The result is always a permutation of the snapshot's component ids.
pub fn sequence(snapshot: &Snapshot) -> Vec<CompId> {
    let index = snapshot.index_map();
    let mut visited = vec![false; index.comp_count()];
    let mut order = Vec::with_capacity(index.comp_count());

    let components = snapshot.components();
    let host_bridges = components
        .iter()
        .filter(|c| c.kind() == ComponentKind::HostBridge);
    let detached = components.iter().filter(|c| {
        c.kind() != ComponentKind::HostBridge && snapshot.parent_connections(c.id).is_empty()
    });

    for root in host_bridges.chain(detached).chain(components.iter()) {
        visit(snapshot, root.id, &mut visited, &mut order);
    }

    trace!(len = order.len(), "sequenced components");
    order
}

/// Preorder walk of the subtree under `root`, skipping visited components.
fn visit(snapshot: &Snapshot, root: CompId, visited: &mut [bool], order: &mut Vec<CompId>) {
    let index = snapshot.index_map();
    let mut stack = vec![root];
    while let Some(comp) = stack.pop() {
        let Ok(i) = index.comp_idx(comp) else {
            continue;
        };
        if visited[i] {
            continue;
        }
        visited[i] = true;
        order.push(comp);

        // Reverse so the first port's child is popped first.
        stack.extend(snapshot.children_of(comp).into_iter().rev());
    }
}
