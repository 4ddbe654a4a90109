//! Property tests over randomly grown topologies.

use ct_compile::{SynthConfig, ValidationMode, compile, sequence, validate};
use ct_core::CompId;
use ct_graph::{ComponentKind, ComponentProps, GraphModel};
use proptest::prelude::*;

fn props_for(choice: u8) -> ComponentProps {
    match choice % 6 {
        0 => ComponentProps::host_bridge(2),
        1 => ComponentProps::RootPort,
        2 => ComponentProps::switch(3),
        3 => ComponentProps::volatile_type3(256),
        4 => ComponentProps::Type2Device {
            memory: vec![ct_graph::BackingMemory::Volatile { size_mib: 64 }],
        },
        _ => ComponentProps::MemoryWindow {
            backing: ct_graph::BackingMemory::Persistent {
                size_mib: 128,
                lsa_size_mib: 16,
            },
        },
    }
}

/// Grow a graph that only ever makes legal connections; some components stay detached.
fn grow(steps: &[(u8, usize)]) -> GraphModel {
    let mut m = GraphModel::new();
    for &(kind, pick) in steps {
        let props = props_for(kind);
        let child_kind = props.kind();
        let id = m.add_component(props).unwrap();
        let Some(up) = m.upstream_port(id) else {
            continue;
        };

        let free: Vec<_> = m
            .components()
            .filter(|c| c.id != id && c.kind().can_parent(child_kind))
            .flat_map(|c| c.downstream.clone())
            .filter(|&p| m.connection_at(p).is_none())
            .collect();
        if free.is_empty() || pick % 4 == 0 {
            continue;
        }
        m.connect(free[pick % free.len()], up).unwrap();
    }
    m
}

proptest! {
    #[test]
    fn sequence_is_parent_first_permutation(
        steps in prop::collection::vec((0_u8..6, 0_usize..64), 0..40)
    ) {
        let m = grow(&steps);
        let snap = m.snapshot();
        prop_assert!(validate(&snap, ValidationMode::Editing).is_empty());

        let order = sequence(&snap);
        let mut sorted = order.clone();
        sorted.sort();
        let mut ids: Vec<CompId> = snap.components().iter().map(|c| c.id).collect();
        ids.sort();
        prop_assert_eq!(sorted, ids);

        let pos = |id: CompId| order.iter().position(|&o| o == id).unwrap();
        for comp in snap.components() {
            if let Some(parent) = snap.parent_of(comp.id) {
                prop_assert!(pos(parent) < pos(comp.id));
            }
        }
    }

    #[test]
    fn compile_is_deterministic(
        steps in prop::collection::vec((0_u8..6, 0_usize..64), 0..40)
    ) {
        let m = grow(&steps);
        // Narrow stride so every grown host bridge still gets a bus number.
        let config = SynthConfig {
            bus_nr_stride: 4,
            ..SynthConfig::default()
        };
        let first = compile(&m.snapshot(), &config).unwrap();
        let second = compile(&m.snapshot(), &config).unwrap();
        prop_assert_eq!(&first, &second);

        // A complete graph (every non host-bridge attached) always compiles.
        let complete = m
            .components()
            .all(|c| c.kind() == ComponentKind::HostBridge || m.connection_at(c.upstream.unwrap()).is_some());
        prop_assert_eq!(first.is_ok(), complete);
    }
}
