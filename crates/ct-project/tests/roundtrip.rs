use ct_graph::{BackingMemory, ComponentProps, Extent};
use ct_project::schema::*;
use ct_project::{build_model, export, load_json, load_yaml, save_json, save_yaml};

fn topology() -> TopologyDef {
    TopologyDef {
        version: 1,
        name: "Roundtrip".to_string(),
        components: vec![
            ComponentDef {
                id: "hb".to_string(),
                props: ComponentProps::HostBridge {
                    downstream_ports: 2,
                    bus_nr: Some(64),
                },
            },
            ComponentDef {
                id: "rp".to_string(),
                props: ComponentProps::RootPort,
            },
            ComponentDef {
                id: "sw".to_string(),
                props: ComponentProps::switch(2),
            },
            ComponentDef {
                id: "mem".to_string(),
                props: ComponentProps::Type3Device {
                    memory: vec![
                        BackingMemory::Volatile { size_mib: 512 },
                        BackingMemory::Persistent {
                            size_mib: 1024,
                            lsa_size_mib: 128,
                        },
                    ],
                },
            },
            ComponentDef {
                id: "pool".to_string(),
                props: ComponentProps::DynamicCapacityPool {
                    extents: vec![Extent { size_mib: 256 }],
                },
            },
        ],
        connections: vec![
            ConnectionDef {
                parent: "hb".to_string(),
                port: 0,
                child: "rp".to_string(),
            },
            ConnectionDef {
                parent: "rp".to_string(),
                port: 0,
                child: "sw".to_string(),
            },
            ConnectionDef {
                parent: "sw".to_string(),
                port: 1,
                child: "mem".to_string(),
            },
            ConnectionDef {
                parent: "sw".to_string(),
                port: 0,
                child: "pool".to_string(),
            },
        ],
    }
}

#[test]
fn roundtrip_yaml_empty_topology() {
    let topology = TopologyDef {
        version: 1,
        name: "Empty".to_string(),
        components: vec![],
        connections: vec![],
    };

    let path = std::env::temp_dir().join("ct_project_roundtrip_empty.yaml");
    save_yaml(&path, &topology).unwrap();
    let loaded = load_yaml(&path).unwrap();

    assert_eq!(topology, loaded);
}

#[test]
fn roundtrip_yaml_switched_topology() {
    let topology = topology();

    let path = std::env::temp_dir().join("ct_project_roundtrip_switched.yaml");
    save_yaml(&path, &topology).unwrap();
    let loaded = load_yaml(&path).unwrap();

    assert_eq!(topology, loaded);
}

#[test]
fn roundtrip_json_switched_topology() {
    let topology = topology();

    let path = std::env::temp_dir().join("ct_project_roundtrip_switched.json");
    save_json(&path, &topology).unwrap();
    let loaded = load_json(&path).unwrap();

    assert_eq!(topology, loaded);
}

#[test]
fn model_export_matches_file() {
    let topology = topology();
    let loaded = build_model(&topology).unwrap();
    let exported = export(&topology.name, &loaded.model.snapshot(), &loaded.names);

    assert_eq!(topology, exported);
}
