//! Conversion between topology files and the graph model.

use std::collections::{HashMap, HashSet};

use ct_core::CompId;
use ct_graph::{GraphModel, Snapshot};
use tracing::debug;

use crate::ProjectResult;
use crate::schema::{ComponentDef, ConnectionDef, TopologyDef};
use crate::validate::{ValidationError, validate_topology};

/// A model built from a topology file, with the file's component names.
#[derive(Debug, Clone)]
pub struct LoadedTopology {
    pub name: String,
    pub model: GraphModel,
    /// File names in file order.
    pub names: Vec<(String, CompId)>,
}

impl LoadedTopology {
    pub fn id_of(&self, name: &str) -> Option<CompId> {
        self.names.iter().find(|(n, _)| n == name).map(|&(_, id)| id)
    }

    pub fn name_of(&self, id: CompId) -> Option<&str> {
        self.names
            .iter()
            .find(|&&(_, c)| c == id)
            .map(|(n, _)| n.as_str())
    }
}

/// Replay a topology file against a fresh model: components in file order,
/// then connections in file order.
///
/// Connections the model refuses (occupied ports, cycles, role errors) fail
/// the load. Grammar violations the model accepts are left for the validator.
pub fn build_model(def: &TopologyDef) -> ProjectResult<LoadedTopology> {
    validate_topology(def)?;

    let mut model = GraphModel::new();
    let mut ids = HashMap::with_capacity(def.components.len());
    let mut names = Vec::with_capacity(def.components.len());
    for comp in &def.components {
        let id = model.add_component(comp.props.clone())?;
        ids.insert(comp.id.as_str(), id);
        names.push((comp.id.clone(), id));
    }

    for (i, conn) in def.connections.iter().enumerate() {
        let missing = |id: &str| ValidationError::MissingReference {
            id: id.to_string(),
            context: format!("connection {i}"),
        };
        let parent = *ids
            .get(conn.parent.as_str())
            .ok_or_else(|| missing(&conn.parent))?;
        let child = *ids
            .get(conn.child.as_str())
            .ok_or_else(|| missing(&conn.child))?;

        let invalid = |field: &str, value: String, reason: &str| ValidationError::InvalidValue {
            field: format!("connection {i} {field}"),
            value,
            reason: reason.to_string(),
        };
        let down = *model
            .downstream_ports(parent)
            .get(conn.port as usize)
            .ok_or_else(|| invalid("port", conn.port.to_string(), "no such downstream port"))?;
        let up = model.upstream_port(child).ok_or_else(|| {
            invalid("child", conn.child.clone(), "component has no upstream port")
        })?;
        model.connect(down, up)?;
    }

    debug!(
        name = %def.name,
        components = def.components.len(),
        connections = def.connections.len(),
        "built topology"
    );
    Ok(LoadedTopology {
        name: def.name.clone(),
        model,
        names,
    })
}

/// Write a snapshot back out as a topology file.
///
/// Components without an entry in `names` are named `c<id>`, with a `-<n>`
/// suffix when that name is already taken. Connections are written in id
/// order, which is creation order.
pub fn export(name: &str, snapshot: &Snapshot, names: &[(String, CompId)]) -> TopologyDef {
    let mut assigned: HashMap<CompId, String> = names
        .iter()
        .filter(|(_, id)| snapshot.component(*id).is_some())
        .map(|(n, id)| (*id, n.clone()))
        .collect();
    let mut taken: HashSet<String> = assigned.values().cloned().collect();
    for comp in snapshot.components() {
        if assigned.contains_key(&comp.id) {
            continue;
        }
        let base = format!("c{}", comp.id);
        let mut candidate = base.clone();
        let mut n = 1;
        while taken.contains(&candidate) {
            candidate = format!("{base}-{n}");
            n += 1;
        }
        taken.insert(candidate.clone());
        assigned.insert(comp.id, candidate);
    }
    let name_of = |id: CompId| assigned.get(&id).cloned().unwrap_or_default();

    let components = snapshot
        .components()
        .iter()
        .map(|c| ComponentDef {
            id: name_of(c.id),
            props: c.props.clone(),
        })
        .collect();

    let connections = snapshot
        .connections()
        .iter()
        .filter_map(|conn| {
            let parent = snapshot.port(conn.parent_port)?;
            let child = snapshot.port(conn.child_port)?;
            Some(ConnectionDef {
                parent: name_of(parent.comp),
                port: parent.slot,
                child: name_of(child.comp),
            })
        })
        .collect();

    TopologyDef {
        version: crate::LATEST_VERSION,
        name: name.to_string(),
        components,
        connections,
    }
}
