//! Topology file schema.

use ct_graph::ComponentProps;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TopologyDef {
    pub version: u32,
    pub name: String,
    #[serde(default)]
    pub components: Vec<ComponentDef>,
    #[serde(default)]
    pub connections: Vec<ConnectionDef>,
}

/// A named component; the properties sit next to the name, tagged by `kind`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ComponentDef {
    pub id: String,
    #[serde(flatten)]
    pub props: ComponentProps,
}

/// Parent downstream port `port` feeds the child's upstream port.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConnectionDef {
    pub parent: String,
    #[serde(default)]
    pub port: u8,
    pub child: String,
}
