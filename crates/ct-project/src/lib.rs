//! ct-project: topology file format, validation and loading.

pub mod load;
pub mod schema;
pub mod validate;

pub use load::{LoadedTopology, build_model, export};
pub use schema::*;
pub use validate::{ValidationError, validate_topology};

use ct_compile::SynthConfig;
use std::path::Path;

pub const LATEST_VERSION: u32 = 1;

pub type ProjectResult<T> = Result<T, ProjectError>;

#[derive(thiserror::Error, Debug)]
pub enum ProjectError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Graph error: {0}")]
    Graph(#[from] ct_graph::GraphError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn load_yaml(path: &Path) -> ProjectResult<TopologyDef> {
    let content = std::fs::read_to_string(path)?;
    let topology: TopologyDef = serde_yaml::from_str(&content)?;
    validate_topology(&topology)?;
    Ok(topology)
}

pub fn save_yaml(path: &Path, topology: &TopologyDef) -> ProjectResult<()> {
    validate_topology(topology)?;
    let content = serde_yaml::to_string(topology)?;
    std::fs::write(path, content)?;
    Ok(())
}

pub fn load_json(path: &Path) -> ProjectResult<TopologyDef> {
    let content = std::fs::read_to_string(path)?;
    let topology: TopologyDef = serde_json::from_str(&content)?;
    validate_topology(&topology)?;
    Ok(topology)
}

pub fn save_json(path: &Path, topology: &TopologyDef) -> ProjectResult<()> {
    validate_topology(topology)?;
    let content = serde_json::to_string_pretty(topology)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Load a topology by extension: `.json` as JSON, anything else as YAML.
pub fn load_any(path: &Path) -> ProjectResult<TopologyDef> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => load_json(path),
        _ => load_yaml(path),
    }
}

/// Load synthesis settings from YAML. Missing fields keep their defaults.
pub fn load_config(path: &Path) -> ProjectResult<SynthConfig> {
    let content = std::fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(SynthConfig::default());
    }
    Ok(serde_yaml::from_str(&content)?)
}
