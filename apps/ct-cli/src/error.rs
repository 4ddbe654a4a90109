//! Error type for the command line front end.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("Project error: {0}")]
    Project(#[from] ct_project::ProjectError),

    #[error("Compile failed: {0}")]
    Synth(#[from] ct_compile::SynthError),

    #[error("Failed to write output file: {path}")]
    OutputWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Topology has {count} violation(s)")]
    Violations { count: usize },
}

pub type CliResult<T> = Result<T, CliError>;
