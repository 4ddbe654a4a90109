//! The full compile pass: validate, sequence, synthesize.

use ct_graph::{GraphModel, Snapshot};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::SynthConfig;
use crate::error::{SynthError, SynthResult};
use crate::sequence::sequence;
use crate::synth::synthesize;
use crate::validate::validate;
use crate::violation::{ValidationMode, Violation};

/// Result of a compile pass as handed back to the editor.
///
/// Serializes as `{"command": "..."}` or `{"violations": [...]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CompileOutput {
    Command { command: String },
    Violations { violations: Vec<Violation> },
}

impl CompileOutput {
    pub fn command(&self) -> Option<&str> {
        match self {
            CompileOutput::Command { command } => Some(command),
            CompileOutput::Violations { .. } => None,
        }
    }

    /// Violations of a failed pass; empty on success.
    pub fn violations(&self) -> &[Violation] {
        match self {
            CompileOutput::Command { .. } => &[],
            CompileOutput::Violations { violations } => violations,
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, CompileOutput::Command { .. })
    }
}

/// Compile one snapshot.
///
/// Any structural or completeness violation yields the full list and no
/// command text. The error case signals a host bridge without a usable bus
/// number under `config`, or a broken internal invariant.
pub fn compile(snapshot: &Snapshot, config: &SynthConfig) -> SynthResult<CompileOutput> {
    let violations = validate(snapshot, ValidationMode::Synthesis);
    if !violations.is_empty() {
        debug!(count = violations.len(), "compile rejected");
        return Ok(CompileOutput::Violations { violations });
    }

    let order = sequence(snapshot);
    match synthesize(&order, snapshot, config) {
        Ok(cmd) => Ok(CompileOutput::Command {
            command: cmd.to_string(),
        }),
        Err(SynthError::Incomplete(violations)) => Ok(CompileOutput::Violations { violations }),
        Err(err) => Err(err),
    }
}

/// Snapshot the model and compile it.
pub fn compile_model(model: &GraphModel, config: &SynthConfig) -> SynthResult<CompileOutput> {
    compile(&model.snapshot(), config)
}
