//! ct-compile: validation and command synthesis for CXL topologies.
//!
//! A compile pass runs three stages over one immutable snapshot:
//! 1. `validate` checks the connectivity grammar and reports violations,
//! 2. `sequence` orders components parents-first,
//! 3. `synthesize` emits the emulator argument fragments.
//!
//! `compile` runs all three and returns either the command line or the
//! complete violation list.

pub mod compile;
pub mod config;
pub mod error;
pub mod fragment;
pub mod sequence;
pub mod synth;
pub mod validate;
pub mod violation;

pub use compile::{CompileOutput, compile, compile_model};
pub use config::SynthConfig;
pub use error::{SynthError, SynthResult};
pub use fragment::{CommandLine, Fragment, Marker};
pub use sequence::sequence;
pub use synth::{external_ids, synthesize};
pub use validate::validate;
pub use violation::{ValidationMode, Violation, ViolationKind};
