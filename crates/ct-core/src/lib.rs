//! ct-core: stable foundation for the CXL topology compiler.
//!
//! Contains:
//! - ids (stable compact IDs for components, ports and connections)
//! - error (shared error types)

pub mod error;
pub mod ids;

// Re-exports: nice ergonomics for downstream crates
pub use error::{CtError, CtResult};
pub use ids::*;
