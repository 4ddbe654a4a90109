//! ct-graph: graph/model layer for the CXL topology compiler.
//!
//! Provides:
//! - Component kinds, tagged property variants and the port layout per kind
//! - The mutable editing model (`GraphModel`) with its mutation/query API
//! - Immutable snapshots consumed by the validation and synthesis passes
//! - Stable indexing from sparse ids to dense pass indices
//!
//! # Example
//!
//! ```
//! use ct_graph::{BackingMemory, ComponentProps, GraphModel};
//!
//! let mut model = GraphModel::new();
//! let hb = model.add_component(ComponentProps::host_bridge(1)).unwrap();
//! let rp = model.add_component(ComponentProps::RootPort).unwrap();
//! let mw = model
//!     .add_component(ComponentProps::MemoryWindow {
//!         backing: BackingMemory::Volatile { size_mib: 256 },
//!     })
//!     .unwrap();
//!
//! model.connect(model.downstream_ports(hb)[0], model.upstream_port(rp).unwrap()).unwrap();
//! model.connect(model.downstream_ports(rp)[0], model.upstream_port(mw).unwrap()).unwrap();
//!
//! let snapshot = model.snapshot();
//! assert_eq!(snapshot.components().len(), 3);
//! assert_eq!(snapshot.parent_of(mw), Some(rp));
//! ```

pub mod error;
pub mod graph;
pub mod indexing;
pub mod kind;
pub mod model;
pub mod props;
pub(crate) mod validate;

// Re-exports for ergonomics
pub use error::{GraphError, GraphResult};
pub use graph::{Component, Connection, Port, PortRole, Snapshot};
pub use indexing::IndexMap;
pub use kind::ComponentKind;
pub use model::GraphModel;
pub use props::{BackingMemory, ComponentProps, Extent, MemoryType};
