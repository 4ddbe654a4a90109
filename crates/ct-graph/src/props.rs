//! Kind-specific component properties.
//!
//! Each `ComponentProps` variant carries exactly the properties legal for its
//! kind. Values are checked once, when a component is created or its
//! properties are replaced, so the passes never see an out-of-range size.

use core::fmt;
use serde::{Deserialize, Serialize};

use crate::error::GraphError;
use crate::kind::ComponentKind;

/// Upper bound on downstream ports of a host bridge or switch.
pub const MAX_DOWNSTREAM_PORTS: u8 = 32;

/// Downstream ports created when a file omits the count.
pub const DEFAULT_DOWNSTREAM_PORTS: u8 = 4;

/// Label storage area size for persistent memory when not given.
pub const DEFAULT_LSA_SIZE_MIB: u64 = 256;

/// Upper bound on dynamic-capacity extents (regions) per device.
pub const MAX_EXTENTS: usize = 8;

/// Memory type of a backing-memory object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MemoryType {
    Volatile,
    Persistent,
    DynamicCapacity,
}

impl MemoryType {
    pub fn as_str(self) -> &'static str {
        match self {
            MemoryType::Volatile => "volatile",
            MemoryType::Persistent => "persistent",
            MemoryType::DynamicCapacity => "dynamic-capacity",
        }
    }
}

impl fmt::Display for MemoryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One dynamic-capacity extent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extent {
    pub size_mib: u64,
}

/// Backing memory bound to a device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum BackingMemory {
    Volatile {
        size_mib: u64,
    },
    Persistent {
        size_mib: u64,
        #[serde(default = "default_lsa_size_mib")]
        lsa_size_mib: u64,
    },
    DynamicCapacity {
        extents: Vec<Extent>,
    },
}

fn default_lsa_size_mib() -> u64 {
    DEFAULT_LSA_SIZE_MIB
}

fn default_downstream_ports() -> u8 {
    DEFAULT_DOWNSTREAM_PORTS
}

impl BackingMemory {
    pub fn memory_type(&self) -> MemoryType {
        match self {
            BackingMemory::Volatile { .. } => MemoryType::Volatile,
            BackingMemory::Persistent { .. } => MemoryType::Persistent,
            BackingMemory::DynamicCapacity { .. } => MemoryType::DynamicCapacity,
        }
    }

    /// Total capacity in MiB (sum of extents for dynamic capacity).
    pub fn size_mib(&self) -> u64 {
        match self {
            BackingMemory::Volatile { size_mib } | BackingMemory::Persistent { size_mib, .. } => {
                *size_mib
            }
            BackingMemory::DynamicCapacity { extents } => extents
                .iter()
                .fold(0_u64, |total, e| total.saturating_add(e.size_mib)),
        }
    }

    fn check(&self) -> Result<(), String> {
        match self {
            BackingMemory::Volatile { size_mib } => check_size("size_mib", *size_mib),
            BackingMemory::Persistent {
                size_mib,
                lsa_size_mib,
            } => {
                check_size("size_mib", *size_mib)?;
                check_size("lsa_size_mib", *lsa_size_mib)
            }
            BackingMemory::DynamicCapacity { extents } => check_extents(extents),
        }
    }
}

/// Component properties, one variant per kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ComponentProps {
    HostBridge {
        #[serde(default = "default_downstream_ports")]
        downstream_ports: u8,
        /// Explicit PCI bus number; derived from the bridge ordinal when absent.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        bus_nr: Option<u8>,
    },
    RootPort,
    Switch {
        #[serde(default = "default_downstream_ports")]
        downstream_ports: u8,
    },
    Type2Device {
        memory: Vec<BackingMemory>,
    },
    Type3Device {
        memory: Vec<BackingMemory>,
    },
    MemoryWindow {
        backing: BackingMemory,
    },
    DynamicCapacityPool {
        extents: Vec<Extent>,
    },
}

impl ComponentProps {
    /// Host bridge with `downstream_ports` root-port slots and a derived bus number.
    pub fn host_bridge(downstream_ports: u8) -> Self {
        ComponentProps::HostBridge {
            downstream_ports,
            bus_nr: None,
        }
    }

    pub fn switch(downstream_ports: u8) -> Self {
        ComponentProps::Switch { downstream_ports }
    }

    /// Type-3 memory expander with a single volatile region.
    pub fn volatile_type3(size_mib: u64) -> Self {
        ComponentProps::Type3Device {
            memory: vec![BackingMemory::Volatile { size_mib }],
        }
    }

    pub fn kind(&self) -> ComponentKind {
        match self {
            ComponentProps::HostBridge { .. } => ComponentKind::HostBridge,
            ComponentProps::RootPort => ComponentKind::RootPort,
            ComponentProps::Switch { .. } => ComponentKind::Switch,
            ComponentProps::Type2Device { .. } => ComponentKind::Type2Device,
            ComponentProps::Type3Device { .. } => ComponentKind::Type3Device,
            ComponentProps::MemoryWindow { .. } => ComponentKind::MemoryWindow,
            ComponentProps::DynamicCapacityPool { .. } => ComponentKind::DynamicCapacityPool,
        }
    }

    /// Port counts as `(upstream, downstream)`.
    pub fn port_layout(&self) -> (usize, usize) {
        match self {
            ComponentProps::HostBridge {
                downstream_ports, ..
            } => (0, *downstream_ports as usize),
            ComponentProps::RootPort => (1, 1),
            ComponentProps::Switch { downstream_ports } => (1, *downstream_ports as usize),
            _ => (1, 0),
        }
    }

    /// Check the property values for this kind.
    pub fn validate(&self) -> Result<(), GraphError> {
        self.check().map_err(|reason| GraphError::InvalidProperty {
            kind: self.kind(),
            reason,
        })
    }

    fn check(&self) -> Result<(), String> {
        match self {
            ComponentProps::HostBridge {
                downstream_ports, ..
            }
            | ComponentProps::Switch { downstream_ports } => {
                if *downstream_ports == 0 || *downstream_ports > MAX_DOWNSTREAM_PORTS {
                    return Err(format!(
                        "downstream_ports must be in 1..={MAX_DOWNSTREAM_PORTS}, got {downstream_ports}"
                    ));
                }
                Ok(())
            }
            ComponentProps::RootPort => Ok(()),
            ComponentProps::Type2Device { memory } | ComponentProps::Type3Device { memory } => {
                if memory.is_empty() {
                    return Err("a device needs at least one backing memory".to_string());
                }
                let mut seen = Vec::with_capacity(memory.len());
                for backing in memory {
                    let ty = backing.memory_type();
                    if seen.contains(&ty) {
                        return Err(format!("duplicate {ty} backing memory"));
                    }
                    seen.push(ty);
                    backing.check()?;
                }
                Ok(())
            }
            ComponentProps::MemoryWindow { backing } => backing.check(),
            ComponentProps::DynamicCapacityPool { extents } => check_extents(extents),
        }
    }
}

fn check_size(field: &str, size_mib: u64) -> Result<(), String> {
    if size_mib == 0 {
        return Err(format!("{field} must be positive"));
    }
    Ok(())
}

fn check_extents(extents: &[Extent]) -> Result<(), String> {
    if extents.is_empty() || extents.len() > MAX_EXTENTS {
        return Err(format!(
            "dynamic capacity needs 1..={MAX_EXTENTS} extents, got {}",
            extents.len()
        ));
    }
    let mut total = 0_u64;
    for extent in extents {
        check_size("extent size_mib", extent.size_mib)?;
        total = total
            .checked_add(extent.size_mib)
            .ok_or_else(|| "total extent size overflows".to_string())?;
    }
    Ok(())
}
