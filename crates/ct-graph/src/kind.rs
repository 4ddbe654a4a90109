//! Component kinds and the connectivity grammar between them.

use core::fmt;
use serde::{Deserialize, Serialize};

/// Kind of a topology component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ComponentKind {
    HostBridge,
    RootPort,
    Switch,
    Type2Device,
    Type3Device,
    MemoryWindow,
    DynamicCapacityPool,
}

impl ComponentKind {
    pub const ALL: [ComponentKind; 7] = [
        ComponentKind::HostBridge,
        ComponentKind::RootPort,
        ComponentKind::Switch,
        ComponentKind::Type2Device,
        ComponentKind::Type3Device,
        ComponentKind::MemoryWindow,
        ComponentKind::DynamicCapacityPool,
    ];

    /// Stable kebab-case name, matching the serialized form.
    pub fn as_str(self) -> &'static str {
        match self {
            ComponentKind::HostBridge => "host-bridge",
            ComponentKind::RootPort => "root-port",
            ComponentKind::Switch => "switch",
            ComponentKind::Type2Device => "type2-device",
            ComponentKind::Type3Device => "type3-device",
            ComponentKind::MemoryWindow => "memory-window",
            ComponentKind::DynamicCapacityPool => "dynamic-capacity-pool",
        }
    }

    /// Whether this kind has an upstream port.
    pub fn has_upstream(self) -> bool {
        !matches!(self, ComponentKind::HostBridge)
    }

    /// Whether this kind is a leaf (no downstream ports).
    pub fn is_leaf(self) -> bool {
        !matches!(
            self,
            ComponentKind::HostBridge | ComponentKind::RootPort | ComponentKind::Switch
        )
    }

    /// Adjacency table: may a component of kind `self` be the parent of `child`?
    ///
    /// host-bridge -> root-port;
    /// root-port, switch -> switch, devices, memory windows, capacity pools.
    pub fn can_parent(self, child: ComponentKind) -> bool {
        use ComponentKind::*;
        match self {
            HostBridge => child == RootPort,
            RootPort | Switch => matches!(
                child,
                Switch | Type2Device | Type3Device | MemoryWindow | DynamicCapacityPool
            ),
            Type2Device | Type3Device | MemoryWindow | DynamicCapacityPool => false,
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_bridge_only_parents_root_ports() {
        for child in ComponentKind::ALL {
            assert_eq!(
                ComponentKind::HostBridge.can_parent(child),
                child == ComponentKind::RootPort
            );
        }
    }

    #[test]
    fn leaves_parent_nothing() {
        for parent in ComponentKind::ALL.into_iter().filter(|k| k.is_leaf()) {
            for child in ComponentKind::ALL {
                assert!(!parent.can_parent(child), "{parent} -> {child}");
            }
        }
    }

    #[test]
    fn nothing_parents_host_bridge_or_root_port_below_bridge() {
        for parent in ComponentKind::ALL {
            assert!(!parent.can_parent(ComponentKind::HostBridge));
        }
        assert!(!ComponentKind::Switch.can_parent(ComponentKind::RootPort));
        assert!(ComponentKind::Switch.can_parent(ComponentKind::Switch));
    }

    #[test]
    fn serialized_names_match_as_str() {
        for kind in ComponentKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }
    }
}
