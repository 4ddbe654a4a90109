//! Synthesis settings.

use serde::{Deserialize, Serialize};

/// Knobs for the emitted command line. Every field has a default, so an
/// empty config file is valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthConfig {
    /// Platform bus the host bridges attach to.
    pub host_bus: String,
    /// Bus number of the first host bridge without an explicit `bus_nr`.
    pub first_bus_nr: u32,
    /// Bus numbers reserved per host bridge.
    pub bus_nr_stride: u32,
    pub chassis: u32,
    /// First slot handed to root ports and switch downstream ports.
    pub first_slot: u32,
    /// Directory for file-backed (persistent and label storage) memory.
    pub backing_dir: String,
    /// When set, one fixed memory window of this size (e.g. "4G") per host bridge.
    pub fixed_window_size: Option<String>,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            host_bus: "pcie.0".to_string(),
            first_bus_nr: 12,
            bus_nr_stride: 8,
            chassis: 0,
            first_slot: 0,
            backing_dir: "/tmp".to_string(),
            fixed_window_size: None,
        }
    }
}

impl SynthConfig {
    /// Bus number for the host bridge with the given ordinal, if it is still
    /// a valid PCI bus number (0..=255).
    pub fn bus_nr(&self, ordinal: u32) -> Option<u8> {
        let nr = ordinal
            .checked_mul(self.bus_nr_stride)?
            .checked_add(self.first_bus_nr)?;
        u8::try_from(nr).ok()
    }

    /// Path of a file-backed memory object.
    pub fn backing_path(&self, object_id: &str) -> String {
        format!("{}/{object_id}.raw", self.backing_dir.trim_end_matches('/'))
    }
}
