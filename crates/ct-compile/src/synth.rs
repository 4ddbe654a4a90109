//! Command synthesis.
//!
//! Walks the sequenced components and emits emulator argument fragments,
//! naming each component and resolving its bus reference through the name
//! already given to its parent.

use std::collections::{HashMap, HashSet};

use ct_core::CompId;
use ct_graph::{BackingMemory, Component, ComponentKind, ComponentProps, MemoryType, Snapshot};
use tracing::debug;

use crate::config::SynthConfig;
use crate::error::{SynthError, SynthResult};
use crate::fragment::{CommandLine, Fragment};
use crate::validate::check_completeness;

/// Name prefix of the external identifier for each kind.
pub fn id_prefix(kind: ComponentKind) -> &'static str {
    match kind {
        ComponentKind::HostBridge => "hb",
        ComponentKind::RootPort => "rp",
        ComponentKind::Switch => "sw",
        ComponentKind::Type2Device => "t2d",
        ComponentKind::Type3Device => "t3d",
        ComponentKind::MemoryWindow => "mw",
        ComponentKind::DynamicCapacityPool => "dcd",
    }
}

/// Identifier of a switch's downstream port device.
pub fn downstream_port_id(switch: &str, slot: u8) -> String {
    format!("{switch}.dsp{slot}")
}

/// External identifiers the synthesizer gives each component of `order`.
///
/// Lets an editor label components with the names used in the command line.
pub fn external_ids(order: &[CompId], snapshot: &Snapshot) -> Vec<(CompId, String)> {
    let mut ordinals = HashMap::new();
    order
        .iter()
        .filter_map(|&id| snapshot.component(id))
        .map(|comp| {
            let n = next_ordinal(&mut ordinals, comp.kind());
            (comp.id, format!("{}{n}", id_prefix(comp.kind())))
        })
        .collect()
}

/// Emit the command line for `order` (normally the output of `sequence`).
///
/// Fails without output when any component is unattached, when `order`
/// names an unknown component, or when a component precedes its parent.
pub fn synthesize(
    order: &[CompId],
    snapshot: &Snapshot,
    config: &SynthConfig,
) -> SynthResult<CommandLine> {
    let missing = check_completeness(snapshot);
    if !missing.is_empty() {
        return Err(SynthError::Incomplete(missing));
    }

    let mut emitter = Emitter::new(snapshot, config);
    for &comp in order {
        emitter.emit(comp)?;
    }
    let cmd = emitter.finish();
    debug!(fragments = cmd.len(), "synthesized command line");
    Ok(cmd)
}

struct Emitter<'a> {
    snapshot: &'a Snapshot,
    config: &'a SynthConfig,
    names: HashMap<CompId, String>,
    ordinals: HashMap<ComponentKind, u32>,
    backing_ordinals: HashMap<MemoryType, u32>,
    next_slot: u32,
    host_bridges: Vec<String>,
    /// Bus numbers set explicitly on host bridges; derived numbers avoid them.
    explicit_buses: HashSet<u8>,
    claimed_buses: HashSet<u8>,
    out: CommandLine,
}

impl<'a> Emitter<'a> {
    fn new(snapshot: &'a Snapshot, config: &'a SynthConfig) -> Self {
        Self {
            snapshot,
            config,
            names: HashMap::new(),
            ordinals: HashMap::new(),
            backing_ordinals: HashMap::new(),
            next_slot: config.first_slot,
            host_bridges: Vec::new(),
            explicit_buses: snapshot
                .components()
                .iter()
                .filter_map(|c| match c.props {
                    ComponentProps::HostBridge {
                        bus_nr: Some(nr), ..
                    } => Some(nr),
                    _ => None,
                })
                .collect(),
            claimed_buses: HashSet::new(),
            out: CommandLine::default(),
        }
    }

    fn emit(&mut self, id: CompId) -> SynthResult<()> {
        let snapshot = self.snapshot;
        let comp = snapshot
            .component(id)
            .ok_or(SynthError::UnknownComponent { comp: id })?;
        if self.names.contains_key(&id) {
            return Ok(());
        }

        let ordinal = next_ordinal(&mut self.ordinals, comp.kind());
        let name = format!("{}{ordinal}", id_prefix(comp.kind()));

        match &comp.props {
            ComponentProps::HostBridge { bus_nr, .. } => {
                let bus_nr = self.host_bus_nr(id, *bus_nr, ordinal)?;
                self.out.push(
                    Fragment::device("pxb-cxl")
                        .arg("bus_nr", bus_nr)
                        .arg("bus", &self.config.host_bus)
                        .arg("id", &name),
                );
                self.host_bridges.push(name.clone());
            }
            ComponentProps::RootPort => {
                let (bus, port) = self.parent_ref(comp)?;
                let slot = self.take_slot();
                self.out.push(
                    Fragment::device("cxl-rp")
                        .arg("port", port)
                        .arg("bus", bus)
                        .arg("id", &name)
                        .arg("chassis", self.config.chassis)
                        .arg("slot", slot),
                );
            }
            ComponentProps::Switch { .. } => {
                let (bus, _) = self.parent_ref(comp)?;
                self.out
                    .push(Fragment::device("cxl-upstream").arg("bus", bus).arg("id", &name));
                for &port_id in &comp.downstream {
                    if snapshot.connections_at(port_id).is_empty() {
                        continue;
                    }
                    let Some(port) = snapshot.port(port_id) else {
                        continue;
                    };
                    let slot = self.take_slot();
                    self.out.push(
                        Fragment::device("cxl-downstream")
                            .arg("port", port.slot)
                            .arg("bus", &name)
                            .arg("id", downstream_port_id(&name, port.slot))
                            .arg("chassis", self.config.chassis)
                            .arg("slot", slot),
                    );
                }
            }
            ComponentProps::Type2Device { memory } => {
                self.memory_device("cxl-type2", comp, &name, memory)?;
            }
            ComponentProps::Type3Device { memory } => {
                self.memory_device("cxl-type3", comp, &name, memory)?;
            }
            ComponentProps::MemoryWindow { backing } => {
                self.memory_device("cxl-type3", comp, &name, std::slice::from_ref(backing))?;
            }
            ComponentProps::DynamicCapacityPool { extents } => {
                let backing = BackingMemory::DynamicCapacity {
                    extents: extents.clone(),
                };
                self.memory_device("cxl-type3", comp, &name, &[backing])?;
            }
        }

        self.names.insert(id, name);
        Ok(())
    }

    /// Backing objects first, then the device that binds them.
    fn memory_device(
        &mut self,
        model: &str,
        comp: &Component,
        name: &str,
        memory: &[BackingMemory],
    ) -> SynthResult<()> {
        let (bus, _) = self.parent_ref(comp)?;
        let mut device = Fragment::device(model).arg("bus", bus);

        for backing in memory {
            let n = next_ordinal(&mut self.backing_ordinals, backing.memory_type());
            match backing {
                BackingMemory::Volatile { size_mib } => {
                    let id = format!("vmem{n}");
                    self.out.push(ram_object(&id, *size_mib));
                    device = device.arg("volatile-memdev", id);
                }
                BackingMemory::Persistent {
                    size_mib,
                    lsa_size_mib,
                } => {
                    let pmem = format!("pmem{n}");
                    let lsa = format!("lsa{n}");
                    let objects = [
                        self.file_object(&pmem, *size_mib),
                        self.file_object(&lsa, *lsa_size_mib),
                    ];
                    self.out.fragments.extend(objects);
                    device = device.arg("persistent-memdev", pmem).arg("lsa", lsa);
                }
                BackingMemory::DynamicCapacity { extents } => {
                    let id = format!("dcmem{n}");
                    self.out.push(ram_object(&id, backing.size_mib()));
                    device = device
                        .arg("volatile-dc-memdev", id)
                        .arg("num-dc-regions", extents.len());
                }
            }
        }

        self.out.push(device.arg("id", name));
        Ok(())
    }

    /// Bus reference and parent port slot for a child component.
    fn parent_ref(&self, comp: &Component) -> SynthResult<(String, u8)> {
        let unresolved = SynthError::UnresolvedParent { comp: comp.id };
        let snapshot = self.snapshot;

        let conn = snapshot
            .parent_connections(comp.id)
            .into_iter()
            .next()
            .ok_or_else(|| unresolved.clone())?;
        let port = snapshot
            .port(conn.parent_port)
            .ok_or_else(|| unresolved.clone())?;
        let parent = snapshot
            .component(port.comp)
            .ok_or_else(|| unresolved.clone())?;
        let parent_name = self.names.get(&parent.id).ok_or(unresolved)?;

        let bus = if parent.kind() == ComponentKind::Switch {
            downstream_port_id(parent_name, port.slot)
        } else {
            parent_name.clone()
        };
        Ok((bus, port.slot))
    }

    /// Explicit or derived bus number of a host bridge, unique across the
    /// command line and within the PCI range.
    fn host_bus_nr(
        &mut self,
        comp: CompId,
        explicit: Option<u8>,
        ordinal: u32,
    ) -> SynthResult<u8> {
        let nr = match explicit {
            Some(nr) => nr,
            None => {
                let nr = self.config.bus_nr(ordinal).ok_or_else(|| SynthError::BusNumber {
                    comp,
                    reason: format!("derived bus number for host bridge {ordinal} exceeds 255"),
                })?;
                if self.explicit_buses.contains(&nr) {
                    return Err(SynthError::BusNumber {
                        comp,
                        reason: format!("bus {nr} is set explicitly on another host bridge"),
                    });
                }
                nr
            }
        };
        if !self.claimed_buses.insert(nr) {
            return Err(SynthError::BusNumber {
                comp,
                reason: format!("bus {nr} is already used"),
            });
        }
        Ok(nr)
    }

    fn take_slot(&mut self) -> u32 {
        let slot = self.next_slot;
        self.next_slot += 1;
        slot
    }

    fn file_object(&self, id: &str, size_mib: u64) -> Fragment {
        Fragment::object("memory-backend-file")
            .arg("id", id)
            .arg("share", "on")
            .arg("mem-path", self.config.backing_path(id))
            .arg("size", format!("{size_mib}M"))
    }

    fn finish(mut self) -> CommandLine {
        if let Some(size) = &self.config.fixed_window_size {
            for (j, hb) in self.host_bridges.iter().enumerate() {
                self.out.push(
                    Fragment::machine()
                        .arg(format!("cxl-fmw.{j}.targets.0"), hb)
                        .arg(format!("cxl-fmw.{j}.size"), size),
                );
            }
        }
        self.out
    }
}

fn ram_object(id: &str, size_mib: u64) -> Fragment {
    Fragment::object("memory-backend-ram")
        .arg("id", id)
        .arg("share", "on")
        .arg("size", format!("{size_mib}M"))
}

fn next_ordinal<K: std::hash::Hash + Eq>(counters: &mut HashMap<K, u32>, key: K) -> u32 {
    let counter = counters.entry(key).or_insert(0);
    let n = *counter;
    *counter += 1;
    n
}
