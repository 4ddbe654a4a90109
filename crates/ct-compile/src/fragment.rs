//! Command-line fragments.
//!
//! A fragment is one emulator option: a marker (`-device`, `-object`, `-M`)
//! followed by a comma-separated token list, `driver,key=value,...`.

use core::fmt;

/// Option flag that introduces a fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Device,
    Object,
    Machine,
}

impl Marker {
    pub fn as_str(self) -> &'static str {
        match self {
            Marker::Device => "-device",
            Marker::Object => "-object",
            Marker::Machine => "-M",
        }
    }
}

/// One option with its ordered key/value list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub marker: Marker,
    /// Leading bare token (device model or backend type).
    pub driver: Option<String>,
    pub args: Vec<(String, String)>,
}

impl Fragment {
    pub fn device(driver: &str) -> Self {
        Self::new(Marker::Device, Some(driver))
    }

    pub fn object(driver: &str) -> Self {
        Self::new(Marker::Object, Some(driver))
    }

    pub fn machine() -> Self {
        Self::new(Marker::Machine, None)
    }

    fn new(marker: Marker, driver: Option<&str>) -> Self {
        Self {
            marker,
            driver: driver.map(str::to_string),
            args: Vec::new(),
        }
    }

    /// Append `key=value`.
    pub fn arg(mut self, key: impl Into<String>, value: impl fmt::Display) -> Self {
        self.args.push((key.into(), value.to_string()));
        self
    }

    /// Value of the first `key`, if present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.args
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// The token list after the marker.
    pub fn value(&self) -> String {
        let pairs = self.args.iter().map(|(k, v)| format!("{k}={v}"));
        self.driver
            .iter()
            .cloned()
            .chain(pairs)
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl fmt::Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.marker.as_str(), self.value())
    }
}

/// The synthesized command line: fragments in emission order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandLine {
    pub fragments: Vec<Fragment>,
}

impl CommandLine {
    pub fn push(&mut self, fragment: Fragment) {
        self.fragments.push(fragment);
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Argument vector form, suitable for spawning the emulator directly.
    pub fn to_args(&self) -> Vec<String> {
        self.fragments
            .iter()
            .flat_map(|f| [f.marker.as_str().to_string(), f.value()])
            .collect()
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, fragment) in self.fragments.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{fragment}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fragment_formats_driver_then_pairs() {
        let f = Fragment::device("cxl-rp").arg("port", 0).arg("bus", "hb0");
        assert_eq!(f.to_string(), "-device cxl-rp,port=0,bus=hb0");
        assert_eq!(f.get("bus"), Some("hb0"));
        assert_eq!(f.get("slot"), None);
    }

    #[test]
    fn machine_fragment_has_no_driver() {
        let f = Fragment::machine().arg("cxl-fmw.0.size", "4G");
        assert_eq!(f.to_string(), "-M cxl-fmw.0.size=4G");
    }

    #[test]
    fn command_line_joins_with_spaces() {
        let mut cmd = CommandLine::default();
        cmd.push(Fragment::object("memory-backend-ram").arg("id", "vmem0"));
        cmd.push(Fragment::device("cxl-type3").arg("volatile-memdev", "vmem0"));
        assert_eq!(
            cmd.to_string(),
            "-object memory-backend-ram,id=vmem0 -device cxl-type3,volatile-memdev=vmem0"
        );
        assert_eq!(
            cmd.to_args(),
            vec![
                "-object",
                "memory-backend-ram,id=vmem0",
                "-device",
                "cxl-type3,volatile-memdev=vmem0"
            ]
        );
    }
}
