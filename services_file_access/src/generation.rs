//! Capability generation detection
//!
//! Hosts expose file access through one of two API shapes. The generation is
//! probed once per session and then threaded through every acquisition as
//! configuration; nothing re-probes afterwards.

use core::fmt;
use serde::{Deserialize, Serialize};

/// Named entry point a host may expose
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntryPoint {
    /// Modern open dialog
    OpenFilePicker,
    /// Modern save dialog
    SaveFilePicker,
    /// Legacy unified open/save dialog
    ChooseFileSystemEntries,
}

impl EntryPoint {
    /// The name the host publishes this entry point under
    pub const fn host_name(self) -> &'static str {
        match self {
            EntryPoint::OpenFilePicker => "showOpenFilePicker",
            EntryPoint::SaveFilePicker => "showSaveFilePicker",
            EntryPoint::ChooseFileSystemEntries => "chooseFileSystemEntries",
        }
    }
}

impl fmt::Display for EntryPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.host_name())
    }
}

/// Feature probe over a host
pub trait CapabilityProbe {
    fn has_entry_point(&self, entry: EntryPoint) -> bool;
}

/// Which shape of the host file-access API is present
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CapabilityGeneration {
    Unsupported,
    Legacy,
    Modern,
}

impl CapabilityGeneration {
    pub fn is_supported(&self) -> bool {
        !matches!(self, CapabilityGeneration::Unsupported)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CapabilityGeneration::Unsupported => "unsupported",
            CapabilityGeneration::Legacy => "legacy",
            CapabilityGeneration::Modern => "modern",
        }
    }
}

impl fmt::Display for CapabilityGeneration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolves the capability generation of a host
///
/// Modern wins over legacy when a host exposes both. A host that exposes only
/// half of the modern pair cannot complete a save, so it only counts as
/// supported when the legacy entry point is there to fall back on.
pub struct CapabilityResolver;

impl CapabilityResolver {
    pub fn resolve<P: CapabilityProbe + ?Sized>(probe: &P) -> CapabilityGeneration {
        let open = probe.has_entry_point(EntryPoint::OpenFilePicker);
        let save = probe.has_entry_point(EntryPoint::SaveFilePicker);
        let legacy = probe.has_entry_point(EntryPoint::ChooseFileSystemEntries);

        let generation = if open && save {
            CapabilityGeneration::Modern
        } else if legacy {
            CapabilityGeneration::Legacy
        } else {
            CapabilityGeneration::Unsupported
        };

        tracing::debug!(open, save, legacy, %generation, "resolved file access capability");
        generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    struct Probe(BTreeSet<EntryPoint>);

    impl Probe {
        fn of(entries: &[EntryPoint]) -> Self {
            Self(entries.iter().copied().collect())
        }
    }

    impl CapabilityProbe for Probe {
        fn has_entry_point(&self, entry: EntryPoint) -> bool {
            self.0.contains(&entry)
        }
    }

    const ALL: [EntryPoint; 3] = [
        EntryPoint::OpenFilePicker,
        EntryPoint::SaveFilePicker,
        EntryPoint::ChooseFileSystemEntries,
    ];

    #[test]
    fn test_modern_takes_precedence() {
        let probe = Probe::of(&ALL);
        for _ in 0..3 {
            assert_eq!(CapabilityResolver::resolve(&probe), CapabilityGeneration::Modern);
        }
    }

    #[test]
    fn test_modern_only() {
        let probe = Probe::of(&[EntryPoint::OpenFilePicker, EntryPoint::SaveFilePicker]);
        assert_eq!(CapabilityResolver::resolve(&probe), CapabilityGeneration::Modern);
    }

    #[test]
    fn test_legacy_only() {
        let probe = Probe::of(&[EntryPoint::ChooseFileSystemEntries]);
        assert_eq!(CapabilityResolver::resolve(&probe), CapabilityGeneration::Legacy);
    }

    #[test]
    fn test_neither() {
        let probe = Probe::of(&[]);
        assert_eq!(CapabilityResolver::resolve(&probe), CapabilityGeneration::Unsupported);
        assert!(!CapabilityGeneration::Unsupported.is_supported());
    }

    #[test]
    fn test_partial_modern_falls_back() {
        let open_only = Probe::of(&[EntryPoint::OpenFilePicker]);
        assert_eq!(
            CapabilityResolver::resolve(&open_only),
            CapabilityGeneration::Unsupported
        );

        let open_and_legacy = Probe::of(&[
            EntryPoint::OpenFilePicker,
            EntryPoint::ChooseFileSystemEntries,
        ]);
        assert_eq!(
            CapabilityResolver::resolve(&open_and_legacy),
            CapabilityGeneration::Legacy
        );
    }

    proptest::proptest! {
        #[test]
        fn prop_resolution_is_a_pure_function_of_entry_points(mask in 0u8..8) {
            let entries: Vec<EntryPoint> = ALL
                .iter()
                .enumerate()
                .filter(|(bit, _)| mask & (1 << bit) != 0)
                .map(|(_, entry)| *entry)
                .collect();
            let probe = Probe::of(&entries);

            let first = CapabilityResolver::resolve(&probe);
            proptest::prop_assert_eq!(CapabilityResolver::resolve(&probe), first);

            let expected = if entries.contains(&EntryPoint::OpenFilePicker)
                && entries.contains(&EntryPoint::SaveFilePicker)
            {
                CapabilityGeneration::Modern
            } else if entries.contains(&EntryPoint::ChooseFileSystemEntries) {
                CapabilityGeneration::Legacy
            } else {
                CapabilityGeneration::Unsupported
            };
            proptest::prop_assert_eq!(first, expected);
        }
    }

    #[test]
    fn test_host_names() {
        assert_eq!(EntryPoint::OpenFilePicker.to_string(), "showOpenFilePicker");
        assert_eq!(EntryPoint::SaveFilePicker.host_name(), "showSaveFilePicker");
        assert_eq!(
            EntryPoint::ChooseFileSystemEntries.host_name(),
            "chooseFileSystemEntries"
        );
    }
}
