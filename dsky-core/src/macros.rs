use heapless::String;

use crate::consts::{MACRO_NAME_LEN, NUM_MACROS};
use crate::patch::SnapshotPatch;
use crate::utils::truncate;

/// A named panel preset bound to one of the F1..F5 keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionKeyMacro {
    pub name: String<MACRO_NAME_LEN>,
    pub patch: SnapshotPatch,
}

impl FunctionKeyMacro {
    pub fn new(name: &str, patch: SnapshotPatch) -> Self {
        FunctionKeyMacro {
            name: truncate(name),
            patch,
        }
    }
}

///
/// Read-only view of the function key macros. The state machine only ever
/// looks macros up; editing and persisting them belongs to the host.
///
pub trait MacroStore {
    fn lookup(&self, slot: usize) -> Option<&FunctionKeyMacro>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MacroSet {
    slots: [Option<FunctionKeyMacro>; NUM_MACROS],
}

impl MacroSet {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Presets shipped with the panel.
    pub fn defaults() -> Self {
        let mut set = Self::empty();
        set.set(0, FunctionKeyMacro::new("Lamp Check", SnapshotPatch::new().verb("35").noun("00")));
        set.set(1, FunctionKeyMacro::new("P11 Select", SnapshotPatch::new().verb("37").noun("11")));
        set.set(2, FunctionKeyMacro::new("P63 Select", SnapshotPatch::new().verb("37").noun("63")));
        set.set(3, FunctionKeyMacro::new("Clock Sync", SnapshotPatch::new().verb("16").noun("36")));
        set.set(4, FunctionKeyMacro::new("Diagnostic ED", SnapshotPatch::new().prog("ED").noun("01")));
        set
    }

    /// Stores `m` into `slot`. Returns `false` when the slot does not exist.
    pub fn set(&mut self, slot: usize, m: FunctionKeyMacro) -> bool {
        match self.slots.get_mut(slot) {
            Some(s) => {
                *s = Some(m);
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self, slot: usize) {
        if let Some(s) = self.slots.get_mut(slot) {
            *s = None;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &FunctionKeyMacro)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_ref().map(|m| (i, m)))
    }

    /// Slot index for a key name such as `"F3"`.
    pub fn slot_from_name(name: &str) -> Option<usize> {
        let n = name.strip_prefix('F')?.parse::<usize>().ok()?;
        if (1..=NUM_MACROS).contains(&n) {
            Some(n - 1)
        } else {
            None
        }
    }
}

impl MacroStore for MacroSet {
    fn lookup(&self, slot: usize) -> Option<&FunctionKeyMacro> {
        self.slots.get(slot).and_then(|s| s.as_ref())
    }
}
