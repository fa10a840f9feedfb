use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use log::info;
use serde::{Deserialize, Serialize};

use dsky_core::consts::{CODE_WIDTH, NUM_LAMPS, REGISTER_WIDTH};
use dsky_core::state::{Code, Register};
use dsky_core::{FunctionKeyMacro, MacroSet, Reg, Sign, SnapshotPatch, StatusPanel};

use crate::error::{PeriphError, Result};

/*
 * On-disk form of a macro patch. Values are written the way they are keyed
 * in and padded on load; `status` lists the lamp ids to light on an
 * otherwise dark panel.
 */
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct PatchFile {
    #[serde(skip_serializing_if = "Option::is_none")]
    verb: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    noun: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    prog: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    r1: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    r2: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    r3: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    r1_sign: Option<Sign>,
    #[serde(skip_serializing_if = "Option::is_none")]
    r2_sign: Option<Sign>,
    #[serde(skip_serializing_if = "Option::is_none")]
    r3_sign: Option<Sign>,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<Vec<usize>>,
}

#[derive(Debug, Serialize, Deserialize)]
struct MacroEntry {
    name: String,
    #[serde(default)]
    patch: PatchFile,
}

fn invalid(slot: &str, reason: String) -> PeriphError {
    PeriphError::InvalidMacro {
        slot: slot.to_string(),
        reason,
    }
}

fn check_digits(slot: &str, field: &str, value: &str, width: usize) -> Result<()> {
    if value.len() > width || !value.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid(
            slot,
            format!("{} must be up to {} digits, got {:?}", field, width, value),
        ));
    }
    Ok(())
}

impl PatchFile {
    fn to_patch(&self, slot: &str) -> Result<SnapshotPatch> {
        let mut patch = SnapshotPatch::new();

        for (field, value) in [("verb", &self.verb), ("noun", &self.noun), ("prog", &self.prog)] {
            if let Some(v) = value {
                check_digits(slot, field, v, CODE_WIDTH)?;
                let v = v.to_ascii_uppercase();
                patch = match field {
                    "verb" => patch.verb(&v),
                    "noun" => patch.noun(&v),
                    _ => patch.prog(&v),
                };
            }
        }

        let registers = [(Reg::R1, &self.r1), (Reg::R2, &self.r2), (Reg::R3, &self.r3)];
        for (reg, value) in registers {
            if let Some(v) = value {
                check_digits(slot, reg.name(), v, REGISTER_WIDTH)?;
                patch = patch.register(reg, &v.to_ascii_uppercase());
            }
        }

        let signs = [(Reg::R1, self.r1_sign), (Reg::R2, self.r2_sign), (Reg::R3, self.r3_sign)];
        for (reg, sign) in signs {
            if let Some(s) = sign {
                patch = patch.sign(reg, s);
            }
        }

        if let Some(ids) = &self.status {
            if let Some(bad) = ids.iter().find(|id| **id >= NUM_LAMPS) {
                return Err(invalid(slot, format!("no lamp with id {}", bad)));
            }
            patch = patch.status(StatusPanel::canonical().with_active(ids));
        }

        Ok(patch)
    }

    fn from_patch(patch: &SnapshotPatch) -> Self {
        let text = |v: &Option<Code>| v.as_ref().map(|c| c.to_string());
        let reg = |v: &Option<Register>| v.as_ref().map(|c| c.to_string());

        PatchFile {
            verb: text(&patch.verb),
            noun: text(&patch.noun),
            prog: text(&patch.prog),
            r1: reg(&patch.r1),
            r2: reg(&patch.r2),
            r3: reg(&patch.r3),
            r1_sign: patch.r1_sign,
            r2_sign: patch.r2_sign,
            r3_sign: patch.r3_sign,
            status: patch.status.as_ref().map(|panel| {
                panel.iter().filter(|(_, l)| l.active).map(|(id, _)| id).collect()
            }),
        }
    }
}

///
/// # Description
///
/// Parses a macro file. Slots present in the file replace the shipped
/// presets; slots it leaves out keep them.
///
/// # Arguments
///
///  - `text` - JSON object keyed by `F1`..`F5`.
///
pub fn parse_macros(text: &str) -> Result<MacroSet> {
    let entries: BTreeMap<String, MacroEntry> = serde_json::from_str(text)?;
    let mut set = MacroSet::defaults();

    for (key, entry) in entries.iter() {
        let slot = MacroSet::slot_from_name(key).ok_or_else(|| PeriphError::UnknownSlot(key.clone()))?;
        let patch = entry.patch.to_patch(key)?;
        set.set(slot, FunctionKeyMacro::new(&entry.name, patch));
    }
    Ok(set)
}

/// Serializes every populated slot, keyed by its function key name.
pub fn render_macros(set: &MacroSet) -> Result<String> {
    let entries: BTreeMap<String, MacroEntry> = set
        .iter()
        .map(|(slot, m)| {
            let entry = MacroEntry {
                name: m.name.to_string(),
                patch: PatchFile::from_patch(&m.patch),
            };
            (format!("F{}", slot + 1), entry)
        })
        .collect();
    Ok(serde_json::to_string_pretty(&entries)?)
}

///
/// ## JsonMacroStore
///
/// Function key macros kept in a JSON file. Relabelled lamps are not
/// persisted: a stored status is a set of lit lamp ids.
///
pub struct JsonMacroStore {
    path: PathBuf,
}

impl JsonMacroStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        JsonMacroStore {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<MacroSet> {
        let text = std::fs::read_to_string(&self.path)?;
        let set = parse_macros(&text)?;
        info!("Macros: loaded {}", self.path.display());
        Ok(set)
    }

    pub fn save(&self, set: &MacroSet) -> Result<()> {
        std::fs::write(&self.path, render_macros(set)?)?;
        info!("Macros: saved {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod store_unittests {
    use super::*;
    use dsky_core::consts::lamp;
    use dsky_core::MacroStore;

    #[test]
    fn file_entries_override_defaults() {
        let text = r#"{
            "F2": { "name": "Abort", "patch": { "prog": "7", "r1": "12", "r1_sign": "-", "status": [4, 8] } }
        }"#;
        let set = parse_macros(text).unwrap();

        let m = set.lookup(1).unwrap();
        assert_eq!(m.name.as_str(), "Abort");
        assert_eq!(m.patch.prog.as_ref().unwrap().as_str(), "07");
        assert_eq!(m.patch.r1.as_ref().unwrap().as_str(), "00012");
        assert_eq!(m.patch.r1_sign, Some(Sign::Minus));
        assert!(m.patch.verb.is_none());

        let status = m.patch.status.as_ref().unwrap();
        assert!(status.is_active(lamp::OPR_ERR) && status.is_active(lamp::RESTART));
        assert!(!status.is_active(lamp::STBY));

        assert_eq!(set.lookup(0).unwrap().name.as_str(), "Lamp Check");
    }

    #[test]
    fn bad_entries_are_rejected() {
        assert!(matches!(
            parse_macros(r#"{ "F9": { "name": "x" } }"#),
            Err(PeriphError::UnknownSlot(_))
        ));
        assert!(matches!(
            parse_macros(r#"{ "F1": { "name": "x", "patch": { "verb": "123" } } }"#),
            Err(PeriphError::InvalidMacro { .. })
        ));
        assert!(matches!(
            parse_macros(r#"{ "F1": { "name": "x", "patch": { "status": [12] } } }"#),
            Err(PeriphError::InvalidMacro { .. })
        ));
        assert!(matches!(parse_macros("[1, 2"), Err(PeriphError::Json(_))));
    }

    #[test]
    fn save_then_load_keeps_presets() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonMacroStore::new(dir.path().join("macros.json"));

        store.save(&MacroSet::defaults()).unwrap();
        assert_eq!(store.load().unwrap(), MacroSet::defaults());
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonMacroStore::new(dir.path().join("absent.json"));
        assert!(matches!(store.load(), Err(PeriphError::Io(_))));
    }
}
