use serde::{Deserialize, Serialize};

use dsky_core::{DisplaySnapshot, LampColor, Reg};

use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LampPayload {
    pub id: usize,
    pub label: String,
    pub active: bool,
    pub color: LampColor,
}

///
/// ## TelemetryPayload
///
/// Wire form of a `DisplaySnapshot` for the physical replica and network
/// consumers. Each register is sent with its sign glued in front of the
/// digits and the lamps are listed by ascending id.
///
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub struct TelemetryPayload {
    pub verb: String,
    pub noun: String,
    pub prog: String,
    pub r1: String,
    pub r2: String,
    pub r3: String,
    pub status: Vec<LampPayload>,
}

fn signed(snapshot: &DisplaySnapshot, reg: Reg) -> String {
    format!("{}{}", snapshot.sign(reg), snapshot.register(reg))
}

impl From<&DisplaySnapshot> for TelemetryPayload {
    fn from(snapshot: &DisplaySnapshot) -> Self {
        TelemetryPayload {
            verb: snapshot.verb.to_string(),
            noun: snapshot.noun.to_string(),
            prog: snapshot.prog.to_string(),
            r1: signed(snapshot, Reg::R1),
            r2: signed(snapshot, Reg::R2),
            r3: signed(snapshot, Reg::R3),
            status: snapshot
                .status
                .iter()
                .map(|(id, l)| LampPayload {
                    id,
                    label: l.label.to_string(),
                    active: l.active,
                    color: l.color,
                })
                .collect(),
        }
    }
}

impl TelemetryPayload {
    /// Single line JSON, without the trailing newline.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
