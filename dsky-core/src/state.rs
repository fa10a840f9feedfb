use core::fmt;

use heapless::String;

use crate::consts::{self, lamp, CODE_WIDTH, LAMP_LABEL_LEN, NUM_LAMPS, REGISTER_WIDTH};
use crate::utils::{pad_field, truncate};

/// Two character PROG/VERB/NOUN code.
pub type Code = String<CODE_WIDTH>;

/// Five character R1/R2/R3 register contents.
pub type Register = String<REGISTER_WIDTH>;

pub type LampLabel = String<LAMP_LABEL_LEN>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Sign {
    #[cfg_attr(feature = "serde", serde(rename = "+"))]
    Plus,
    #[cfg_attr(feature = "serde", serde(rename = "-"))]
    Minus,
    #[cfg_attr(feature = "serde", serde(rename = ""))]
    Blank,
}

impl Sign {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sign::Plus => "+",
            Sign::Minus => "-",
            Sign::Blank => "",
        }
    }
}

impl fmt::Display for Sign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum LampColor {
    Red,
    Amber,
}

/// One of the three signed data registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reg {
    R1,
    R2,
    R3,
}

impl Reg {
    pub const ALL: [Reg; 3] = [Reg::R1, Reg::R2, Reg::R3];

    pub fn name(&self) -> &'static str {
        match self {
            Reg::R1 => "R1",
            Reg::R2 => "R2",
            Reg::R3 => "R3",
        }
    }
}

/* Canonical label and color of every lamp, indexed by lamp id */
const LAMP_TABLE: [(&str, LampColor); NUM_LAMPS] = [
    ("UPLINK ACTY", LampColor::Amber),
    ("NO ATT", LampColor::Red),
    ("STBY", LampColor::Amber),
    ("KEY REL", LampColor::Amber),
    ("OPR ERR", LampColor::Red),
    ("TEMP", LampColor::Red),
    ("GIMBAL LOCK", LampColor::Red),
    ("PROG", LampColor::Amber),
    ("RESTART", LampColor::Red),
    ("TRACKER", LampColor::Amber),
    ("ALT", LampColor::Amber),
    ("VEL", LampColor::Amber),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLamp {
    pub active: bool,
    pub label: LampLabel,
    pub color: LampColor,
}

///
/// ## StatusPanel
///
/// The twelve annunciator lamps. The panel is a fixed array indexed by the
/// ids in `consts::lamp`, so lamps can be toggled and relabelled but never
/// added or removed.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusPanel {
    lamps: [StatusLamp; NUM_LAMPS],
}

impl StatusPanel {
    /// All lamps dark with their canonical labels and colors.
    pub fn canonical() -> Self {
        StatusPanel {
            lamps: core::array::from_fn(|id| StatusLamp {
                active: false,
                label: truncate(LAMP_TABLE[id].0),
                color: LAMP_TABLE[id].1,
            }),
        }
    }

    pub fn get(&self, id: usize) -> Option<&StatusLamp> {
        self.lamps.get(id)
    }

    pub fn is_active(&self, id: usize) -> bool {
        self.lamps.get(id).map(|l| l.active).unwrap_or(false)
    }

    ///
    /// Sets the lamp `id` on or off. Ids outside of the panel are ignored.
    ///
    /// # Results
    ///
    ///  - `true` when the lamp changed state.
    ///
    pub fn set_active(&mut self, id: usize, active: bool) -> bool {
        match self.lamps.get_mut(id) {
            Some(l) if l.active != active => {
                l.active = active;
                true
            }
            _ => false,
        }
    }

    /// Copy of the panel with every lamp lit. Labels and colors are kept.
    pub fn all_active(&self) -> Self {
        let mut panel = self.clone();
        for l in panel.lamps.iter_mut() {
            l.active = true;
        }
        panel
    }

    /// Copy of the panel with the given lamps lit and all others untouched.
    pub fn with_active(&self, ids: &[usize]) -> Self {
        let mut panel = self.clone();
        for id in ids {
            panel.set_active(*id, true);
        }
        panel
    }

    pub fn relabel(&mut self, id: usize, label: &str, color: LampColor) -> bool {
        match self.lamps.get_mut(id) {
            Some(l) => {
                l.label = truncate(label);
                l.color = color;
                true
            }
            None => false,
        }
    }

    /// Lamps in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &StatusLamp)> {
        self.lamps.iter().enumerate()
    }
}

impl Default for StatusPanel {
    fn default() -> Self {
        Self::canonical()
    }
}

///
/// ## DisplaySnapshot
///
/// Everything the panel shows outside of transient effects: the three code
/// displays, the signed data registers and the status lamps.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplaySnapshot {
    pub verb: Code,
    pub noun: Code,
    pub prog: Code,
    pub r1: Register,
    pub r2: Register,
    pub r3: Register,
    pub r1_sign: Sign,
    pub r2_sign: Sign,
    pub r3_sign: Sign,
    pub status: StatusPanel,
}

impl DisplaySnapshot {
    /// Power-on state: every field zeroed, `+` signs and STBY lit.
    pub fn initial() -> Self {
        let mut status = StatusPanel::canonical();
        status.set_active(lamp::STBY, true);

        DisplaySnapshot {
            verb: pad_field(""),
            noun: pad_field(""),
            prog: pad_field(""),
            r1: pad_field(""),
            r2: pad_field(""),
            r3: pad_field(""),
            r1_sign: Sign::Plus,
            r2_sign: Sign::Plus,
            r3_sign: Sign::Plus,
            status,
        }
    }

    pub fn register(&self, reg: Reg) -> &Register {
        match reg {
            Reg::R1 => &self.r1,
            Reg::R2 => &self.r2,
            Reg::R3 => &self.r3,
        }
    }

    pub fn register_mut(&mut self, reg: Reg) -> &mut Register {
        match reg {
            Reg::R1 => &mut self.r1,
            Reg::R2 => &mut self.r2,
            Reg::R3 => &mut self.r3,
        }
    }

    pub fn sign(&self, reg: Reg) -> Sign {
        match reg {
            Reg::R1 => self.r1_sign,
            Reg::R2 => self.r2_sign,
            Reg::R3 => self.r3_sign,
        }
    }

    pub fn sign_mut(&mut self, reg: Reg) -> &mut Sign {
        match reg {
            Reg::R1 => &mut self.r1_sign,
            Reg::R2 => &mut self.r2_sign,
            Reg::R3 => &mut self.r3_sign,
        }
    }

    /// True when R1 shows the overflow/all-lit marker.
    pub fn r1_overflowed(&self) -> bool {
        self.r1.as_str() == consts::ALL_LIT_REGISTER
    }
}

impl Default for DisplaySnapshot {
    fn default() -> Self {
        Self::initial()
    }
}
