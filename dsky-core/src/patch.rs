use crate::state::{Code, DisplaySnapshot, Reg, Register, Sign, StatusPanel};
use crate::utils::pad_field;

///
/// ## SnapshotPatch
///
/// A partial update of a `DisplaySnapshot`. Both the command interpreter and
/// the function key macros hand these back instead of touching the snapshot
/// themselves.
///
/// Every field that is present overwrites the snapshot and every field that
/// is absent is left alone. The status panel is the exception: a present
/// `status` replaces all twelve lamps at once rather than merging into them.
///
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotPatch {
    pub verb: Option<Code>,
    pub noun: Option<Code>,
    pub prog: Option<Code>,
    pub r1: Option<Register>,
    pub r2: Option<Register>,
    pub r3: Option<Register>,
    pub r1_sign: Option<Sign>,
    pub r2_sign: Option<Sign>,
    pub r3_sign: Option<Sign>,
    pub status: Option<StatusPanel>,
}

fn overwrite<T: Clone + PartialEq>(dst: &mut T, src: &Option<T>) -> bool {
    match src {
        Some(v) if dst != v => {
            *dst = v.clone();
            true
        }
        _ => false,
    }
}

impl SnapshotPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn verb(mut self, value: &str) -> Self {
        self.verb = Some(pad_field(value));
        self
    }

    pub fn noun(mut self, value: &str) -> Self {
        self.noun = Some(pad_field(value));
        self
    }

    pub fn prog(mut self, value: &str) -> Self {
        self.prog = Some(pad_field(value));
        self
    }

    pub fn register(mut self, reg: Reg, value: &str) -> Self {
        *self.register_slot(reg) = Some(pad_field(value));
        self
    }

    pub fn sign(mut self, reg: Reg, sign: Sign) -> Self {
        *self.sign_slot(reg) = Some(sign);
        self
    }

    pub fn status(mut self, panel: StatusPanel) -> Self {
        self.status = Some(panel);
        self
    }

    pub fn register_slot(&mut self, reg: Reg) -> &mut Option<Register> {
        match reg {
            Reg::R1 => &mut self.r1,
            Reg::R2 => &mut self.r2,
            Reg::R3 => &mut self.r3,
        }
    }

    pub fn sign_slot(&mut self, reg: Reg) -> &mut Option<Sign> {
        match reg {
            Reg::R1 => &mut self.r1_sign,
            Reg::R2 => &mut self.r2_sign,
            Reg::R3 => &mut self.r3_sign,
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    ///
    /// Applies the patch on top of `snapshot`.
    ///
    /// # Results
    ///
    ///  - `true` when at least one displayed value changed.
    ///
    pub fn apply(&self, snapshot: &mut DisplaySnapshot) -> bool {
        let mut changed = false;

        changed |= overwrite(&mut snapshot.verb, &self.verb);
        changed |= overwrite(&mut snapshot.noun, &self.noun);
        changed |= overwrite(&mut snapshot.prog, &self.prog);
        changed |= overwrite(&mut snapshot.r1, &self.r1);
        changed |= overwrite(&mut snapshot.r2, &self.r2);
        changed |= overwrite(&mut snapshot.r3, &self.r3);
        changed |= overwrite(&mut snapshot.r1_sign, &self.r1_sign);
        changed |= overwrite(&mut snapshot.r2_sign, &self.r2_sign);
        changed |= overwrite(&mut snapshot.r3_sign, &self.r3_sign);

        // Whole-panel replacement, never a per-lamp merge.
        changed |= overwrite(&mut snapshot.status, &self.status);

        changed
    }
}
