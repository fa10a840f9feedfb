use core::fmt::Write;

use log::debug;

use crate::clock::WallClock;
use crate::consts::{self, lamp};
use crate::patch::SnapshotPatch;
use crate::state::{DisplaySnapshot, Reg, Register};

static VERB_DICT: [(&str, &str); 4] = [
    (consts::verb::MONITOR_DECIMAL, "Monitor Noun (Decimal)"),
    (consts::verb::WRITE_COMPONENT_1, "Write Component 1"),
    (consts::verb::LAMP_TEST, "Lamp Test"),
    (consts::verb::CHANGE_PROGRAM, "Change Program"),
];

static NOUN_DICT: [(&str, &str); 4] = [
    (consts::noun::DESIRED_AUTO_MANEUVER, "Desired Auto Maneuver"),
    (consts::noun::CLOCK_TIME, "Time (Clock)"),
    (consts::noun::VELOCITY_TO_BE_GAINED, "VG (Velocity to be Gained)"),
    (consts::noun::LANDING_SITE, "Landing Site Lat/Long"),
];

pub fn verb_description(code: &str) -> Option<&'static str> {
    VERB_DICT.iter().find(|(c, _)| *c == code).map(|(_, d)| *d)
}

pub fn noun_description(code: &str) -> Option<&'static str> {
    NOUN_DICT.iter().find(|(c, _)| *c == code).map(|(_, d)| *d)
}

pub fn verbs() -> impl Iterator<Item = &'static (&'static str, &'static str)> {
    VERB_DICT.iter()
}

pub fn nouns() -> impl Iterator<Item = &'static (&'static str, &'static str)> {
    NOUN_DICT.iter()
}

fn clock_field(value: u8) -> Register {
    let mut out = Register::new();
    let _ = write!(out, "{:05}", value);
    out
}

fn operator_error(snapshot: &DisplaySnapshot) -> SnapshotPatch {
    SnapshotPatch::new().status(snapshot.status.with_active(&[lamp::OPR_ERR]))
}

///
/// # Description
///
/// Computes what a committed VERB/NOUN pair does to the display. Only a
/// small catalog of commands is understood; anything else lights OPR ERR,
/// which is how the panel reports a bad command.
///
/// # Arguments
///
///  - `verb` - Committed VERB code.
///  - `noun` - Committed NOUN code.
///  - `snapshot` - Current display, read only.
///  - `clock` - Time source for V16 N36.
///
/// # Return Value
///
///  - Patch to apply on top of `snapshot`.
///
pub fn execute_command<C: WallClock + ?Sized>(
    verb: &str,
    noun: &str,
    snapshot: &DisplaySnapshot,
    clock: &C,
) -> SnapshotPatch {
    debug!("Interp: V{} N{}", verb, noun);
    match (verb, noun) {
        (consts::verb::LAMP_TEST, _) => SnapshotPatch::new()
            .status(snapshot.status.all_active())
            .register(Reg::R1, consts::ALL_LIT_REGISTER)
            .register(Reg::R2, consts::ALL_LIT_REGISTER)
            .register(Reg::R3, consts::ALL_LIT_REGISTER),
        (consts::verb::MONITOR_DECIMAL, consts::noun::CLOCK_TIME) => {
            let (h, m, s) = clock.now_hms();
            let mut patch = SnapshotPatch::new();
            patch.r1 = Some(clock_field(h));
            patch.r2 = Some(clock_field(m));
            patch.r3 = Some(clock_field(s));
            patch
        }
        // The noun doubles as the program selector.
        (consts::verb::CHANGE_PROGRAM, _) => SnapshotPatch::new().prog(noun).register(Reg::R1, "0"),
        _ => operator_error(snapshot),
    }
}

///
/// # Description
///
/// Computes what running program `prog` does to the display. Programs are
/// canned: each one loads a fixed set of register values and lamps.
///
/// # Return Value
///
///  - Patch to apply on top of `snapshot`.
///
pub fn execute_program(prog: &str, snapshot: &DisplaySnapshot) -> SnapshotPatch {
    debug!("Interp: P{}", prog);
    match prog {
        consts::prog::EARTH_ORBIT_INSERTION => SnapshotPatch::new()
            .register(Reg::R1, "07800")
            .register(Reg::R2, "25400")
            .register(Reg::R3, "00100")
            .status(snapshot.status.with_active(&[lamp::VEL, lamp::ALT, lamp::PROG])),
        consts::prog::LUNAR_LANDING => SnapshotPatch::new()
            .register(Reg::R1, "00050")
            .register(Reg::R2, "00010")
            .register(Reg::R3, "00005")
            .status(snapshot.status.with_active(&[lamp::TRACKER, lamp::ALT, lamp::PROG])),
        consts::prog::IDLE => operator_error(snapshot),
        _ => SnapshotPatch::new()
            .register(Reg::R1, "0")
            .register(Reg::R2, "0")
            .register(Reg::R3, "0")
            .status(snapshot.status.with_active(&[lamp::PROG])),
    }
}
