#![no_std]

#[cfg(any(feature = "std", test))]
extern crate std;

pub mod clock;
pub mod consts;
pub mod frame;
pub mod interp;
pub mod keys;
pub mod machine;
pub mod macros;
pub mod patch;
pub mod state;
pub mod timer;
pub mod utils;

#[cfg(test)]
mod tests;

pub use keys::Key;
pub use machine::{ColdStartTrigger, Dsky, DskyConfig, InputMode, Outcome};
pub use macros::{FunctionKeyMacro, MacroSet, MacroStore};
pub use patch::SnapshotPatch;
pub use state::{DisplaySnapshot, LampColor, Reg, Sign, StatusLamp, StatusPanel};
