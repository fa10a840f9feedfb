/* Number of characters within the PROG, VERB and NOUN displays */
pub const CODE_WIDTH: usize = 2;

/* Number of characters within each of the R1, R2 and R3 registers */
pub const REGISTER_WIDTH: usize = 5;

/* Number of annunciator lamps on the status panel */
pub const NUM_LAMPS: usize = 12;

/* Longest label a status lamp can carry */
pub const LAMP_LABEL_LEN: usize = 16;

/* Number of function keys (F1..F5) that can hold a macro */
pub const NUM_MACROS: usize = 5;

/* Longest name a function key macro can carry */
pub const MACRO_NAME_LEN: usize = 24;

/* How long the LAMP key keeps every segment and lamp lit */
pub const LAMP_TEST_MS: u32 = 3000;

/* Half period of the VERB/NOUN flashing while a code is being keyed in */
pub const FLASH_MS: u32 = 400;

/* Register value shown with every segment lit. Doubles as the overflow marker. */
pub const ALL_LIT_REGISTER: &str = "AAAAA";

/* Program code under which PROC opens the data registers for editing */
pub const DIAGNOSTIC_PROG: &str = "ED";

pub mod lamp {
    pub const UPLINK_ACTY: usize = 0;
    pub const NO_ATT: usize = 1;
    pub const STBY: usize = 2;
    pub const KEY_REL: usize = 3;
    pub const OPR_ERR: usize = 4;
    pub const TEMP: usize = 5;
    pub const GIMBAL_LOCK: usize = 6;
    pub const PROG: usize = 7;
    pub const RESTART: usize = 8;
    pub const TRACKER: usize = 9;
    pub const ALT: usize = 10;
    pub const VEL: usize = 11;
}

pub mod verb {
    pub const MONITOR_DECIMAL: &str = "16";
    pub const WRITE_COMPONENT_1: &str = "21";
    pub const LAMP_TEST: &str = "35";
    pub const CHANGE_PROGRAM: &str = "37";
}

pub mod noun {
    pub const R1: &str = "01";
    pub const R2: &str = "02";
    pub const R3: &str = "03";
    pub const DESIRED_AUTO_MANEUVER: &str = "18";
    pub const CLOCK_TIME: &str = "36";
    pub const VELOCITY_TO_BE_GAINED: &str = "40";
    pub const LANDING_SITE: &str = "68";
}

pub mod prog {
    pub const IDLE: &str = "00";
    pub const EARTH_ORBIT_INSERTION: &str = "11";
    pub const LUNAR_LANDING: &str = "63";
}
