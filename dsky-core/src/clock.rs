///
/// Source of the wall clock read by V16 N36.
///
pub trait WallClock {
    /// Current `(hours, minutes, seconds)`.
    fn now_hms(&self) -> (u8, u8, u8);
}

/// Clock frozen at a given time of day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub u8, pub u8, pub u8);

impl WallClock for FixedClock {
    fn now_hms(&self) -> (u8, u8, u8) {
        (self.0, self.1, self.2)
    }
}

/// Host clock, reported in the host's local time zone.
#[cfg(feature = "std")]
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

#[cfg(feature = "std")]
impl WallClock for SystemClock {
    fn now_hms(&self) -> (u8, u8, u8) {
        use chrono::Timelike;

        let now = chrono::Local::now();
        (now.hour() as u8, now.minute() as u8, now.second() as u8)
    }
}
