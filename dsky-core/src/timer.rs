//! Transient display timers.
//!
//! The LAMP override and the VERB/NOUN flashing are the only parts of the
//! panel that change on their own. Each one is armed with a fresh epoch.
//! A host fires a timer by handing the epoch back, either from a sleeping
//! thread (`fire`) or from a polling loop (`advance`). Firing with an epoch
//! that is no longer armed is a no-op, so a timer that outlives a reset or a
//! mode change cannot disturb the panel.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    LampTest,
    Flash,
}

/// Request for the host to call back after `after_ms` with `epoch`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerRequest {
    pub kind: TimerKind,
    pub epoch: u32,
    pub after_ms: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fired {
    /// Epoch was stale, nothing changed.
    Stale,
    LampTestEnded,
    /// Flash phase flipped; the timer was re-armed with a new request.
    FlashToggled(TimerRequest),
}

#[derive(Debug, Clone, Copy)]
struct Armed {
    epoch: u32,
    remaining_ms: u32,
    period_ms: u32,
}

#[derive(Debug, Default)]
pub struct Transients {
    epoch: u32,
    lamp_test: Option<Armed>,
    flash: Option<Armed>,
    flash_dark: bool,
}

impl Transients {
    pub fn new() -> Self {
        Self::default()
    }

    fn arm(&mut self, kind: TimerKind, period_ms: u32) -> TimerRequest {
        self.epoch = self.epoch.wrapping_add(1);
        let armed = Armed {
            epoch: self.epoch,
            remaining_ms: period_ms,
            period_ms,
        };
        match kind {
            TimerKind::LampTest => self.lamp_test = Some(armed),
            TimerKind::Flash => self.flash = Some(armed),
        }
        TimerRequest {
            kind,
            epoch: self.epoch,
            after_ms: period_ms,
        }
    }

    pub fn start_lamp_test(&mut self, duration_ms: u32) -> TimerRequest {
        self.arm(TimerKind::LampTest, duration_ms)
    }

    pub fn lamp_test_active(&self) -> bool {
        self.lamp_test.is_some()
    }

    pub fn start_flash(&mut self, period_ms: u32) -> TimerRequest {
        self.flash_dark = false;
        self.arm(TimerKind::Flash, period_ms)
    }

    pub fn stop_flash(&mut self) {
        self.flash = None;
        self.flash_dark = false;
    }

    /// True while a flashing field is in its blanked phase.
    pub fn flash_dark(&self) -> bool {
        self.flash.is_some() && self.flash_dark
    }

    /// Drops every armed timer. Outstanding epochs all become stale.
    pub fn cancel_all(&mut self) {
        self.lamp_test = None;
        self.stop_flash();
        self.epoch = self.epoch.wrapping_add(1);
    }

    pub fn fire(&mut self, kind: TimerKind, epoch: u32) -> Fired {
        match kind {
            TimerKind::LampTest => match self.lamp_test {
                Some(a) if a.epoch == epoch => {
                    self.lamp_test = None;
                    Fired::LampTestEnded
                }
                _ => Fired::Stale,
            },
            TimerKind::Flash => match self.flash {
                Some(a) if a.epoch == epoch => {
                    self.flash_dark = !self.flash_dark;
                    Fired::FlashToggled(self.arm(TimerKind::Flash, a.period_ms))
                }
                _ => Fired::Stale,
            },
        }
    }

    ///
    /// Moves every armed timer `elapsed_ms` forward.
    ///
    /// # Results
    ///
    ///  - `true` when something visible changed.
    ///
    pub fn advance(&mut self, elapsed_ms: u32) -> bool {
        let mut changed = false;

        if let Some(a) = self.lamp_test.as_mut() {
            a.remaining_ms = a.remaining_ms.saturating_sub(elapsed_ms);
            if a.remaining_ms == 0 {
                self.lamp_test = None;
                changed = true;
            }
        }

        if let Some(a) = self.flash.as_mut() {
            if a.period_ms > 0 {
                let mut left = elapsed_ms;
                while left >= a.remaining_ms {
                    left -= a.remaining_ms;
                    a.remaining_ms = a.period_ms;
                    self.flash_dark = !self.flash_dark;
                    changed = true;
                }
                a.remaining_ms -= left;
            }
        }

        changed
    }
}
