use heapless::String;
use log::{debug, info};

use crate::clock::WallClock;
use crate::consts::{self, lamp, CODE_WIDTH, REGISTER_WIDTH};
use crate::frame::Frame;
use crate::interp;
use crate::keys::Key;
use crate::macros::MacroStore;
use crate::state::{DisplaySnapshot, Reg, Sign};
use crate::timer::{Fired, TimerKind, TimerRequest, Transients};
use crate::utils::{pad_field, push_window};

fn replace<T: PartialEq>(dst: &mut T, value: T) -> bool {
    let changed = *dst != value;
    *dst = value;
    changed
}

/// What makes RSET throw the whole panel back to its power-on state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColdStartTrigger {
    /// The RESTART lamp is lit.
    RestartLamp,
    /// The RESTART lamp is lit or R1 shows the overflow marker.
    RestartLampOrOverflow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DskyConfig {
    /// How long the LAMP key override lasts.
    pub lamp_test_ms: u32,
    /// Flash half period while keying in a code, `0` disables flashing.
    pub flash_ms: u32,
    /// Accept `A-F` while keying in VERB, NOUN and PROG.
    pub hex_codes: bool,
    /// Committing a NOUN also executes a verb that takes the noun as its
    /// operand (V37, V16 N36). Never applies inside the diagnostic program.
    pub noun_entry_executes: bool,
    pub cold_start: ColdStartTrigger,
}

impl Default for DskyConfig {
    fn default() -> Self {
        DskyConfig {
            lamp_test_ms: consts::LAMP_TEST_MS,
            flash_ms: 0,
            hex_codes: false,
            noun_entry_executes: true,
            cold_start: ColdStartTrigger::RestartLamp,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Idle,
    EnteringVerb,
    EnteringNoun,
    EnteringProg,
    EnteringR1,
    EnteringR2,
    EnteringR3,
}

/// Display field an editing mode writes into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Verb,
    Noun,
    Prog,
    Register(Reg),
}

impl Field {
    pub fn width(&self) -> usize {
        match self {
            Field::Register(_) => REGISTER_WIDTH,
            _ => CODE_WIDTH,
        }
    }

    pub fn is_register(&self) -> bool {
        matches!(self, Field::Register(_))
    }
}

impl InputMode {
    pub fn editing(reg: Reg) -> Self {
        match reg {
            Reg::R1 => InputMode::EnteringR1,
            Reg::R2 => InputMode::EnteringR2,
            Reg::R3 => InputMode::EnteringR3,
        }
    }

    pub fn field(&self) -> Option<Field> {
        match self {
            InputMode::Idle => None,
            InputMode::EnteringVerb => Some(Field::Verb),
            InputMode::EnteringNoun => Some(Field::Noun),
            InputMode::EnteringProg => Some(Field::Prog),
            InputMode::EnteringR1 => Some(Field::Register(Reg::R1)),
            InputMode::EnteringR2 => Some(Field::Register(Reg::R2)),
            InputMode::EnteringR3 => Some(Field::Register(Reg::R3)),
        }
    }

    pub fn is_idle(&self) -> bool {
        *self == InputMode::Idle
    }
}

///
/// Result of feeding one key or timer into the machine.
///
///  - `changed` - The snapshot differs from before.
///  - `emit` - The snapshot must be sent to the telemetry sink.
///  - `redraw` - Something visible changed (snapshot, buffer or transients).
///  - `timer` - The host must call `Dsky::expire` with this request later.
///
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Outcome {
    pub changed: bool,
    pub emit: bool,
    pub redraw: bool,
    pub timer: Option<TimerRequest>,
}

impl Outcome {
    pub fn ignored() -> Self {
        Self::default()
    }

    fn redraw() -> Self {
        Outcome {
            redraw: true,
            ..Self::default()
        }
    }

    /// Emits only when the snapshot changed.
    fn update(changed: bool) -> Self {
        Outcome {
            changed,
            emit: changed,
            redraw: changed,
            timer: None,
        }
    }

    /// Emits no matter what changed.
    fn commit(changed: bool) -> Self {
        Outcome {
            changed,
            emit: true,
            redraw: true,
            timer: None,
        }
    }

    fn with_timer(mut self, timer: Option<TimerRequest>) -> Self {
        self.timer = timer;
        self
    }

    pub fn is_ignored(&self) -> bool {
        *self == Self::default()
    }
}

///
/// ## Dsky
///
/// The panel state machine. It owns the display snapshot, the edit mode and
/// the input buffer, and every change to them goes through `handle_key` or
/// the timer callbacks. The macro store and the clock are handed in by the
/// host.
///
pub struct Dsky<M: MacroStore, C: WallClock> {
    config: DskyConfig,
    snapshot: DisplaySnapshot,
    mode: InputMode,
    buffer: String<REGISTER_WIDTH>,
    macros: M,
    clock: C,
    transients: Transients,
}

impl<M: MacroStore, C: WallClock> Dsky<M, C> {
    pub fn new(config: DskyConfig, macros: M, clock: C) -> Self {
        Dsky {
            config,
            snapshot: DisplaySnapshot::initial(),
            mode: InputMode::Idle,
            buffer: String::new(),
            macros,
            clock,
            transients: Transients::new(),
        }
    }

    pub fn config(&self) -> &DskyConfig {
        &self.config
    }

    pub fn snapshot(&self) -> &DisplaySnapshot {
        &self.snapshot
    }

    pub fn mode(&self) -> InputMode {
        self.mode
    }

    pub fn buffer(&self) -> &str {
        self.buffer.as_str()
    }

    pub fn macros(&self) -> &M {
        &self.macros
    }

    pub fn lamp_test_active(&self) -> bool {
        self.transients.lamp_test_active()
    }

    pub fn flash_dark(&self) -> bool {
        self.transients.flash_dark()
    }

    /// Effective panel contents with the transient effects applied.
    pub fn frame(&self) -> Frame {
        Frame::render(
            &self.snapshot,
            self.mode,
            self.buffer(),
            self.lamp_test_active(),
            self.flash_dark(),
        )
    }

    ///
    /// # Description
    ///
    /// Single entry point for key presses. Every key has a defined result in
    /// every mode; keys that make no sense in the current mode are ignored.
    ///
    /// # Arguments
    ///
    ///  - `key` - Logical key, see `Key::parse`.
    ///
    /// # Return Value
    ///
    ///  - `Outcome` telling the host what to emit, redraw and schedule.
    ///
    pub fn handle_key(&mut self, key: Key) -> Outcome {
        debug!("DSKY: {:?} in {:?} [{}]", key, self.mode, self.buffer);
        match key {
            Key::Macro(slot) => self.apply_macro(slot),
            Key::Lamp => self.lamp_test(),
            Key::Reset => self.reset(),
            Key::Verb => self.enter_mode(InputMode::EnteringVerb),
            Key::Noun => self.enter_mode(InputMode::EnteringNoun),
            Key::Prog => self.enter_mode(InputMode::EnteringProg),
            Key::Proceed => self.proceed(),
            Key::Clear => self.clear(),
            Key::Plus => self.set_sign(Sign::Plus),
            Key::Minus => self.set_sign(Sign::Minus),
            Key::Enter => self.enter(),
            Key::Digit(c) => self.push_digit(c),
        }
    }

    /// Timer callback. Stale epochs are ignored.
    pub fn expire(&mut self, kind: TimerKind, epoch: u32) -> Outcome {
        match self.transients.fire(kind, epoch) {
            Fired::Stale => {
                debug!("DSKY: stale {:?} timer (epoch {})", kind, epoch);
                Outcome::ignored()
            }
            Fired::LampTestEnded => Outcome::redraw(),
            Fired::FlashToggled(next) => Outcome::redraw().with_timer(Some(next)),
        }
    }

    /// Polling alternative to `expire`: moves the transients forward in time.
    pub fn advance(&mut self, elapsed_ms: u32) -> Outcome {
        if self.transients.advance(elapsed_ms) {
            Outcome::redraw()
        } else {
            Outcome::ignored()
        }
    }

    fn apply_macro(&mut self, slot: usize) -> Outcome {
        match self.macros.lookup(slot) {
            Some(m) => {
                info!("DSKY: F{} {}", slot + 1, m.name);
                let changed = m.patch.apply(&mut self.snapshot);
                Outcome::commit(changed)
            }
            None => Outcome::ignored(),
        }
    }

    fn lamp_test(&mut self) -> Outcome {
        let req = self.transients.start_lamp_test(self.config.lamp_test_ms);
        Outcome::redraw().with_timer(Some(req))
    }

    fn cold_start_due(&self) -> bool {
        let restart = self.snapshot.status.is_active(lamp::RESTART);
        match self.config.cold_start {
            ColdStartTrigger::RestartLamp => restart,
            ColdStartTrigger::RestartLampOrOverflow => restart || self.snapshot.r1_overflowed(),
        }
    }

    fn reset(&mut self) -> Outcome {
        let cold_start = self.cold_start_due();

        let mut changed = self.snapshot.status.set_active(lamp::OPR_ERR, false);
        changed |= self.snapshot.status.set_active(lamp::PROG, false);

        if cold_start {
            info!("DSKY: cold start");
            let initial = DisplaySnapshot::initial();
            changed |= self.snapshot != initial;
            self.snapshot = initial;
            self.return_to_idle();
            self.transients.cancel_all();
        }

        Outcome::update(changed)
    }

    fn enter_mode(&mut self, mode: InputMode) -> Outcome {
        self.mode = mode;
        self.buffer.clear();

        let flashing = matches!(mode.field(), Some(f) if !f.is_register());
        if flashing && self.config.flash_ms > 0 {
            let req = self.transients.start_flash(self.config.flash_ms);
            Outcome::redraw().with_timer(Some(req))
        } else {
            self.transients.stop_flash();
            Outcome::redraw()
        }
    }

    fn return_to_idle(&mut self) {
        self.mode = InputMode::Idle;
        self.buffer.clear();
        self.transients.stop_flash();
    }

    fn proceed(&mut self) -> Outcome {
        if self.snapshot.prog.as_str() == consts::DIAGNOSTIC_PROG {
            let reg = match self.snapshot.noun.as_str() {
                consts::noun::R1 => Some(Reg::R1),
                consts::noun::R2 => Some(Reg::R2),
                consts::noun::R3 => Some(Reg::R3),
                _ => None,
            };
            if let Some(reg) = reg {
                return self.enter_mode(InputMode::editing(reg));
            }
        }

        let patch = interp::execute_program(&self.snapshot.prog, &self.snapshot);
        self.return_to_idle();
        Outcome::commit(patch.apply(&mut self.snapshot))
    }

    fn clear(&mut self) -> Outcome {
        if self.mode.is_idle() {
            // Arms the cold start; the next RSET performs it.
            let changed = self.snapshot.status.set_active(lamp::RESTART, true);
            Outcome::commit(changed)
        } else {
            self.buffer.clear();
            Outcome::redraw()
        }
    }

    fn set_sign(&mut self, sign: Sign) -> Outcome {
        match self.mode.field() {
            Some(Field::Register(reg)) => {
                Outcome::update(replace(self.snapshot.sign_mut(reg), sign))
            }
            _ => Outcome::ignored(),
        }
    }

    fn commit(&mut self, field: Field) -> bool {
        let value = self.buffer.as_str();
        let s = &mut self.snapshot;
        debug!("DSKY: {:?} <- {}", field, value);
        match field {
            Field::Verb => replace(&mut s.verb, pad_field(value)),
            Field::Noun => replace(&mut s.noun, pad_field(value)),
            Field::Prog => replace(&mut s.prog, pad_field(value)),
            Field::Register(reg) => replace(s.register_mut(reg), pad_field(value)),
        }
    }

    fn execute_verb_noun(&mut self) -> bool {
        let patch = interp::execute_command(
            &self.snapshot.verb,
            &self.snapshot.noun,
            &self.snapshot,
            &self.clock,
        );
        patch.apply(&mut self.snapshot)
    }

    // Verbs that consume the noun as their operand run as soon as it is
    // committed. In ED the noun selects the register to edit instead.
    fn noun_commit_executes(&self) -> bool {
        if !self.config.noun_entry_executes
            || self.snapshot.prog.as_str() == consts::DIAGNOSTIC_PROG
        {
            return false;
        }
        match self.snapshot.verb.as_str() {
            consts::verb::CHANGE_PROGRAM => true,
            consts::verb::MONITOR_DECIMAL => self.snapshot.noun.as_str() == consts::noun::CLOCK_TIME,
            _ => false,
        }
    }

    fn enter(&mut self) -> Outcome {
        let changed = match self.mode.field() {
            Some(field) => {
                let mut changed = self.commit(field);
                if field == Field::Noun && self.noun_commit_executes() {
                    changed |= self.execute_verb_noun();
                }
                changed
            }
            None => self.execute_verb_noun(),
        };

        self.return_to_idle();
        Outcome::commit(changed)
    }

    fn push_digit(&mut self, c: char) -> Outcome {
        let field = match self.mode.field() {
            Some(f) => f,
            None => return Outcome::ignored(),
        };

        if Key::Digit(c).is_hex_letter() && !field.is_register() && !self.config.hex_codes {
            return Outcome::ignored();
        }

        self.buffer = push_window(&self.buffer, c, field.width());
        Outcome::redraw()
    }
}
