#[cfg(test)]
mod dsky_tests {
    use crate::clock::FixedClock;
    use crate::consts::{lamp, NUM_LAMPS};
    use crate::machine::{ColdStartTrigger, Dsky, DskyConfig, InputMode, Outcome};
    use crate::macros::MacroSet;
    use crate::state::{DisplaySnapshot, Reg, Sign};
    use crate::timer::TimerKind;
    use crate::Key;

    pub fn init_dsky(config: DskyConfig) -> Dsky<MacroSet, FixedClock> {
        Dsky::new(config, MacroSet::defaults(), FixedClock(10, 20, 30))
    }

    ///
    /// Feeds a whitespace separated key sequence into the machine and returns
    /// the outcome of the last recognised key.
    ///
    pub fn press(dsky: &mut Dsky<MacroSet, FixedClock>, keys: &str) -> Outcome {
        let mut last = Outcome::ignored();
        for token in keys.split_whitespace() {
            if let Some(key) = Key::parse(token) {
                last = dsky.handle_key(key);
            }
        }
        last
    }

    #[test]
    fn lamp_test_verb_twice() {
        let mut dsky = init_dsky(DskyConfig::default());
        press(&mut dsky, "F1 ENTR");
        let first = dsky.snapshot().clone();
        press(&mut dsky, "ENTR");

        assert_eq!(&first, dsky.snapshot());
        assert_eq!(dsky.snapshot().r2.as_str(), "AAAAA");
        assert_eq!(dsky.snapshot().status.iter().filter(|(_, l)| l.active).count(), NUM_LAMPS);
    }

    #[test]
    fn verb_then_noun_selects_program() {
        let mut dsky = init_dsky(DskyConfig::default());

        let out = press(&mut dsky, "VERB 3 7 ENTR");
        assert!(out.emit);
        assert_eq!(dsky.snapshot().verb.as_str(), "37");
        assert_eq!(dsky.mode(), InputMode::Idle);

        press(&mut dsky, "NOUN 1 1 ENTR");
        assert_eq!(dsky.snapshot().noun.as_str(), "11");
        assert_eq!(dsky.snapshot().prog.as_str(), "11");
        assert_eq!(dsky.snapshot().r1.as_str(), "00000");
    }

    #[test]
    fn noun_commit_without_execution() {
        let config = DskyConfig {
            noun_entry_executes: false,
            ..DskyConfig::default()
        };
        let mut dsky = init_dsky(config);

        press(&mut dsky, "VERB 3 7 ENTR NOUN 1 1 ENTR");
        assert_eq!(dsky.snapshot().prog.as_str(), "00");

        press(&mut dsky, "ENTR");
        assert_eq!(dsky.snapshot().prog.as_str(), "11");
    }

    #[test]
    fn register_entry_slides_window() {
        let mut dsky = init_dsky(DskyConfig::default());

        let out = press(&mut dsky, "F5 PROC");
        assert_eq!(dsky.mode(), InputMode::EnteringR1);
        assert!(!out.emit);

        press(&mut dsky, "1 2 3 4 5 6");
        assert_eq!(dsky.buffer(), "23456");
        assert_eq!(dsky.frame().register(Reg::R1).1, "23456");
        assert_eq!(dsky.snapshot().r1.as_str(), "00000");

        press(&mut dsky, "ENTR");
        assert_eq!(dsky.snapshot().r1.as_str(), "23456");
        assert_eq!(dsky.buffer(), "");
    }

    #[test]
    fn short_entry_is_zero_padded() {
        let mut dsky = init_dsky(DskyConfig::default());
        // Hex is refused for codes by default
        press(&mut dsky, "PROG E D ENTR");
        assert_eq!(dsky.snapshot().prog.as_str(), "00");

        press(&mut dsky, "F5 NOUN 2 ENTR PROC 4 2 ENTR");
        assert_eq!(dsky.snapshot().prog.as_str(), "ED");
        assert_eq!(dsky.snapshot().noun.as_str(), "02");
        assert_eq!(dsky.snapshot().r2.as_str(), "00042");
        // Picking a register in ED lights nothing
        assert_eq!(dsky.snapshot().status, DisplaySnapshot::initial().status);
    }

    #[test]
    fn register_pick_in_ed_survives_program_change_verb() {
        let mut dsky = init_dsky(DskyConfig::default());
        // F2 leaves V37 behind; the noun must still only select R2
        press(&mut dsky, "F2 F5 NOUN 0 2 ENTR");
        assert_eq!(dsky.snapshot().verb.as_str(), "37");
        assert_eq!(dsky.snapshot().prog.as_str(), "ED");
        assert_eq!(dsky.snapshot().noun.as_str(), "02");

        press(&mut dsky, "PROC");
        assert_eq!(dsky.mode(), InputMode::EnteringR2);

        press(&mut dsky, "- 1 2 3 ENTR");
        assert_eq!(dsky.snapshot().r2.as_str(), "00123");
        assert_eq!(dsky.snapshot().r2_sign, Sign::Minus);
        assert_eq!(dsky.snapshot().prog.as_str(), "ED");
        assert!(!dsky.snapshot().status.is_active(lamp::OPR_ERR));
        assert!(!dsky.snapshot().status.is_active(lamp::PROG));
    }

    #[test]
    fn plain_noun_entry_only_commits() {
        let mut dsky = init_dsky(DskyConfig::default());
        let out = press(&mut dsky, "NOUN 0 1 ENTR");
        assert!(out.changed && out.emit);
        assert_eq!(dsky.snapshot().noun.as_str(), "01");
        assert_eq!(dsky.snapshot().status, DisplaySnapshot::initial().status);

        // A verb that does not consume the noun waits for ENTR in Idle
        press(&mut dsky, "VERB 2 1 ENTR NOUN 4 0 ENTR");
        assert!(!dsky.snapshot().status.is_active(lamp::OPR_ERR));
        press(&mut dsky, "ENTR");
        assert!(dsky.snapshot().status.is_active(lamp::OPR_ERR));
    }

    #[test]
    fn clock_noun_commit_runs_monitor_verb() {
        let mut dsky = init_dsky(DskyConfig::default());
        press(&mut dsky, "VERB 1 6 ENTR NOUN 3 6 ENTR");
        assert_eq!(dsky.snapshot().r1.as_str(), "00010");
        assert_eq!(dsky.snapshot().r2.as_str(), "00020");
        assert_eq!(dsky.snapshot().r3.as_str(), "00030");
        assert!(!dsky.snapshot().status.is_active(lamp::OPR_ERR));
    }

    #[test]
    fn restart_and_reset_cold_start() {
        let mut dsky = init_dsky(DskyConfig::default());
        press(&mut dsky, "F5 PROC - 7");
        assert_eq!(dsky.mode(), InputMode::EnteringR1);

        press(&mut dsky, "CLR");
        assert!(!dsky.snapshot().status.is_active(lamp::RESTART));

        press(&mut dsky, "ENTR CLR");
        assert!(dsky.snapshot().status.is_active(lamp::RESTART));

        let out = press(&mut dsky, "RSET");
        assert!(out.emit);
        assert_eq!(dsky.snapshot(), &DisplaySnapshot::initial());
        assert_eq!(dsky.mode(), InputMode::Idle);
    }

    #[test]
    fn reset_without_restart_clears_error_lamps_only() {
        let mut dsky = init_dsky(DskyConfig::default());
        press(&mut dsky, "VERB 9 9 ENTR NOUN 9 9 ENTR ENTR PROG 4 2 ENTR PROC");
        assert!(dsky.snapshot().status.is_active(lamp::OPR_ERR));
        assert!(dsky.snapshot().status.is_active(lamp::PROG));

        let out = press(&mut dsky, "RSET");
        assert!(out.changed && out.emit);
        assert!(!dsky.snapshot().status.is_active(lamp::OPR_ERR));
        assert!(!dsky.snapshot().status.is_active(lamp::PROG));
        assert_eq!(dsky.snapshot().verb.as_str(), "99");

        // Nothing left to clear: no emission
        let out = press(&mut dsky, "RSET");
        assert!(!out.changed && !out.emit);
    }

    #[test]
    fn overflow_marker_triggers_cold_start_when_configured() {
        let config = DskyConfig {
            cold_start: ColdStartTrigger::RestartLampOrOverflow,
            ..DskyConfig::default()
        };
        let mut dsky = init_dsky(config);
        press(&mut dsky, "F5 PROC A A A A A ENTR");
        assert!(dsky.snapshot().r1_overflowed());

        press(&mut dsky, "RSET");
        assert_eq!(dsky.snapshot(), &DisplaySnapshot::initial());

        let mut dsky = init_dsky(DskyConfig::default());
        press(&mut dsky, "F5 PROC A A A A A ENTR RSET");
        assert_eq!(dsky.snapshot().r1.as_str(), "AAAAA");
        assert_eq!(dsky.snapshot().prog.as_str(), "ED");
    }

    #[test]
    fn clock_macro_is_sparse() {
        let mut dsky = init_dsky(DskyConfig::default());
        press(&mut dsky, "F5 PROC - 1 2 ENTR");
        let before = dsky.snapshot().clone();
        assert_eq!(before.r1_sign, Sign::Minus);

        let out = press(&mut dsky, "F4");
        assert!(out.emit);
        let after = dsky.snapshot();
        assert_eq!(after.verb.as_str(), "16");
        assert_eq!(after.noun.as_str(), "36");
        assert_eq!(after.r1, before.r1);
        assert_eq!(after.r1_sign, before.r1_sign);
        assert_eq!(after.status, before.status);

        press(&mut dsky, "ENTR");
        assert_eq!(dsky.snapshot().r1.as_str(), "00010");
        assert_eq!(dsky.snapshot().r3.as_str(), "00030");
        assert_eq!(dsky.snapshot().r1_sign, Sign::Minus);
    }

    #[test]
    fn lunar_landing_program() {
        let mut dsky = init_dsky(DskyConfig::default());
        press(&mut dsky, "PROG 6 3 ENTR");
        let before = dsky.snapshot().status.clone();

        let out = press(&mut dsky, "PROC");
        assert!(out.emit);
        let s = dsky.snapshot();
        assert_eq!((s.r1.as_str(), s.r2.as_str(), s.r3.as_str()), ("00050", "00010", "00005"));
        for (id, l) in s.status.iter() {
            match id {
                lamp::TRACKER | lamp::ALT | lamp::PROG => assert!(l.active),
                _ => assert_eq!(l.active, before.is_active(id)),
            }
        }
    }

    #[test]
    fn unknown_command_in_idle() {
        let config = DskyConfig {
            noun_entry_executes: false,
            ..DskyConfig::default()
        };
        let mut dsky = init_dsky(config);
        press(&mut dsky, "VERB 9 9 ENTR NOUN 9 9 ENTR");
        assert!(!dsky.snapshot().status.is_active(lamp::OPR_ERR));
        let before = dsky.snapshot().clone();

        let out = press(&mut dsky, "ENTR");
        assert!(out.changed && out.emit);
        assert!(dsky.snapshot().status.is_active(lamp::OPR_ERR));
        for reg in Reg::ALL.iter() {
            assert_eq!(dsky.snapshot().register(*reg), before.register(*reg));
        }
    }

    #[test]
    fn enter_emits_even_when_unchanged() {
        let mut dsky = init_dsky(DskyConfig::default());
        let out = press(&mut dsky, "VERB ENTR");
        assert!(!out.changed);
        assert!(out.emit);
    }

    #[test]
    fn stale_lamp_test_epochs() {
        let mut dsky = init_dsky(DskyConfig::default());

        let first = press(&mut dsky, "LAMP").timer.unwrap();
        assert_eq!(first.kind, TimerKind::LampTest);
        assert_eq!(first.after_ms, 3000);
        assert_eq!(dsky.frame().verb.as_str(), "88");

        let second = press(&mut dsky, "LAMP").timer.unwrap();
        let before = dsky.snapshot().clone();

        assert!(dsky.expire(TimerKind::LampTest, first.epoch).is_ignored());
        assert!(dsky.lamp_test_active());
        assert_eq!(dsky.snapshot(), &before);

        assert!(dsky.expire(TimerKind::LampTest, second.epoch).redraw);
        assert!(!dsky.lamp_test_active());
        assert_eq!(dsky.snapshot(), &before);
        assert_eq!(dsky.frame().verb.as_str(), "00");
    }

    #[test]
    fn cold_start_cancels_transients() {
        let mut dsky = init_dsky(DskyConfig::default());
        let req = press(&mut dsky, "LAMP").timer.unwrap();

        press(&mut dsky, "CLR RSET");
        assert!(!dsky.lamp_test_active());

        press(&mut dsky, "LAMP");
        let snapshot = dsky.snapshot().clone();
        assert!(dsky.expire(TimerKind::LampTest, req.epoch).is_ignored());
        assert!(dsky.lamp_test_active());
        assert_eq!(dsky.snapshot(), &snapshot);
    }

    #[test]
    fn polled_lamp_test() {
        let mut dsky = init_dsky(DskyConfig::default());
        press(&mut dsky, "LAMP");
        assert!(dsky.advance(2999).is_ignored());
        assert!(dsky.advance(1).redraw);
        assert!(!dsky.lamp_test_active());
    }

    #[test]
    fn flashing_while_keying_codes() {
        let config = DskyConfig {
            flash_ms: 400,
            ..DskyConfig::default()
        };
        let mut dsky = init_dsky(config);

        let req = press(&mut dsky, "VERB").timer.unwrap();
        assert_eq!(req.kind, TimerKind::Flash);
        assert_eq!(req.after_ms, 400);

        let next = dsky.expire(TimerKind::Flash, req.epoch).timer.unwrap();
        assert!(dsky.flash_dark());
        assert_eq!(dsky.frame().verb.as_str(), "  ");

        press(&mut dsky, "1 ENTR");
        assert!(!dsky.flash_dark());
        assert!(dsky.expire(TimerKind::Flash, next.epoch).is_ignored());
        assert_eq!(dsky.frame().verb.as_str(), "01");
    }

    #[test]
    fn register_edit_does_not_flash() {
        let config = DskyConfig {
            flash_ms: 400,
            ..DskyConfig::default()
        };
        let mut dsky = init_dsky(config);
        let out = press(&mut dsky, "F5 PROC");
        assert!(out.timer.is_none());
    }

    #[test]
    fn clear_in_editing_mode_keeps_mode() {
        let mut dsky = init_dsky(DskyConfig::default());
        press(&mut dsky, "VERB 3");
        let out = press(&mut dsky, "CLR");

        assert_eq!(dsky.mode(), InputMode::EnteringVerb);
        assert_eq!(dsky.buffer(), "");
        assert!(!out.emit);
        assert!(!dsky.snapshot().status.is_active(lamp::RESTART));
    }

    #[test]
    fn signs_only_in_register_modes() {
        let mut dsky = init_dsky(DskyConfig::default());
        assert!(press(&mut dsky, "-").is_ignored());
        assert!(press(&mut dsky, "VERB +").is_ignored());

        press(&mut dsky, "ENTR F5 NOUN 0 3 ENTR");
        assert_eq!(dsky.snapshot().prog.as_str(), "ED");
        assert_eq!(dsky.snapshot().status, DisplaySnapshot::initial().status);
        press(&mut dsky, "PROC");
        assert_eq!(dsky.mode(), InputMode::EnteringR3);
        let out = press(&mut dsky, "-");
        assert!(out.emit);
        assert_eq!(dsky.snapshot().r3_sign, Sign::Minus);

        // Same sign again changes nothing
        assert!(!press(&mut dsky, "-").emit);
    }

    #[test]
    fn hex_digits_gated_for_codes() {
        let mut dsky = init_dsky(DskyConfig::default());
        assert!(press(&mut dsky, "VERB A").is_ignored());
        press(&mut dsky, "ENTR F5 PROC C");
        assert_eq!(dsky.buffer(), "C");

        let config = DskyConfig {
            hex_codes: true,
            ..DskyConfig::default()
        };
        let mut dsky = init_dsky(config);
        press(&mut dsky, "PROG E D ENTR");
        assert_eq!(dsky.snapshot().prog.as_str(), "ED");
    }

    #[test]
    fn idle_ignores_digits_and_unknown_tokens() {
        let mut dsky = init_dsky(DskyConfig::default());
        assert!(press(&mut dsky, "4").is_ignored());
        assert!(press(&mut dsky, "KEY REL XYZZY F9").is_ignored());
        assert_eq!(dsky.snapshot(), &DisplaySnapshot::initial());
    }

    #[test]
    fn reentering_mode_clears_buffer() {
        let mut dsky = init_dsky(DskyConfig::default());
        press(&mut dsky, "NOUN 4 NOUN");
        assert_eq!(dsky.mode(), InputMode::EnteringNoun);
        assert_eq!(dsky.buffer(), "");
    }

    #[test]
    fn missing_macro_slot_is_ignored() {
        let mut dsky = Dsky::new(DskyConfig::default(), MacroSet::empty(), FixedClock(0, 0, 0));
        assert!(dsky.handle_key(Key::Macro(2)).is_ignored());
    }
}
