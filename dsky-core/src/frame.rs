use core::fmt;

use heapless::String;

use crate::consts::{CODE_WIDTH, REGISTER_WIDTH};
use crate::machine::{Field, InputMode};
use crate::state::{Code, DisplaySnapshot, Reg, Register, Sign, StatusPanel};
use crate::utils::pad_field;

const SEVEN_SEG_TABLE: [u8; 18] = [
    // 0, 1, 2, 3, 4, 5, 6, 7, 8, 9,
    0x3F, 0x06, 0x5B, 0x4F, 0x66, 0x6D, 0x7D, 0x07, 0x7F, 0x6F,
    // A, b, C, d, E, F, -, BLANK
    0x77, 0x7C, 0x39, 0x5E, 0x79, 0x71, 0x40, 0x00,
];

///
/// # Description
///
/// Converts a display character into the segment pattern of a seven
/// segment digit, bit 0 being segment `a` and bit 6 segment `g`. A hardware
/// replica can drive its digits straight from these values.
///
/// # Arguments
///
///  - `c` - `0-9`, `A-F` (either case), `-` or anything else for blank.
///
/// # Return Value
///
///  - 7 Segment value code
///
pub fn seven_seg(c: char) -> u8 {
    match c.to_ascii_uppercase() {
        d @ '0'..='9' => SEVEN_SEG_TABLE[(d as u8 - b'0') as usize],
        h @ 'A'..='F' => SEVEN_SEG_TABLE[10 + (h as u8 - b'A') as usize],
        '-' => SEVEN_SEG_TABLE[16],
        _ => SEVEN_SEG_TABLE[17],
    }
}

/// Segment patterns for every character of a display field.
pub fn seven_seg_field<const N: usize>(value: &str) -> [u8; N] {
    let mut out = [0u8; N];
    for (slot, c) in out.iter_mut().zip(value.chars()) {
        *slot = seven_seg(c);
    }
    out
}

fn blank<const N: usize>() -> String<N> {
    let mut out = String::new();
    for _ in 0..N {
        let _ = out.push(' ');
    }
    out
}

fn lit<const N: usize>() -> String<N> {
    let mut out = String::new();
    for _ in 0..N {
        let _ = out.push('8');
    }
    out
}

///
/// ## Frame
///
/// What the panel actually shows at a given instant. The snapshot is the
/// committed state; the frame adds the digits being keyed in, the blanked
/// phase of a flashing code and the LAMP override on top of it.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub prog: Code,
    pub verb: Code,
    pub noun: Code,
    pub registers: [(Sign, Register); 3],
    pub status: StatusPanel,
}

impl Frame {
    pub fn render(
        snapshot: &DisplaySnapshot,
        mode: InputMode,
        buffer: &str,
        lamp_test: bool,
        flash_dark: bool,
    ) -> Self {
        if lamp_test {
            return Frame {
                prog: lit(),
                verb: lit(),
                noun: lit(),
                registers: [(Sign::Plus, lit()), (Sign::Plus, lit()), (Sign::Plus, lit())],
                status: snapshot.status.all_active(),
            };
        }

        let mut frame = Frame {
            prog: snapshot.prog.clone(),
            verb: snapshot.verb.clone(),
            noun: snapshot.noun.clone(),
            registers: [
                (snapshot.r1_sign, snapshot.r1.clone()),
                (snapshot.r2_sign, snapshot.r2.clone()),
                (snapshot.r3_sign, snapshot.r3.clone()),
            ],
            status: snapshot.status.clone(),
        };

        let field = match mode.field() {
            Some(f) => f,
            None => return frame,
        };

        if flash_dark && !field.is_register() {
            *frame.code_mut(field) = blank();
        } else if !buffer.is_empty() {
            match field {
                Field::Register(reg) => frame.registers[reg_index(reg)].1 = pad_field(buffer),
                _ => *frame.code_mut(field) = pad_field(buffer),
            }
        }
        frame
    }

    fn code_mut(&mut self, field: Field) -> &mut Code {
        match field {
            Field::Verb => &mut self.verb,
            Field::Noun => &mut self.noun,
            _ => &mut self.prog,
        }
    }

    pub fn register(&self, reg: Reg) -> (Sign, &str) {
        let (sign, value) = &self.registers[reg_index(reg)];
        (*sign, value.as_str())
    }

    /// Segment patterns in panel order: PROG, VERB, NOUN, R1, R2, R3.
    pub fn segments(&self) -> [u8; 3 * CODE_WIDTH + 3 * REGISTER_WIDTH] {
        let mut out = [0u8; 3 * CODE_WIDTH + 3 * REGISTER_WIDTH];
        let mut idx = 0;
        for code in [&self.prog, &self.verb, &self.noun] {
            let seg: [u8; CODE_WIDTH] = seven_seg_field(code);
            out[idx..idx + CODE_WIDTH].copy_from_slice(&seg);
            idx += CODE_WIDTH;
        }
        for (_, value) in self.registers.iter() {
            let seg: [u8; REGISTER_WIDTH] = seven_seg_field(value);
            out[idx..idx + REGISTER_WIDTH].copy_from_slice(&seg);
            idx += REGISTER_WIDTH;
        }
        out
    }
}

fn reg_index(reg: Reg) -> usize {
    match reg {
        Reg::R1 => 0,
        Reg::R2 => 1,
        Reg::R3 => 2,
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "PROG {}  VERB {}  NOUN {}", self.prog, self.verb, self.noun)?;
        for reg in Reg::ALL.iter() {
            let (sign, value) = self.register(*reg);
            let sign = if sign == Sign::Blank { " " } else { sign.as_str() };
            writeln!(f, "{}  {}{}", reg.name(), sign, value)?;
        }
        let mut first = true;
        for (_, l) in self.status.iter().filter(|(_, l)| l.active) {
            if !first {
                f.write_str(" ")?;
            }
            write!(f, "[{}]", l.label)?;
            first = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod frame_unittests {
    use super::*;
    use crate::consts::lamp;

    #[test]
    fn seven_seg_digits_and_hex() {
        assert_eq!(seven_seg('0'), 0x3F);
        assert_eq!(seven_seg('8'), 0x7F);
        assert_eq!(seven_seg('a'), 0x77);
        assert_eq!(seven_seg('F'), 0x71);
        assert_eq!(seven_seg('-'), 0x40);
        assert_eq!(seven_seg(' '), 0x00);
        assert_eq!(seven_seg('Z'), 0x00);
    }

    #[test]
    fn lamp_test_lights_everything() {
        let s = DisplaySnapshot::initial();
        let f = Frame::render(&s, InputMode::Idle, "", true, false);

        assert_eq!(f.verb.as_str(), "88");
        assert_eq!(f.register(Reg::R2), (Sign::Plus, "88888"));
        assert!(f.status.iter().all(|(_, l)| l.active));
        assert!(f.segments().iter().all(|s| *s == 0x7F));
    }

    #[test]
    fn buffer_overlays_edited_field() {
        let s = DisplaySnapshot::initial();

        let f = Frame::render(&s, InputMode::EnteringR2, "42", false, false);
        assert_eq!(f.register(Reg::R2).1, "00042");
        assert_eq!(f.register(Reg::R1).1, "00000");

        let f = Frame::render(&s, InputMode::EnteringVerb, "3", false, false);
        assert_eq!(f.verb.as_str(), "03");
    }

    #[test]
    fn flashing_blanks_code_field() {
        let s = DisplaySnapshot::initial();
        let f = Frame::render(&s, InputMode::EnteringNoun, "1", false, true);
        assert_eq!(f.noun.as_str(), "  ");
        assert_eq!(f.verb.as_str(), "00");
    }

    #[test]
    fn display_lists_lit_lamps() {
        use std::string::ToString;

        let mut s = DisplaySnapshot::initial();
        s.status.set_active(lamp::OPR_ERR, true);
        let text = Frame::render(&s, InputMode::Idle, "", false, false).to_string();

        assert!(text.contains("PROG 00  VERB 00  NOUN 00"));
        assert!(text.contains("R1  +00000"));
        assert!(text.contains("[STBY] [OPR ERR]"));
    }
}
