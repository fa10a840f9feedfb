use crate::consts::NUM_MACROS;

///
/// ## Key
///
/// Logical keys of the panel. Hosts receive keys as text tokens (button
/// labels, keyboard shortcuts, lines over a socket) and turn them into a
/// `Key` with `Key::parse` before feeding the state machine.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Verb,
    Noun,
    /// Early panel revision: edits the PROG display directly.
    Prog,
    Proceed,
    Clear,
    Enter,
    Reset,
    Lamp,
    Plus,
    Minus,
    /// `0-9` or an upper case `A-F`.
    Digit(char),
    /// Function key macro slot, `0` for F1.
    Macro(usize),
}

impl Key {
    ///
    /// Parses a key token.
    ///
    /// A token longer than one character that starts with `F` names a
    /// function key (`F1`..`F5`), while a lone `F` is the hexadecimal digit.
    ///
    /// # Results
    ///
    ///  - `None` for anything that is not a key on the panel.
    ///
    pub fn parse(token: &str) -> Option<Key> {
        let key = match token {
            "VERB" => Key::Verb,
            "NOUN" => Key::Noun,
            "PROG" => Key::Prog,
            "PROC" | "PRO" => Key::Proceed,
            "CLR" => Key::Clear,
            "ENTR" => Key::Enter,
            "RSET" => Key::Reset,
            "LAMP" => Key::Lamp,
            "+" => Key::Plus,
            "-" => Key::Minus,
            _ => return Self::parse_char_key(token),
        };
        Some(key)
    }

    fn parse_char_key(token: &str) -> Option<Key> {
        let mut chars = token.chars();
        let first = chars.next()?;

        if token.len() > 1 {
            if first != 'F' {
                return None;
            }
            return match chars.as_str().parse::<usize>() {
                Ok(n) if (1..=NUM_MACROS).contains(&n) => Some(Key::Macro(n - 1)),
                _ => None,
            };
        }

        if first.is_ascii_hexdigit() {
            Some(Key::Digit(first.to_ascii_uppercase()))
        } else {
            None
        }
    }

    /// True for the `A-F` digits.
    pub fn is_hex_letter(&self) -> bool {
        matches!(self, Key::Digit(c) if c.is_ascii_alphabetic())
    }
}
