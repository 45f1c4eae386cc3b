// Copyright (c) 2026 rezky_nightky

use std::char;

use rand::Rng;

use crate::column::ColumnState;

pub const PIXEL_GLYPH: char = '\u{2588}';

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Charset(u32);

impl Charset {
    pub const NONE: Charset = Charset(0);
    pub const ENGLISH_LETTERS: Charset = Charset(0x1);
    pub const ENGLISH_DIGITS: Charset = Charset(0x2);
    pub const ENGLISH_PUNCTUATION: Charset = Charset(0x4);
    pub const KATAKANA: Charset = Charset(0x8);
    pub const GREEK: Charset = Charset(0x10);
    pub const CYRILLIC: Charset = Charset(0x20);
    pub const BINARY: Charset = Charset(0x100);
    pub const HEX: Charset = Charset(0x200);
    pub const RUNIC: Charset = Charset(0x1000);
    pub const HIEROGLYPHS: Charset = Charset(0x2000);
    pub const CORONA: Charset = Charset(0x4000);

    pub const ASCII_SAFE: Charset = Charset(0x3);
    pub const MATRIX: Charset = Charset(0xB);

    pub fn contains(self, other: Charset) -> bool {
        (self.0 & other.0) != 0
    }
}

pub fn charset_from_str(spec: &str, default_to_ascii: bool) -> Result<Charset, String> {
    let spec = spec.trim().to_ascii_lowercase();
    match spec.as_str() {
        "auto" => Ok(if default_to_ascii {
            Charset::ASCII_SAFE
        } else {
            Charset::MATRIX
        }),
        "matrix" => Ok(Charset::MATRIX),
        "ascii" => Ok(Charset(
            Charset::ENGLISH_LETTERS.0 | Charset::ENGLISH_DIGITS.0 | Charset::ENGLISH_PUNCTUATION.0,
        )),
        "english" => Ok(Charset::ENGLISH_LETTERS),
        "digits" | "dec" | "decimal" => Ok(Charset::ENGLISH_DIGITS),
        "bin" | "binary" | "01" => Ok(Charset::BINARY),
        "hex" | "hexadecimal" => Ok(Charset::HEX),
        "katakana" => Ok(Charset::KATAKANA),
        "greek" => Ok(Charset::GREEK),
        "cyrillic" => Ok(Charset::CYRILLIC),
        "runic" => Ok(Charset::RUNIC),
        "hieroglyphs" | "egyptian" => Ok(Charset::HIEROGLYPHS),
        "corona" | "unicode" => Ok(Charset::CORONA),
        _ => Err(format!(
            "unsupported charset: {} (see --list-charsets)",
            spec
        )),
    }
}

pub const CHARSET_LISTING: &[(&str, &str)] = &[
    ("auto", "Auto-select (ascii-safe when non-UTF, otherwise matrix)"),
    ("matrix", "Letters + digits + katakana"),
    ("ascii", "Letters + digits + punctuation"),
    ("english", "Letters only"),
    ("digits", "Digits only (aliases: dec, decimal)"),
    ("binary", "0 and 1 (aliases: bin, 01)"),
    ("hex", "0-9 and A-F (alias: hexadecimal)"),
    ("katakana", "Half-width katakana"),
    ("greek", "Greek"),
    ("cyrillic", "Cyrillic"),
    ("runic", "Runic"),
    ("hieroglyphs", "Egyptian hieroglyphs (alias: egyptian)"),
    ("corona", "Wide sweep of the BMP with hieroglyph stand-ins (alias: unicode)"),
];

fn push_range(out: &mut Vec<char>, start: u32, end: u32) {
    for v in start..=end {
        if let Some(ch) = char::from_u32(v) {
            out.push(ch);
        }
    }
}

/// Code points the broad sweep skips: blocks that render as emoji, as
/// boxes, or not at all.
fn is_excluded_sweep_point(v: u32) -> bool {
    matches!(
        v,
        0x0800..=0x08FF
            | 0x1C90..=0x1CCF
            | 0x2100..=0x27FF
            | 0x2934..=0x2935
            | 0x2B00..=0x2B59
            | 0x3297..=0x3299
            | 0xD800..=0xFFFF
            | 0x20E3
            | 0x303D
            | 0x3030
    )
}

fn push_corona_sweep(out: &mut Vec<char>) {
    for v in 0x00C0..=0xD7FF {
        if is_excluded_sweep_point(v) {
            continue;
        }
        if let Some(ch) = char::from_u32(v) {
            if !ch.is_control() && !ch.is_whitespace() {
                out.push(ch);
            }
        }
    }
    push_range(out, 0x13000, 0x1342F);
}

pub fn build_chars(mut charset: Charset, default_to_ascii: bool) -> Vec<char> {
    if charset == Charset::NONE {
        charset = if default_to_ascii {
            Charset::ASCII_SAFE
        } else {
            Charset::MATRIX
        };
    }

    let mut out: Vec<char> = Vec::new();

    if charset.contains(Charset::BINARY) {
        push_range(&mut out, 0x30, 0x31);
    }
    if charset.contains(Charset::HEX) {
        push_range(&mut out, 0x30, 0x39);
        push_range(&mut out, 0x41, 0x46);
    }
    if charset.contains(Charset::ENGLISH_LETTERS) {
        push_range(&mut out, 0x41, 0x5A);
        push_range(&mut out, 0x61, 0x7A);
    }
    if charset.contains(Charset::ENGLISH_DIGITS) {
        push_range(&mut out, 0x30, 0x39);
    }
    if charset.contains(Charset::ENGLISH_PUNCTUATION) {
        push_range(&mut out, 0x21, 0x2F);
        push_range(&mut out, 0x3A, 0x40);
        push_range(&mut out, 0x5B, 0x60);
        push_range(&mut out, 0x7B, 0x7E);
    }
    if charset.contains(Charset::KATAKANA) {
        push_range(&mut out, 0xFF66, 0xFF9D);
    }
    if charset.contains(Charset::GREEK) {
        push_range(&mut out, 0x0391, 0x03C9);
    }
    if charset.contains(Charset::CYRILLIC) {
        push_range(&mut out, 0x0410, 0x044F);
    }
    if charset.contains(Charset::RUNIC) {
        push_range(&mut out, 0x16A0, 0x16F0);
    }
    if charset.contains(Charset::HIEROGLYPHS) {
        push_range(&mut out, 0x13000, 0x1342F);
    }
    if charset.contains(Charset::CORONA) {
        push_corona_sweep(&mut out);
    }

    if out.is_empty() {
        out.push('0');
        out.push('1');
    }

    out
}

/// Per-state icons shown at the head of a number reveal and while a column
/// is infected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Icons {
    pub confirmed: char,
    pub active: char,
    pub recovered: char,
    pub dead: char,
}

impl Icons {
    pub const EMOJI: Icons = Icons {
        confirmed: '\u{1F934}',
        active: '\u{23F3}',
        recovered: '\u{1F973}',
        dead: '\u{1F480}',
    };

    pub const ASCII: Icons = Icons {
        confirmed: '+',
        active: '*',
        recovered: 'o',
        dead: 'x',
    };

    pub fn for_locale(default_to_ascii: bool) -> Self {
        if default_to_ascii {
            Icons::ASCII
        } else {
            Icons::EMOJI
        }
    }

    pub fn for_state(&self, state: ColumnState) -> Option<char> {
        match state {
            ColumnState::Confirmed => Some(self.confirmed),
            ColumnState::Active => Some(self.active),
            ColumnState::Recovered => Some(self.recovered),
            ColumnState::Dead => Some(self.dead),
            ColumnState::Unknown | ColumnState::Paused(_) | ColumnState::Delayed(_) => None,
        }
    }
}

/// Everything a column may draw when its queue is empty.
#[derive(Clone, Debug)]
pub struct Glyphs {
    pool: Vec<char>,
    pub icons: Icons,
}

impl Glyphs {
    pub fn new(pool: Vec<char>, icons: Icons) -> Self {
        let pool = if pool.is_empty() { vec!['0', '1'] } else { pool };
        Self { pool, icons }
    }

    pub fn decorative<R: Rng>(&self, rng: &mut R) -> char {
        self.pool[rng.random_range(0..self.pool.len())]
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    #[test]
    fn charset_auto_selects_ascii_safe_when_non_utf() {
        let cs = charset_from_str("auto", true).unwrap();
        assert_eq!(cs, Charset::ASCII_SAFE);
    }

    #[test]
    fn build_chars_binary_has_only_0_and_1() {
        let out = build_chars(Charset::BINARY, true);
        assert_eq!(out, vec!['0', '1']);
    }

    #[test]
    fn corona_sweep_skips_excluded_blocks() {
        let out = build_chars(Charset::CORONA, false);
        assert!(out.contains(&'\u{00C0}'));
        assert!(out.contains(&'\u{13000}'));
        assert!(!out.iter().any(|&c| (0x2100..=0x27FF).contains(&(c as u32))));
        assert!(!out.iter().any(|&c| (0x1C90..=0x1CCF).contains(&(c as u32))));
        assert!(!out.iter().any(|c| c.is_whitespace()));
    }

    #[test]
    fn every_listed_charset_parses() {
        for (name, _) in CHARSET_LISTING {
            assert!(charset_from_str(name, false).is_ok(), "{}", name);
        }
    }

    #[test]
    fn icons_cover_epidemic_states_only() {
        let icons = Icons::ASCII;
        assert_eq!(icons.for_state(ColumnState::Dead), Some('x'));
        assert_eq!(icons.for_state(ColumnState::Unknown), None);
        assert_eq!(icons.for_state(ColumnState::Paused(1)), None);
    }

    #[test]
    fn decorative_glyphs_come_from_the_pool() {
        let glyphs = Glyphs::new(vec!['a', 'b'], Icons::ASCII);
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..50 {
            assert!(matches!(glyphs.decorative(&mut rng), 'a' | 'b'));
        }
    }
}
