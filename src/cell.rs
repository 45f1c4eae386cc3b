// Copyright (c) 2026 rezky_nightky

use crate::palette::Rgb;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub fg: Option<Rgb>,
}

impl Cell {
    pub const BLANK: Cell = Cell { ch: ' ', fg: None };

    pub fn glyph(ch: char, fg: Rgb) -> Self {
        Self { ch, fg: Some(fg) }
    }

    #[cfg(test)]
    pub fn is_lit(&self) -> bool {
        self.fg.is_some()
    }
}
