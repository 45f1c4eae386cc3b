// Copyright (c) 2026 rezky_nightky

use crate::cell::Cell;
use crate::palette::{fade_toward, Rgb};
use crate::surface::Surface;

/// Terminal-backed drawing surface.
///
/// One slot per rain column and row. A slot is drawn two terminal cells wide
/// so wide glyphs fit. Coordinates coming through [`Surface`] are points;
/// every slot is `glyph_size` points square.
#[derive(Clone, Debug)]
pub struct Frame {
    pub width: u16,
    pub height: u16,
    pub cells: Vec<Cell>,
    glyph_size: f32,
    dirty_all: bool,
    dirty_map: Vec<bool>,
    dirty: Vec<usize>,
}

impl Frame {
    pub fn new(width: u16, height: u16, glyph_size: f32) -> Self {
        let len = width as usize * height as usize;
        Self {
            width,
            height,
            cells: vec![Cell::BLANK; len],
            glyph_size: glyph_size.max(1.0),
            dirty_all: true,
            dirty_map: vec![false; len],
            dirty: Vec::new(),
        }
    }

    /// Slots that fit a terminal of `cols` x `rows` cells.
    pub fn for_terminal(cols: u16, rows: u16, glyph_size: f32) -> Self {
        Self::new(cols / 2, rows, glyph_size)
    }

    pub fn glyph_size(&self) -> f32 {
        self.glyph_size
    }

    pub fn is_dirty_all(&self) -> bool {
        self.dirty_all
    }

    pub fn dirty_indices(&self) -> &[usize] {
        &self.dirty
    }

    pub fn clear_dirty(&mut self) {
        if self.dirty_all {
            self.dirty_all = false;
            self.dirty_map.fill(false);
            self.dirty.clear();
            return;
        }

        for &i in &self.dirty {
            if let Some(v) = self.dirty_map.get_mut(i) {
                *v = false;
            }
        }
        self.dirty.clear();
    }

    pub fn index(&self, x: u16, y: u16) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    #[cfg(test)]
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        self.index(x, y).map(|i| &self.cells[i])
    }

    pub fn cell_at_index(&self, i: usize) -> Cell {
        self.cells.get(i).copied().unwrap_or(Cell::BLANK)
    }

    pub fn set(&mut self, x: u16, y: u16, cell: Cell) {
        if let Some(i) = self.index(x, y) {
            self.set_index(i, cell);
        }
    }

    fn set_index(&mut self, i: usize, cell: Cell) {
        if self.cells[i] == cell {
            return;
        }
        self.cells[i] = cell;
        if !self.dirty_all && self.dirty_map.get(i).copied() == Some(false) {
            self.dirty_map[i] = true;
            self.dirty.push(i);
        }
    }

    fn to_slot(&self, v: f32) -> Option<u16> {
        if !v.is_finite() || v < 0.0 {
            return None;
        }
        let s = (v / self.glyph_size).round();
        if s > u16::MAX as f32 {
            return None;
        }
        Some(s as u16)
    }

    fn to_slot_floor(&self, v: f32) -> u16 {
        if !v.is_finite() || v <= 0.0 {
            return 0;
        }
        (v / self.glyph_size).floor().min(u16::MAX as f32) as u16
    }

    fn to_slot_ceil(&self, v: f32) -> u16 {
        if !v.is_finite() || v <= 0.0 {
            return 0;
        }
        (v / self.glyph_size).ceil().min(u16::MAX as f32) as u16
    }
}

impl Surface for Frame {
    fn width(&self) -> f32 {
        self.width as f32 * self.glyph_size
    }

    fn height(&self) -> f32 {
        self.height as f32 * self.glyph_size
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgb, alpha: f32) {
        let alpha = if alpha.is_finite() {
            alpha.clamp(0.0, 1.0)
        } else {
            return;
        };
        let x0 = self.to_slot_floor(x);
        let y0 = self.to_slot_floor(y);
        let x1 = self.to_slot_ceil(x + w).min(self.width);
        let y1 = self.to_slot_ceil(y + h).min(self.height);

        for sy in y0..y1 {
            for sx in x0..x1 {
                let Some(i) = self.index(sx, sy) else {
                    continue;
                };
                let cur = self.cells[i];
                let Some(fg) = cur.fg else {
                    continue;
                };
                let faded = fade_toward(fg, color, alpha);
                let next = if faded == color {
                    Cell::BLANK
                } else {
                    Cell::glyph(cur.ch, faded)
                };
                self.set_index(i, next);
            }
        }
    }

    fn fill_text(&mut self, glyph: char, x: f32, y: f32, color: Rgb) {
        if glyph.is_whitespace() || glyph.is_control() {
            return;
        }
        let (Some(sx), Some(sy)) = (self.to_slot(x), self.to_slot(y)) else {
            return;
        };
        self.set(sx, sy, Cell::glyph(glyph, color));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::{BACKGROUND, RAIN_GREEN};

    #[test]
    fn text_lands_in_slot_for_point_coordinates() {
        let mut f = Frame::new(4, 3, 14.0);
        f.fill_text('x', 28.0, 14.0, RAIN_GREEN);
        assert_eq!(f.get(2, 1).unwrap().ch, 'x');
        assert_eq!(f.width(), 56.0);
        assert_eq!(f.height(), 42.0);
    }

    #[test]
    fn text_outside_frame_is_dropped() {
        let mut f = Frame::new(2, 2, 10.0);
        f.fill_text('x', 10.0, 500.0, RAIN_GREEN);
        f.fill_text('x', -10.0, 0.0, RAIN_GREEN);
        assert!(f.cells.iter().all(|c| !c.is_lit()));
    }

    #[test]
    fn whitespace_draws_nothing() {
        let mut f = Frame::new(2, 2, 10.0);
        f.fill_text('a', 0.0, 0.0, RAIN_GREEN);
        f.fill_text(' ', 0.0, 0.0, RAIN_GREEN);
        assert_eq!(f.get(0, 0).unwrap().ch, 'a');
    }

    #[test]
    fn overlay_fades_glyphs_to_blank() {
        let mut f = Frame::new(2, 2, 10.0);
        f.fill_text('a', 0.0, 0.0, RAIN_GREEN);
        f.fill_all(BACKGROUND, 0.5);
        let c = *f.get(0, 0).unwrap();
        assert_eq!(c.ch, 'a');
        assert!(c.fg.unwrap().1 < RAIN_GREEN.1);

        for _ in 0..20 {
            f.fill_all(BACKGROUND, 0.5);
        }
        assert_eq!(*f.get(0, 0).unwrap(), Cell::BLANK);
    }

    #[test]
    fn changes_are_tracked_as_dirty() {
        let mut f = Frame::new(3, 3, 10.0);
        f.clear_dirty();
        assert!(f.dirty_indices().is_empty());

        f.fill_text('q', 10.0, 20.0, RAIN_GREEN);
        assert_eq!(f.dirty_indices(), &[7]);

        f.clear_dirty();
        f.fill_text('q', 10.0, 20.0, RAIN_GREEN);
        assert!(f.dirty_indices().is_empty());
    }

    #[test]
    fn terminal_frame_uses_two_cells_per_slot() {
        let f = Frame::for_terminal(81, 24, 14.0);
        assert_eq!((f.width, f.height), (40, 24));
    }
}
