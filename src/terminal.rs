// Copyright (c) 2026 rezky_nightky

use std::io::{stdout, Result, Stdout, Write};

use crossterm::{
    cursor, event,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor},
    terminal, ExecutableCommand, QueueableCommand,
};
use unicode_width::UnicodeWidthChar;

use crate::cell::Cell;
use crate::frame::Frame;
use crate::palette::terminal_color;
use crate::runtime::ColorMode;

struct LastFrame {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl LastFrame {
    fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::BLANK; width as usize * height as usize],
        }
    }
}

/// Appends a slot's glyph padded to two terminal cells.
fn push_slot(buf: &mut String, ch: char) {
    let ch = match ch.width() {
        Some(1) | Some(2) => ch,
        _ => ' ',
    };
    buf.push(ch);
    if ch.width() != Some(2) {
        buf.push(' ');
    }
}

pub struct Terminal {
    stdout: Stdout,
    color_mode: ColorMode,
    last: Option<LastFrame>,
    run_buf: String,
    row_dirty: Vec<Vec<usize>>,
    touched_rows: Vec<u16>,
}

impl Terminal {
    pub fn new(color_mode: ColorMode) -> Result<Self> {
        let mut out = stdout();
        terminal::enable_raw_mode()?;
        let init_res: Result<()> = (|| {
            out.execute(terminal::EnterAlternateScreen)?;
            out.execute(cursor::Hide)?;
            let _ = out.execute(terminal::DisableLineWrap);
            out.execute(SetAttribute(Attribute::Reset))?;
            out.execute(ResetColor)?;
            out.execute(terminal::Clear(terminal::ClearType::All))?;
            out.flush()?;
            Ok(())
        })();
        if let Err(e) = init_res {
            restore_terminal_best_effort();
            return Err(e);
        }
        Ok(Self {
            stdout: out,
            color_mode,
            last: None,
            run_buf: String::with_capacity(64),
            row_dirty: Vec::new(),
            touched_rows: Vec::new(),
        })
    }

    pub fn size(&self) -> Result<(u16, u16)> {
        terminal::size()
    }

    pub fn poll_event(timeout: std::time::Duration) -> Result<bool> {
        event::poll(timeout)
    }

    pub fn read_event() -> Result<event::Event> {
        event::read()
    }

    fn queue_fg(&mut self, cell: &Cell, cur_fg: &mut Option<Option<Color>>) -> Result<()> {
        let fg = cell.fg.and_then(|rgb| terminal_color(self.color_mode, rgb));
        if *cur_fg != Some(fg) {
            self.stdout
                .queue(SetForegroundColor(fg.unwrap_or(Color::Reset)))?;
            *cur_fg = Some(fg);
        }
        Ok(())
    }

    pub fn draw(&mut self, frame: &mut Frame) -> Result<()> {
        let mut cur_fg: Option<Option<Color>> = None;
        let mut cur_pos: Option<(u16, u16)> = None;

        let needs_full_redraw = self
            .last
            .as_ref()
            .map(|l| l.width != frame.width || l.height != frame.height)
            .unwrap_or(true);

        if needs_full_redraw {
            self.stdout
                .queue(terminal::Clear(terminal::ClearType::All))?;
            self.last = Some(LastFrame::new(frame.width, frame.height));
        }

        let total_cells = frame.width as usize * frame.height as usize;
        let dirty_count = frame.dirty_indices().len();
        let dirty_is_large = total_cells > 0 && dirty_count >= (total_cells / 3);

        if needs_full_redraw || frame.is_dirty_all() || dirty_is_large {
            for y in 0..frame.height {
                self.stdout.queue(cursor::MoveTo(0, y))?;
                for x in 0..frame.width {
                    let idx = y as usize * frame.width as usize + x as usize;
                    let cell = frame.cell_at_index(idx);
                    self.queue_fg(&cell, &mut cur_fg)?;
                    self.run_buf.clear();
                    push_slot(&mut self.run_buf, cell.ch);
                    self.stdout.queue(Print(self.run_buf.as_str()))?;
                    if let Some(last) = self.last.as_mut() {
                        last.cells[idx] = cell;
                    }
                }
            }

            self.stdout.queue(SetAttribute(Attribute::Reset))?;
            self.stdout.queue(ResetColor)?;
            self.stdout.flush()?;

            frame.clear_dirty();
            return Ok(());
        }

        let width_usize = frame.width as usize;

        if self.row_dirty.len() != frame.height as usize {
            self.row_dirty = vec![Vec::new(); frame.height as usize];
        }
        for r in &mut self.row_dirty {
            r.clear();
        }
        self.touched_rows.clear();

        for &idx in frame.dirty_indices() {
            let y = (idx / width_usize) as u16;
            if y >= frame.height {
                continue;
            }
            let b = &mut self.row_dirty[y as usize];
            if b.is_empty() {
                self.touched_rows.push(y);
            }
            b.push(idx);
        }

        self.touched_rows.sort_unstable();
        self.touched_rows.dedup();

        let rows = std::mem::take(&mut self.touched_rows);
        for &y0 in &rows {
            let mut b = std::mem::take(&mut self.row_dirty[y0 as usize]);
            b.sort_unstable();

            let mut i = 0usize;
            while i < b.len() {
                let idx0 = b[i];
                let cell0 = frame.cell_at_index(idx0);
                let Some(last) = self.last.as_mut() else {
                    break;
                };
                if last.cells.get(idx0).copied() == Some(cell0) {
                    i += 1;
                    continue;
                }
                last.cells[idx0] = cell0;

                let x0 = (idx0 % width_usize) as u16;
                self.run_buf.clear();
                push_slot(&mut self.run_buf, cell0.ch);
                let mut run_len: u16 = 1;
                let mut last_idx_in_run = idx0;
                let mut j = i + 1;

                while j < b.len() {
                    let idx1 = b[j];
                    if idx1 != last_idx_in_run + 1 {
                        break;
                    }
                    let cell1 = frame.cell_at_index(idx1);
                    if last.cells.get(idx1).copied() == Some(cell1) || cell1.fg != cell0.fg {
                        break;
                    }
                    push_slot(&mut self.run_buf, cell1.ch);
                    last.cells[idx1] = cell1;
                    run_len = run_len.saturating_add(1);
                    last_idx_in_run = idx1;
                    j += 1;
                }

                let term_x = x0.saturating_mul(2);
                if cur_pos != Some((term_x, y0)) {
                    self.stdout.queue(cursor::MoveTo(term_x, y0))?;
                }
                self.queue_fg(&cell0, &mut cur_fg)?;
                self.stdout.queue(Print(self.run_buf.as_str()))?;
                cur_pos = Some((term_x.saturating_add(run_len.saturating_mul(2)), y0));

                i = j;
            }
            b.clear();
            self.row_dirty[y0 as usize] = b;
        }
        self.touched_rows = rows;

        self.stdout.queue(SetAttribute(Attribute::Reset))?;
        self.stdout.queue(ResetColor)?;
        self.stdout.flush()?;
        frame.clear_dirty();
        Ok(())
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        let _ = self.stdout.execute(SetAttribute(Attribute::Reset));
        let _ = self.stdout.execute(ResetColor);
        let _ = self.stdout.execute(cursor::Show);
        let _ = self.stdout.execute(terminal::EnableLineWrap);
        let _ = self.stdout.execute(terminal::LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
        let _ = self.stdout.flush();
    }
}

pub fn restore_terminal_best_effort() {
    let mut out = stdout();
    let _ = out.execute(SetAttribute(Attribute::Reset));
    let _ = out.execute(ResetColor);
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::EnableLineWrap);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();
    let _ = out.flush();
}

#[cfg(test)]
mod tests {
    use super::push_slot;

    #[test]
    fn narrow_glyphs_are_padded_to_two_cells() {
        let mut s = String::new();
        push_slot(&mut s, 'a');
        assert_eq!(s, "a ");
    }

    #[test]
    fn wide_glyphs_fill_the_slot() {
        let mut s = String::new();
        push_slot(&mut s, '\u{1F480}');
        assert_eq!(s, "\u{1F480}");
    }

    #[test]
    fn zero_width_glyphs_become_blank() {
        let mut s = String::new();
        push_slot(&mut s, '\u{0301}');
        assert_eq!(s, "  ");
    }
}
