// Copyright (c) 2026 rezky_nightky

use crossterm::style::Color;

use crate::column::ColumnState;
use crate::runtime::ColorMode;

pub type Rgb = (u8, u8, u8);

pub const BACKGROUND: Rgb = (0, 0, 0);

/// Fill colors per column state.
pub const RAIN_GREEN: Rgb = (0, 255, 0);
pub const CONFIRMED_RED: Rgb = (255, 0, 0);
pub const ACTIVE_GOLD: Rgb = (255, 215, 0);
pub const RECOVERED_TEAL: Rgb = (0, 255, 170);
pub const DEAD_ORANGE_RED: Rgb = (255, 69, 0);

pub fn state_color(state: ColumnState) -> Rgb {
    match state {
        ColumnState::Confirmed => CONFIRMED_RED,
        ColumnState::Active => ACTIVE_GOLD,
        ColumnState::Recovered => RECOVERED_TEAL,
        ColumnState::Dead => DEAD_ORANGE_RED,
        ColumnState::Unknown | ColumnState::Paused(_) | ColumnState::Delayed(_) => RAIN_GREEN,
    }
}

fn dist2(r0: u8, g0: u8, b0: u8, r1: u8, g1: u8, b1: u8) -> i32 {
    let dr = (r0 as i32) - (r1 as i32);
    let dg = (g0 as i32) - (g1 as i32);
    let db = (b0 as i32) - (b1 as i32);
    (dr * dr) + (dg * dg) + (db * db)
}

fn rgb_to_ansi256(r: u8, g: u8, b: u8) -> u8 {
    const CUBE_LEVELS: [u8; 6] = [0, 95, 135, 175, 215, 255];

    let r6 = ((r as u16 * 5) + 127) / 255;
    let g6 = ((g as u16 * 5) + 127) / 255;
    let b6 = ((b as u16 * 5) + 127) / 255;

    let cr = CUBE_LEVELS[r6 as usize];
    let cg = CUBE_LEVELS[g6 as usize];
    let cb = CUBE_LEVELS[b6 as usize];
    let cube_idx = 16 + (36 * r6 as u8) + (6 * g6 as u8) + (b6 as u8);
    let cube_dist = dist2(r, g, b, cr, cg, cb);

    let avg = ((r as u16 + g as u16 + b as u16) / 3) as u8;
    let gray_idx = if avg < 8 {
        16
    } else if avg > 238 {
        231
    } else {
        232 + ((avg - 8) / 10)
    };
    let (gr, gg, gb) = if gray_idx == 16 {
        (0, 0, 0)
    } else if gray_idx == 231 {
        (255, 255, 255)
    } else {
        let v = 8 + 10 * (gray_idx - 232);
        (v, v, v)
    };
    let gray_dist = dist2(r, g, b, gr, gg, gb);

    if gray_dist < cube_dist {
        gray_idx
    } else {
        cube_idx
    }
}

fn rgb_to_color16(r: u8, g: u8, b: u8) -> Color {
    const TABLE: [(Color, (u8, u8, u8)); 16] = [
        (Color::Black, (0, 0, 0)),
        (Color::DarkGrey, (128, 128, 128)),
        (Color::Grey, (192, 192, 192)),
        (Color::White, (255, 255, 255)),
        (Color::DarkRed, (128, 0, 0)),
        (Color::Red, (255, 0, 0)),
        (Color::DarkGreen, (0, 128, 0)),
        (Color::Green, (0, 255, 0)),
        (Color::DarkBlue, (0, 0, 128)),
        (Color::Blue, (0, 0, 255)),
        (Color::DarkCyan, (0, 128, 128)),
        (Color::Cyan, (0, 255, 255)),
        (Color::DarkMagenta, (128, 0, 128)),
        (Color::Magenta, (255, 0, 255)),
        (Color::DarkYellow, (128, 128, 0)),
        (Color::Yellow, (255, 255, 0)),
    ];

    let mut best = Color::White;
    let mut best_d = i32::MAX;
    for (c, (cr, cg, cb)) in TABLE {
        let d = dist2(r, g, b, cr, cg, cb);
        if d < best_d {
            best_d = d;
            best = c;
        }
    }
    best
}

/// Terminal color for `rgb`; `None` leaves the terminal's default foreground.
pub fn terminal_color(mode: ColorMode, (r, g, b): Rgb) -> Option<Color> {
    match mode {
        ColorMode::Mono => None,
        ColorMode::TrueColor => Some(Color::Rgb { r, g, b }),
        ColorMode::Color256 => Some(Color::AnsiValue(rgb_to_ansi256(r, g, b))),
        ColorMode::Color16 => Some(rgb_to_color16(r, g, b)),
    }
}

/// Moves `from` toward `to` by `alpha`, always by at least one step per
/// channel so repeated fades reach the target.
pub fn fade_toward(from: Rgb, to: Rgb, alpha: f32) -> Rgb {
    fn channel(a: u8, b: u8, alpha: f32) -> u8 {
        if a == b {
            return a;
        }
        let diff = (b as f32) - (a as f32);
        let mut step = (diff * alpha).round();
        if step == 0.0 {
            step = diff.signum();
        }
        ((a as f32) + step).clamp(0.0, 255.0) as u8
    }
    (
        channel(from.0, to.0, alpha),
        channel(from.1, to.1, alpha),
        channel(from.2, to.2, alpha),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pure_colors_map_to_16_color_table() {
        assert_eq!(terminal_color(ColorMode::Color16, CONFIRMED_RED), Some(Color::Red));
        assert_eq!(terminal_color(ColorMode::Color16, RAIN_GREEN), Some(Color::Green));
        assert_eq!(terminal_color(ColorMode::Mono, RAIN_GREEN), None);
    }

    #[test]
    fn ansi256_maps_green_into_cube() {
        assert_eq!(rgb_to_ansi256(0, 255, 0), 46);
        assert_eq!(rgb_to_ansi256(0, 0, 0), 16);
    }

    #[test]
    fn fade_converges_to_target() {
        let mut c = RAIN_GREEN;
        for _ in 0..400 {
            c = fade_toward(c, BACKGROUND, 0.05);
        }
        assert_eq!(c, BACKGROUND);
    }

    #[test]
    fn states_have_distinct_colors() {
        let colors = [
            state_color(ColumnState::Unknown),
            state_color(ColumnState::Confirmed),
            state_color(ColumnState::Active),
            state_color(ColumnState::Recovered),
            state_color(ColumnState::Dead),
        ];
        for (i, a) in colors.iter().enumerate() {
            for b in &colors[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert_eq!(state_color(ColumnState::Delayed(2)), RAIN_GREEN);
    }
}
