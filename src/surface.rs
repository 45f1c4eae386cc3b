// Copyright (c) 2026 rezky_nightky

use crate::palette::Rgb;

/// 2-D drawing target in points, fixed in size once created.
pub trait Surface {
    fn width(&self) -> f32;
    fn height(&self) -> f32;

    /// Blends `color` over the rectangle with the given opacity.
    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgb, alpha: f32);

    /// Places `glyph` horizontally centered on `x`, with its top at `y`.
    fn fill_text(&mut self, glyph: char, x: f32, y: f32, color: Rgb);

    fn fill_all(&mut self, color: Rgb, alpha: f32) {
        let (w, h) = (self.width(), self.height());
        self.fill_rect(0.0, 0.0, w, h, color, alpha);
    }
}
