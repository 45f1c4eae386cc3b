// Copyright (c) 2026 rezky_nightky

use rand::{rngs::StdRng, Rng};
use tracing::{debug, info, trace};

use crate::{
    charset::{Glyphs, PIXEL_GLYPH},
    column::{Column, ColumnState, Epidemic, DELAY_TICKS, PAUSE_TICKS},
    config::Settings,
    palette::{state_color, BACKGROUND, RAIN_GREEN},
    queue::{number_reveal, SPACER},
    runtime::DrawVariant,
    scheduler::{FrameOutcome, Scheduler},
    stats::StatsSource,
    surface::Surface,
};

/// Columns reset once they fall past this share of the viewport height,
/// scaled by a uniform draw.
const RESET_LOW: f32 = 0.5;
const RESET_HIGH: f32 = 1.5;

/// One running rain effect over a fixed set of columns.
///
/// The column arena is sized once from the viewport and never resized; a new
/// viewport needs a new `Rain`.
pub struct Rain<R: Rng = StdRng> {
    variant: DrawVariant,
    glyph_size: f32,
    factor: f64,
    fade: f32,
    viewport_height: f32,

    glyphs: Glyphs,
    columns: Vec<Column>,
    scheduler: Scheduler,
    rng: R,
}

impl<R: Rng> Rain<R> {
    pub fn new(settings: &Settings, glyphs: Glyphs, width: f32, height: f32, rng: R) -> Self {
        let glyph_size = settings.size;
        let count = (width / glyph_size).round().max(0.0) as usize;
        let mut columns = Vec::with_capacity(count);
        columns.resize_with(count, Column::default);

        let scheduler = Scheduler::new(settings.fps);
        debug!(
            columns = count,
            variant = ?settings.variant,
            period_ms = scheduler.period().as_millis() as u64,
            "rain allocated"
        );

        Self {
            variant: settings.variant,
            glyph_size,
            factor: settings.factor,
            fade: settings.fade,
            viewport_height: height,
            glyphs,
            columns,
            scheduler,
            rng,
        }
    }

    #[cfg(test)]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    #[cfg(test)]
    pub fn columns_mut(&mut self) -> &mut [Column] {
        &mut self.columns
    }

    pub fn variant(&self) -> DrawVariant {
        self.variant
    }

    pub fn factor(&self) -> f64 {
        self.factor
    }

    pub fn is_running(&self) -> bool {
        self.scheduler.is_running()
    }

    /// Begins scheduling from a clean slate.
    pub fn start(&mut self) {
        for c in &mut self.columns {
            c.reset();
        }
        self.scheduler.start();
        info!(columns = self.columns.len(), "rain started");
    }

    pub fn stop(&mut self) {
        self.scheduler.stop();
        info!("rain stopped");
    }

    pub fn toggle(&mut self) {
        if self.is_running() {
            self.stop();
        } else {
            self.start();
        }
    }

    /// Host frame callback. Runs one tick when the scheduler says so.
    pub fn on_frame<S>(
        &mut self,
        timestamp_ms: f64,
        stats: &dyn StatsSource,
        surface: &mut S,
    ) -> FrameOutcome
    where
        S: Surface + ?Sized,
    {
        let outcome = self.scheduler.on_frame(timestamp_ms);
        if outcome == FrameOutcome::Tick {
            self.tick(stats, surface);
        }
        outcome
    }

    pub fn tick<S>(&mut self, stats: &dyn StatsSource, surface: &mut S)
    where
        S: Surface + ?Sized,
    {
        let epi = Epidemic {
            stats: stats.latest(),
            total_population: stats.total_population(),
            factor: self.factor,
        };
        self.update(&epi);
        self.draw_frame(surface);
    }

    fn update(&mut self, epi: &Epidemic) {
        // A right neighbour paused this tick has had its turn.
        let mut paused_ahead = None;
        for i in 0..self.columns.len() {
            if paused_ahead == Some(i) {
                continue;
            }

            if self.reset_due(i) {
                let c = &mut self.columns[i];
                c.position = 0;
                // Confirmed must still reach Active on this tick.
                if c.state != ColumnState::Confirmed {
                    c.state = ColumnState::Unknown;
                }
            }

            if self.variant == DrawVariant::Corona {
                paused_ahead = self.advance_column(i, epi);
            }
        }
    }

    fn reset_due(&mut self, i: usize) -> bool {
        let c = &self.columns[i];
        if !c.queue.is_empty() {
            return false;
        }
        if c.state == ColumnState::Dead {
            return true;
        }
        let fallen = c.position as f32 * self.glyph_size;
        let threshold = self.viewport_height * self.rng.random_range(RESET_LOW..RESET_HIGH);
        fallen > threshold
    }

    /// Steps column `i`. Returns the right neighbour's index when it was
    /// paused.
    fn advance_column(&mut self, i: usize, epi: &Epidemic) -> Option<usize> {
        let state = self.columns[i].state;
        let next = state.next(epi, &mut self.rng);
        self.columns[i].state = next;

        if state.is_control() || next == state {
            return None;
        }

        let count = next.revealed_count(&epi.stats)?;
        let icon = self.glyphs.icons.for_state(next)?;
        let queue = &mut self.columns[i].queue;
        queue.enqueue(number_reveal(icon, count));
        trace!(column = i, state = ?next, count, pending = queue.len(), "column revealed");

        let control = if next == ColumnState::Dead {
            ColumnState::Paused(PAUSE_TICKS)
        } else {
            ColumnState::Delayed(DELAY_TICKS)
        };
        self.pause_neighbours(i, control)
    }

    fn pause_neighbours(&mut self, i: usize, control: ColumnState) -> Option<usize> {
        let len = self.columns.len();
        let mut pause = |j: usize| {
            let n = &mut self.columns[j];
            let pausable = n.state.is_pausable();
            if pausable {
                n.state = control;
            }
            pausable
        };

        if let Some(left) = i.checked_sub(1) {
            pause(left);
        }
        let right = i + 1;
        if right < len && pause(right) {
            return Some(right);
        }
        None
    }

    /// Fades the surface, then draws one glyph per column and moves it down.
    pub fn draw_frame<S>(&mut self, surface: &mut S)
    where
        S: Surface + ?Sized,
    {
        surface.fill_all(BACKGROUND, self.fade);

        let variant = self.variant;
        let size = self.glyph_size;
        let glyphs = &self.glyphs;
        let rng = &mut self.rng;

        for (i, c) in self.columns.iter_mut().enumerate() {
            let state = c.state;
            let glyph = c
                .queue
                .dequeue_or_else(|| fallback_glyph(variant, state, glyphs, &mut *rng));
            let color = match variant {
                DrawVariant::Corona => state_color(state),
                DrawVariant::Pixel | DrawVariant::Random => RAIN_GREEN,
            };
            surface.fill_text(glyph, i as f32 * size, c.position as f32 * size, color);
            c.position = c.position.saturating_add(1);
        }
    }
}

fn fallback_glyph<R: Rng>(
    variant: DrawVariant,
    state: ColumnState,
    glyphs: &Glyphs,
    rng: &mut R,
) -> char {
    match variant {
        DrawVariant::Pixel => PIXEL_GLYPH,
        DrawVariant::Random => glyphs.decorative(rng),
        DrawVariant::Corona => match state {
            ColumnState::Unknown => glyphs.decorative(rng),
            ColumnState::Paused(_) | ColumnState::Delayed(_) => SPACER,
            other => glyphs.icons.for_state(other).unwrap_or(SPACER),
        },
    }
}
