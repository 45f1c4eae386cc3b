// Copyright (c) 2026 rezky_nightky

use std::time::Duration;

pub const DEFAULT_FPS: f64 = 25.0;

/// Turns host frame callbacks into ticks at a fixed target rate.
///
/// The host calls [`Scheduler::on_frame`] at whatever cadence it has; a tick
/// fires only once at least one period has passed since the last one.
#[derive(Clone, Debug)]
pub struct Scheduler {
    period_ms: f64,
    last_draw_ms: f64,
    frame_requested: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameOutcome {
    Tick,
    Skip,
    Stopped,
}

impl Scheduler {
    pub fn new(fps: f64) -> Self {
        let fps = if fps.is_finite() && fps > 0.0 {
            fps
        } else {
            DEFAULT_FPS
        };
        Self {
            period_ms: 1000.0 / fps,
            last_draw_ms: 0.0,
            frame_requested: false,
        }
    }

    pub fn period(&self) -> Duration {
        Duration::from_secs_f64(self.period_ms / 1000.0)
    }

    pub fn start(&mut self) {
        self.frame_requested = true;
    }

    pub fn stop(&mut self) {
        self.frame_requested = false;
        self.last_draw_ms = 0.0;
    }

    pub fn is_running(&self) -> bool {
        self.frame_requested
    }

    /// Consumes the pending frame request and re-arms it for the next frame.
    pub fn on_frame(&mut self, timestamp_ms: f64) -> FrameOutcome {
        if !self.frame_requested {
            return FrameOutcome::Stopped;
        }

        let outcome = if timestamp_ms - self.last_draw_ms >= self.period_ms {
            self.last_draw_ms = timestamp_ms;
            FrameOutcome::Tick
        } else {
            FrameOutcome::Skip
        };

        self.frame_requested = true;
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticks_at_target_rate_regardless_of_host_cadence() {
        let mut s = Scheduler::new(25.0);
        s.start();

        let mut ticks = 0;
        // 144 Hz host for one second
        for i in 1..=144 {
            let ts = i as f64 * (1000.0 / 144.0);
            if s.on_frame(ts) == FrameOutcome::Tick {
                ticks += 1;
            }
        }
        assert!((20..=25).contains(&ticks), "ticks = {}", ticks);
    }

    #[test]
    fn stays_armed_after_skipped_frames() {
        let mut s = Scheduler::new(10.0);
        s.start();
        assert_eq!(s.on_frame(100.0), FrameOutcome::Tick);
        assert_eq!(s.on_frame(150.0), FrameOutcome::Skip);
        assert!(s.is_running());
        assert_eq!(s.on_frame(200.0), FrameOutcome::Tick);
    }

    #[test]
    fn stop_then_start_is_a_cold_start() {
        let mut s = Scheduler::new(10.0);
        s.start();
        assert_eq!(s.on_frame(5000.0), FrameOutcome::Tick);
        s.stop();
        assert_eq!(s.on_frame(5050.0), FrameOutcome::Stopped);

        s.start();
        assert_eq!(s.on_frame(5050.0), FrameOutcome::Tick);
    }

    #[test]
    fn invalid_fps_uses_default() {
        for fps in [f64::NAN, -3.0, 0.0] {
            let s = Scheduler::new(fps);
            assert!((s.period().as_secs_f64() - 0.04).abs() < 1e-9);
        }
    }
}
