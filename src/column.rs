// Copyright (c) 2026 rezky_nightky

use rand::Rng;

use crate::queue::GlyphQueue;
use crate::stats::AggregateStats;

/// Ticks a neighbour of a freshly dead column stays blank.
pub const PAUSE_TICKS: u8 = 4;
/// Ticks a neighbour of a freshly recovered column stays blank.
pub const DELAY_TICKS: u8 = 2;

pub const DEFAULT_FACTOR: f64 = 0.996;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColumnState {
    #[default]
    Unknown,
    Confirmed,
    Active,
    Recovered,
    Dead,
    /// Suppressed because a neighbour died; counts down to `Unknown`.
    Paused(u8),
    /// Suppressed because a neighbour recovered; counts down to `Unknown`.
    Delayed(u8),
}

/// Global numbers every column draws its odds from during one tick.
#[derive(Clone, Copy, Debug)]
pub struct Epidemic {
    pub stats: AggregateStats,
    pub total_population: u64,
    /// Resistance to reinfection; `1 - factor` is the reinfection chance.
    pub factor: f64,
}

impl Epidemic {
    pub fn confirm_probability(&self) -> f64 {
        if self.total_population == 0 {
            return 0.0;
        }
        (self.stats.confirmed as f64 / self.total_population as f64).min(1.0)
    }

    pub fn reinfect_probability(&self) -> f64 {
        let p = 1.0 - self.factor;
        if p.is_finite() {
            p.clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Where an active case goes next, weighted by the global counts.
    pub fn resolve_active<R: Rng>(&self, rng: &mut R) -> ColumnState {
        let s = &self.stats;
        if s.confirmed == 0 {
            return ColumnState::Recovered;
        }
        let luck = rng.random::<f64>() * s.confirmed as f64;
        if luck < s.dead as f64 {
            ColumnState::Dead
        } else if luck < s.dead.saturating_add(s.active) as f64 {
            ColumnState::Active
        } else {
            ColumnState::Recovered
        }
    }
}

impl ColumnState {
    pub fn is_control(self) -> bool {
        matches!(self, ColumnState::Paused(_) | ColumnState::Delayed(_))
    }

    /// Neighbours in these states may be paused by a death or recovery
    /// next door. `Confirmed` is left alone so it always reaches `Active`.
    pub fn is_pausable(self) -> bool {
        matches!(self, ColumnState::Unknown | ColumnState::Active)
    }

    /// One step of the transition table.
    pub fn next<R: Rng>(self, epi: &Epidemic, rng: &mut R) -> ColumnState {
        match self {
            ColumnState::Paused(n) => decay(n, ColumnState::Paused),
            ColumnState::Delayed(n) => decay(n, ColumnState::Delayed),
            ColumnState::Unknown => {
                if rng.random_bool(epi.confirm_probability()) {
                    ColumnState::Confirmed
                } else {
                    ColumnState::Unknown
                }
            }
            ColumnState::Confirmed => ColumnState::Active,
            ColumnState::Active => epi.resolve_active(rng),
            ColumnState::Recovered => {
                if rng.random_bool(epi.reinfect_probability()) {
                    ColumnState::Confirmed
                } else {
                    ColumnState::Unknown
                }
            }
            ColumnState::Dead => ColumnState::Unknown,
        }
    }

    /// The count revealed when a column enters this state.
    pub fn revealed_count(self, stats: &AggregateStats) -> Option<u64> {
        match self {
            ColumnState::Recovered => Some(stats.recovered),
            ColumnState::Dead => Some(stats.dead),
            _ => None,
        }
    }
}

fn decay(n: u8, same: fn(u8) -> ColumnState) -> ColumnState {
    if n > 1 {
        same(n - 1)
    } else {
        ColumnState::Unknown
    }
}

/// One lane of the rain.
#[derive(Clone, Debug, Default)]
pub struct Column {
    pub state: ColumnState,
    pub position: u32,
    pub queue: GlyphQueue,
}

impl Column {
    pub fn reset(&mut self) {
        self.state = ColumnState::Unknown;
        self.position = 0;
        self.queue.clear();
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    fn epi(confirmed: u64, dead: u64, recovered: u64, active: u64, pop: u64) -> Epidemic {
        Epidemic {
            stats: AggregateStats {
                confirmed,
                dead,
                recovered,
                active,
                timestamp: 0,
            },
            total_population: pop,
            factor: DEFAULT_FACTOR,
        }
    }

    #[test]
    fn zero_population_never_confirms() {
        let e = epi(100, 0, 0, 100, 0);
        assert_eq!(e.confirm_probability(), 0.0);
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..1000 {
            assert_eq!(ColumnState::Unknown.next(&e, &mut rng), ColumnState::Unknown);
        }
    }

    #[test]
    fn confirm_probability_is_capped() {
        let e = epi(500, 0, 0, 500, 100);
        assert_eq!(e.confirm_probability(), 1.0);
        let mut rng = StdRng::seed_from_u64(2);
        assert_eq!(ColumnState::Unknown.next(&e, &mut rng), ColumnState::Confirmed);
    }

    #[test]
    fn confirmed_always_becomes_active() {
        let e = epi(0, 0, 0, 0, 0);
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(ColumnState::Confirmed.next(&e, &mut rng), ColumnState::Active);
    }

    #[test]
    fn active_with_no_confirmed_recovers() {
        let e = epi(0, 0, 0, 0, 100);
        let mut rng = StdRng::seed_from_u64(4);
        assert_eq!(ColumnState::Active.next(&e, &mut rng), ColumnState::Recovered);
    }

    #[test]
    fn active_outcomes_follow_weights() {
        let e = epi(1000, 100, 400, 500, 10_000);
        let mut rng = StdRng::seed_from_u64(5);
        let (mut dead, mut active, mut recovered) = (0, 0, 0);
        for _ in 0..20_000 {
            match e.resolve_active(&mut rng) {
                ColumnState::Dead => dead += 1,
                ColumnState::Active => active += 1,
                ColumnState::Recovered => recovered += 1,
                other => panic!("unexpected {:?}", other),
            }
        }
        assert!((1600..2400).contains(&dead), "dead = {}", dead);
        assert!((9200..10800).contains(&active), "active = {}", active);
        assert!((7200..8800).contains(&recovered), "recovered = {}", recovered);
    }

    #[test]
    fn only_dead_when_everyone_died() {
        let e = epi(10, 10, 0, 0, 100);
        let mut rng = StdRng::seed_from_u64(6);
        for _ in 0..100 {
            assert_eq!(e.resolve_active(&mut rng), ColumnState::Dead);
        }
    }

    #[test]
    fn recovered_reinfects_only_with_zero_resistance() {
        let mut e = epi(10, 0, 10, 0, 100);
        let mut rng = StdRng::seed_from_u64(7);

        e.factor = 1.0;
        for _ in 0..100 {
            assert_eq!(ColumnState::Recovered.next(&e, &mut rng), ColumnState::Unknown);
        }

        e.factor = 0.0;
        assert_eq!(ColumnState::Recovered.next(&e, &mut rng), ColumnState::Confirmed);
    }

    #[test]
    fn dead_respawns() {
        let e = epi(10, 10, 0, 0, 10);
        let mut rng = StdRng::seed_from_u64(8);
        assert_eq!(ColumnState::Dead.next(&e, &mut rng), ColumnState::Unknown);
    }

    #[test]
    fn control_states_count_down_to_unknown() {
        let e = epi(100, 0, 0, 100, 100);
        let mut rng = StdRng::seed_from_u64(9);

        let mut s = ColumnState::Paused(3);
        let mut seen = vec![s];
        while s != ColumnState::Unknown {
            s = s.next(&e, &mut rng);
            seen.push(s);
        }
        assert_eq!(
            seen,
            vec![
                ColumnState::Paused(3),
                ColumnState::Paused(2),
                ColumnState::Paused(1),
                ColumnState::Unknown,
            ]
        );
        assert_eq!(ColumnState::Delayed(0).next(&e, &mut rng), ColumnState::Unknown);
    }

    #[test]
    fn terminal_and_control_states_are_not_pausable() {
        assert!(ColumnState::Unknown.is_pausable());
        assert!(ColumnState::Active.is_pausable());
        assert!(!ColumnState::Confirmed.is_pausable());
        assert!(!ColumnState::Dead.is_pausable());
        assert!(!ColumnState::Recovered.is_pausable());
        assert!(!ColumnState::Paused(2).is_pausable());
        assert!(!ColumnState::Delayed(1).is_pausable());
    }
}
