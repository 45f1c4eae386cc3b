// Copyright (c) 2026 rezky_nightky

//! Read side of the epidemic statistics.
//!
//! Fetching lives elsewhere; whatever fetches the numbers leaves a flat JSON
//! record in a cache file. The rain only ever sees a complete
//! [`AggregateStats`] snapshot, never a parse error.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info, warn};

pub const DEFAULT_POPULATION: u64 = 7_780_000_000;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AggregateStats {
    pub confirmed: u64,
    pub dead: u64,
    pub recovered: u64,
    pub active: u64,
    /// Milliseconds since the unix epoch.
    pub timestamp: u64,
}

impl AggregateStats {
    /// Last-known-good numbers used whenever nothing better is available.
    pub const FALLBACK: AggregateStats = AggregateStats {
        confirmed: 440_392,
        dead: 19_769,
        recovered: 111_460,
        active: 309_163,
        timestamp: 0,
    };

    pub fn derived_active(confirmed: u64, dead: u64, recovered: u64) -> u64 {
        confirmed.saturating_sub(dead).saturating_sub(recovered)
    }
}

pub trait StatsSource {
    fn latest(&self) -> AggregateStats;
    fn total_population(&self) -> u64;
}

#[derive(Clone, Debug)]
pub struct StaticStats {
    stats: AggregateStats,
    population: u64,
}

impl StaticStats {
    pub fn new(stats: AggregateStats, population: u64) -> Self {
        Self { stats, population }
    }

    pub fn fallback(population: u64) -> Self {
        Self::new(AggregateStats::FALLBACK, population)
    }
}

impl StatsSource for StaticStats {
    fn latest(&self) -> AggregateStats {
        self.stats
    }

    fn total_population(&self) -> u64 {
        self.population
    }
}

#[derive(Debug, Default, Deserialize)]
struct CachedRecord {
    confirmed: Option<u64>,
    dead: Option<u64>,
    recovered: Option<u64>,
    active: Option<u64>,
    timestamp: Option<u64>,
}

impl CachedRecord {
    fn merge_into(self, prev: AggregateStats) -> AggregateStats {
        let confirmed = self.confirmed.unwrap_or(prev.confirmed);
        let dead = self.dead.unwrap_or(prev.dead);
        let recovered = self.recovered.unwrap_or(prev.recovered);
        let active = self
            .active
            .unwrap_or_else(|| AggregateStats::derived_active(confirmed, dead, recovered));
        AggregateStats {
            confirmed,
            dead,
            recovered,
            active,
            timestamp: self.timestamp.unwrap_or(prev.timestamp),
        }
    }
}

/// Snapshot backed by the fetcher's cache file.
#[derive(Clone, Debug)]
pub struct CacheFileStats {
    path: PathBuf,
    current: AggregateStats,
    population: u64,
}

impl CacheFileStats {
    pub fn open(path: impl Into<PathBuf>, population: u64) -> Self {
        let mut s = Self {
            path: path.into(),
            current: AggregateStats::FALLBACK,
            population,
        };
        s.refresh();
        s
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Re-reads the cache file. Returns whether the snapshot was replaced.
    pub fn refresh(&mut self) -> bool {
        let text = match fs::read_to_string(&self.path) {
            Ok(t) => t,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "stats cache unreadable, keeping last-known-good");
                return false;
            }
        };

        match serde_json::from_str::<CachedRecord>(&text) {
            Ok(rec) => {
                self.current = rec.merge_into(self.current);
                debug!(
                    confirmed = self.current.confirmed,
                    dead = self.current.dead,
                    recovered = self.current.recovered,
                    active = self.current.active,
                    "stats cache loaded"
                );
                true
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "stats cache malformed, keeping last-known-good");
                false
            }
        }
    }
}

impl StatsSource for CacheFileStats {
    fn latest(&self) -> AggregateStats {
        self.current
    }

    fn total_population(&self) -> u64 {
        self.population
    }
}

/// Whichever source the host was started with.
#[derive(Clone, Debug)]
pub enum StatsFeed {
    Fixed(StaticStats),
    Cache(CacheFileStats),
}

impl StatsFeed {
    pub fn from_path(path: Option<&Path>, population: u64) -> Self {
        match path {
            Some(p) => {
                let cache = CacheFileStats::open(p, population);
                info!(path = %cache.path().display(), "reading stats from cache file");
                StatsFeed::Cache(cache)
            }
            None => StatsFeed::Fixed(StaticStats::fallback(population)),
        }
    }

    pub fn refresh(&mut self) -> bool {
        match self {
            StatsFeed::Fixed(_) => false,
            StatsFeed::Cache(c) => c.refresh(),
        }
    }
}

impl StatsSource for StatsFeed {
    fn latest(&self) -> AggregateStats {
        match self {
            StatsFeed::Fixed(s) => s.latest(),
            StatsFeed::Cache(c) => c.latest(),
        }
    }

    fn total_population(&self) -> u64 {
        match self {
            StatsFeed::Fixed(s) => s.total_population(),
            StatsFeed::Cache(c) => c.total_population(),
        }
    }
}
