//! `PathCache` — memoized congestion-aware routes.
//!
//! Keyed by `(agent position, target)`.  A hit returns the stored path even
//! if occupancy has changed since it was computed; staleness is bounded by
//! clearing the whole cache every `interval` ticks rather than tracking
//! which entries a move invalidates.

#[cfg(not(feature = "fx-hash"))]
use std::collections::HashMap;

#[cfg(feature = "fx-hash")]
use rustc_hash::FxHashMap as HashMap;

use ev_core::{Position, Tick};

use crate::{CostMode, Grid, Path, PathPlanner};

/// Hit/miss counters since construction.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits:      u64,
    pub misses:    u64,
    pub evictions: u64,
}

/// Route memo with wholesale periodic eviction.
#[derive(Debug)]
pub struct PathCache {
    entries:  HashMap<(Position, Position), Path>,
    interval: u64,
    stats:    CacheStats,
}

impl PathCache {
    /// A cache cleared on every non-zero multiple of `interval` ticks.
    pub fn new(interval: u64) -> Self {
        Self {
            entries:  HashMap::default(),
            interval,
            stats:    CacheStats::default(),
        }
    }

    /// Stored path for `(from, target)`, computing and storing it with a
    /// congestion-aware search on a miss.
    ///
    /// Between evictions the planner runs at most once per key.
    pub fn get_or_compute<P: PathPlanner + ?Sized>(
        &mut self,
        from:    Position,
        target:  Position,
        grid:    &Grid,
        planner: &P,
    ) -> Path {
        if let Some(path) = self.entries.get(&(from, target)) {
            self.stats.hits += 1;
            return path.clone();
        }
        self.stats.misses += 1;
        let path = planner.plan(grid, from, target, CostMode::Congestion);
        self.entries.insert((from, target), path.clone());
        path
    }

    /// Stored path without computing.
    pub fn get(&self, from: Position, target: Position) -> Option<&Path> {
        self.entries.get(&(from, target))
    }

    /// `true` if `(from, target)` is cached.
    pub fn contains(&self, from: Position, target: Position) -> bool {
        self.entries.contains_key(&(from, target))
    }

    /// Store a path computed elsewhere (e.g. by a parallel pre-phase).
    pub fn insert(&mut self, from: Position, target: Position, path: Path) {
        self.stats.misses += 1;
        self.entries.insert((from, target), path);
    }

    /// Clear everything if `tick` is a non-zero multiple of the interval.
    /// Returns `true` when the cache was cleared.
    pub fn evict_periodically(&mut self, tick: Tick) -> bool {
        if !tick.is_nonzero_multiple_of(self.interval) {
            return false;
        }
        self.clear();
        true
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.stats.evictions += 1;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }
}
