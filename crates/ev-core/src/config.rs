//! Run configuration.
//!
//! One immutable `EvacConfig` value describes a whole run.  The driver builds
//! it (or deserializes it from JSON with the `serde` feature) and every
//! component receives it, or the slice of it it needs, at construction.
//! Nothing reads configuration from ambient module state.

use crate::{EvError, EvResult, Position};

/// How the winner of a contested cell is drawn.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ConflictPolicy {
    /// Weighted by the probability mass each contender's move was sampled
    /// with, renormalized over just the contenders.
    #[default]
    MassWeighted,
    /// Every contender is equally likely to win.
    Uniform,
}

/// A rectangular room: wall perimeter with a single door cell.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoomSpec {
    /// Top-left corner of the perimeter.
    pub start: Position,
    /// `(rows, cols)` extent including the walls.
    pub size: (i32, i32),
    /// The door, which must lie on the perimeter.
    pub door: Position,
}

/// Top-level simulation configuration.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EvacConfig {
    /// Grid columns.
    pub width: i32,
    /// Grid rows.
    pub height: i32,

    /// Exit cells.  An agent stepping onto one has evacuated.
    pub exits: Vec<Position>,

    /// Rooms carved into the grid before agents are placed.
    pub rooms: Vec<RoomSpec>,

    /// Free-standing wall cells (pillars, partitions) added after the rooms.
    pub walls: Vec<Position>,

    /// Agents placed uniformly at random on empty cells.
    pub agent_count: usize,

    /// Master RNG seed.  The same seed always produces identical runs.
    pub seed: u64,

    /// Direction preference relative to "straight ahead" (row 0, col 1).
    pub base_preference: [[f64; 3]; 3],

    /// Amplification applied to the static term before exponentiation.
    pub preference_tilt: f64,

    /// Dynamic-field diffusion coefficient (α).
    pub diffusion: f64,

    /// Dynamic-field decay rate (δ) applied as `× (1 − δ)` per tick.
    pub decay: f64,

    /// Half-width of the congestion window.
    pub congestion_radius: i32,

    /// Occupied cells in the window above which a cell counts as congested.
    pub congestion_threshold: usize,

    /// Extra edge cost per occupied cell near the neighbour in
    /// congestion-aware searches.
    pub congestion_cost: f64,

    /// Cost of a diagonal step (orthogonal steps cost 1).
    pub diagonal_cost: f64,

    /// Chebyshev radius within which an agent counts as near its exit.
    pub near_exit_radius: i32,

    /// The path cache is cleared on every non-zero multiple of this tick.
    pub cache_eviction_interval: u64,

    pub conflict_policy: ConflictPolicy,

    /// Hard stop for runs whose population cannot drain.  `None` runs until
    /// every agent has evacuated.
    pub max_ticks: Option<u64>,

    /// Worker thread count passed to Rayon.  `None` uses all logical cores.
    pub num_threads: Option<usize>,
}

impl Default for EvacConfig {
    /// The reference scenario: a 50×50 floor, three exits, three rooms.
    fn default() -> Self {
        let width = 50;
        let height = 50;
        Self {
            width,
            height,
            exits: vec![
                Position::new(30, 0),
                Position::new(height - 1, width / 2),
                Position::new(30, 49),
            ],
            rooms: vec![
                RoomSpec {
                    start: Position::new(height - 15, 5),
                    size:  (15, 15),
                    door:  Position::new(height - 15, 12),
                },
                RoomSpec {
                    start: Position::new(height - 15, 30),
                    size:  (15, 20),
                    door:  Position::new(height - 15, 40),
                },
                RoomSpec {
                    start: Position::new(0, 10),
                    size:  (25, 20),
                    door:  Position::new(24, 20),
                },
            ],
            walls: Vec::new(),
            agent_count: 100,
            seed: 42,
            base_preference: [
                [0.055, 0.85, 0.055],
                [0.01,  0.0,  0.01],
                [0.007, 0.006, 0.007],
            ],
            preference_tilt: 5.0,
            diffusion: 0.1,
            decay: 0.3,
            congestion_radius: 2,
            congestion_threshold: 3,
            congestion_cost: 0.7,
            diagonal_cost: 1.4,
            near_exit_radius: 3,
            cache_eviction_interval: 3,
            conflict_policy: ConflictPolicy::MassWeighted,
            max_ticks: None,
            num_threads: None,
        }
    }
}

impl EvacConfig {
    /// An open `height × width` floor with the given exits and no rooms.
    pub fn open_floor(width: i32, height: i32, exits: Vec<Position>) -> Self {
        Self {
            width,
            height,
            exits,
            rooms: Vec::new(),
            ..Self::default()
        }
    }

    /// `true` if `pos` lies inside the configured extent.
    #[inline]
    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.row >= 0 && pos.col >= 0 && pos.row < self.height && pos.col < self.width
    }

    /// Reject configurations the simulation cannot run.
    pub fn validate(&self) -> EvResult<()> {
        if self.width <= 0 || self.height <= 0 {
            return Err(EvError::Config(format!(
                "grid must be non-empty, got {}x{}",
                self.height, self.width
            )));
        }
        if self.exits.is_empty() {
            return Err(EvError::Config("at least one exit is required".into()));
        }
        if let Some(&exit) = self.exits.iter().find(|&&e| !self.in_bounds(e)) {
            return Err(EvError::OutOfBounds(exit));
        }
        if let Some(&wall) = self.walls.iter().find(|&&w| !self.in_bounds(w)) {
            return Err(EvError::OutOfBounds(wall));
        }

        if self.base_preference.iter().flatten().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(EvError::Config(
                "base preference weights must be finite and non-negative".into(),
            ));
        }
        for (name, value) in [
            ("preference_tilt", self.preference_tilt),
            ("diffusion", self.diffusion),
            ("congestion_cost", self.congestion_cost),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(EvError::Config(format!("{name} must be finite and >= 0, got {value}")));
            }
        }
        if !(0.0..=1.0).contains(&self.decay) {
            return Err(EvError::Config(format!("decay must lie in [0, 1], got {}", self.decay)));
        }
        if !self.diagonal_cost.is_finite() || self.diagonal_cost < 1.0 {
            return Err(EvError::Config(format!(
                "diagonal_cost must be finite and >= 1, got {}",
                self.diagonal_cost
            )));
        }
        if self.congestion_radius < 0 || self.near_exit_radius < 0 {
            return Err(EvError::Config("radii must be non-negative".into()));
        }
        if self.cache_eviction_interval == 0 {
            return Err(EvError::Config("cache_eviction_interval must be at least 1".into()));
        }
        if self.num_threads == Some(0) {
            return Err(EvError::Config("num_threads must be at least 1".into()));
        }
        Ok(())
    }
}
