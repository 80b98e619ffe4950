//! `StaticField` — per-cell shortest routes toward every target.
//!
//! # Storage
//!
//! One small `Vec<StaticFieldEntry>` per grid cell, indexed row-major like
//! the grid itself.  A cell rarely has more than a handful of targets (the
//! global exits, or its room's door), so lookups scan linearly.
//!
//! Entries are computed lazily the first time an agent stands on a cell and
//! never change afterwards: the field ignores occupancy, so walls are the
//! only thing that could invalidate it and walls are fixed once the run
//! starts.
//!
//! # Parallel fill
//!
//! [`StaticField::missing`] lists the `(cell, target)` pairs still to do and
//! [`StaticField::compute_entry`] is a pure function of the grid, so a caller
//! can fan the searches out over a thread pool and feed the results back
//! through [`StaticField::insert`].

use ev_core::{AgentRng, Position};
use ev_grid::{CostMode, Grid, Path, PathPlanner};

use crate::{FieldError, FieldResult};

/// The route from one cell to one target.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StaticFieldEntry {
    pub target: Position,
    /// Cell → target, both inclusive.  Empty when the target is unreachable.
    pub path:   Path,
    /// Number of cells on `path` (start included); 0 when unreachable.
    pub steps:  usize,
}

impl StaticFieldEntry {
    #[inline]
    pub fn is_reachable(&self) -> bool {
        self.steps > 0
    }
}

/// Lazily filled table of `(cell, target) → StaticFieldEntry`.
#[derive(Clone, Debug)]
pub struct StaticField {
    width:   i32,
    height:  i32,
    entries: Vec<Vec<StaticFieldEntry>>,
    len:     usize,
}

impl StaticField {
    /// An empty field sized to `grid`.
    pub fn new(grid: &Grid) -> Self {
        Self {
            width:   grid.width(),
            height:  grid.height(),
            entries: vec![Vec::new(); grid.len()],
            len:     0,
        }
    }

    fn index(&self, cell: Position) -> Option<usize> {
        let in_bounds =
            cell.row >= 0 && cell.col >= 0 && cell.row < self.height && cell.col < self.width;
        in_bounds.then(|| (cell.row * self.width + cell.col) as usize)
    }

    /// Search toward `cell` from `target` with plain costs and return the
    /// route reversed to run cell → target.
    pub fn compute_entry<P: PathPlanner + ?Sized>(
        grid:    &Grid,
        planner: &P,
        cell:    Position,
        target:  Position,
    ) -> StaticFieldEntry {
        let path = planner.plan(grid, target, cell, CostMode::Plain).reversed();
        let steps = path.len();
        StaticFieldEntry { target, path, steps }
    }

    /// Targets in `targets` that have no entry at `cell` yet.
    pub fn missing<'a>(
        &'a self,
        cell:    Position,
        targets: &'a [Position],
    ) -> impl Iterator<Item = Position> + 'a {
        targets
            .iter()
            .copied()
            .filter(move |&t| self.entry(cell, t).is_none())
    }

    /// Store `entry` at `cell` unless one for the same target already
    /// exists.  Returns `true` if it was stored.
    pub fn insert(&mut self, cell: Position, entry: StaticFieldEntry) -> bool {
        let Some(i) = self.index(cell) else {
            return false;
        };
        let slot = &mut self.entries[i];
        if slot.iter().any(|e| e.target == entry.target) {
            return false;
        }
        slot.push(entry);
        self.len += 1;
        true
    }

    /// Compute every missing `(cell, target)` entry.  Returns how many
    /// searches ran; calling it again with the same arguments returns 0.
    pub fn ensure_computed<P: PathPlanner + ?Sized>(
        &mut self,
        grid:    &Grid,
        planner: &P,
        cell:    Position,
        targets: &[Position],
    ) -> usize {
        let todo: Vec<Position> = self.missing(cell, targets).collect();
        let mut computed = 0;
        for target in todo {
            if self.insert(cell, Self::compute_entry(grid, planner, cell, target)) {
                computed += 1;
            }
        }
        computed
    }

    pub fn entry(&self, cell: Position, target: Position) -> Option<&StaticFieldEntry> {
        self.index(cell)
            .and_then(|i| self.entries[i].iter().find(|e| e.target == target))
    }

    /// Every entry computed for `cell`, in insertion order.
    pub fn entries(&self, cell: Position) -> &[StaticFieldEntry] {
        match self.index(cell) {
            Some(i) => &self.entries[i],
            None => &[],
        }
    }

    /// Total number of stored entries across all cells.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Probability of picking each of `targets` from `cell`.
    ///
    /// Weight of target *i* is `(1 / steps_i) / (1 / Σ steps)`, renormalized
    /// over the targets, so nearer targets win more than proportionally.
    /// Unreachable targets get 0.  If nothing is reachable every entry is 0.
    ///
    /// # Errors
    ///
    /// [`FieldError::MissingEntry`] if [`ensure_computed`](Self::ensure_computed)
    /// has not run for one of the targets.
    pub fn exit_choice_probabilities(
        &self,
        cell:    Position,
        targets: &[Position],
    ) -> FieldResult<Vec<f64>> {
        let steps = targets
            .iter()
            .map(|&target| {
                self.entry(cell, target)
                    .map(|e| e.steps)
                    .ok_or(FieldError::MissingEntry { cell, target })
            })
            .collect::<FieldResult<Vec<usize>>>()?;

        let sum_steps: usize = steps.iter().sum();
        if sum_steps == 0 {
            return Ok(vec![0.0; targets.len()]);
        }

        let inv_sum = 1.0 / sum_steps as f64;
        let raw: Vec<f64> = steps
            .iter()
            .map(|&s| if s == 0 { 0.0 } else { (1.0 / s as f64) / inv_sum })
            .collect();
        let total: f64 = raw.iter().sum();
        Ok(raw.into_iter().map(|p| p / total).collect())
    }

    /// Draw one of `targets` at `cell` with the given probabilities.
    ///
    /// Returns `Ok(None)` when every probability is zero.
    pub fn select_field(
        &self,
        cell:          Position,
        targets:       &[Position],
        probabilities: &[f64],
        rng:           &mut AgentRng,
    ) -> FieldResult<Option<&StaticFieldEntry>> {
        if probabilities.len() != targets.len() {
            return Err(FieldError::ProbabilityMismatch {
                expected: targets.len(),
                got:      probabilities.len(),
            });
        }
        let Some(i) = rng.choose_weighted(probabilities) else {
            return Ok(None);
        };
        let target = targets[i];
        self.entry(cell, target)
            .map(Some)
            .ok_or(FieldError::MissingEntry { cell, target })
    }
}
