//! Path-planning trait and the default A* implementation.
//!
//! # Pluggability
//!
//! The simulation calls routing through the [`PathPlanner`] trait so a
//! different search (flow fields, jump-point search) can be swapped in
//! without touching the rest of the engine.  The default [`AStarPlanner`]
//! is an 8-connected A* with a Euclidean heuristic.
//!
//! # Cost model
//!
//! | Step        | Cost                                                     |
//! |-------------|----------------------------------------------------------|
//! | orthogonal  | 1.0                                                      |
//! | diagonal    | `diagonal_cost` (1.4 by default)                         |
//! | into a wall | excluded                                                 |
//! | congestion  | `+ occupied_in_window(neighbour, radius) · congestion_cost` |
//!
//! Equal f-scores are popped in insertion order, so a search is fully
//! deterministic for a given grid state.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::ops::Deref;
use std::sync::Arc;

use ev_core::{EvacConfig, Position};

use crate::Grid;

// ── Path ──────────────────────────────────────────────────────────────────────

/// An ordered cell sequence from start to goal, both inclusive.
///
/// Empty when the goal is unreachable.  Cheap to clone: the cells are shared.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Path(Arc<[Position]>);

impl Path {
    pub fn new(cells: Vec<Position>) -> Self {
        Path(cells.into())
    }

    /// The "no route" path.
    pub fn empty() -> Self {
        Path(Arc::from(Vec::new()))
    }

    pub fn cells(&self) -> &[Position] {
        &self.0
    }

    /// The cell after the start, if the path has more than one cell.
    pub fn next_step(&self) -> Option<Position> {
        self.0.get(1).copied()
    }

    /// Goal cell.
    pub fn goal(&self) -> Option<Position> {
        self.0.last().copied()
    }

    /// The same cells in the opposite direction.
    pub fn reversed(&self) -> Path {
        let mut cells = self.0.to_vec();
        cells.reverse();
        Path::new(cells)
    }

    /// `true` if both values share the same allocation.
    pub fn ptr_eq(&self, other: &Path) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Deref for Path {
    type Target = [Position];
    fn deref(&self) -> &[Position] {
        &self.0
    }
}

// ── PathPlanner trait ─────────────────────────────────────────────────────────

/// Which edge costs a search uses.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum CostMode {
    /// Geometric cost only; used to build static fields.
    Plain,
    /// Geometric cost plus local occupancy; used for live replanning.
    Congestion,
}

/// Pluggable path search.
///
/// # Thread safety
///
/// Implementations must be `Send + Sync` so they can be shared across Rayon
/// workers while static fields are filled in parallel.
pub trait PathPlanner: Send + Sync {
    /// Route from `from` to `to`.  Returns [`Path::empty`] if `to` cannot be
    /// reached; `from == to` yields a one-cell path.
    fn plan(&self, grid: &Grid, from: Position, to: Position, mode: CostMode) -> Path;
}

// ── AStarPlanner ──────────────────────────────────────────────────────────────

/// 8-connected A* over the grid.
#[derive(Clone, Debug)]
pub struct AStarPlanner {
    pub diagonal_cost:     f64,
    pub congestion_cost:   f64,
    pub congestion_radius: i32,
}

impl Default for AStarPlanner {
    fn default() -> Self {
        Self {
            diagonal_cost:     1.4,
            congestion_cost:   0.7,
            congestion_radius: 2,
        }
    }
}

impl AStarPlanner {
    pub fn from_config(config: &EvacConfig) -> Self {
        Self {
            diagonal_cost:     config.diagonal_cost,
            congestion_cost:   config.congestion_cost,
            congestion_radius: config.congestion_radius,
        }
    }

    /// Cost of stepping from `current` to its neighbour `next`.
    #[inline]
    fn step_cost(&self, grid: &Grid, current: Position, next: Position, mode: CostMode) -> f64 {
        let base = if current.delta_to(next).is_diagonal() {
            self.diagonal_cost
        } else {
            1.0
        };
        match mode {
            CostMode::Plain => base,
            CostMode::Congestion => {
                let crowd = grid.occupied_in_window(next, self.congestion_radius);
                base + crowd as f64 * self.congestion_cost
            }
        }
    }
}

impl PathPlanner for AStarPlanner {
    fn plan(&self, grid: &Grid, from: Position, to: Position, mode: CostMode) -> Path {
        astar(self, grid, from, to, mode)
    }
}

// ── A* internals ──────────────────────────────────────────────────────────────

/// Open-set entry.  Ordered by f-score, then by insertion sequence.
#[derive(Copy, Clone, Debug)]
struct Frontier {
    f:    f64,
    seq:  u64,
    g:    f64,
    cell: usize,
}

impl PartialEq for Frontier {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Frontier {}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        self.f
            .total_cmp(&other.f)
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

fn astar(planner: &AStarPlanner, grid: &Grid, from: Position, to: Position, mode: CostMode) -> Path {
    let (Some(start), Some(goal)) = (grid.index(from), grid.index(to)) else {
        return Path::empty();
    };
    if grid.is_wall(to) {
        return Path::empty();
    }
    if start == goal {
        return Path::new(vec![from]);
    }

    let n = grid.len();
    let mut g_score   = vec![f64::INFINITY; n];
    let mut came_from = vec![usize::MAX; n];

    // Min-heap via Reverse; `seq` breaks f-score ties in insertion order.
    let mut open: BinaryHeap<Reverse<Frontier>> = BinaryHeap::new();
    let mut seq = 0u64;

    g_score[start] = 0.0;
    open.push(Reverse(Frontier { f: from.euclidean(to), seq, g: 0.0, cell: start }));

    while let Some(Reverse(entry)) = open.pop() {
        if entry.cell == goal {
            return reconstruct(grid, &came_from, start, goal);
        }

        // Skip stale heap entries.
        if entry.g > g_score[entry.cell] {
            continue;
        }

        let current = grid.position(entry.cell);
        for next in grid.neighbors(current) {
            let Some(ni) = grid.index(next) else { continue };
            let tentative = entry.g + planner.step_cost(grid, current, next, mode);
            if tentative < g_score[ni] {
                g_score[ni]   = tentative;
                came_from[ni] = entry.cell;
                seq += 1;
                open.push(Reverse(Frontier {
                    f:    tentative + next.euclidean(to),
                    seq,
                    g:    tentative,
                    cell: ni,
                }));
            }
        }
    }

    Path::empty()
}

fn reconstruct(grid: &Grid, came_from: &[usize], start: usize, goal: usize) -> Path {
    let mut cells = vec![grid.position(goal)];
    let mut cur = goal;
    while cur != start {
        cur = came_from[cur];
        cells.push(grid.position(cur));
    }
    cells.reverse();
    Path::new(cells)
}
