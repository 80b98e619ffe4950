//! `Pedestrian` — one agent's state and the helpers that turn a route into
//! a sampled move.
//!
//! A pedestrian never touches the grid.  During the intent phase it reads
//! the grid to decide where it would like to go and records that wish in
//! `preferred_next` together with the probability mass it was drawn with;
//! the commit phase decides whether the wish is granted.

use ev_core::{AgentId, AgentRng, CellState, MOVES, Offset, Position};
use ev_field::PreferenceMatrix;
use ev_grid::{Grid, Path};

/// Per-agent simulation state.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pedestrian {
    pub id:       AgentId,
    /// Current cell.  Mirrored as `Occupied` in the grid.
    pub position: Position,

    /// Exit (or room door) the agent is heading for.  `None` until the first
    /// decision.
    pub chosen_exit: Option<Position>,

    /// Direction of the first step along the current route.  Survives ticks
    /// in which no route is available.
    pub preferred_move: Option<Offset>,

    /// Cell proposed for this tick; equal to `position` when staying.
    pub preferred_next: Position,

    /// Probability the proposed move had in the (unmasked) preference
    /// distribution.  Conflict resolution weights contenders by it.
    pub mass: f64,
}

impl Pedestrian {
    pub fn new(id: AgentId, position: Position) -> Self {
        Self {
            id,
            position,
            chosen_exit:    None,
            preferred_move: None,
            preferred_next: position,
            mass:           0.0,
        }
    }

    /// `true` if both the row and column offsets to the chosen exit are
    /// within `radius`.  Always `false` without a chosen exit.
    pub fn is_near_exit(&self, radius: i32) -> bool {
        self.chosen_exit
            .is_some_and(|exit| self.position.chebyshev(exit) <= radius.max(0) as u32)
    }

    /// The door of the room the agent is standing in, or `None` when
    /// outside every room.  Standing on a door counts as outside.
    pub fn is_inside_room(&self, grid: &Grid) -> Option<Position> {
        grid.room_containing(self.position).map(|room| room.door)
    }

    /// Which of the nine relative moves land on an in-bounds cell that is
    /// neither a wall nor occupied.  Staying put is always feasible.
    pub fn feasible_moves(&self, grid: &Grid) -> [[bool; 3]; 3] {
        let mut out = [[false; 3]; 3];
        for (i, row) in MOVES.iter().enumerate() {
            for (j, &offset) in row.iter().enumerate() {
                out[i][j] = offset.is_zero()
                    || matches!(
                        grid.state(self.position.offset(offset)),
                        Some(CellState::Empty | CellState::Exit)
                    );
            }
        }
        out
    }

    /// Point `preferred_move` at the first step of `path`.
    ///
    /// Paths of one cell or fewer leave the previous preference in place.
    pub fn best_move_from_path(&mut self, path: &Path) {
        if let [first, second, ..] = path.cells() {
            self.preferred_move = Some(first.delta_to(*second));
        }
    }

    /// Draw one move from `matrix` with infeasible moves masked out, record
    /// it as this tick's intent, and return it.
    ///
    /// `matrix` is expected to be normalized; the recorded `mass` is the
    /// chosen cell's value in it.  If no feasible move has any weight the
    /// agent stays.
    pub fn sample_move(
        &mut self,
        matrix:   &PreferenceMatrix,
        feasible: &[[bool; 3]; 3],
        rng:      &mut AgentRng,
    ) -> Offset {
        let weights = matrix.masked(feasible).flatten();
        let (row, col) = match rng.choose_weighted(&weights) {
            Some(k) => (k / 3, k % 3),
            None => (1, 1),
        };
        let offset = MOVES[row][col];
        self.preferred_next = self.position.offset(offset);
        self.mass = matrix.get(row, col);
        offset
    }

    /// Withdraw this tick's intent; the agent stays where it is.
    #[inline]
    pub fn stay(&mut self) {
        self.preferred_next = self.position;
    }

    /// `true` if the current intent leaves the cell.
    #[inline]
    pub fn is_moving(&self) -> bool {
        self.preferred_next != self.position
    }
}
