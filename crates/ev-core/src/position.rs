//! Lattice coordinates and relative moves.
//!
//! Coordinates are signed so that offset arithmetic never underflows; bounds
//! are checked by the grid, which owns the `(height, width)` extent.

use std::fmt;

/// A cell on the lattice, addressed as `(row, col)`.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub row: i32,
    pub col: i32,
}

impl Position {
    #[inline]
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// The cell reached by applying `offset`.  May lie outside the grid.
    #[inline]
    pub fn offset(self, offset: Offset) -> Position {
        Position::new(self.row + offset.dr, self.col + offset.dc)
    }

    /// Relative move from `self` to `other`.
    #[inline]
    pub fn delta_to(self, other: Position) -> Offset {
        Offset::new(other.row - self.row, other.col - self.col)
    }

    /// Chebyshev (king-move) distance.
    #[inline]
    pub fn chebyshev(self, other: Position) -> u32 {
        (self.row - other.row)
            .unsigned_abs()
            .max((self.col - other.col).unsigned_abs())
    }

    /// Straight-line distance, used as the A* heuristic.
    #[inline]
    pub fn euclidean(self, other: Position) -> f64 {
        let dr = f64::from(self.row - other.row);
        let dc = f64::from(self.col - other.col);
        (dr * dr + dc * dc).sqrt()
    }
}

impl From<(i32, i32)> for Position {
    fn from((row, col): (i32, i32)) -> Self {
        Position::new(row, col)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

// ── Offset ────────────────────────────────────────────────────────────────────

/// A relative move `(dr, dc)`.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Offset {
    pub dr: i32,
    pub dc: i32,
}

impl Offset {
    pub const ZERO: Offset = Offset::new(0, 0);

    #[inline]
    pub const fn new(dr: i32, dc: i32) -> Self {
        Self { dr, dc }
    }

    #[inline]
    pub fn is_zero(self) -> bool {
        self.dr == 0 && self.dc == 0
    }

    #[inline]
    pub fn is_diagonal(self) -> bool {
        self.dr != 0 && self.dc != 0
    }

    /// Cell of a 3×3 matrix centred on the mover that this unit move lands
    /// in, as `(row, col)`.  `None` for moves longer than one step.
    pub fn matrix_cell(self) -> Option<(usize, usize)> {
        if self.dr.abs() > 1 || self.dc.abs() > 1 {
            return None;
        }
        Some(((self.dr + 1) as usize, (self.dc + 1) as usize))
    }
}

/// The nine relative moves laid out like the preference matrix: row 0 is
/// "up" (`dr = -1`), the centre is "stay".
pub const MOVES: [[Offset; 3]; 3] = [
    [Offset::new(-1, -1), Offset::new(-1, 0), Offset::new(-1, 1)],
    [Offset::new(0, -1),  Offset::new(0, 0),  Offset::new(0, 1)],
    [Offset::new(1, -1),  Offset::new(1, 0),  Offset::new(1, 1)],
];
