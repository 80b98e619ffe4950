//! `PreferenceMatrix` — a 3×3 distribution over the nine moves.
//!
//! Cell `(i, j)` holds the weight of moving by `(i − 1, j − 1)`; the centre
//! is "stay".  The configured base matrix assumes the agent is heading north
//! (row 0, col 1 is straight ahead).
//!
//! # Rotation
//!
//! Turning the base toward a [`Heading`] is a fixed permutation of the eight
//! border cells: walking the border clockwise from north, a heading `k`
//! steps of 45° round from north shifts every weight `k` places along the
//! ring.  The centre never moves.
//!
//! ```text
//!   ring index        N=0  NE=1  E=2  SE=3  S=4  SW=5  W=6  NW=7
//!   matrix cell     (0,1) (0,2) (1,2) (2,2) (2,1) (2,0) (1,0) (0,0)
//! ```

use ev_core::Offset;

/// Matrix cells of the border, clockwise from north.
const RING: [(usize, usize); 8] = [
    (0, 1), (0, 2), (1, 2), (2, 2),
    (2, 1), (2, 0), (1, 0), (0, 0),
];

// ── Heading ───────────────────────────────────────────────────────────────────

/// One of the eight compass octants.  North is "up" (`dr < 0`).
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum Heading {
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
    NW,
}

impl Heading {
    pub const ALL: [Heading; 8] = [
        Heading::N, Heading::NE, Heading::E, Heading::SE,
        Heading::S, Heading::SW, Heading::W, Heading::NW,
    ];

    /// Octant of an arbitrary move vector, `None` for the zero vector.
    ///
    /// A component counts only if it is at least half the other one, so
    /// `(−5, 1)` is north and `(−3, 2)` is north-east.
    pub fn from_offset(offset: Offset) -> Option<Heading> {
        if offset.is_zero() {
            return None;
        }
        let (ar, ac) = (offset.dr.abs(), offset.dc.abs());
        let vertical = if ac > 2 * ar { 0 } else { offset.dr.signum() };
        let horizontal = if ar > 2 * ac { 0 } else { offset.dc.signum() };

        Some(match (vertical, horizontal) {
            (-1, 0) => Heading::N,
            (-1, 1) => Heading::NE,
            (0, 1) => Heading::E,
            (1, 1) => Heading::SE,
            (1, 0) => Heading::S,
            (1, -1) => Heading::SW,
            (0, -1) => Heading::W,
            _ => Heading::NW,
        })
    }

    /// Clockwise 45° steps from north.
    #[inline]
    pub fn steps(self) -> usize {
        self as usize
    }

    /// The unit move pointing this way.
    pub fn offset(self) -> Offset {
        let (r, c) = RING[self.steps()];
        Offset::new(r as i32 - 1, c as i32 - 1)
    }
}

// ── PreferenceMatrix ──────────────────────────────────────────────────────────

#[derive(Copy, Clone, PartialEq, Debug, Default)]
pub struct PreferenceMatrix {
    cells: [[f64; 3]; 3],
}

impl PreferenceMatrix {
    pub const fn new(cells: [[f64; 3]; 3]) -> Self {
        Self { cells }
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.cells[row][col]
    }

    pub fn cells(&self) -> &[[f64; 3]; 3] {
        &self.cells
    }

    /// Row-major copy of the nine weights.
    pub fn flatten(&self) -> [f64; 9] {
        let mut out = [0.0; 9];
        for (i, value) in self.cells.iter().flatten().enumerate() {
            out[i] = *value;
        }
        out
    }

    pub fn sum(&self) -> f64 {
        self.cells.iter().flatten().sum()
    }

    /// Turn the matrix so its north weight points along `heading`.
    /// `None` returns an unrotated copy.
    pub fn rotate(&self, heading: Option<Heading>) -> Self {
        let Some(heading) = heading else {
            return *self;
        };
        let k = heading.steps();
        let mut out = *self;
        for (i, &(r, c)) in RING.iter().enumerate() {
            let (tr, tc) = RING[(i + k) % 8];
            out.cells[tr][tc] = self.cells[r][c];
        }
        out
    }

    /// Rotate toward the octant of `preferred`; zero or absent moves leave
    /// the matrix as it is.
    pub fn rotate_toward(&self, preferred: Option<Offset>) -> Self {
        self.rotate(preferred.and_then(Heading::from_offset))
    }

    /// `exp(dynamic) · exp(self · tilt)`, element-wise.
    pub fn combine(&self, dynamic: &[[f64; 3]; 3], tilt: f64) -> Self {
        let mut out = [[0.0; 3]; 3];
        for (i, row) in out.iter_mut().enumerate() {
            for (j, value) in row.iter_mut().enumerate() {
                *value = dynamic[i][j].exp() * (self.cells[i][j] * tilt).exp();
            }
        }
        Self::new(out)
    }

    /// Scale so the entries sum to 1.
    ///
    /// A zero or non-finite sum leaves the matrix untouched and returns
    /// `false`; the caller decides what an unusable distribution means.
    pub fn normalize(&mut self) -> bool {
        let sum = self.sum();
        if sum == 0.0 || !sum.is_finite() {
            return false;
        }
        for value in self.cells.iter_mut().flatten() {
            *value /= sum;
        }
        true
    }

    /// Copy with every cell whose `feasible` flag is `false` set to 0.
    pub fn masked(&self, feasible: &[[bool; 3]; 3]) -> Self {
        let mut out = *self;
        for (i, row) in out.cells.iter_mut().enumerate() {
            for (j, value) in row.iter_mut().enumerate() {
                if !feasible[i][j] {
                    *value = 0.0;
                }
            }
        }
        out
    }
}

impl From<[[f64; 3]; 3]> for PreferenceMatrix {
    fn from(cells: [[f64; 3]; 3]) -> Self {
        Self::new(cells)
    }
}
