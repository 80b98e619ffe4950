//! The closed set of states a grid cell can be in.

use std::fmt;

/// State of one lattice cell.  Exactly one state per cell at all times.
///
/// The discriminants are the wire encoding handed to renderers:
/// `0 = Empty, 1 = Occupied, 2 = Exit, 3 = Wall`.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum CellState {
    #[default]
    Empty    = 0,
    Occupied = 1,
    Exit     = 2,
    Wall     = 3,
}

impl CellState {
    /// Renderer encoding.
    #[inline]
    pub fn code(self) -> u8 {
        self as u8
    }

    /// `true` for cells a pedestrian may step onto right now.
    #[inline]
    pub fn is_enterable(self) -> bool {
        match self {
            CellState::Empty | CellState::Exit => true,
            CellState::Occupied | CellState::Wall => false,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CellState::Empty    => "empty",
            CellState::Occupied => "occupied",
            CellState::Exit     => "exit",
            CellState::Wall     => "wall",
        }
    }
}

impl TryFrom<u8> for CellState {
    type Error = u8;

    fn try_from(code: u8) -> Result<Self, u8> {
        match code {
            0 => Ok(CellState::Empty),
            1 => Ok(CellState::Occupied),
            2 => Ok(CellState::Exit),
            3 => Ok(CellState::Wall),
            other => Err(other),
        }
    }
}

impl fmt::Display for CellState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
