//! Grid-subsystem error type.

use thiserror::Error;

use ev_core::{EvError, Position};

/// Errors produced by `ev-grid`.
#[derive(Debug, Error)]
pub enum GridError {
    #[error("position {0} is outside the grid")]
    OutOfBounds(Position),

    #[error("requested {requested} agents but only {available} free cells exist")]
    InsufficientCapacity { requested: usize, available: usize },

    #[error("cell {0} is not empty")]
    CellNotEmpty(Position),

    #[error("room at {start} with size {rows}x{cols} does not fit inside the grid")]
    RoomOutOfBounds { start: Position, rows: i32, cols: i32 },

    #[error("room at {0} overlaps an existing room")]
    RoomOverlap(Position),

    #[error("door {door} is not on the perimeter of the room at {start}")]
    DoorNotOnPerimeter { start: Position, door: Position },

    #[error(transparent)]
    Core(#[from] EvError),
}

pub type GridResult<T> = Result<T, GridError>;
