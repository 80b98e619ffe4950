//! The occupancy grid.
//!
//! # Storage
//!
//! Cell states live in one dense row-major `Vec<CellState>`; the value at
//! `row * width + col` is the single source of truth for that cell.  An
//! occupied-cell counter is maintained alongside so the
//! "occupied cells == live agents" invariant can be checked in O(1).
//!
//! The grid never decides anything.  It changes only through exit/room
//! setup before the run and through [`Grid::vacate`] / [`Grid::occupy`]
//! during the commit phase.

use ev_core::{CellState, EvacConfig, Position, SimRng, Tick};

use crate::{GridError, GridResult};

/// Relative 8-neighbourhood, orthogonal moves first.
const NEIGHBOUR_OFFSETS: [(i32, i32); 8] = [
    (0, 1), (0, -1), (1, 0), (-1, 0),
    (1, 1), (1, -1), (-1, 1), (-1, -1),
];

// ── Room ──────────────────────────────────────────────────────────────────────

/// An axis-aligned walled room with one door.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Room {
    /// Top-left corner of the perimeter (inclusive).
    pub start: Position,
    /// Bottom-right bound (exclusive).
    pub end: Position,
    /// The open cell in the perimeter.
    pub door: Position,
}

impl Room {
    /// `true` if `pos` lies within the room's bounding box, walls included.
    #[inline]
    pub fn contains(&self, pos: Position) -> bool {
        pos.row >= self.start.row
            && pos.row < self.end.row
            && pos.col >= self.start.col
            && pos.col < self.end.col
    }

    /// `true` if `pos` lies on the wall perimeter.
    pub fn on_perimeter(&self, pos: Position) -> bool {
        self.contains(pos)
            && (pos.row == self.start.row
                || pos.row == self.end.row - 1
                || pos.col == self.start.col
                || pos.col == self.end.col - 1)
    }

    fn intersects(&self, other: &Room) -> bool {
        self.start.row < other.end.row
            && other.start.row < self.end.row
            && self.start.col < other.end.col
            && other.start.col < self.end.col
    }
}

// ── Frame ─────────────────────────────────────────────────────────────────────

/// An owned copy of the grid handed to renderers once per tick.
///
/// Cells use the 4-valued encoding `0 = Empty, 1 = Occupied, 2 = Exit,
/// 3 = Wall`, row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Frame {
    /// Visual step index.
    pub tick:   Tick,
    pub width:  i32,
    pub height: i32,
    pub cells:  Vec<u8>,
}

impl Frame {
    /// Encoded state at `(row, col)`, or `None` out of bounds.
    pub fn get(&self, row: i32, col: i32) -> Option<u8> {
        if row < 0 || col < 0 || row >= self.height || col >= self.width {
            return None;
        }
        self.cells.get((row * self.width + col) as usize).copied()
    }

    /// One grid row.
    pub fn row(&self, row: i32) -> &[u8] {
        let w = self.width as usize;
        let start = row as usize * w;
        &self.cells[start..start + w]
    }

    /// Number of cells carrying `state`.
    pub fn count(&self, state: CellState) -> usize {
        self.cells.iter().filter(|&&c| c == state.code()).count()
    }
}

// ── Grid ──────────────────────────────────────────────────────────────────────

/// Dense `height × width` lattice of [`CellState`]s plus room metadata.
#[derive(Clone, Debug)]
pub struct Grid {
    width:    i32,
    height:   i32,
    cells:    Vec<CellState>,
    rooms:    Vec<Room>,
    exits:    Vec<Position>,
    occupied: usize,
}

impl Grid {
    /// An all-empty grid.
    pub fn new(width: i32, height: i32) -> Self {
        let count = (width.max(0) as usize) * (height.max(0) as usize);
        Self {
            width,
            height,
            cells: vec![CellState::Empty; count],
            rooms: Vec::new(),
            exits: Vec::new(),
            occupied: 0,
        }
    }

    /// Build the floor described by `config`: exits first, then rooms.
    ///
    /// Agents are not placed; see [`Grid::set_agents`].
    pub fn from_config(config: &EvacConfig) -> GridResult<Self> {
        config.validate()?;
        let mut grid = Grid::new(config.width, config.height);
        grid.add_exits(&config.exits)?;
        for room in &config.rooms {
            grid.add_room(room.start, room.size, room.door)?;
        }
        grid.add_walls(&config.walls)?;
        Ok(grid)
    }

    // ── Geometry ──────────────────────────────────────────────────────────

    #[inline]
    pub fn width(&self) -> i32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.height
    }

    /// Total number of cells.
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[inline]
    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.row >= 0 && pos.col >= 0 && pos.row < self.height && pos.col < self.width
    }

    /// Row-major index of `pos`, or `None` out of bounds.
    #[inline]
    pub fn index(&self, pos: Position) -> Option<usize> {
        self.in_bounds(pos)
            .then(|| (pos.row * self.width + pos.col) as usize)
    }

    /// Inverse of [`Grid::index`].
    #[inline]
    pub fn position(&self, index: usize) -> Position {
        let w = self.width as usize;
        Position::new((index / w) as i32, (index % w) as i32)
    }

    // ── Queries ───────────────────────────────────────────────────────────

    /// State at `pos`, or `None` out of bounds.
    #[inline]
    pub fn state(&self, pos: Position) -> Option<CellState> {
        self.index(pos).map(|i| self.cells[i])
    }

    #[inline]
    pub fn is_wall(&self, pos: Position) -> bool {
        self.state(pos) == Some(CellState::Wall)
    }

    #[inline]
    pub fn is_occupied(&self, pos: Position) -> bool {
        self.state(pos) == Some(CellState::Occupied)
    }

    #[inline]
    pub fn is_exit(&self, pos: Position) -> bool {
        self.state(pos) == Some(CellState::Exit)
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    pub fn exits(&self) -> &[Position] {
        &self.exits
    }

    /// Number of `Occupied` cells.
    #[inline]
    pub fn occupied_count(&self) -> usize {
        self.occupied
    }

    /// Positions of every `Empty` cell in row-major order.
    pub fn free_cells(&self) -> Vec<Position> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, s)| **s == CellState::Empty)
            .map(|(i, _)| self.position(i))
            .collect()
    }

    /// In-bounds, non-wall cells among the 8 neighbours of `pos`.
    pub fn neighbors(&self, pos: Position) -> impl Iterator<Item = Position> + '_ {
        NEIGHBOUR_OFFSETS
            .iter()
            .map(move |&(dr, dc)| Position::new(pos.row + dr, pos.col + dc))
            .filter(move |&n| matches!(self.state(n), Some(s) if s != CellState::Wall))
    }

    /// Occupied cells in the `(2·radius + 1)²` window around `pos`, clipped
    /// to the grid.
    pub fn occupied_in_window(&self, pos: Position, radius: i32) -> usize {
        let r0 = (pos.row - radius).max(0);
        let r1 = (pos.row + radius).min(self.height - 1);
        let c0 = (pos.col - radius).max(0);
        let c1 = (pos.col + radius).min(self.width - 1);
        if r0 > r1 || c0 > c1 {
            return 0;
        }

        let mut count = 0;
        for row in r0..=r1 {
            let base = (row * self.width) as usize;
            count += self.cells[base + c0 as usize..=base + c1 as usize]
                .iter()
                .filter(|&&s| s == CellState::Occupied)
                .count();
        }
        count
    }

    /// `true` iff more than `threshold` cells in the window are occupied.
    #[inline]
    pub fn congestion_around(&self, pos: Position, radius: i32, threshold: usize) -> bool {
        self.occupied_in_window(pos, radius) > threshold
    }

    /// The room whose interior holds `pos`, with its door.
    ///
    /// Standing on a door counts as being outside every room.
    pub fn room_containing(&self, pos: Position) -> Option<&Room> {
        if self.rooms.iter().any(|r| r.door == pos) {
            return None;
        }
        self.rooms.iter().find(|r| r.contains(pos))
    }

    /// Renderer snapshot of the current state.
    pub fn snapshot(&self, tick: Tick) -> Frame {
        Frame {
            tick,
            width:  self.width,
            height: self.height,
            cells:  self.cells.iter().map(|s| s.code()).collect(),
        }
    }

    // ── Setup ─────────────────────────────────────────────────────────────

    /// Mark each position as an exit.
    pub fn add_exits(&mut self, exits: &[Position]) -> GridResult<()> {
        for &exit in exits {
            let i = self.index(exit).ok_or(GridError::OutOfBounds(exit))?;
            if self.cells[i] == CellState::Occupied {
                self.occupied -= 1;
            }
            self.cells[i] = CellState::Exit;
            if !self.exits.contains(&exit) {
                self.exits.push(exit);
            }
        }
        Ok(())
    }

    /// Carve a wall perimeter of `size = (rows, cols)` starting at `start`
    /// and open `door` in it.
    ///
    /// Exit cells on the perimeter stay exits.  Rooms may not overlap.
    pub fn add_room(&mut self, start: Position, size: (i32, i32), door: Position) -> GridResult<Room> {
        let (rows, cols) = size;
        let end = Position::new(start.row + rows, start.col + cols);
        if rows < 3 || cols < 3 || !self.in_bounds(start) || end.row > self.height || end.col > self.width {
            return Err(GridError::RoomOutOfBounds { start, rows, cols });
        }

        let room = Room { start, end, door };
        if !room.on_perimeter(door) {
            return Err(GridError::DoorNotOnPerimeter { start, door });
        }
        if self.rooms.iter().any(|r| r.intersects(&room)) {
            return Err(GridError::RoomOverlap(start));
        }

        let perimeter = (start.row..end.row)
            .flat_map(|row| (start.col..end.col).map(move |col| Position::new(row, col)))
            .filter(|&p| room.on_perimeter(p));
        let mut walls = Vec::new();
        for pos in perimeter {
            match self.state(pos) {
                Some(CellState::Occupied) => return Err(GridError::CellNotEmpty(pos)),
                Some(CellState::Exit) | None => {}
                Some(CellState::Empty) | Some(CellState::Wall) => walls.push(pos),
            }
        }
        for pos in walls {
            if let Some(i) = self.index(pos) {
                self.cells[i] = CellState::Wall;
            }
        }
        if let Some(i) = self.index(door) {
            if self.cells[i] == CellState::Wall {
                self.cells[i] = CellState::Empty;
            }
        }

        self.rooms.push(room);
        Ok(room)
    }

    /// Turn empty cells into walls.  Exits and occupied cells are refused.
    pub fn add_walls(&mut self, cells: &[Position]) -> GridResult<()> {
        for &pos in cells {
            let i = self.index(pos).ok_or(GridError::OutOfBounds(pos))?;
            match self.cells[i] {
                CellState::Empty | CellState::Wall => self.cells[i] = CellState::Wall,
                CellState::Occupied | CellState::Exit => return Err(GridError::CellNotEmpty(pos)),
            }
        }
        Ok(())
    }

    /// Place `n` agents on distinct, uniformly drawn `Empty` cells.
    ///
    /// Fails without touching the grid if fewer than `n` cells are free.
    pub fn set_agents(&mut self, n: usize, rng: &mut SimRng) -> GridResult<Vec<Position>> {
        let free = self.free_cells();
        if free.len() < n {
            return Err(GridError::InsufficientCapacity {
                requested: n,
                available: free.len(),
            });
        }

        let picked: Vec<Position> = rng
            .sample_indices(free.len(), n)
            .into_iter()
            .map(|i| free[i])
            .collect();
        for &pos in &picked {
            self.occupy(pos)?;
        }
        Ok(picked)
    }

    /// Place one agent at `pos`, which must be `Empty`.
    pub fn place_agent(&mut self, pos: Position) -> GridResult<()> {
        match self.state(pos) {
            None => Err(GridError::OutOfBounds(pos)),
            Some(CellState::Empty) => self.occupy(pos),
            Some(_) => Err(GridError::CellNotEmpty(pos)),
        }
    }

    // ── Commit-phase mutation ─────────────────────────────────────────────

    /// Clear an occupied cell.  Any other state is left untouched.
    pub fn vacate(&mut self, pos: Position) {
        if let Some(i) = self.index(pos) {
            if self.cells[i] == CellState::Occupied {
                self.cells[i] = CellState::Empty;
                self.occupied -= 1;
            }
        }
    }

    /// Mark an empty cell occupied.
    pub fn occupy(&mut self, pos: Position) -> GridResult<()> {
        let i = self.index(pos).ok_or(GridError::OutOfBounds(pos))?;
        match self.cells[i] {
            CellState::Empty => {
                self.cells[i] = CellState::Occupied;
                self.occupied += 1;
                Ok(())
            }
            CellState::Occupied | CellState::Exit | CellState::Wall => {
                Err(GridError::CellNotEmpty(pos))
            }
        }
    }
}
