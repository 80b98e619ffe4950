//! Plain data row types written by output backends.

use ev_agent::Pedestrian;
use ev_core::{AgentId, Tick};
use ev_grid::Frame;
use ev_sim::TickStats;

/// Marker for "no exit chosen" in the `exit_*` columns.
pub const NO_EXIT: i32 = -1;

/// One agent's cell at a given tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentSnapshotRow {
    pub agent_id: u32,
    pub tick:     u64,
    pub row:      i32,
    pub col:      i32,
    /// Target exit or door; [`NO_EXIT`] when none has been chosen.
    pub exit_row: i32,
    pub exit_col: i32,
}

impl AgentSnapshotRow {
    pub fn new(tick: Tick, ped: &Pedestrian) -> Self {
        let (exit_row, exit_col) = ped.chosen_exit.map_or((NO_EXIT, NO_EXIT), |e| (e.row, e.col));
        Self {
            agent_id: ped.id.0,
            tick:     tick.0,
            row:      ped.position.row,
            col:      ped.position.col,
            exit_row,
            exit_col,
        }
    }
}

/// Counters for one committed tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickSummaryRow {
    pub tick:              u64,
    pub remaining:         u64,
    pub evacuated:         u64,
    pub moved:             u64,
    pub unreachable:       u64,
    pub conflict_cells:    u64,
    pub resolution_rounds: u64,
    pub cache_size:        u64,
}

impl From<&TickStats> for TickSummaryRow {
    fn from(s: &TickStats) -> Self {
        Self {
            tick:              s.tick.0,
            remaining:         s.remaining as u64,
            evacuated:         s.evacuated as u64,
            moved:             s.moved as u64,
            unreachable:       s.unreachable as u64,
            conflict_cells:    s.conflict_cells as u64,
            resolution_rounds: s.resolution_rounds as u64,
            cache_size:        s.cache_size as u64,
        }
    }
}

/// One grid row of a frame, cells rendered as a digit string
/// (`0` empty, `1` occupied, `2` exit, `3` wall).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameRow {
    pub tick:  u64,
    pub row:   i32,
    pub cells: String,
}

impl FrameRow {
    /// Split `frame` into one row per grid row.
    pub fn from_frame(frame: &Frame) -> Vec<FrameRow> {
        (0..frame.height)
            .map(|r| FrameRow {
                tick:  frame.tick.0,
                row:   r,
                cells: frame.row(r).iter().map(|&c| char::from(b'0' + c)).collect(),
            })
            .collect()
    }
}

/// When one agent left the floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvacuationRow {
    pub agent_id: u32,
    pub tick:     u64,
}

impl From<(AgentId, Tick)> for EvacuationRow {
    fn from((agent, tick): (AgentId, Tick)) -> Self {
        Self { agent_id: agent.0, tick: tick.0 }
    }
}
