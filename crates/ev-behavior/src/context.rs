//! Read-only simulation state passed to every behavior callback.

use ev_core::Tick;
use ev_field::DynamicField;
use ev_grid::Grid;

/// Everything an agent may look at while deciding its move.
///
/// Built once per tick after routing and shared immutably across the
/// decide phase.  Nothing behind these borrows changes until the commit
/// phase, so every agent sees the same occupancy and the same trace.
pub struct TickContext<'a> {
    pub tick:    Tick,
    pub grid:    &'a Grid,
    pub dynamic: &'a DynamicField,
}

impl<'a> TickContext<'a> {
    #[inline]
    pub fn new(tick: Tick, grid: &'a Grid, dynamic: &'a DynamicField) -> Self {
        Self { tick, grid, dynamic }
    }
}
