//! What routing hands to the decide step, and what the decide step hands
//! to conflict resolution.

use ev_agent::Pedestrian;
use ev_core::{AgentId, Position};
use ev_grid::Path;

/// Where a route came from.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum RouteSource {
    /// Occupancy-blind shortest path from the static field.
    StaticField,
    /// Congestion-aware path from the cache (possibly computed this tick).
    Congestion,
    /// No target is reachable from the agent's cell.
    Unreachable,
}

/// The path an agent follows this tick.
#[derive(Clone, Debug, PartialEq)]
pub struct Route {
    /// Exit or door the path leads to.  `None` when unreachable.
    pub target: Option<Position>,
    /// Agent cell → target.  Empty when unreachable.
    pub path:   Path,
    pub source: RouteSource,
}

impl Route {
    pub fn unreachable() -> Self {
        Self { target: None, path: Path::empty(), source: RouteSource::Unreachable }
    }
}

/// One agent's proposed move for the current tick.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MoveIntent {
    pub agent: AgentId,
    pub from:  Position,
    pub to:    Position,
    /// Probability the move had before masking.
    pub mass:  f64,
}

impl MoveIntent {
    /// `true` if the agent proposes to stay put.
    #[inline]
    pub fn is_stay(&self) -> bool {
        self.from == self.to
    }
}

impl From<&Pedestrian> for MoveIntent {
    fn from(p: &Pedestrian) -> Self {
        Self { agent: p.id, from: p.position, to: p.preferred_next, mass: p.mass }
    }
}
