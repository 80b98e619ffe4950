//! A behavior model whose agents never move.

use ev_agent::Pedestrian;
use ev_core::AgentRng;

use crate::{BehaviorModel, MoveIntent, Route, TickContext};

/// A [`BehaviorModel`] that always proposes staying in place.
///
/// Useful in tests and for static obstacles made of agents: they hold
/// their cells, count as occupants, and always win their own cell.
pub struct StayBehavior;

impl BehaviorModel for StayBehavior {
    fn decide(
        &self,
        ped:    &mut Pedestrian,
        _route: &Route,
        _ctx:   &TickContext<'_>,
        _rng:   &mut AgentRng,
    ) -> MoveIntent {
        ped.stay();
        ped.mass = 1.0;
        MoveIntent::from(&*ped)
    }
}
