//! Conflict resolution: at most one agent per target cell.
//!
//! ```text
//! loop:
//!   detect   — group intents by target cell; groups of size > 1 conflict
//!   resolve  — per conflicting cell (ascending position), draw one winner;
//!              every loser's target is reset to its own cell
//!   re-check — a loser now "moves" to its own cell, which another agent
//!              may be targeting; repeat until no cell is claimed twice
//! ```
//!
//! An agent already staying on a cell always keeps it: it cannot be
//! displaced, so it wins every group it belongs to.  Each other round
//! converts at least one mover into a stayer, so the loop ends after at
//! most `intents.len() + 1` rounds; exceeding that is reported as
//! [`SimError::ConflictNonConvergence`].

#[cfg(not(feature = "fx-hash"))]
use std::collections::HashMap;

#[cfg(feature = "fx-hash")]
use rustc_hash::FxHashMap as HashMap;

use ev_behavior::MoveIntent;
use ev_core::{ConflictPolicy, Position, SimRng};
use tracing::trace;

use crate::{SimError, SimResult};

/// What one call to [`resolve`] did.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Rounds that found at least one conflict.
    pub rounds:         usize,
    /// Conflicting cells, summed over rounds.
    pub conflict_cells: usize,
}

/// Rewrite `intents` in place until no two share a target cell.
///
/// Conflict-free input is returned unchanged with `rounds == 0`.
pub fn resolve(
    intents: &mut [MoveIntent],
    policy:  ConflictPolicy,
    rng:     &mut SimRng,
) -> SimResult<Resolution> {
    let cap = intents.len() + 1;
    let mut outcome = Resolution::default();

    loop {
        let groups = conflicting_groups(intents);
        if groups.is_empty() {
            return Ok(outcome);
        }
        if outcome.rounds == cap {
            return Err(SimError::ConflictNonConvergence { iterations: outcome.rounds });
        }
        outcome.rounds += 1;
        outcome.conflict_cells += groups.len();
        trace!(round = outcome.rounds, cells = groups.len(), "resolving conflicts");

        for (cell, members) in groups {
            let winner = pick_winner(intents, cell, &members, policy, rng);
            for &i in &members {
                if i != winner {
                    intents[i].to = intents[i].from;
                }
            }
        }
    }
}

/// Target cells claimed by more than one intent, with the claimants'
/// indices, sorted by cell so draws do not depend on hash order.
pub fn conflicting_groups(intents: &[MoveIntent]) -> Vec<(Position, Vec<usize>)> {
    let mut by_target: HashMap<Position, Vec<usize>> = HashMap::default();
    for (i, intent) in intents.iter().enumerate() {
        by_target.entry(intent.to).or_default().push(i);
    }
    let mut groups: Vec<(Position, Vec<usize>)> =
        by_target.into_iter().filter(|(_, members)| members.len() > 1).collect();
    groups.sort_unstable_by_key(|(cell, _)| *cell);
    groups
}

fn pick_winner(
    intents: &[MoveIntent],
    cell:    Position,
    members: &[usize],
    policy:  ConflictPolicy,
    rng:     &mut SimRng,
) -> usize {
    if let Some(&occupant) = members.iter().find(|&&i| intents[i].from == cell) {
        return occupant;
    }
    let drawn = match policy {
        ConflictPolicy::MassWeighted => {
            let weights: Vec<f64> = members.iter().map(|&i| intents[i].mass).collect();
            rng.choose_weighted(&weights)
        }
        ConflictPolicy::Uniform => None,
    };
    let k = drawn.unwrap_or_else(|| rng.gen_range(0..members.len()));
    members[k]
}
