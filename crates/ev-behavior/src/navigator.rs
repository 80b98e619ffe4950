//! `Navigator` — which target an agent heads for and which path it follows.
//!
//! # Target choice
//!
//! | Agent is…                      | Target                                       |
//! |--------------------------------|----------------------------------------------|
//! | inside a room                  | the room's door                              |
//! | outside, committed to an exit  | that exit, while it stays reachable          |
//! | outside, otherwise             | an exit drawn from the static-field odds     |
//!
//! An agent inside a room with no target yet adopts the door as its
//! `chosen_exit`; once outside, a `chosen_exit` that is not a global exit
//! (a door) is replaced by a fresh draw.
//!
//! # Path choice
//!
//! If more than `congestion_threshold` cells around the agent are occupied
//! and the agent is not yet near its target, the path comes from the
//! congestion-aware [`PathCache`].  Otherwise it is the static-field path.

use ev_agent::Pedestrian;
use ev_core::{AgentRng, EvacConfig, Position};
use ev_field::{StaticField, StaticFieldEntry};
use ev_grid::{AStarPlanner, Grid, PathCache, PathPlanner};

use crate::{BehaviorResult, Route, RouteSource};

/// Owns the static field, the path cache, and the planner behind both.
pub struct Navigator {
    planner:              Box<dyn PathPlanner>,
    static_field:         StaticField,
    cache:                PathCache,
    near_exit_radius:     i32,
    congestion_radius:    i32,
    congestion_threshold: usize,
}

impl Navigator {
    /// A navigator using the default A* planner configured from `config`.
    pub fn new(grid: &Grid, config: &EvacConfig) -> Self {
        Self::with_planner(grid, config, Box::new(AStarPlanner::from_config(config)))
    }

    pub fn with_planner(grid: &Grid, config: &EvacConfig, planner: Box<dyn PathPlanner>) -> Self {
        Self {
            planner,
            static_field:         StaticField::new(grid),
            cache:                PathCache::new(config.cache_eviction_interval),
            near_exit_radius:     config.near_exit_radius,
            congestion_radius:    config.congestion_radius,
            congestion_threshold: config.congestion_threshold,
        }
    }

    pub fn planner(&self) -> &dyn PathPlanner {
        self.planner.as_ref()
    }

    pub fn static_field(&self) -> &StaticField {
        &self.static_field
    }

    pub fn cache(&self) -> &PathCache {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut PathCache {
        &mut self.cache
    }

    /// Targets whose static field `ped` needs at its current cell.
    pub fn targets_for<'g>(&self, grid: &'g Grid, ped: &Pedestrian) -> TargetSet<'g> {
        match ped.is_inside_room(grid) {
            Some(door) => TargetSet::Door(door),
            None => TargetSet::Exits(grid.exits()),
        }
    }

    /// Compute every static-field entry the agents will look up this tick.
    ///
    /// With the `parallel` feature the searches run on the Rayon pool; the
    /// results are identical either way.  Returns the number of new entries.
    pub fn prefill(&mut self, grid: &Grid, agents: &[Pedestrian]) -> usize {
        let mut pending: Vec<(Position, Position)> = Vec::new();
        for ped in agents {
            let targets = self.targets_for(grid, ped);
            for target in self.static_field.missing(ped.position, targets.as_slice()) {
                pending.push((ped.position, target));
            }
        }
        pending.sort_unstable();
        pending.dedup();

        let planner = self.planner.as_ref();
        let entries = compute_entries(grid, planner, &pending);

        let mut added = 0;
        for (cell, entry) in entries {
            if self.static_field.insert(cell, entry) {
                added += 1;
            }
        }
        added
    }

    /// Choose `ped`'s target and the path toward it, updating
    /// `ped.chosen_exit` as needed.
    ///
    /// Missing static-field entries are computed on the spot, so calling
    /// [`prefill`](Self::prefill) first is an optimization, not a
    /// requirement.
    pub fn route(
        &mut self,
        grid: &Grid,
        ped:  &mut Pedestrian,
        rng:  &mut AgentRng,
    ) -> BehaviorResult<Route> {
        let cell = ped.position;
        let targets = self.targets_for(grid, ped);
        self.static_field
            .ensure_computed(grid, self.planner.as_ref(), cell, targets.as_slice());

        let target = match targets {
            TargetSet::Door(door) => {
                if ped.chosen_exit.is_none() {
                    ped.chosen_exit = Some(door);
                }
                Some(door)
            }
            TargetSet::Exits(exits) => self.pick_exit(cell, exits, ped, rng)?,
        };

        let static_path = target
            .and_then(|t| self.static_field.entry(cell, t))
            .filter(|e| e.is_reachable())
            .map(|e| e.path.clone());
        let (Some(target), Some(static_path)) = (target, static_path) else {
            return Ok(Route::unreachable());
        };

        let congested = grid.congestion_around(cell, self.congestion_radius, self.congestion_threshold);
        if congested && !ped.is_near_exit(self.near_exit_radius) {
            let path = self.cache.get_or_compute(cell, target, grid, self.planner.as_ref());
            if !path.is_empty() {
                return Ok(Route { target: Some(target), path, source: RouteSource::Congestion });
            }
        }

        Ok(Route {
            target: Some(target),
            path:   static_path,
            source: RouteSource::StaticField,
        })
    }

    /// Keep a reachable committed exit, otherwise draw a new one.
    fn pick_exit(
        &self,
        cell:  Position,
        exits: &[Position],
        ped:   &mut Pedestrian,
        rng:   &mut AgentRng,
    ) -> BehaviorResult<Option<Position>> {
        let committed = ped
            .chosen_exit
            .filter(|exit| exits.contains(exit))
            .filter(|&exit| self.static_field.entry(cell, exit).is_some_and(|e| e.is_reachable()));
        if committed.is_some() {
            return Ok(committed);
        }

        let probabilities = self.static_field.exit_choice_probabilities(cell, exits)?;
        let picked = self
            .static_field
            .select_field(cell, exits, &probabilities, rng)?
            .map(|entry| entry.target);
        if picked.is_some() {
            ped.chosen_exit = picked;
        }
        Ok(picked)
    }
}

/// The targets relevant to one agent.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TargetSet<'g> {
    Door(Position),
    Exits(&'g [Position]),
}

impl TargetSet<'_> {
    pub fn as_slice(&self) -> &[Position] {
        match self {
            TargetSet::Door(door) => std::slice::from_ref(door),
            TargetSet::Exits(exits) => exits,
        }
    }
}

#[cfg(feature = "parallel")]
fn compute_entries(
    grid:    &Grid,
    planner: &dyn PathPlanner,
    pending: &[(Position, Position)],
) -> Vec<(Position, StaticFieldEntry)> {
    use rayon::prelude::*;
    pending
        .par_iter()
        .map(|&(cell, target)| (cell, StaticField::compute_entry(grid, planner, cell, target)))
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn compute_entries(
    grid:    &Grid,
    planner: &dyn PathPlanner,
    pending: &[(Position, Position)],
) -> Vec<(Position, StaticFieldEntry)> {
    pending
        .iter()
        .map(|&(cell, target)| (cell, StaticField::compute_entry(grid, planner, cell, target)))
        .collect()
}
