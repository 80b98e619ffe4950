//! The `Sim` struct and its tick loop.

use ev_agent::{AgentRngs, Population};
use ev_behavior::{BehaviorModel, MoveIntent, Navigator, Route, RouteSource, TickContext};
use ev_core::{AgentId, EvacConfig, Position, SimRng, Tick};
use ev_field::DynamicField;
use ev_grid::{Frame, Grid};
use tracing::{debug, info, warn};

use crate::conflict::{self, Resolution};
use crate::{RunSummary, SimError, SimObserver, SimResult, TickStats};

// ── Sim ───────────────────────────────────────────────────────────────────────

/// The main simulation runner.
///
/// `Sim<B>` holds all simulation state and drives the tick loop:
///
/// 1. **Prefill**: compute the static-field entries agents will look up
///    (parallel with the `parallel` feature).
/// 2. **Route** (sequential): pick each agent's target and path; congestion
///    replans go through the shared path cache.
/// 3. **Decide** (optionally parallel): call [`BehaviorModel::decide`] for
///    every agent.  Reads the grid and dynamic field, writes nothing shared.
/// 4. **Resolve**: make targets unique; see [`conflict`](crate::conflict).
/// 5. **Commit** (sequential, exclusive): move agents, deposit trace, remove
///    evacuees, decay the dynamic field, evict the path cache.
///
/// Create via [`SimBuilder`][crate::SimBuilder].
pub struct Sim<B: BehaviorModel> {
    /// Run configuration; immutable once built.
    pub config: EvacConfig,

    /// The tick the next call to `run`/`run_ticks` will process.
    pub tick: Tick,

    /// Cell states.  Occupied cells always match `population`.
    pub grid: Grid,

    /// Trace left by recent movers.
    pub dynamic: DynamicField,

    /// Agents still on the floor.
    pub population: Population,

    /// Per-agent deterministic RNGs, separated for the split-borrow pattern.
    pub rngs: AgentRngs,

    /// Static field, path cache, and the planner behind both.
    pub navigator: Navigator,

    /// The behavior model.  Called once per agent per tick.
    pub behavior: B,

    /// Draws conflict winners.  Only used in the sequential resolve phase.
    pub(crate) conflict_rng: SimRng,

    pub(crate) initial_agents: usize,
    pub(crate) evacuations:    Vec<(AgentId, Tick)>,
}

impl<B: BehaviorModel> Sim<B> {
    // ── Public API ────────────────────────────────────────────────────────

    /// Run until the floor is empty or `config.max_ticks` ticks have been
    /// processed.
    ///
    /// Calls observer hooks at every tick boundary.  Use
    /// [`NoopObserver`][crate::NoopObserver] if you don't need callbacks.
    pub fn run<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<RunSummary> {
        info!(
            agents = self.population.len(),
            width  = self.grid.width(),
            height = self.grid.height(),
            exits  = self.grid.exits().len(),
            "evacuation started"
        );

        let mut completed = true;
        while !self.population.is_empty() {
            if self.config.max_ticks.is_some_and(|max| self.tick.0 >= max) {
                warn!(
                    tick      = self.tick.0,
                    remaining = self.population.len(),
                    "tick limit reached before the floor emptied"
                );
                completed = false;
                break;
            }
            self.step(observer)?;
        }

        let summary = self.summary(completed);
        observer.on_sim_end(self.tick, &summary);
        info!(
            ticks     = summary.ticks,
            evacuated = summary.evacuated,
            remaining = summary.remaining,
            "evacuation finished"
        );
        Ok(summary)
    }

    /// Run exactly `n` ticks (or fewer, if the floor empties first),
    /// ignoring `max_ticks`.
    ///
    /// Useful for tests and incremental stepping.  Returns the number of
    /// ticks processed.
    pub fn run_ticks<O: SimObserver>(&mut self, n: u64, observer: &mut O) -> SimResult<u64> {
        let mut done = 0;
        while done < n && !self.population.is_empty() {
            self.step(observer)?;
            done += 1;
        }
        Ok(done)
    }

    /// Post-commit copy of the grid, stamped with the last processed tick.
    pub fn frame(&self) -> Frame {
        self.grid.snapshot(self.tick)
    }

    /// `true` once every agent has left.
    pub fn is_finished(&self) -> bool {
        self.population.is_empty()
    }

    /// Summary of the run so far.
    pub fn summary(&self, completed: bool) -> RunSummary {
        RunSummary {
            ticks:            self.tick.0,
            initial_agents:   self.initial_agents,
            evacuated:        self.evacuations.len(),
            remaining:        self.population.len(),
            evacuation_ticks: self.evacuations.clone(),
            completed:        completed && self.population.is_empty(),
        }
    }

    // ── Core tick processing ──────────────────────────────────────────────

    fn step<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        let now = self.tick;
        observer.on_tick_start(now);
        let stats = self.process_tick(now)?;
        observer.on_tick_end(now, &stats);
        let frame = self.grid.snapshot(now);
        observer.on_snapshot(now, &frame, &self.population);
        self.tick = now.next();
        Ok(())
    }

    fn process_tick(&mut self, now: Tick) -> SimResult<TickStats> {
        // ── Phase 1: static-field prefill ─────────────────────────────────
        self.navigator.prefill(&self.grid, self.population.agents());

        // ── Phase 2: routing (sequential; mutates the path cache) ─────────
        let routes = self.compute_routes()?;
        let unreachable = routes.iter().filter(|r| r.source == RouteSource::Unreachable).count();

        // ── Phase 3: decide (read-only on shared state) ───────────────────
        let mut intents = self.compute_intents(now, &routes);

        // ── Phase 4: conflict resolution ──────────────────────────────────
        let resolution = conflict::resolve(&mut intents, self.config.conflict_policy, &mut self.conflict_rng)?;
        for (ped, intent) in self.population.agents_mut().iter_mut().zip(&intents) {
            ped.preferred_next = intent.to;
        }

        // ── Phase 5: commit ───────────────────────────────────────────────
        let (moved, evacuated) = self.commit(now, &intents)?;
        self.navigator.cache_mut().evict_periodically(now);

        let stats = TickStats {
            tick:              now,
            remaining:         self.population.len(),
            evacuated,
            moved,
            unreachable,
            conflict_cells:    resolution.conflict_cells,
            resolution_rounds: resolution.rounds,
            cache_size:        self.navigator.cache().len(),
        };
        log_tick(&stats, resolution);
        Ok(stats)
    }

    fn compute_routes(&mut self) -> SimResult<Vec<Route>> {
        let mut routes = Vec::with_capacity(self.population.len());
        for (ped, rng) in self.population.agents_mut().iter_mut().zip(self.rngs.inner.iter_mut()) {
            let route = self.navigator.route(&self.grid, ped, rng)?;
            if route.source == RouteSource::Unreachable {
                warn!(agent = %ped.id, position = %ped.position, "no reachable door or exit");
            }
            routes.push(route);
        }
        Ok(routes)
    }

    /// Call `decide` for every agent.
    ///
    /// With the `parallel` Cargo feature this runs on Rayon's thread pool.
    /// Each agent draws only from its own RNG, so the intents are identical
    /// either way.
    fn compute_intents(&mut self, now: Tick, routes: &[Route]) -> Vec<MoveIntent> {
        let ctx = TickContext::new(now, &self.grid, &self.dynamic);
        let behavior = &self.behavior;
        let agents = self.population.agents_mut();
        let rngs = &mut self.rngs.inner;

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            agents
                .par_iter_mut()
                .zip(rngs.par_iter_mut())
                .zip(routes.par_iter())
                .map(|((ped, rng), route)| behavior.decide(ped, route, &ctx, rng))
                .collect()
        }

        #[cfg(not(feature = "parallel"))]
        {
            agents
                .iter_mut()
                .zip(rngs.iter_mut())
                .zip(routes.iter())
                .map(|((ped, rng), route)| behavior.decide(ped, route, &ctx, rng))
                .collect()
        }
    }

    /// Apply resolved intents.  Returns `(moved, evacuated)`.
    fn commit(&mut self, now: Tick, intents: &[MoveIntent]) -> SimResult<(usize, usize)> {
        let departed: Vec<Position> = intents.iter().filter(|i| !i.is_stay()).map(|i| i.from).collect();
        let moved = departed.len();

        for ped in self.population.iter() {
            self.grid.vacate(ped.position);
        }

        self.dynamic.record_passage(departed);
        self.dynamic.decay_and_diffuse();

        let grid = &self.grid;
        let gone = self.population.evacuate(&mut self.rngs, |p| grid.is_exit(p.preferred_next));
        for ped in &gone {
            debug!(agent = %ped.id, exit = %ped.preferred_next, tick = now.0, "agent evacuated");
            self.evacuations.push((ped.id, now));
        }

        for ped in self.population.agents_mut() {
            ped.position = ped.preferred_next;
            self.grid.occupy(ped.position)?;
        }

        let occupied = self.grid.occupied_count();
        if occupied != self.population.len() {
            return Err(SimError::InvariantViolation(format!(
                "{occupied} occupied cells for {} agents after {now}",
                self.population.len()
            )));
        }
        Ok((moved, gone.len()))
    }
}

fn log_tick(stats: &TickStats, resolution: Resolution) {
    debug!(
        tick           = stats.tick.0,
        remaining      = stats.remaining,
        evacuated      = stats.evacuated,
        moved          = stats.moved,
        conflict_cells = resolution.conflict_cells,
        rounds         = resolution.rounds,
        cache          = stats.cache_size,
        "tick committed"
    );
}
