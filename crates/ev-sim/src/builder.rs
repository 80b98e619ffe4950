//! Fluent builder for constructing a [`Sim`].

use ev_agent::PopulationBuilder;
use ev_behavior::{BehaviorModel, Navigator};
use ev_core::{EvacConfig, Position, SimRng, Tick};
use ev_field::DynamicField;
use ev_grid::{Grid, PathPlanner};

use crate::{Sim, SimError, SimResult};

/// Seed offset separating the conflict RNG stream from agent placement.
const CONFLICT_STREAM: u64 = 1;

/// Fluent builder for [`Sim<B>`].
///
/// # Required inputs
///
/// - [`EvacConfig`]: floor plan, agent count, seed, field constants, …
/// - `B: BehaviorModel`: the move-decision implementation (e.g.
///   [`ev_behavior::FloorFieldBehavior`])
///
/// # Optional inputs (have defaults)
///
/// | Method           | Default                                                 |
/// |------------------|---------------------------------------------------------|
/// | `.grid(g)`       | `Grid::from_config(&config)`                            |
/// | `.agents(v)`     | `config.agent_count` agents on random free cells        |
/// | `.planner(p)`    | `AStarPlanner::from_config(&config)`                    |
///
/// # Example
///
/// ```rust,ignore
/// let config = EvacConfig::default();
/// let behavior = FloorFieldBehavior::from_config(&config);
/// let mut sim = SimBuilder::new(config, behavior).build()?;
/// let summary = sim.run(&mut NoopObserver)?;
/// ```
pub struct SimBuilder<B: BehaviorModel> {
    config:    EvacConfig,
    behavior:  B,
    grid:      Option<Grid>,
    positions: Option<Vec<Position>>,
    planner:   Option<Box<dyn PathPlanner>>,
}

impl<B: BehaviorModel> SimBuilder<B> {
    /// Create a builder with all required inputs.
    pub fn new(config: EvacConfig, behavior: B) -> Self {
        Self {
            config,
            behavior,
            grid:      None,
            positions: None,
            planner:   None,
        }
    }

    /// Supply a prepared floor plan instead of building one from the config.
    ///
    /// The grid must not contain agents yet; they are placed by `build`.
    pub fn grid(mut self, grid: Grid) -> Self {
        self.grid = Some(grid);
        self
    }

    /// Place agents on exactly these cells, in ID order.
    ///
    /// Overrides `config.agent_count` and the random placement.
    pub fn agents<I: IntoIterator<Item = Position>>(mut self, positions: I) -> Self {
        self.positions = Some(positions.into_iter().collect());
        self
    }

    /// Use a custom planner for the static field and congestion replans.
    pub fn planner<P: PathPlanner + 'static>(mut self, planner: P) -> Self {
        self.planner = Some(Box::new(planner));
        self
    }

    /// Validate inputs, lay out the floor, place the agents, and return a
    /// ready-to-run [`Sim`].
    pub fn build(self) -> SimResult<Sim<B>> {
        self.config
            .validate()
            .map_err(|e| SimError::Config(e.to_string()))?;

        // ── Floor plan ────────────────────────────────────────────────────
        let mut grid = match self.grid {
            Some(g) => g,
            None => Grid::from_config(&self.config)?,
        };
        if grid.occupied_count() != 0 {
            return Err(SimError::Config(format!(
                "supplied grid already has {} occupied cells",
                grid.occupied_count()
            )));
        }
        if grid.exits().is_empty() {
            return Err(SimError::Config("floor plan has no exits".into()));
        }

        // ── Agent placement ───────────────────────────────────────────────
        let mut sim_rng = SimRng::new(self.config.seed);
        let positions = match self.positions {
            Some(positions) => {
                for &p in &positions {
                    grid.place_agent(p)?;
                }
                positions
            }
            None => grid.set_agents(self.config.agent_count, &mut sim_rng)?,
        };
        let (population, rngs) = PopulationBuilder::new(self.config.seed).agents(positions).build();

        // ── Fields and routing ────────────────────────────────────────────
        let navigator = match self.planner {
            Some(p) => Navigator::with_planner(&grid, &self.config, p),
            None => Navigator::new(&grid, &self.config),
        };
        let dynamic = DynamicField::new(grid.width(), grid.height(), self.config.diffusion, self.config.decay);

        Ok(Sim {
            initial_agents: population.len(),
            config:         self.config,
            tick:           Tick::ZERO,
            grid,
            dynamic,
            population,
            rngs,
            navigator,
            behavior:       self.behavior,
            conflict_rng:   sim_rng.child(CONFLICT_STREAM),
            evacuations:    Vec::new(),
        })
    }
}
