//! Fluent builder for `Population` + `AgentRngs`.
//!
//! # Usage
//!
//! ```rust
//! use ev_agent::PopulationBuilder;
//! use ev_core::Position;
//!
//! let (pop, rngs) = PopulationBuilder::new(/*seed=*/ 42)
//!     .agent(Position::new(0, 5))
//!     .agents([Position::new(3, 3), Position::new(4, 4)])
//!     .build();
//!
//! assert_eq!(pop.len(), 3);
//! assert_eq!(rngs.len(), 3);
//! ```

use ev_core::{AgentId, Position};

use crate::{AgentRngs, Pedestrian, Population};

/// Assigns IDs `0, 1, 2, …` in the order positions are added.
pub struct PopulationBuilder {
    seed:      u64,
    positions: Vec<Position>,
}

impl PopulationBuilder {
    pub fn new(seed: u64) -> Self {
        Self { seed, positions: Vec::new() }
    }

    pub fn agent(mut self, position: Position) -> Self {
        self.positions.push(position);
        self
    }

    pub fn agents<I: IntoIterator<Item = Position>>(mut self, positions: I) -> Self {
        self.positions.extend(positions);
        self
    }

    pub fn build(self) -> (Population, AgentRngs) {
        let agents: Vec<Pedestrian> = self
            .positions
            .into_iter()
            .enumerate()
            .map(|(i, pos)| Pedestrian::new(AgentId(i as u32), pos))
            .collect();
        let rngs = AgentRngs::new(agents.iter().map(|p| p.id), self.seed);
        (Population::new(agents), rngs)
    }
}
