//! `ev-agent` — pedestrians and the population that owns them.
//!
//! # Crate layout
//!
//! | Module          | Contents                                                   |
//! |-----------------|------------------------------------------------------------|
//! | [`pedestrian`]  | `Pedestrian` — per-agent state and move-intent helpers     |
//! | [`population`]  | `Population` (live agents), `AgentRngs` (per-agent RNG)    |
//! | [`builder`]     | `PopulationBuilder` (fluent construction)                  |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on `Pedestrian`.         |

pub mod builder;
pub mod pedestrian;
pub mod population;


pub use builder::PopulationBuilder;
pub use pedestrian::Pedestrian;
pub use population::{AgentRngs, Population};
