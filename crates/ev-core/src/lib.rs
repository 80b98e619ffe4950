//! `ev-core` — foundational types for the evacuation floor-field simulator.
//!
//! This crate is a dependency of every other `ev-*` crate.  It intentionally
//! has no `ev-*` dependencies and minimal external ones (only `rand` and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `AgentId`                                             |
//! | [`position`]    | `Position`, `Offset`, the 3×3 move table              |
//! | [`cell`]        | `CellState` (Empty / Occupied / Exit / Wall)          |
//! | [`time`]        | `Tick`                                                |
//! | [`rng`]         | `AgentRng` (per-agent), `SimRng` (global)             |
//! | [`config`]      | `EvacConfig`, `RoomSpec`, `ConflictPolicy`            |
//! | [`error`]       | `EvError`, `EvResult`                                 |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | `Serialize`/`Deserialize` on all public types; needed to   |
//! |         | load an `EvacConfig` from JSON.                            |

pub mod cell;
pub mod config;
pub mod error;
pub mod ids;
pub mod position;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use cell::CellState;
pub use config::{ConflictPolicy, EvacConfig, RoomSpec};
pub use error::{EvError, EvResult};
pub use ids::AgentId;
pub use position::{MOVES, Offset, Position};
pub use rng::{AgentRng, SimRng};
pub use time::Tick;
