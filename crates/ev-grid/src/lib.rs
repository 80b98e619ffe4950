//! `ev-grid` — the lattice, its rooms, and routing over it.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                    |
//! |-------------|-------------------------------------------------------------|
//! | [`grid`]    | `Grid` (dense cell states), `Room`, `Frame` snapshots       |
//! | [`planner`] | `PathPlanner` trait, `Path`, `CostMode`, `AStarPlanner`     |
//! | [`cache`]   | `PathCache` — memoized congestion-aware paths               |
//! | [`error`]   | `GridError`, `GridResult<T>`                                |
//!
//! # Feature flags
//!
//! | Flag      | Effect                                                     |
//! |-----------|------------------------------------------------------------|
//! | `fx-hash` | `PathCache` uses `rustc-hash` instead of SipHash.          |
//! | `serde`   | Derives `Serialize`/`Deserialize` on public types.         |

pub mod cache;
pub mod error;
pub mod grid;
pub mod planner;


pub use cache::{CacheStats, PathCache};
pub use error::{GridError, GridResult};
pub use grid::{Frame, Grid, Room};
pub use planner::{AStarPlanner, CostMode, Path, PathPlanner};
