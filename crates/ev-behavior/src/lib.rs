//! `ev-behavior` — how a pedestrian decides where to step.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                       |
//! |---------------|----------------------------------------------------------------|
//! | [`navigator`] | `Navigator`, `TargetSet` — target choice and route lookup     |
//! | [`context`]   | `TickContext<'a>` — read-only tick snapshot shared by agents   |
//! | [`intent`]    | `MoveIntent`, `Route`, `RouteSource`                           |
//! | [`model`]     | `BehaviorModel` trait, `FloorFieldBehavior`                    |
//! | [`stay`]      | `StayBehavior` — agents that never move                        |
//! | [`error`]     | `BehaviorError`, `BehaviorResult<T>`                           |
//!
//! # Two steps per agent per tick
//!
//! 1. **Route** (sequential): [`Navigator::route`] picks the agent's target
//!    and returns the path it should follow.  It owns the lazily filled
//!    static field and the path cache, so it needs `&mut self`.
//!
//! 2. **Decide** (parallel with the `parallel` feature in `ev-sim`):
//!    [`BehaviorModel::decide`] turns the route into a sampled move.  It only
//!    reads the grid and dynamic field through `&TickContext`, writes the
//!    agent's own state, and draws from the agent's own RNG.
//!
//! # Feature flags
//!
//! | Flag       | Effect                                                     |
//! |------------|------------------------------------------------------------|
//! | `parallel` | [`Navigator::prefill`] runs its searches on Rayon.         |

pub mod context;
pub mod error;
pub mod intent;
pub mod model;
pub mod navigator;
pub mod stay;


pub use context::TickContext;
pub use error::{BehaviorError, BehaviorResult};
pub use intent::{MoveIntent, Route, RouteSource};
pub use model::{BehaviorModel, FloorFieldBehavior};
pub use navigator::{Navigator, TargetSet};
pub use stay::StayBehavior;
