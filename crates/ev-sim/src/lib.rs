//! `ev-sim` — tick loop orchestrator for the evacuation simulator.
//!
//! # Tick loop
//!
//! ```text
//! while agents remain (and tick < max_ticks):
//!   ① Prefill  — compute missing static-field entries for every agent's
//!                cell (parallel with the `parallel` feature).
//!   ② Route    — per agent, choose door/exit and path; congested agents
//!                replan through the path cache.
//!   ③ Decide   — call BehaviorModel::decide for each agent
//!                (parallel with the `parallel` feature).
//!   ④ Resolve  — one winner per contested cell; losers stay.
//!   ⑤ Commit   — vacate, deposit trace at departed cells, decay/diffuse,
//!                remove agents on exits, occupy new cells, check
//!                occupied == population, evict the cache every N ticks.
//!   ⑥ Observe  — on_tick_end(stats), on_snapshot(frame, population).
//! ```
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                     |
//! |------------|------------------------------------------------------------|
//! | `parallel` | Runs prefill and the decide phase on Rayon's thread pool.  |
//! | `fx-hash`  | FxHash for the conflict map and the path cache.            |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use ev_behavior::FloorFieldBehavior;
//! use ev_core::EvacConfig;
//! use ev_sim::{NoopObserver, SimBuilder};
//!
//! let config = EvacConfig::default();
//! let behavior = FloorFieldBehavior::from_config(&config);
//! let mut sim = SimBuilder::new(config, behavior).build()?;
//! let summary = sim.run(&mut NoopObserver)?;
//! println!("{} agents out in {} ticks", summary.evacuated, summary.ticks);
//! ```

pub mod builder;
pub mod conflict;
pub mod error;
pub mod observer;
pub mod sim;

#[cfg(test)]
mod tests;

pub use builder::SimBuilder;
pub use conflict::Resolution;
pub use error::{SimError, SimResult};
pub use observer::{NoopObserver, RunSummary, SimObserver, TickStats};
pub use sim::Sim;
