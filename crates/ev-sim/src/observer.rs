//! Simulation observer trait and the per-tick / per-run summaries it receives.

use ev_agent::Population;
use ev_core::{AgentId, Tick};
use ev_grid::Frame;

/// Counters for one committed tick.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct TickStats {
    pub tick:              Tick,
    /// Agents still on the floor after the commit.
    pub remaining:         usize,
    /// Agents that stepped onto an exit this tick.
    pub evacuated:         usize,
    /// Agents whose position changed (evacuees included).
    pub moved:             usize,
    /// Agents with no reachable door or exit from their cell.
    pub unreachable:       usize,
    /// Target cells claimed by more than one agent, summed over rounds.
    pub conflict_cells:    usize,
    /// Detect/resolve rounds that found at least one conflict.
    pub resolution_rounds: usize,
    /// Congestion paths cached after the commit (0 right after an eviction).
    pub cache_size:        usize,
}

/// Outcome of a [`Sim::run`][crate::Sim::run].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Ticks processed over the sim's lifetime.
    pub ticks:            u64,
    pub initial_agents:   usize,
    pub evacuated:        usize,
    pub remaining:        usize,
    /// `(agent, tick)` in evacuation order.
    pub evacuation_ticks: Vec<(AgentId, Tick)>,
    /// `true` if every agent left; `false` if `max_ticks` stopped the run.
    pub completed:        bool,
}

impl RunSummary {
    /// Tick at which the last agent left, if anyone left.
    pub fn last_evacuation(&self) -> Option<Tick> {
        self.evacuation_ticks.iter().map(|&(_, t)| t).max()
    }

    /// Mean evacuation tick (0-based) over agents that left.
    pub fn mean_evacuation_tick(&self) -> Option<f64> {
        if self.evacuation_ticks.is_empty() {
            return None;
        }
        let sum: u64 = self.evacuation_ticks.iter().map(|&(_, t)| t.0).sum();
        Some(sum as f64 / self.evacuation_ticks.len() as f64)
    }
}

/// Callbacks invoked by [`Sim::run`][crate::Sim::run] at key points in the
/// tick loop.
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.
///
/// # Example: progress printer
///
/// ```rust,ignore
/// struct ProgressPrinter;
///
/// impl SimObserver for ProgressPrinter {
///     fn on_tick_end(&mut self, tick: Tick, stats: &TickStats) {
///         println!("{tick}: {} left, {} out", stats.remaining, stats.evacuated);
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called at the very start of each tick, before any processing.
    fn on_tick_start(&mut self, _tick: Tick) {}

    /// Called after the commit of each tick.
    fn on_tick_end(&mut self, _tick: Tick, _stats: &TickStats) {}

    /// Called once per tick with the post-commit grid.
    ///
    /// `frame` is an owned copy: renderers may keep it.  `population` holds
    /// the agents still on the floor.
    fn on_snapshot(&mut self, _tick: Tick, _frame: &Frame, _population: &Population) {}

    /// Called once after the loop stops.
    fn on_sim_end(&mut self, _final_tick: Tick, _summary: &RunSummary) {}
}

/// A [`SimObserver`] that does nothing.  Use when you need to call `run` but
/// don't want progress callbacks.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
