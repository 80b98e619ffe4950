//! Deterministic per-agent and simulation-level RNG wrappers.
//!
//! # Determinism strategy
//!
//! Each pedestrian gets its own independent `SmallRng` seeded by:
//!
//!   seed = global_seed XOR (agent_id * MIXING_CONSTANT)
//!
//! The mixing constant is the 64-bit fractional part of the golden ratio,
//! which spreads consecutive agent IDs uniformly across the seed space.
//! This means:
//!
//! - Agents never share RNG state, so the intent phase can run in parallel
//!   and still reproduce the sequential result bit-for-bit.
//! - Removing evacuated agents does not disturb the streams of the others.
//!
//! Grid-wide draws (initial placement, conflict winners) use `SimRng` and
//! only happen in single-threaded phases.

use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::AgentId;

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

/// Draw an index with probability proportional to `weights[i]`.
///
/// Returns `None` when the weights are empty, all zero, or contain a
/// negative / non-finite entry.
fn weighted_index<R: Rng>(rng: &mut R, weights: &[f64]) -> Option<usize> {
    let dist = WeightedIndex::new(weights).ok()?;
    Some(dist.sample(rng))
}

// ── AgentRng ──────────────────────────────────────────────────────────────────

/// Per-agent deterministic RNG.
///
/// Stored in a parallel `Vec<AgentRng>` alongside the pedestrians so the
/// intent phase can hold `&mut AgentRng` and `&Grid` at the same time.
pub struct AgentRng(SmallRng);

impl AgentRng {
    /// Seed deterministically from the run's global seed and an agent ID.
    pub fn new(global_seed: u64, agent: AgentId) -> Self {
        let seed = global_seed ^ u64::from(agent.0).wrapping_mul(MIXING_CONSTANT);
        AgentRng(SmallRng::seed_from_u64(seed))
    }

    /// Expose the inner `SmallRng` for use with `rand` distribution types.
    #[inline]
    pub fn inner(&mut self) -> &mut SmallRng {
        &mut self.0
    }

    /// Sample a uniformly distributed value of any `Standard`-distributed type.
    #[inline]
    pub fn random<T>(&mut self) -> T
    where
        rand::distributions::Standard: rand::distributions::Distribution<T>,
    {
        self.0.r#gen()
    }

    /// Generate a value uniformly in `range`.
    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }

    /// Weighted categorical draw; see [`weighted_index`] for the `None` cases.
    #[inline]
    pub fn choose_weighted(&mut self, weights: &[f64]) -> Option<usize> {
        weighted_index(&mut self.0, weights)
    }
}

// ── SimRng ────────────────────────────────────────────────────────────────────

/// Simulation-level RNG for grid-wide operations (agent placement, conflict
/// resolution).
///
/// Used only in single-threaded contexts.
pub struct SimRng(SmallRng);

impl SimRng {
    pub fn new(seed: u64) -> Self {
        SimRng(SmallRng::seed_from_u64(seed))
    }

    /// Derive a child `SimRng` with a different seed offset.
    pub fn child(&mut self, offset: u64) -> SimRng {
        let child_seed: u64 = self.0.r#gen::<u64>() ^ offset.wrapping_mul(MIXING_CONSTANT);
        SimRng(SmallRng::seed_from_u64(child_seed))
    }

    #[inline]
    pub fn inner(&mut self) -> &mut SmallRng {
        &mut self.0
    }

    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }

    /// Weighted categorical draw; see [`weighted_index`] for the `None` cases.
    #[inline]
    pub fn choose_weighted(&mut self, weights: &[f64]) -> Option<usize> {
        weighted_index(&mut self.0, weights)
    }

    /// `amount` distinct indices from `0..len`, in random order.
    ///
    /// The caller guarantees `amount <= len`.
    pub fn sample_indices(&mut self, len: usize, amount: usize) -> Vec<usize> {
        rand::seq::index::sample(&mut self.0, len, amount).into_vec()
    }
}
