//! Live-agent storage: `Population` (pedestrians) and `AgentRngs` (their RNGs).
//!
//! # Why two structs?
//!
//! The intent phase needs `&mut AgentRng` for each agent while reading the
//! grid, the fields, and the other pedestrians.  Keeping the RNGs outside
//! `Population` lets the simulation hold `&mut AgentRngs` and
//! `&mut [Pedestrian]` side by side and zip them:
//!
//! ```ignore
//! pop.agents_mut()
//!     .par_iter_mut()
//!     .zip(rngs.inner.par_iter_mut())
//!     .for_each(|(ped, rng)| behavior.decide(ped, &ctx, rng));
//! ```
//!
//! Both vectors are indexed by *slot*, not by `AgentId`: evacuated agents
//! are removed from both in one pass by [`Population::evacuate`], so slots
//! shift while IDs stay stable.

use ev_core::{AgentId, AgentRng, Position};

use crate::Pedestrian;

// ── AgentRngs ─────────────────────────────────────────────────────────────────

/// Per-agent RNGs, slot-aligned with [`Population`].
pub struct AgentRngs {
    pub inner: Vec<AgentRng>,
}

impl AgentRngs {
    /// Seed one RNG per ID from `global_seed`.
    pub(crate) fn new(ids: impl IntoIterator<Item = AgentId>, global_seed: u64) -> Self {
        Self {
            inner: ids.into_iter().map(|id| AgentRng::new(global_seed, id)).collect(),
        }
    }

    #[inline]
    pub fn get_mut(&mut self, slot: usize) -> &mut AgentRng {
        &mut self.inner[slot]
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

// ── Population ────────────────────────────────────────────────────────────────

/// The pedestrians still inside the building.
#[derive(Clone, Debug, Default)]
pub struct Population {
    agents: Vec<Pedestrian>,
}

impl Population {
    pub(crate) fn new(agents: Vec<Pedestrian>) -> Self {
        Self { agents }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn agents(&self) -> &[Pedestrian] {
        &self.agents
    }

    pub fn agents_mut(&mut self) -> &mut [Pedestrian] {
        &mut self.agents
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pedestrian> {
        self.agents.iter()
    }

    /// Look an agent up by ID.  Linear; meant for tests and reporting.
    pub fn find(&self, id: AgentId) -> Option<&Pedestrian> {
        self.agents.iter().find(|p| p.id == id)
    }

    /// Current positions, slot order.
    pub fn positions(&self) -> Vec<Position> {
        self.agents.iter().map(|p| p.position).collect()
    }

    /// Remove every agent for which `leaves` returns `true`, together with
    /// its RNG, and return them in slot order.
    pub fn evacuate<F>(&mut self, rngs: &mut AgentRngs, mut leaves: F) -> Vec<Pedestrian>
    where
        F: FnMut(&Pedestrian) -> bool,
    {
        let keep: Vec<bool> = self.agents.iter().map(|p| !leaves(p)).collect();
        if keep.iter().all(|&k| k) {
            return Vec::new();
        }

        let mut gone = Vec::new();
        let agents = std::mem::take(&mut self.agents);
        for (ped, &k) in agents.into_iter().zip(&keep) {
            if k {
                self.agents.push(ped);
            } else {
                gone.push(ped);
            }
        }

        let mut flags = keep.iter();
        rngs.inner.retain(|_| flags.next().copied().unwrap_or(false));

        gone
    }
}

impl<'a> IntoIterator for &'a Population {
    type Item = &'a Pedestrian;
    type IntoIter = std::slice::Iter<'a, Pedestrian>;

    fn into_iter(self) -> Self::IntoIter {
        self.agents.iter()
    }
}
