//! The `BehaviorModel` trait and the floor-field model.

use ev_agent::Pedestrian;
use ev_core::{AgentRng, EvacConfig};
use ev_field::PreferenceMatrix;

use crate::{MoveIntent, Route, TickContext};

/// Pluggable move decision.
///
/// Called once per agent per tick, after routing.  Implementations write
/// the agent's intent into `ped` (`preferred_next`, `mass`, and whatever
/// else they track) and return it as a [`MoveIntent`].
///
/// # Thread safety
///
/// The simulation may call `decide` for many agents at once, so
/// implementations must be `Send + Sync`.  Per-agent state belongs on the
/// [`Pedestrian`], not on the model.
pub trait BehaviorModel: Send + Sync + 'static {
    fn decide(
        &self,
        ped:   &mut Pedestrian,
        route: &Route,
        ctx:   &TickContext<'_>,
        rng:   &mut AgentRng,
    ) -> MoveIntent;
}

// ── FloorFieldBehavior ────────────────────────────────────────────────────────

/// Static direction preference tilted by the dynamic trace.
///
/// 1. the first step of the route becomes the preferred move;
/// 2. the base matrix is rotated toward it;
/// 3. `exp(trace) · exp(tilt · rotated)` is normalized;
/// 4. one feasible move is drawn from the result.
#[derive(Clone, Debug)]
pub struct FloorFieldBehavior {
    pub base: PreferenceMatrix,
    pub tilt: f64,
}

impl FloorFieldBehavior {
    pub fn new(base: PreferenceMatrix, tilt: f64) -> Self {
        Self { base, tilt }
    }

    pub fn from_config(config: &EvacConfig) -> Self {
        Self::new(PreferenceMatrix::new(config.base_preference), config.preference_tilt)
    }

    /// The normalized distribution `ped` would sample from, given its
    /// current `preferred_move`.
    pub fn distribution(&self, ped: &Pedestrian, ctx: &TickContext<'_>) -> PreferenceMatrix {
        let rotated = self.base.rotate_toward(ped.preferred_move);
        let trace = ctx.dynamic.neighborhood3x3(ped.position);
        let mut matrix = rotated.combine(&trace, self.tilt);
        // An unusable sum is left as is; masking then sampling falls back
        // to staying.
        matrix.normalize();
        matrix
    }
}

impl Default for FloorFieldBehavior {
    fn default() -> Self {
        Self::from_config(&EvacConfig::default())
    }
}

impl BehaviorModel for FloorFieldBehavior {
    fn decide(
        &self,
        ped:   &mut Pedestrian,
        route: &Route,
        ctx:   &TickContext<'_>,
        rng:   &mut AgentRng,
    ) -> MoveIntent {
        ped.best_move_from_path(&route.path);
        let matrix = self.distribution(ped, ctx);
        let feasible = ped.feasible_moves(ctx.grid);
        ped.sample_move(&matrix, &feasible, rng);
        MoveIntent::from(&*ped)
    }
}
