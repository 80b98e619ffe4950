use ev_behavior::BehaviorError;
use ev_grid::GridError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(String),

    #[error("grid error: {0}")]
    Grid(#[from] GridError),

    #[error(transparent)]
    Behavior(#[from] BehaviorError),

    #[error("conflict resolution did not converge after {iterations} rounds")]
    ConflictNonConvergence { iterations: usize },

    #[error("invariant violated: {0}")]
    InvariantViolation(String),
}

pub type SimResult<T> = Result<T, SimError>;
