use ev_core::Position;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FieldError {
    #[error("no static field entry for cell {cell} toward {target}")]
    MissingEntry { cell: Position, target: Position },

    #[error("expected {expected} probabilities, got {got}")]
    ProbabilityMismatch { expected: usize, got: usize },
}

pub type FieldResult<T> = Result<T, FieldError>;
