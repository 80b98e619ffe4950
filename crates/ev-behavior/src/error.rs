use ev_field::FieldError;
use thiserror::Error;

/// Errors raised while routing an agent.
#[derive(Debug, Error)]
pub enum BehaviorError {
    #[error(transparent)]
    Field(#[from] FieldError),
}

pub type BehaviorResult<T> = Result<T, BehaviorError>;
