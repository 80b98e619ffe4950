//! Framework error type.
//!
//! Sub-crates define their own error enums and wrap `EvError` as one variant
//! via `From`, so configuration failures surface unchanged through `?`.

use thiserror::Error;

use crate::Position;

/// The top-level error type for `ev-core` and a common base for sub-crates.
#[derive(Debug, Error)]
pub enum EvError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("position {0} is outside the grid")]
    OutOfBounds(Position),
}

/// Shorthand result type for all `ev-*` crates.
pub type EvResult<T> = Result<T, EvError>;
