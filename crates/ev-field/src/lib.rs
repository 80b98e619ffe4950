//! `ev-field` — the floor fields that steer pedestrians.
//!
//! # Crate layout
//!
//! | Module              | Contents                                                  |
//! |---------------------|-----------------------------------------------------------|
//! | [`static_field`]    | `StaticField` — lazily computed per-cell routes to targets |
//! | [`dynamic_field`]   | `DynamicField` — decaying, diffusing traffic trace        |
//! | [`preference`]      | `PreferenceMatrix`, `Heading` — the 3×3 move distribution |
//! | [`error`]           | `FieldError`, `FieldResult<T>`                            |
//!
//! # How the fields combine
//!
//! The static field answers "where am I heading": a shortest path from the
//! agent's cell to its chosen exit (or its room's door).  The first step of
//! that path becomes a [`Heading`], which rotates the configured base
//! preference so its strongest weight points along the path.  The dynamic
//! field answers "where have people just been": its 3×3 neighbourhood is
//! combined with the rotated base as `exp(dynamic) · exp(tilt · static)` and
//! normalized into a probability distribution over the nine moves.

pub mod dynamic_field;
pub mod error;
pub mod preference;
pub mod static_field;


pub use dynamic_field::{DIFFUSION_KERNEL, DynamicField};
pub use error::{FieldError, FieldResult};
pub use preference::{Heading, PreferenceMatrix};
pub use static_field::{StaticField, StaticFieldEntry};
