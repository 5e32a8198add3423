//! `puntualcheck-core` — shared primitives for the PuntualCheck console.
//!
//! Pure value types only; no IO, no transport.

pub mod error;
pub mod id;

pub use error::{DomainError, DomainResult};
pub use id::UserId;
