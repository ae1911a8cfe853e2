//! # fison-types
//!
//! Shared types, identifiers, error types, and numerical constants
//! for the Fison partitioned coupling engine.
//!
//! This crate has zero domain logic — it defines the vocabulary
//! that all other Fison crates share.

pub mod constants;
pub mod error;
pub mod ids;

pub use error::{FisonError, FisonResult};
pub use ids::SubproblemKind;
