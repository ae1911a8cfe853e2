//! # fison-math
//!
//! Sparse linear algebra used by the interface transfer operators.
//!
//! The fluid-to-structure traction transfer projects the traction onto the
//! interface trace space by solving a small symmetric positive-definite
//! mass-matrix system. This crate provides the CSR assembly format and a
//! cached sparse Cholesky solver for that system.
//!
//! ## Key Types
//!
//! - [`CsrMatrix`] — compressed sparse row matrix (f64)
//! - [`SparseSolver`] — SPD solver trait (factorize once, solve many)
//! - [`CholeskySolver`] — faer-backed supernodal LLᵀ implementation

pub mod cholesky;
pub mod sparse;

pub use cholesky::CholeskySolver;
pub use sparse::{CsrMatrix, SparseSolver};
