//! # fison-io
//!
//! Persistence boundary of the coupling engine: the store contract the
//! solvers write through, a directory-backed JSONL implementation, and
//! a null store for runs that keep nothing.
//!
//! ## Key Types
//!
//! - [`SolutionStore`] — persistence contract (states, iteration counts,
//!   goal samples, meshes, dof counts)
//! - [`DirectoryStore`] — JSONL series under an output directory
//! - [`NullStore`] — discards everything
//! - [`StoreSummary`] — read-back summary of a stored run

pub mod directory;
pub mod store;

pub use directory::{DirectoryStore, StoreSummary};
pub use store::{NullStore, SolutionStore};
