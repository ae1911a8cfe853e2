//! # fison-adaptivity
//!
//! The outer adaptive loop: error estimation contracts, the dual-solve
//! boundary, and the controller that decides between stopping, freezing
//! the mesh, and refining it.
//!
//! ## Key Types
//!
//! - [`ErrorEstimate`] / [`ErrorEstimator`] — per-pass error breakdown
//! - [`DualSolver`] — dual-problem boundary (sharpens the estimate only)
//! - [`AdaptiveRefinementController`] — the outer loop
//! - [`GoalValue`] — fresh vs. stale goal-functional marker

pub mod controller;
pub mod estimate;

pub use controller::{
    AdaptiveOptions, AdaptiveOutcome, AdaptiveRefinementController, GoalValue,
};
pub use estimate::{
    DecayingEstimator, DualSolver, ErrorEstimate, ErrorEstimator, NullDualSolver,
};
