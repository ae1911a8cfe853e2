//! # fison-coupling
//!
//! The partitioned coupling core: interface transfer operators, the
//! Gauss–Seidel fixed-point loop, time-step control, goal-functional
//! accumulation, and the primal coupled solver that ties them together.
//!
//! ## Key Types
//!
//! - [`Configuration`] — immutable, validated run options
//! - [`TractionProjector`] — fluid→structure traction with the interface
//!   mass-matrix projection
//! - [`CouplingResult`] — converged / failed outcome of one time step
//! - [`TimeStepController`] — uniform and residual-driven adaptive stepping
//! - [`PrimalCoupledSolver`] — one full time-dependent coupled solve

pub mod config;
pub mod fixed_point;
pub mod goal;
pub mod primal;
pub mod timestep;
pub mod transfer;

pub use config::Configuration;
pub use fixed_point::{compute_itertol, couple_step, CouplingContext, CouplingResult};
pub use goal::GoalFunctionalAccumulator;
pub use primal::{EngineFactory, PrimalCoupledSolver, PrimalOutcome};
pub use timestep::{SeriesWindow, TimeStepController, TimeStepRecord};
pub use transfer::TractionProjector;
