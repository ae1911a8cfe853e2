//! # fison-physics
//!
//! The three subproblem adapters of the partitioned solve (fluid,
//! structure, mesh motion), the engine contracts they delegate to, and
//! the externally owned problem definition.
//!
//! ## Key Types
//!
//! - [`SolutionState`] — the coupled unknowns at one time instant
//! - [`ProblemDefinition`] — geometry, materials, goal functional, dof maps
//! - [`FluidEngine`] / [`StructureEngine`] / [`MeshMotionEngine`] —
//!   pluggable black-box solvers
//! - [`FluidAdapter`] / [`StructureAdapter`] / [`MeshMotionAdapter`] —
//!   step/commit lifecycle around an engine
//! - [`FluidGeometry`] / [`GeometryUpdate`] — deformed-domain bookkeeping,
//!   owned exclusively by the fluid adapter

pub mod engine;
pub mod fluid;
pub mod geometry;
pub mod mesh_motion;
pub mod problem;
pub mod state;
pub mod structure;
pub mod stub;

pub use engine::{FluidEngine, MeshMotionEngine, StructureEngine};
pub use fluid::FluidAdapter;
pub use geometry::{FluidGeometry, GeometryUpdate};
pub use mesh_motion::MeshMotionAdapter;
pub use problem::{validate_problem, MaterialParams, ProblemDefinition};
pub use state::{DofCounts, FluidFields, MeshFields, SolutionState, StructureFields};
pub use structure::StructureAdapter;
