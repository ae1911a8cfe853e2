//! Run event types.
//!
//! Structured events emitted at each stage of a coupled solve: time steps,
//! coupling iterations, convergence reports, refinement passes. Events are
//! lightweight value types carrying just enough data for monitoring and
//! post-mortem diagnosis of a diverged run.

use serde::{Deserialize, Serialize};

/// An event emitted during a coupled solve.
///
/// `timestep` counts time steps within the current primal solve
/// (0 before the first step); outer-loop events carry the refinement
/// level instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunEvent {
    /// Time-step number within the current primal solve, or the
    /// refinement level for outer-loop events.
    pub timestep: u32,
    /// Event payload.
    pub kind: EventKind,
}

/// What the outer loop decided to do with the mesh this pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MeshDecision {
    /// Mesh kept unchanged: spatial error already within its sub-budget.
    Frozen,
    /// Every cell refined (temporal-convergence study policy).
    RefinedUniform,
    /// Indicator-driven adaptive refinement.
    RefinedByIndicators,
}

/// Event payload variants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EventKind {
    /// A new time step started.
    TimestepBegin {
        /// Target time t1 for this step.
        t: f64,
        /// Step size.
        dt: f64,
    },

    /// Time step committed.
    TimestepEnd {
        /// Committed time.
        t: f64,
        /// Coupling iterations the step needed.
        coupling_iterations: u32,
    },

    /// One Gauss–Seidel sweep over the three subproblems completed.
    CouplingIteration {
        /// Iteration number within the time step (1-indexed).
        iteration: u32,
        /// Structure-displacement increment norm.
        increment: f64,
        /// Per-step coupling tolerance the increment is tested against.
        tolerance: f64,
    },

    /// The coupling loop converged for this time step.
    CouplingConverged {
        /// Iterations used.
        iterations: u32,
        /// Final increment norm.
        increment: f64,
    },

    /// Goal-functional sample after a converged step.
    GoalSample {
        /// Instantaneous functional value at t1.
        value: f64,
        /// Trapezoidal time-integral so far.
        integrated: f64,
    },

    /// One outer adaptive pass finished its error check.
    RefinementPass {
        /// Refinement level (0-indexed outer iteration).
        level: u32,
        /// Estimated goal-functional error.
        error: f64,
        /// Global tolerance it was compared against.
        tolerance: f64,
    },

    /// The outer loop's mesh decision for this pass.
    MeshAction {
        /// What happened to the mesh.
        decision: MeshDecision,
        /// Cell count of the mesh entering the next pass.
        cells: usize,
    },

    /// Custom event for extensibility.
    Custom {
        /// Arbitrary label.
        label: String,
        /// JSON-encoded payload.
        payload: String,
    },
}

impl RunEvent {
    /// Creates a new event for the given timestep.
    pub fn new(timestep: u32, kind: EventKind) -> Self {
        Self { timestep, kind }
    }
}
