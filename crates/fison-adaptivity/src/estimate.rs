//! Error estimation and dual-solve contracts.
//!
//! The estimation mathematics lives behind these traits; the controller
//! only consumes the resulting [`ErrorEstimate`].

use fison_coupling::Configuration;
use fison_physics::ProblemDefinition;
use fison_types::{FisonError, FisonResult};

/// Error breakdown produced once per outer-loop pass.
#[derive(Debug, Clone)]
pub struct ErrorEstimate {
    /// Estimated goal-functional error.
    pub error: f64,
    /// Per-cell refinement indicators on the fluid mesh.
    pub indicators: Vec<f64>,
    /// Updated stability factor `ST` for the adaptive time stepper.
    pub stability_factor: f64,
    /// Space-discretization share `E_h` of the error.
    pub space_error: f64,
}

/// Produces an [`ErrorEstimate`] for the problem's current meshes.
pub trait ErrorEstimator {
    /// Estimates the goal-functional error after a primal (and optional
    /// dual) solve on the current mesh generation.
    fn estimate(
        &mut self,
        problem: &dyn ProblemDefinition,
        config: &Configuration,
    ) -> FisonResult<ErrorEstimate>;
}

/// Solves the dual problem backward over `[0, T]`.
///
/// The dual solution only sharpens the error estimate; the controller
/// never consumes it directly.
pub trait DualSolver {
    /// Runs the dual solve for the current mesh generation.
    fn solve_dual(
        &mut self,
        problem: &dyn ProblemDefinition,
        config: &Configuration,
    ) -> FisonResult<()>;
}

/// Dual solver that does nothing.
///
/// Stands in when the dual mathematics is not wired up; the estimator
/// then works from the primal solution alone.
#[derive(Debug, Default)]
pub struct NullDualSolver;

impl DualSolver for NullDualSolver {
    fn solve_dual(
        &mut self,
        _problem: &dyn ProblemDefinition,
        _config: &Configuration,
    ) -> FisonResult<()> {
        Ok(())
    }
}

/// Estimator whose error halves with every pass.
///
/// Drives the demo scenario: the error starts above the tolerance and
/// decays geometrically, exercising a few refinement passes before the
/// loop stops. Indicators weight cells near the interface highest.
#[derive(Debug)]
pub struct DecayingEstimator {
    initial_error: f64,
    space_fraction: f64,
    passes: u32,
}

impl DecayingEstimator {
    /// `initial_error` is the first pass's error; `space_fraction` of it
    /// is reported as `E_h`.
    pub fn new(initial_error: f64, space_fraction: f64) -> FisonResult<Self> {
        if !(initial_error > 0.0) {
            return Err(FisonError::InvalidConfig(format!(
                "Initial error must be positive, got {initial_error}"
            )));
        }
        if !(0.0..=1.0).contains(&space_fraction) {
            return Err(FisonError::InvalidConfig(format!(
                "Space fraction must lie in [0, 1], got {space_fraction}"
            )));
        }
        Ok(Self {
            initial_error,
            space_fraction,
            passes: 0,
        })
    }
}

impl ErrorEstimator for DecayingEstimator {
    fn estimate(
        &mut self,
        problem: &dyn ProblemDefinition,
        _config: &Configuration,
    ) -> FisonResult<ErrorEstimate> {
        let error = self.initial_error * 0.5_f64.powi(self.passes as i32);
        self.passes += 1;

        let mesh = problem.fluid_mesh();
        let mut indicators = Vec::with_capacity(mesh.cell_count());
        for c in 0..mesh.cell_count() {
            let [v0, v1, v2] = mesh.cell(c);
            let y = (mesh.pos_y[v0 as usize] + mesh.pos_y[v1 as usize] + mesh.pos_y[v2 as usize])
                / 3.0;
            // Cells closest to the interface dominate the estimate.
            indicators.push(error * mesh.cell_area(c) / (1.0 + y.abs()));
        }

        Ok(ErrorEstimate {
            error,
            indicators,
            stability_factor: 1.0,
            space_error: self.space_fraction * error,
        })
    }
}
