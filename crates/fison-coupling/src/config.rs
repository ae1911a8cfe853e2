//! Run configuration.
//!
//! Immutable once constructed; validated before any solver is built.
//! Loaded from JSON by the CLI, or built programmatically for tests.

use fison_types::constants::{DEFAULT_MAX_ITERATIONS, DEFAULT_NUM_SMOOTHINGS, DEFAULT_TOLERANCE};
use fison_types::{FisonError, FisonResult};
use serde::{Deserialize, Serialize};

/// All recognized run options.
///
/// The tolerance budget is split by the three weights: `w_h` for space
/// discretization, `w_k` for time discretization, `w_c` for the per-step
/// coupling tolerance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    /// Global goal-functional error budget.
    pub tolerance: f64,
    /// Space-discretization share of the budget.
    pub w_h: f64,
    /// Time-discretization share of the budget.
    pub w_k: f64,
    /// Coupling share of the budget.
    pub w_c: f64,
    /// Fixed time steps instead of residual-driven adaptive steps.
    pub uniform_timestep: bool,
    /// First time-step size. `None` picks `end_time / 100`.
    pub initial_timestep: Option<f64>,
    /// Cap on fixed-point iterations per time step.
    pub maximum_iterations: u32,
    /// Laplacian smoothing passes in the mesh→fluid transfer.
    pub num_smoothings: u32,
    /// Polynomial degree of the structure elements (1 or 2).
    pub structure_element_degree: u32,
    /// Run the primal solve each outer pass.
    pub solve_primal: bool,
    /// Run the dual solve each outer pass.
    pub solve_dual: bool,
    /// Run the error estimator each outer pass.
    pub estimate_error: bool,
    /// Persist solution series and meshes.
    pub save_solution: bool,
    /// Emit plot-friendly output (accepted, currently ignored).
    pub plot_solution: bool,
    /// Directory the store writes under.
    pub output_directory: String,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            w_h: 0.45,
            w_k: 0.45,
            w_c: 0.1,
            uniform_timestep: true,
            initial_timestep: None,
            maximum_iterations: DEFAULT_MAX_ITERATIONS,
            num_smoothings: DEFAULT_NUM_SMOOTHINGS,
            structure_element_degree: 1,
            solve_primal: true,
            solve_dual: true,
            estimate_error: true,
            save_solution: true,
            plot_solution: false,
            output_directory: "output".to_string(),
        }
    }
}

impl Configuration {
    /// Preset for quick debugging runs: loose tolerance, uniform steps,
    /// no dual solve or estimation.
    pub fn debug() -> Self {
        Self {
            tolerance: 0.1,
            uniform_timestep: true,
            solve_dual: false,
            estimate_error: false,
            save_solution: false,
            ..Self::default()
        }
    }

    /// Checks value ranges. Call once before constructing solvers.
    pub fn validate(&self) -> FisonResult<()> {
        if !(self.tolerance > 0.0) {
            return Err(FisonError::InvalidConfig(format!(
                "tolerance must be positive, got {}",
                self.tolerance
            )));
        }
        for (name, w) in [("w_h", self.w_h), ("w_k", self.w_k), ("w_c", self.w_c)] {
            if !(w > 0.0) {
                return Err(FisonError::InvalidConfig(format!(
                    "{name} must be positive, got {w}"
                )));
            }
        }
        if self.maximum_iterations == 0 {
            return Err(FisonError::InvalidConfig(
                "maximum_iterations must be at least 1".into(),
            ));
        }
        if let Some(dt) = self.initial_timestep {
            if !(dt > 0.0) {
                return Err(FisonError::InvalidConfig(format!(
                    "initial_timestep must be positive, got {dt}"
                )));
            }
        }
        if !matches!(self.structure_element_degree, 1 | 2) {
            return Err(FisonError::InvalidConfig(format!(
                "structure_element_degree must be 1 or 2, got {}",
                self.structure_element_degree
            )));
        }
        if self.save_solution && self.output_directory.is_empty() {
            return Err(FisonError::InvalidConfig(
                "output_directory must be set when save_solution is enabled".into(),
            ));
        }
        Ok(())
    }

    /// First time-step size, applying the default when unset.
    pub fn first_timestep(&self, end_time: f64) -> f64 {
        self.initial_timestep.unwrap_or(end_time / 100.0)
    }
}
