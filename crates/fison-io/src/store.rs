//! The persistence contract.
//!
//! The primal solver and the adaptive controller write through this
//! trait; they never know where the data goes. Failures from a concrete
//! store are real I/O errors and propagate as such.

use fison_mesh::TriMesh;
use fison_physics::{DofCounts, SolutionState};
use fison_types::FisonResult;

/// Sink for everything a run produces.
///
/// Time-series operations append; snapshot operations overwrite by key.
pub trait SolutionStore {
    /// Appends one coupled state keyed by time.
    fn append_state(&mut self, t: f64, state: &SolutionState) -> FisonResult<()>;

    /// Appends the coupling iteration count for the step ending at `t`.
    fn append_iteration_count(&mut self, t: f64, iterations: u32) -> FisonResult<()>;

    /// Appends a goal-functional sample `(t, value, integrated-so-far)`.
    fn append_goal(&mut self, t: f64, value: f64, integrated: f64) -> FisonResult<()>;

    /// Writes the final goal-functional value of one primal solve.
    fn write_final_goal(&mut self, value: f64, integrated: f64) -> FisonResult<()>;

    /// Persists a mesh snapshot keyed by refinement level.
    fn save_mesh(&mut self, level: u32, mesh: &TriMesh) -> FisonResult<()>;

    /// Persists dof counts keyed by refinement level and step count.
    fn save_dof_counts(&mut self, level: u32, timesteps: u32, dofs: &DofCounts)
        -> FisonResult<()>;
}

/// A store that discards everything.
///
/// Used when `save_solution` is off, and as the test double wherever a
/// solve needs a store but the test asserts on something else.
#[derive(Debug, Default)]
pub struct NullStore;

impl SolutionStore for NullStore {
    fn append_state(&mut self, _t: f64, _state: &SolutionState) -> FisonResult<()> {
        Ok(())
    }

    fn append_iteration_count(&mut self, _t: f64, _iterations: u32) -> FisonResult<()> {
        Ok(())
    }

    fn append_goal(&mut self, _t: f64, _value: f64, _integrated: f64) -> FisonResult<()> {
        Ok(())
    }

    fn write_final_goal(&mut self, _value: f64, _integrated: f64) -> FisonResult<()> {
        Ok(())
    }

    fn save_mesh(&mut self, _level: u32, _mesh: &TriMesh) -> FisonResult<()> {
        Ok(())
    }

    fn save_dof_counts(
        &mut self,
        _level: u32,
        _timesteps: u32,
        _dofs: &DofCounts,
    ) -> FisonResult<()> {
        Ok(())
    }
}
