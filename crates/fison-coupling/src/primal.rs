//! The primal coupled solver — one full time-dependent solve.
//!
//! Runs the time loop until the controller reaches the end time: couple
//! to convergence, persist the step's state, commit all three adapters,
//! accumulate the goal functional, pick the next step size. A coupling
//! failure or engine failure aborts the solve with no partial result.

use tracing::{debug, info};

use fison_io::SolutionStore;
use fison_mesh::{Topology, TriMesh};
use fison_physics::{
    DofCounts, FluidAdapter, FluidEngine, MeshMotionAdapter, MeshMotionEngine, ProblemDefinition,
    SolutionState, StructureAdapter, StructureEngine,
};
use fison_telemetry::{EventBus, EventKind};
use fison_types::{FisonError, FisonResult};

use crate::config::Configuration;
use crate::fixed_point::{self, CouplingContext, CouplingResult};
use crate::goal::GoalFunctionalAccumulator;
use crate::timestep::{SeriesWindow, TimeStepController};
use crate::transfer::TractionProjector;

/// Builds fresh engines for a mesh generation.
///
/// The outer adaptive loop rebuilds all three adapters after each
/// refinement; the factory is how it gets engines sized for the new
/// meshes without knowing the concrete solver types.
pub trait EngineFactory {
    /// Fluid engine for the given fluid mesh.
    fn fluid_engine(&self, mesh: &TriMesh) -> Box<dyn FluidEngine>;

    /// Structure engine for the given structure mesh.
    fn structure_engine(&self, mesh: &TriMesh) -> Box<dyn StructureEngine>;

    /// Mesh-motion engine for the given fluid mesh.
    fn mesh_engine(&self, mesh: &TriMesh) -> Box<dyn MeshMotionEngine>;
}

/// Result of one completed primal solve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrimalOutcome {
    /// Goal-functional value at the final time step.
    pub goal_functional: f64,
    /// Trapezoidal time integral of the goal functional over `[0, T]`.
    pub integrated_goal: f64,
    /// Number of time steps taken.
    pub timesteps: u32,
    /// Coupling iterations summed over all steps.
    pub total_coupling_iterations: u64,
}

/// One full time-dependent coupled solve over `[0, T]`.
pub struct PrimalCoupledSolver {
    config: Configuration,
}

impl PrimalCoupledSolver {
    /// Creates a solver from a validated configuration.
    pub fn new(config: Configuration) -> FisonResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Runs the time loop.
    ///
    /// `stability_factor` is the current warm-start value of `ST`;
    /// `level` keys the persisted per-level artifacts.
    pub fn solve(
        &self,
        problem: &dyn ProblemDefinition,
        engines: &dyn EngineFactory,
        stability_factor: f64,
        level: u32,
        store: &mut dyn SolutionStore,
        bus: &EventBus,
    ) -> FisonResult<PrimalOutcome> {
        let fluid_mesh = problem.fluid_mesh();
        let structure_mesh = problem.structure_mesh();
        let end_time = problem.end_time();

        let mut fluid = FluidAdapter::new(engines.fluid_engine(fluid_mesh), fluid_mesh);
        let mut structure =
            StructureAdapter::new(engines.structure_engine(structure_mesh), structure_mesh);
        let mut mesh = MeshMotionAdapter::new(engines.mesh_engine(fluid_mesh), fluid_mesh);

        let projector = TractionProjector::new(fluid_mesh)?;
        let topology = Topology::build(fluid_mesh);

        let first_dt = self.config.first_timestep(end_time);
        let mut controller = if self.config.uniform_timestep {
            TimeStepController::uniform(first_dt, end_time)?
        } else {
            TimeStepController::adaptive(first_dt, end_time, self.config.w_k, self.config.tolerance)?
        };

        // Initial state at t = 0, including the mesh adapter's committed
        // displacement, seeds both the store and the goal accumulator.
        let initial = {
            let mut state = problem.initial_state();
            state.mesh_displacement = mesh.solution().displacement.clone();
            state
        };
        if self.config.save_solution {
            store.append_state(0.0, &initial)?;
        }
        let mut goal =
            GoalFunctionalAccumulator::new(problem.evaluate_functional(&initial, 0.0, 0.0));
        let mut window = SeriesWindow::new();
        window.push(0.0, initial);

        let mut timesteps: u32 = 0;
        let mut total_iterations: u64 = 0;

        info!(level, end_time, uniform = self.config.uniform_timestep, "primal solve started");

        loop {
            let record = controller.record();
            let itertol = fixed_point::compute_itertol(
                self.config.w_c,
                self.config.tolerance,
                record.dt,
                record.t1,
            );
            bus.emit_kind(
                timesteps,
                EventKind::TimestepBegin {
                    t: record.t1,
                    dt: record.dt,
                },
            );

            let ctx = CouplingContext {
                problem,
                projector: &projector,
                topology: &topology,
                itertol,
                maximum_iterations: self.config.maximum_iterations,
                num_smoothings: self.config.num_smoothings,
                timestep: timesteps,
            };

            let iterations = match fixed_point::couple_step(
                &ctx,
                &mut fluid,
                &mut structure,
                &mut mesh,
                record.dt,
                bus,
            )? {
                CouplingResult::Converged { iterations, .. } => iterations,
                CouplingResult::Failed {
                    iterations,
                    last_increment,
                } => {
                    return Err(FisonError::CouplingDivergence {
                        time: record.t1,
                        iterations,
                        last_increment,
                    });
                }
            };
            total_iterations += u64::from(iterations);

            // Persist the converged step before committing it.
            let state =
                SolutionState::from_fields(fluid.latest(), structure.latest(), mesh.latest());
            if self.config.save_solution {
                store.append_state(record.t1, &state)?;
            }
            store.append_iteration_count(record.t1, iterations)?;

            fluid.commit(record.t1);
            structure.commit(record.t1);
            mesh.commit(record.t1);
            fluid.post_commit_housekeeping();

            let value = problem.evaluate_functional(&state, record.t0, record.t1);
            goal.accumulate(record.dt, value);
            store.append_goal(record.t1, value, goal.integrated())?;
            bus.emit_kind(
                timesteps,
                EventKind::GoalSample {
                    value,
                    integrated: goal.integrated(),
                },
            );

            timesteps += 1;
            bus.emit_kind(
                timesteps - 1,
                EventKind::TimestepEnd {
                    t: record.t1,
                    coupling_iterations: iterations,
                },
            );
            debug!(t = record.t1, dt = record.dt, iterations, "time step committed");

            window.push(record.t1, state);

            if record.at_end {
                break;
            }
            controller.advance(window.time_residual(), stability_factor);
        }

        store.write_final_goal(goal.value(), goal.integrated())?;
        store.save_dof_counts(
            level,
            timesteps,
            &DofCounts::from_meshes(fluid_mesh, structure_mesh),
        )?;

        info!(
            timesteps,
            total_iterations,
            goal = goal.value(),
            integrated = goal.integrated(),
            "primal solve finished"
        );

        Ok(PrimalOutcome {
            goal_functional: goal.value(),
            integrated_goal: goal.integrated(),
            timesteps,
            total_coupling_iterations: total_iterations,
        })
    }
}
