//! The fixed-point coupling loop.
//!
//! One instance of the loop runs per time step. The sweep order is fixed
//! Gauss–Seidel: each stage consumes the freshest output of the previous
//! stage within the same iteration —
//!
//! ```text
//! Fluid.step → fluid→structure → Structure.step → structure→mesh
//!            → Mesh.step → mesh→fluid (feeding the next Fluid.step)
//! ```
//!
//! Convergence is measured on the structure-displacement increment
//! between successive iterates. Exhausting the iteration budget is fatal
//! for the whole run; the primal solver converts [`CouplingResult::Failed`]
//! into the run-aborting divergence error.

use fison_mesh::Topology;
use fison_physics::{FluidAdapter, MeshMotionAdapter, ProblemDefinition, StructureAdapter};
use fison_telemetry::{EventBus, EventKind};
use fison_types::constants::TIME_EPSILON;
use fison_types::FisonResult;

use crate::transfer::{self, TractionProjector};

/// Outcome of the coupling loop for one time step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CouplingResult {
    /// The increment dropped below the per-step tolerance.
    Converged {
        /// Iterations used (1-indexed).
        iterations: u32,
        /// Final increment norm.
        increment: f64,
    },
    /// The iteration budget ran out first.
    Failed {
        /// Iterations performed (equals the budget).
        iterations: u32,
        /// Increment norm of the final iteration.
        last_increment: f64,
    },
}

/// Per-step coupling tolerance from the budget split.
///
/// Shorter steps and earlier times tighten the tolerance so the coupling
/// error accumulated over `[0, T]` stays within the `w_c` share of the
/// global budget. Always a single positive scalar.
pub fn compute_itertol(w_c: f64, tolerance: f64, dt: f64, t1: f64) -> f64 {
    w_c * tolerance * dt / t1.max(TIME_EPSILON)
}

/// Bundles everything the coupling loop needs per time step.
pub struct CouplingContext<'a> {
    pub problem: &'a dyn ProblemDefinition,
    pub projector: &'a TractionProjector,
    pub topology: &'a Topology,
    pub itertol: f64,
    pub maximum_iterations: u32,
    pub num_smoothings: u32,
    /// Time-step index, for event tagging.
    pub timestep: u32,
}

/// Runs the Gauss–Seidel loop for the step `(t0, t1]` of size `dt`.
///
/// Engine failures propagate immediately; non-convergence is reported as
/// a value so the caller attaches the time context to the fatal error.
pub fn couple_step(
    ctx: &CouplingContext<'_>,
    fluid: &mut FluidAdapter,
    structure: &mut StructureAdapter,
    mesh: &mut MeshMotionAdapter,
    dt: f64,
    bus: &EventBus,
) -> FisonResult<CouplingResult> {
    // Increment reference: the committed displacement entering the step.
    let mut previous = structure.solution().displacement.clone();
    let mut last_increment = f64::INFINITY;

    for iteration in 1..=ctx.maximum_iterations {
        fluid.step(dt)?;

        let traction = transfer::fluid_to_structure(
            ctx.projector,
            ctx.problem,
            fluid.latest(),
            &mesh.latest().displacement,
        )?;
        structure.apply_interface_condition(&traction);
        structure.step(dt)?;

        let boundary = transfer::structure_to_mesh(ctx.problem, &structure.latest().displacement);
        mesh.apply_interface_condition(&boundary);
        mesh.step(dt)?;

        let update = transfer::mesh_to_fluid(
            ctx.problem.fluid_mesh(),
            ctx.topology,
            &mesh.latest().displacement,
            fluid.geometry(),
            dt,
            ctx.num_smoothings,
        )?;
        fluid.apply_interface_condition(&update);

        let increment = previous.difference_norm(&structure.latest().displacement);
        last_increment = increment;
        bus.emit_kind(
            ctx.timestep,
            EventKind::CouplingIteration {
                iteration,
                increment,
                tolerance: ctx.itertol,
            },
        );

        if increment < ctx.itertol {
            bus.emit_kind(
                ctx.timestep,
                EventKind::CouplingConverged {
                    iterations: iteration,
                    increment,
                },
            );
            return Ok(CouplingResult::Converged {
                iterations: iteration,
                increment,
            });
        }

        previous.copy_from(&structure.latest().displacement);
    }

    Ok(CouplingResult::Failed {
        iterations: ctx.maximum_iterations,
        last_increment,
    })
}
