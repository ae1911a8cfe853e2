//! The adaptive refinement outer loop.
//!
//! Each pass optionally runs the primal solve, the dual solve, and the
//! error estimator, then decides among three outcomes: stop (error within
//! the budget), freeze the mesh (spatial share already small enough), or
//! refine. Freezing deliberately leaves the overall error above the
//! tolerance until the time stepper reduces it; the loop carries no
//! built-in pass cap unless [`AdaptiveOptions::max_passes`] sets one.

use tracing::{info, warn};

use fison_coupling::{Configuration, EngineFactory, PrimalCoupledSolver};
use fison_io::SolutionStore;
use fison_mesh::MeshRefiner;
use fison_physics::ProblemDefinition;
use fison_telemetry::{EventBus, EventKind, MeshDecision};
use fison_types::FisonResult;

use crate::estimate::{DualSolver, ErrorEstimate, ErrorEstimator};

/// Options of the outer loop itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct AdaptiveOptions {
    /// Optional cap on outer passes. `None` lets the loop run until the
    /// error criterion stops it, however long that takes.
    pub max_passes: Option<u32>,
}

/// Goal-functional value at the end of the outer loop.
///
/// A pass that skips the primal solve has no fresh value; the marker
/// keeps that visible instead of silently reusing old data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GoalValue {
    /// Computed by the final pass's primal solve.
    Fresh(f64),
    /// The final pass skipped the primal solve; the payload is the most
    /// recent earlier value, if any pass produced one.
    Stale(Option<f64>),
}

/// Result of the outer loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdaptiveOutcome {
    /// Goal functional with its freshness marker.
    pub goal: GoalValue,
    /// Integrated goal functional of the last primal solve, if any ran.
    pub integrated_goal: Option<f64>,
    /// Completed outer passes.
    pub passes: u32,
    /// Error estimate of the final pass.
    pub final_error: f64,
    /// Fluid-mesh cell count at exit.
    pub final_cells: usize,
    /// True when the loop stopped on `error ≤ tolerance`; false when the
    /// pass cap cut it off first.
    pub converged: bool,
}

/// Drives refinement passes until the estimated error is within budget.
pub struct AdaptiveRefinementController {
    config: Configuration,
    options: AdaptiveOptions,
}

impl AdaptiveRefinementController {
    /// Creates a controller from a validated configuration.
    pub fn new(config: Configuration, options: AdaptiveOptions) -> FisonResult<Self> {
        config.validate()?;
        Ok(Self { config, options })
    }

    /// Runs the outer loop.
    pub fn solve(
        &self,
        problem: &mut dyn ProblemDefinition,
        engines: &dyn EngineFactory,
        estimator: &mut dyn ErrorEstimator,
        dual: &mut dyn DualSolver,
        refiner: &dyn MeshRefiner,
        store: &mut dyn SolutionStore,
        bus: &mut EventBus,
    ) -> FisonResult<AdaptiveOutcome> {
        let primal = PrimalCoupledSolver::new(self.config.clone())?;

        // ST survives across passes; only the estimator updates it.
        let mut stability_factor = 1.0;
        let mut goal = GoalValue::Stale(None);
        let mut integrated_goal = None;
        let mut level: u32 = 0;

        store.save_mesh(level, problem.fluid_mesh())?;

        loop {
            if self.config.solve_primal {
                let outcome =
                    primal.solve(problem, engines, stability_factor, level, store, bus)?;
                goal = GoalValue::Fresh(outcome.goal_functional);
                integrated_goal = Some(outcome.integrated_goal);
            } else {
                info!(level, "primal solve disabled; goal functional is stale");
                goal = match goal {
                    GoalValue::Fresh(v) | GoalValue::Stale(Some(v)) => GoalValue::Stale(Some(v)),
                    GoalValue::Stale(None) => GoalValue::Stale(None),
                };
            }

            if self.config.solve_dual {
                dual.solve_dual(problem, &self.config)?;
            } else {
                info!(level, "dual solve disabled");
            }

            let estimate = if self.config.estimate_error {
                estimator.estimate(problem, &self.config)?
            } else {
                // Explicit fallback: no estimate means the loop treats the
                // error as zero and stops after this pass.
                warn!(level, "error estimation disabled; assuming zero error");
                ErrorEstimate {
                    error: 0.0,
                    indicators: Vec::new(),
                    stability_factor,
                    space_error: 0.0,
                }
            };
            stability_factor = estimate.stability_factor;

            bus.emit_kind(
                level,
                EventKind::RefinementPass {
                    level,
                    error: estimate.error,
                    tolerance: self.config.tolerance,
                },
            );
            info!(
                level,
                error = estimate.error,
                space_error = estimate.space_error,
                tolerance = self.config.tolerance,
                "outer pass estimated"
            );

            if estimate.error <= self.config.tolerance {
                bus.finalize();
                return Ok(AdaptiveOutcome {
                    goal,
                    integrated_goal,
                    passes: level + 1,
                    final_error: estimate.error,
                    final_cells: problem.fluid_mesh().cell_count(),
                    converged: true,
                });
            }

            if estimate.space_error <= self.config.w_h * self.config.tolerance {
                // Freeze: the mesh stays as it is, the refiner is not
                // consulted; only sharper time stepping can close the gap.
                // The unchanged mesh is still persisted so every level has
                // a snapshot matching its dof counts.
                store.save_mesh(level + 1, problem.fluid_mesh())?;
                bus.emit_kind(
                    level,
                    EventKind::MeshAction {
                        decision: MeshDecision::Frozen,
                        cells: problem.fluid_mesh().cell_count(),
                    },
                );
            } else {
                let uniform =
                    problem.convergence_study() && !problem.use_error_indicators();
                let (refined, decision) = if uniform {
                    (
                        refiner.refine_uniform(problem.fluid_mesh())?,
                        MeshDecision::RefinedUniform,
                    )
                } else {
                    (
                        refiner.refine_by_indicators(problem.fluid_mesh(), &estimate.indicators)?,
                        MeshDecision::RefinedByIndicators,
                    )
                };
                let cells = refined.cell_count();
                problem.init_meshes(refined)?;
                store.save_mesh(level + 1, problem.fluid_mesh())?;
                bus.emit_kind(level, EventKind::MeshAction { decision, cells });
            }

            bus.flush();
            level += 1;

            if let Some(max) = self.options.max_passes {
                if level >= max {
                    warn!(passes = level, "outer pass cap reached before convergence");
                    bus.finalize();
                    return Ok(AdaptiveOutcome {
                        goal,
                        integrated_goal,
                        passes: level,
                        final_error: estimate.error,
                        final_cells: problem.fluid_mesh().cell_count(),
                        converged: false,
                    });
                }
            }
        }
    }
}
