//! Integration tests for the outer adaptive loop.

use std::cell::Cell;

use fison_adaptivity::{
    AdaptiveOptions, AdaptiveRefinementController, ErrorEstimate, ErrorEstimator, GoalValue,
    NullDualSolver,
};
use fison_coupling::{Configuration, EngineFactory};
use fison_io::{NullStore, SolutionStore};
use fison_mesh::generators::{fluid_channel, matched_interface_pairs, structure_strip};
use fison_mesh::{BisectionRefiner, MeshRefiner, TriMesh};
use fison_physics::stub::{IdentityFluidEngine, IdentityMeshEngine, IdentityStructureEngine};
use fison_physics::{
    FluidEngine, MaterialParams, MeshMotionEngine, ProblemDefinition, SolutionState,
    StructureEngine,
};
use fison_telemetry::EventBus;
use fison_types::FisonResult;

// ─────────────────────────── Test Doubles ───────────────────────────

struct TestProblem {
    fluid: TriMesh,
    structure: TriMesh,
    material: MaterialParams,
    pairs: Vec<(u32, u32)>,
    convergence_study: bool,
    use_indicators: bool,
}

impl TestProblem {
    fn new() -> Self {
        let fluid = fluid_channel(4, 2, 4.0, 1.0);
        let structure = structure_strip(4, 1, 4.0, 0.25);
        let pairs = matched_interface_pairs(&fluid, &structure).unwrap();
        Self {
            fluid,
            structure,
            material: MaterialParams::default(),
            pairs,
            convergence_study: false,
            use_indicators: true,
        }
    }
}

impl ProblemDefinition for TestProblem {
    fn fluid_mesh(&self) -> &TriMesh {
        &self.fluid
    }

    fn structure_mesh(&self) -> &TriMesh {
        &self.structure
    }

    fn material(&self) -> &MaterialParams {
        &self.material
    }

    fn end_time(&self) -> f64 {
        0.2
    }

    fn evaluate_functional(&self, _state: &SolutionState, _t0: f64, _t1: f64) -> f64 {
        1.0
    }

    fn interface_pairs(&self) -> &[(u32, u32)] {
        &self.pairs
    }

    fn init_meshes(&mut self, fluid_mesh: TriMesh) -> FisonResult<()> {
        self.fluid = fluid_mesh;
        Ok(())
    }

    fn convergence_study(&self) -> bool {
        self.convergence_study
    }

    fn use_error_indicators(&self) -> bool {
        self.use_indicators
    }
}

struct IdentityFactory;

impl EngineFactory for IdentityFactory {
    fn fluid_engine(&self, _mesh: &TriMesh) -> Box<dyn FluidEngine> {
        Box::new(IdentityFluidEngine)
    }

    fn structure_engine(&self, _mesh: &TriMesh) -> Box<dyn StructureEngine> {
        Box::new(IdentityStructureEngine)
    }

    fn mesh_engine(&self, _mesh: &TriMesh) -> Box<dyn MeshMotionEngine> {
        Box::new(IdentityMeshEngine)
    }
}

/// Estimator replaying a fixed script of estimates.
struct ScriptedEstimator {
    script: Vec<ErrorEstimate>,
    cursor: usize,
}

impl ScriptedEstimator {
    fn new(script: Vec<ErrorEstimate>) -> Self {
        Self { script, cursor: 0 }
    }

    fn entry(error: f64, space_error: f64) -> ErrorEstimate {
        ErrorEstimate {
            error,
            indicators: Vec::new(),
            stability_factor: 1.0,
            space_error,
        }
    }
}

impl ErrorEstimator for ScriptedEstimator {
    fn estimate(
        &mut self,
        problem: &dyn ProblemDefinition,
        _config: &Configuration,
    ) -> FisonResult<ErrorEstimate> {
        let mut estimate = self.script[self.cursor.min(self.script.len() - 1)].clone();
        self.cursor += 1;
        if estimate.indicators.is_empty() {
            estimate.indicators = vec![1.0; problem.fluid_mesh().cell_count()];
        }
        Ok(estimate)
    }
}

/// Refiner that counts invocations before delegating.
struct CountingRefiner {
    inner: BisectionRefiner,
    uniform_calls: Cell<u32>,
    indicator_calls: Cell<u32>,
}

impl CountingRefiner {
    fn new() -> Self {
        Self {
            inner: BisectionRefiner::default(),
            uniform_calls: Cell::new(0),
            indicator_calls: Cell::new(0),
        }
    }
}

impl MeshRefiner for CountingRefiner {
    fn refine_uniform(&self, mesh: &TriMesh) -> FisonResult<TriMesh> {
        self.uniform_calls.set(self.uniform_calls.get() + 1);
        self.inner.refine_uniform(mesh)
    }

    fn refine_by_indicators(&self, mesh: &TriMesh, indicators: &[f64]) -> FisonResult<TriMesh> {
        self.indicator_calls.set(self.indicator_calls.get() + 1);
        self.inner.refine_by_indicators(mesh, indicators)
    }
}

/// Store that records mesh snapshots and the levels they were keyed to.
#[derive(Default)]
struct MeshCountingStore {
    meshes_saved: u32,
    saved_levels: Vec<u32>,
}

impl SolutionStore for MeshCountingStore {
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

    fn save_mesh(&mut self, level: u32, _mesh: &TriMesh) -> FisonResult<()> {
        self.meshes_saved += 1;
        self.saved_levels.push(level);
        Ok(())
    }

    fn save_dof_counts(
        &mut self,
        _level: u32,
        _timesteps: u32,
        _dofs: &fison_physics::DofCounts,
    ) -> FisonResult<()> {
        Ok(())
    }
}

fn test_config() -> Configuration {
    Configuration {
        tolerance: 1e-3,
        initial_timestep: Some(0.1),
        uniform_timestep: true,
        save_solution: false,
        solve_dual: false,
        ..Configuration::default()
    }
}

// ─────────────────────────── Stop / Freeze / Refine ───────────────────────────

#[test]
fn immediate_stop_when_error_is_within_budget() {
    let mut problem = TestProblem::new();
    let mut estimator = ScriptedEstimator::new(vec![ScriptedEstimator::entry(5e-4, 1e-4)]);
    let refiner = CountingRefiner::new();
    let mut store = MeshCountingStore::default();
    let mut bus = EventBus::new();

    let controller =
        AdaptiveRefinementController::new(test_config(), AdaptiveOptions::default()).unwrap();
    let outcome = controller
        .solve(
            &mut problem,
            &IdentityFactory,
            &mut estimator,
            &mut NullDualSolver,
            &refiner,
            &mut store,
            &mut bus,
        )
        .unwrap();

    assert!(outcome.converged);
    assert_eq!(outcome.passes, 1);
    assert!(matches!(outcome.goal, GoalValue::Fresh(_)));
    assert_eq!(refiner.uniform_calls.get(), 0);
    assert_eq!(refiner.indicator_calls.get(), 0);
    // Only the level-0 snapshot, never a refined mesh.
    assert_eq!(store.meshes_saved, 1);
}

#[test]
fn small_spatial_error_freezes_the_mesh() {
    let config = test_config();
    let mut problem = TestProblem::new();
    let generation_before = problem.fluid.generation;
    let cells_before = problem.fluid.cell_count();

    // Pass 1: error above tolerance, E_h within its share → freeze.
    // Pass 2: done.
    let mut estimator = ScriptedEstimator::new(vec![
        ScriptedEstimator::entry(10.0 * config.tolerance, 0.5 * config.w_h * config.tolerance),
        ScriptedEstimator::entry(0.0, 0.0),
    ]);
    let refiner = CountingRefiner::new();
    let mut store = MeshCountingStore::default();
    let mut bus = EventBus::new();

    let controller = AdaptiveRefinementController::new(config, AdaptiveOptions::default()).unwrap();
    let outcome = controller
        .solve(
            &mut problem,
            &IdentityFactory,
            &mut estimator,
            &mut NullDualSolver,
            &refiner,
            &mut store,
            &mut bus,
        )
        .unwrap();

    assert!(outcome.converged);
    assert_eq!(outcome.passes, 2);
    assert_eq!(refiner.uniform_calls.get(), 0);
    assert_eq!(refiner.indicator_calls.get(), 0);
    assert_eq!(problem.fluid.generation, generation_before);
    assert_eq!(problem.fluid.cell_count(), cells_before);
    // The frozen pass still persists the (unchanged) mesh, so every
    // level that reports dof counts has a matching snapshot.
    assert_eq!(store.meshes_saved, 2);
    assert_eq!(store.saved_levels, vec![0, 1]);
}

#[test]
fn large_spatial_error_refines_by_indicators() {
    let config = test_config();
    let mut problem = TestProblem::new();
    let cells_before = problem.fluid.cell_count();

    let mut estimator = ScriptedEstimator::new(vec![
        ScriptedEstimator::entry(10.0 * config.tolerance, 10.0 * config.tolerance),
        ScriptedEstimator::entry(0.0, 0.0),
    ]);
    let refiner = CountingRefiner::new();
    let mut store = MeshCountingStore::default();
    let mut bus = EventBus::new();

    // Skip the primal solve so the refined fluid mesh never has to be
    // re-paired with the structure mesh.
    let config = Configuration {
        solve_primal: false,
        ..config
    };
    let controller = AdaptiveRefinementController::new(config, AdaptiveOptions::default()).unwrap();
    let outcome = controller
        .solve(
            &mut problem,
            &IdentityFactory,
            &mut estimator,
            &mut NullDualSolver,
            &refiner,
            &mut store,
            &mut bus,
        )
        .unwrap();

    assert!(outcome.converged);
    assert_eq!(refiner.indicator_calls.get(), 1);
    assert_eq!(refiner.uniform_calls.get(), 0);
    assert!(problem.fluid.cell_count() > cells_before);
    assert!(problem.fluid.generation > 0);
    // Level 0 plus the refined level 1.
    assert_eq!(store.meshes_saved, 2);
}

#[test]
fn convergence_study_without_indicators_refines_uniformly() {
    let config = Configuration {
        solve_primal: false,
        ..test_config()
    };
    let mut problem = TestProblem::new();
    problem.convergence_study = true;
    problem.use_indicators = false;
    let cells_before = problem.fluid.cell_count();

    let mut estimator = ScriptedEstimator::new(vec![
        ScriptedEstimator::entry(10.0 * config.tolerance, 10.0 * config.tolerance),
        ScriptedEstimator::entry(0.0, 0.0),
    ]);
    let refiner = CountingRefiner::new();
    let mut store = NullStore;
    let mut bus = EventBus::new();

    let controller = AdaptiveRefinementController::new(config, AdaptiveOptions::default()).unwrap();
    controller
        .solve(
            &mut problem,
            &IdentityFactory,
            &mut estimator,
            &mut NullDualSolver,
            &refiner,
            &mut store,
            &mut bus,
        )
        .unwrap();

    assert_eq!(refiner.uniform_calls.get(), 1);
    assert_eq!(refiner.indicator_calls.get(), 0);
    assert_eq!(problem.fluid.cell_count(), 4 * cells_before);
}

// ─────────────────────────── Fallbacks and Caps ───────────────────────────

#[test]
fn disabled_estimation_stops_immediately_with_zero_error() {
    let config = Configuration {
        estimate_error: false,
        ..test_config()
    };
    let mut problem = TestProblem::new();
    // The estimator must never be consulted.
    let mut estimator = ScriptedEstimator::new(vec![ScriptedEstimator::entry(f64::MAX, 0.0)]);
    let refiner = CountingRefiner::new();
    let mut store = NullStore;
    let mut bus = EventBus::new();

    let controller = AdaptiveRefinementController::new(config, AdaptiveOptions::default()).unwrap();
    let outcome = controller
        .solve(
            &mut problem,
            &IdentityFactory,
            &mut estimator,
            &mut NullDualSolver,
            &refiner,
            &mut store,
            &mut bus,
        )
        .unwrap();

    assert!(outcome.converged);
    assert_eq!(outcome.final_error, 0.0);
    assert_eq!(outcome.passes, 1);
}

#[test]
fn skipped_primal_yields_a_stale_goal_marker() {
    let config = Configuration {
        solve_primal: false,
        estimate_error: false,
        ..test_config()
    };
    let mut problem = TestProblem::new();
    let mut estimator = ScriptedEstimator::new(vec![ScriptedEstimator::entry(0.0, 0.0)]);
    let refiner = CountingRefiner::new();
    let mut store = NullStore;
    let mut bus = EventBus::new();

    let controller = AdaptiveRefinementController::new(config, AdaptiveOptions::default()).unwrap();
    let outcome = controller
        .solve(
            &mut problem,
            &IdentityFactory,
            &mut estimator,
            &mut NullDualSolver,
            &refiner,
            &mut store,
            &mut bus,
        )
        .unwrap();

    assert_eq!(outcome.goal, GoalValue::Stale(None));
    assert_eq!(outcome.integrated_goal, None);
}

#[test]
fn pass_cap_cuts_off_a_non_converging_loop() {
    let config = Configuration {
        solve_primal: false,
        ..test_config()
    };
    let mut problem = TestProblem::new();
    // Error never improves; E_h small, so every pass freezes.
    let mut estimator = ScriptedEstimator::new(vec![ScriptedEstimator::entry(1.0, 0.0)]);
    let refiner = CountingRefiner::new();
    let mut store = NullStore;
    let mut bus = EventBus::new();

    let controller = AdaptiveRefinementController::new(
        config,
        AdaptiveOptions {
            max_passes: Some(3),
        },
    )
    .unwrap();
    let outcome = controller
        .solve(
            &mut problem,
            &IdentityFactory,
            &mut estimator,
            &mut NullDualSolver,
            &refiner,
            &mut store,
            &mut bus,
        )
        .unwrap();

    assert!(!outcome.converged);
    assert_eq!(outcome.passes, 3);
    assert_eq!(refiner.uniform_calls.get() + refiner.indicator_calls.get(), 0);
}
