//! Integration tests for the physics adapters and problem contract.

use fison_mesh::generators::{fluid_channel, matched_interface_pairs, structure_strip};
use fison_mesh::{TriMesh, VectorField};
use fison_physics::problem::validate_problem;
use fison_physics::stub::{
    FailingFluidEngine, IdentityFluidEngine, IdentityMeshEngine, IdentityStructureEngine,
    OscillatingStructureEngine,
};
use fison_physics::{
    DofCounts, FluidAdapter, GeometryUpdate, MaterialParams, MeshMotionAdapter, ProblemDefinition,
    SolutionState, StructureAdapter,
};
use fison_types::FisonError;

// ─────────────────────────── Fixtures ───────────────────────────

struct TestProblem {
    fluid: TriMesh,
    structure: TriMesh,
    material: MaterialParams,
    pairs: Vec<(u32, u32)>,
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
        1.0
    }

    fn evaluate_functional(&self, state: &SolutionState, _t0: f64, _t1: f64) -> f64 {
        state.structure_displacement.l2_norm()
    }

    fn interface_pairs(&self) -> &[(u32, u32)] {
        &self.pairs
    }

    fn init_meshes(&mut self, fluid_mesh: TriMesh) -> fison_types::FisonResult<()> {
        self.fluid = fluid_mesh;
        Ok(())
    }
}

// ─────────────────────────── Adapter Lifecycle ───────────────────────────

#[test]
fn step_does_not_commit() {
    let problem = TestProblem::new();
    let mut adapter =
        StructureAdapter::new(Box::new(OscillatingStructureEngine::new(0.5)), &problem.structure);

    adapter.step(0.1).unwrap();
    // Trial moved, committed state untouched.
    assert!(adapter.latest().displacement.l2_norm() > 0.0);
    assert_eq!(adapter.solution().displacement.l2_norm(), 0.0);

    adapter.commit(0.1);
    assert!(adapter.solution().displacement.l2_norm() > 0.0);
}

#[test]
fn repeated_steps_restart_from_committed_state() {
    let problem = TestProblem::new();
    let mut adapter =
        StructureAdapter::new(Box::new(IdentityStructureEngine), &problem.structure);

    // Identity engine: however many trial steps, the fields stay put.
    for _ in 0..3 {
        adapter.step(0.1).unwrap();
    }
    assert_eq!(adapter.latest().displacement.l2_norm(), 0.0);
}

#[test]
fn commit_without_step_keeps_state() {
    let problem = TestProblem::new();
    let mut adapter = MeshMotionAdapter::new(Box::new(IdentityMeshEngine), &problem.fluid);
    adapter.commit(0.1);
    assert_eq!(adapter.solution().displacement.l2_norm(), 0.0);
}

#[test]
fn engine_failure_is_tagged_with_subproblem_and_time() {
    let problem = TestProblem::new();
    let mut adapter = FluidAdapter::new(Box::new(FailingFluidEngine), &problem.fluid);
    adapter.commit(0.4);

    let err = adapter.step(0.1).unwrap_err();
    match err {
        FisonError::EngineFailure {
            subproblem, time, ..
        } => {
            assert_eq!(subproblem.to_string(), "fluid");
            assert!((time - 0.5).abs() < 1e-12);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

// ─────────────────────────── Fluid Geometry ───────────────────────────

#[test]
fn geometry_update_marks_reassembly_and_housekeeping_rolls_previous() {
    let problem = TestProblem::new();
    let n = problem.fluid.vertex_count();
    let mut adapter = FluidAdapter::new(Box::new(IdentityFluidEngine), &problem.fluid);

    let mut positions_x = problem.fluid.pos_x.clone();
    let positions_y = problem.fluid.pos_y.clone();
    for x in positions_x.iter_mut() {
        *x += 0.01;
    }
    let update = GeometryUpdate {
        positions_x: positions_x.clone(),
        positions_y,
        velocity: VectorField::zeros(n),
    };

    adapter.apply_interface_condition(&update);
    assert!((adapter.geometry().current_x[0] - positions_x[0]).abs() < 1e-15);
    // Previous coordinates unchanged until housekeeping.
    assert!((adapter.geometry().previous_x[0] - problem.fluid.pos_x[0]).abs() < 1e-15);

    adapter.step(0.1).unwrap();
    adapter.commit(0.1);
    adapter.post_commit_housekeeping();
    assert!((adapter.geometry().previous_x[0] - positions_x[0]).abs() < 1e-15);
}

// ─────────────────────────── Problem Contract ───────────────────────────

#[test]
fn dof_maps_round_trip_on_the_interface() {
    let problem = TestProblem::new();
    let mut fluid_values = VectorField::zeros(problem.fluid.vertex_count());
    for (i, &(fv, _)) in problem.pairs.iter().enumerate() {
        fluid_values.x[fv as usize] = 1.0 + i as f64;
        fluid_values.y[fv as usize] = -(1.0 + i as f64);
    }

    let on_structure = problem.map_fluid_to_structure(&fluid_values);
    let back = problem.map_structure_to_fluid(&on_structure);

    for &(fv, sv) in &problem.pairs {
        assert_eq!(on_structure.x[sv as usize], fluid_values.x[fv as usize]);
        assert_eq!(back.x[fv as usize], fluid_values.x[fv as usize]);
        assert_eq!(back.y[fv as usize], fluid_values.y[fv as usize]);
    }
}

#[test]
fn validate_accepts_matched_problem() {
    let problem = TestProblem::new();
    validate_problem(&problem).unwrap();
}

#[test]
fn validate_rejects_out_of_bounds_pair() {
    let mut problem = TestProblem::new();
    problem.pairs.push((9999, 0));
    assert!(matches!(
        validate_problem(&problem),
        Err(FisonError::InvalidProblem(_))
    ));
}

#[test]
fn validate_rejects_non_coincident_pair() {
    let mut problem = TestProblem::new();
    // Pair two vertices that do not share coordinates.
    problem.pairs.push((0, problem.structure.vertex_count() as u32 - 1));
    assert!(matches!(
        validate_problem(&problem),
        Err(FisonError::InvalidProblem(_))
    ));
}

#[test]
fn dof_counts_cover_all_three_subproblems() {
    let problem = TestProblem::new();
    let counts = DofCounts::from_meshes(&problem.fluid, &problem.structure);
    let n_f = problem.fluid.vertex_count();
    let n_s = problem.structure.vertex_count();
    assert_eq!(counts.fluid, 3 * n_f);
    assert_eq!(counts.structure, 3 * n_s);
    assert_eq!(counts.mesh, 2 * n_f);
    assert_eq!(counts.total(), 5 * n_f + 3 * n_s);
}

#[test]
fn initial_state_is_zero_by_default() {
    let problem = TestProblem::new();
    let state = problem.initial_state();
    assert_eq!(state.fluid_velocity.len(), problem.fluid.vertex_count());
    assert_eq!(
        state.structure_displacement.len(),
        problem.structure.vertex_count()
    );
    assert_eq!(state.structure_displacement.l2_norm(), 0.0);
}
