//! Problem definition — the externally owned description of one
//! coupled scenario.
//!
//! The coupling core never mutates a problem except to replace its meshes
//! wholesale on refinement via [`ProblemDefinition::init_meshes`].

use fison_mesh::{TriMesh, VectorField};
use fison_types::{FisonError, FisonResult};
use serde::{Deserialize, Serialize};

use crate::state::SolutionState;

/// Material parameters for the three subproblems.
///
/// The mesh-motion operator is a pseudo-elasticity problem; its Lamé
/// parameters are scaled per cell by `mesh_stiffness_alpha / cell_area`
/// to stiffen small cells near the interface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaterialParams {
    /// Fluid dynamic viscosity `μ_F`.
    pub fluid_viscosity: f64,
    /// Fluid density `ρ_F`.
    pub fluid_density: f64,
    /// Structure first Lamé parameter (shear modulus) `μ_S`.
    pub structure_mu: f64,
    /// Structure second Lamé parameter `λ_S`.
    pub structure_lambda: f64,
    /// Structure density `ρ_S`.
    pub structure_density: f64,
    /// Mesh-motion shear modulus `μ_M`.
    pub mesh_mu: f64,
    /// Mesh-motion second Lamé parameter `λ_M`.
    pub mesh_lambda: f64,
    /// Cell-wise stiffness scaling factor for the mesh operator.
    pub mesh_stiffness_alpha: f64,
}

impl Default for MaterialParams {
    fn default() -> Self {
        Self {
            fluid_viscosity: 0.002,
            fluid_density: 1.0,
            structure_mu: 0.15,
            structure_lambda: 0.25,
            structure_density: 0.25,
            mesh_mu: 3.8461,
            mesh_lambda: 5.76,
            mesh_stiffness_alpha: 1.0,
        }
    }
}

/// The externally owned description of one coupled scenario.
///
/// Implementors expose geometry, materials, the goal functional, and the
/// two interface dof-remapping operators. The blanket map implementations
/// copy values across [`interface_pairs`](Self::interface_pairs); override
/// them for problems whose interface numbering is not a vertex bijection.
pub trait ProblemDefinition {
    /// Current fluid mesh.
    fn fluid_mesh(&self) -> &TriMesh;

    /// Current structure mesh.
    fn structure_mesh(&self) -> &TriMesh;

    /// Material parameters for all three subproblems.
    fn material(&self) -> &MaterialParams;

    /// End time `T` of the simulation interval.
    fn end_time(&self) -> f64;

    /// Evaluates the goal functional over the step `(t0, t1)`.
    fn evaluate_functional(&self, state: &SolutionState, t0: f64, t1: f64) -> f64;

    /// Matched interface vertex pairs `(fluid_vertex, structure_vertex)`.
    fn interface_pairs(&self) -> &[(u32, u32)];

    /// Remaps a fluid-mesh nodal field to structure-mesh numbering.
    ///
    /// Off-interface entries of the result are zero.
    fn map_fluid_to_structure(&self, fluid_values: &VectorField) -> VectorField {
        let mut out = VectorField::zeros(self.structure_mesh().vertex_count());
        for &(fv, sv) in self.interface_pairs() {
            out.x[sv as usize] = fluid_values.x[fv as usize];
            out.y[sv as usize] = fluid_values.y[fv as usize];
        }
        out
    }

    /// Remaps a structure-mesh nodal field to fluid-mesh numbering.
    ///
    /// Off-interface entries of the result are zero.
    fn map_structure_to_fluid(&self, structure_values: &VectorField) -> VectorField {
        let mut out = VectorField::zeros(self.fluid_mesh().vertex_count());
        for &(fv, sv) in self.interface_pairs() {
            out.x[fv as usize] = structure_values.x[sv as usize];
            out.y[fv as usize] = structure_values.y[sv as usize];
        }
        out
    }

    /// Replaces the problem's meshes after refinement.
    ///
    /// `fluid_mesh` is the refined fluid-side mesh; the implementor
    /// rebuilds its structure mesh and interface pairing to match.
    fn init_meshes(&mut self, fluid_mesh: TriMesh) -> FisonResult<()>;

    /// True for a pure temporal-convergence study. Combined with
    /// disabled error estimation this selects uniform refinement.
    fn convergence_study(&self) -> bool {
        false
    }

    /// Whether indicator-driven refinement should be used when refining.
    fn use_error_indicators(&self) -> bool {
        true
    }

    /// Initial coupled state at `t = 0`.
    fn initial_state(&self) -> SolutionState {
        SolutionState::zeros(self.fluid_mesh(), self.structure_mesh())
    }
}

/// Checks a problem's meshes and interface pairing for consistency.
///
/// Run once before a solve is constructed. Verifies the meshes
/// individually, then every pair index and the coordinate agreement of
/// paired vertices.
pub fn validate_problem(problem: &dyn ProblemDefinition) -> FisonResult<()> {
    problem.fluid_mesh().validate()?;
    problem.structure_mesh().validate()?;

    let n_f = problem.fluid_mesh().vertex_count();
    let n_s = problem.structure_mesh().vertex_count();
    for &(fv, sv) in problem.interface_pairs() {
        if fv as usize >= n_f || sv as usize >= n_s {
            return Err(FisonError::InvalidProblem(format!(
                "Interface pair ({fv}, {sv}) out of bounds (fluid {n_f}, structure {n_s} vertices)"
            )));
        }
        let [fx, fy] = problem.fluid_mesh().position(fv as usize);
        let [sx, sy] = problem.structure_mesh().position(sv as usize);
        if (fx - sx).abs() > 1e-10 || (fy - sy).abs() > 1e-10 {
            return Err(FisonError::InvalidProblem(format!(
                "Interface pair ({fv}, {sv}) joins non-coincident vertices \
                 ({fx}, {fy}) and ({sx}, {sy})"
            )));
        }
    }

    if problem.end_time() <= 0.0 {
        return Err(FisonError::InvalidProblem(format!(
            "End time must be positive, got {}",
            problem.end_time()
        )));
    }

    Ok(())
}
