//! Coupled solution state — per-physics field bundles.
//!
//! Each subproblem carries its own primary fields; a [`SolutionState`]
//! snapshots all of them at a single time instant. States are plain
//! serializable data, produced once per converged time step and never
//! mutated afterwards.

use fison_mesh::{ScalarField, TriMesh, VectorField};
use serde::{Deserialize, Serialize};

/// Primary fields of the fluid subproblem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FluidFields {
    /// Nodal velocity on the fluid mesh.
    pub velocity: VectorField,
    /// Nodal pressure on the fluid mesh.
    pub pressure: ScalarField,
}

impl FluidFields {
    /// All-zero fields sized for the given mesh.
    pub fn zeros(mesh: &TriMesh) -> Self {
        let n = mesh.vertex_count();
        Self {
            velocity: VectorField::zeros(n),
            pressure: ScalarField::zeros(n),
        }
    }
}

/// Primary fields of the structure subproblem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructureFields {
    /// Nodal displacement on the structure mesh.
    pub displacement: VectorField,
    /// Nodal pressure/stress auxiliary field on the structure mesh.
    pub pressure: ScalarField,
}

impl StructureFields {
    /// All-zero fields sized for the given mesh.
    pub fn zeros(mesh: &TriMesh) -> Self {
        let n = mesh.vertex_count();
        Self {
            displacement: VectorField::zeros(n),
            pressure: ScalarField::zeros(n),
        }
    }
}

/// Primary fields of the mesh-motion subproblem (lives on the fluid mesh).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshFields {
    /// Nodal mesh displacement on the fluid mesh.
    pub displacement: VectorField,
}

impl MeshFields {
    /// All-zero fields sized for the given mesh.
    pub fn zeros(mesh: &TriMesh) -> Self {
        Self {
            displacement: VectorField::zeros(mesh.vertex_count()),
        }
    }
}

/// The coupled unknowns at a single time instant.
///
/// Owned by the primal solver for the duration of one step, then handed
/// to persistence and used as the next step's starting point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolutionState {
    /// Fluid velocity `u_F`.
    pub fluid_velocity: VectorField,
    /// Fluid pressure `p_F`.
    pub fluid_pressure: ScalarField,
    /// Structure displacement `U_S`.
    pub structure_displacement: VectorField,
    /// Structure pressure `P_S`.
    pub structure_pressure: ScalarField,
    /// Mesh displacement `U_M`.
    pub mesh_displacement: VectorField,
}

impl SolutionState {
    /// All-zero state sized for the given fluid and structure meshes.
    pub fn zeros(fluid_mesh: &TriMesh, structure_mesh: &TriMesh) -> Self {
        let n_f = fluid_mesh.vertex_count();
        let n_s = structure_mesh.vertex_count();
        Self {
            fluid_velocity: VectorField::zeros(n_f),
            fluid_pressure: ScalarField::zeros(n_f),
            structure_displacement: VectorField::zeros(n_s),
            structure_pressure: ScalarField::zeros(n_s),
            mesh_displacement: VectorField::zeros(n_f),
        }
    }

    /// Assembles a state from the three per-physics bundles.
    pub fn from_fields(fluid: &FluidFields, structure: &StructureFields, mesh: &MeshFields) -> Self {
        Self {
            fluid_velocity: fluid.velocity.clone(),
            fluid_pressure: fluid.pressure.clone(),
            structure_displacement: structure.displacement.clone(),
            structure_pressure: structure.pressure.clone(),
            mesh_displacement: mesh.displacement.clone(),
        }
    }
}

/// Degrees-of-freedom counts for one refinement level.
///
/// Fluid carries velocity (2 per vertex) plus pressure (1 per vertex),
/// the structure likewise, and the mesh-motion problem displacement only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DofCounts {
    pub fluid: usize,
    pub structure: usize,
    pub mesh: usize,
}

impl DofCounts {
    /// Counts dofs over a fluid/structure mesh pair.
    pub fn from_meshes(fluid_mesh: &TriMesh, structure_mesh: &TriMesh) -> Self {
        let n_f = fluid_mesh.vertex_count();
        let n_s = structure_mesh.vertex_count();
        Self {
            fluid: 3 * n_f,
            structure: 3 * n_s,
            mesh: 2 * n_f,
        }
    }

    /// Total dof count across the three subproblems.
    pub fn total(&self) -> usize {
        self.fluid + self.structure + self.mesh
    }
}
