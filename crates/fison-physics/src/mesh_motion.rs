//! Mesh-motion subproblem adapter.

use fison_mesh::{TriMesh, VectorField};
use fison_types::{FisonError, FisonResult, SubproblemKind};

use crate::engine::MeshMotionEngine;
use crate::state::MeshFields;

/// Adapter around a black-box mesh-motion solver.
///
/// Boundary data is the structure's interface displacement remapped to
/// fluid-side numbering, installed as a Dirichlet condition on the
/// moving boundary by the structure→mesh transfer.
pub struct MeshMotionAdapter {
    engine: Box<dyn MeshMotionEngine>,
    committed: MeshFields,
    trial: Option<MeshFields>,
    /// Dirichlet displacement on the moving boundary, zero elsewhere.
    boundary_displacement: VectorField,
    time: f64,
}

impl MeshMotionAdapter {
    /// Creates an adapter with zero initial displacement.
    pub fn new(engine: Box<dyn MeshMotionEngine>, mesh: &TriMesh) -> Self {
        Self {
            engine,
            committed: MeshFields::zeros(mesh),
            trial: None,
            boundary_displacement: VectorField::zeros(mesh.vertex_count()),
            time: 0.0,
        }
    }

    /// Advances the mesh displacement by one trial step of size `dt`
    /// under the currently installed boundary data.
    pub fn step(&mut self, dt: f64) -> FisonResult<&MeshFields> {
        let fields = self
            .engine
            .advance(dt, &self.committed, &self.boundary_displacement)
            .map_err(|e| FisonError::EngineFailure {
                subproblem: SubproblemKind::Mesh,
                time: self.time + dt,
                message: e.to_string(),
            })?;
        self.trial = Some(fields);
        Ok(self.latest())
    }

    /// Accepts the latest trial step as the definitive state at `t`.
    pub fn commit(&mut self, t: f64) {
        if let Some(fields) = self.trial.take() {
            self.committed = fields;
        }
        self.time = t;
    }

    /// Most recently committed fields.
    pub fn solution(&self) -> &MeshFields {
        &self.committed
    }

    /// Latest trial fields, falling back to the committed state.
    pub fn latest(&self) -> &MeshFields {
        self.trial.as_ref().unwrap_or(&self.committed)
    }

    /// Installs Dirichlet displacement on the moving boundary
    /// (fluid-side numbering).
    pub fn apply_interface_condition(&mut self, displacement: &VectorField) {
        self.boundary_displacement.copy_from(displacement);
    }
}
