//! Structure subproblem adapter.

use fison_mesh::{TriMesh, VectorField};
use fison_types::{FisonError, FisonResult, SubproblemKind};

use crate::engine::StructureEngine;
use crate::state::StructureFields;

/// Adapter around a black-box structure solver.
///
/// Boundary data is the interface traction in structure-side numbering,
/// installed by the fluid→structure transfer before each `step`.
pub struct StructureAdapter {
    engine: Box<dyn StructureEngine>,
    committed: StructureFields,
    trial: Option<StructureFields>,
    /// Neumann traction on the interface, zero elsewhere.
    traction: VectorField,
    time: f64,
}

impl StructureAdapter {
    /// Creates an adapter with zero initial fields and zero traction.
    pub fn new(engine: Box<dyn StructureEngine>, mesh: &TriMesh) -> Self {
        Self {
            engine,
            committed: StructureFields::zeros(mesh),
            trial: None,
            traction: VectorField::zeros(mesh.vertex_count()),
            time: 0.0,
        }
    }

    /// Advances the structure by one trial step of size `dt` under the
    /// currently installed traction.
    pub fn step(&mut self, dt: f64) -> FisonResult<&StructureFields> {
        let fields = self
            .engine
            .advance(dt, &self.committed, &self.traction)
            .map_err(|e| FisonError::EngineFailure {
                subproblem: SubproblemKind::Structure,
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
    pub fn solution(&self) -> &StructureFields {
        &self.committed
    }

    /// Latest trial fields, falling back to the committed state.
    pub fn latest(&self) -> &StructureFields {
        self.trial.as_ref().unwrap_or(&self.committed)
    }

    /// Installs interface traction (structure-side numbering).
    pub fn apply_interface_condition(&mut self, traction: &VectorField) {
        self.traction.copy_from(traction);
    }
}
