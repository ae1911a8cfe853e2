//! Deformed-domain geometry for the fluid subproblem.
//!
//! The fluid adapter owns this data exclusively. The mesh→fluid transfer
//! never touches it directly; it produces a [`GeometryUpdate`] value that
//! the adapter installs through `apply_interface_condition`.

use fison_mesh::{TriMesh, VectorField};

/// The fluid domain's coordinate sets and mesh velocity.
///
/// `previous` holds the deformed coordinates at the last committed step;
/// it is rolled forward to `current` by the fluid adapter's
/// post-commit housekeeping, never during coupling iteration.
#[derive(Debug, Clone)]
pub struct FluidGeometry {
    /// Undeformed reference x coordinates.
    pub reference_x: Vec<f64>,
    /// Undeformed reference y coordinates.
    pub reference_y: Vec<f64>,
    /// Deformed x coordinates at the last committed step.
    pub previous_x: Vec<f64>,
    /// Deformed y coordinates at the last committed step.
    pub previous_y: Vec<f64>,
    /// Current deformed x coordinates.
    pub current_x: Vec<f64>,
    /// Current deformed y coordinates.
    pub current_y: Vec<f64>,
    /// Nodal mesh velocity `(current − previous) / dt`.
    pub velocity: VectorField,
}

impl FluidGeometry {
    /// Starts from an undeformed mesh: all three coordinate sets coincide
    /// and the mesh velocity is zero.
    pub fn from_mesh(mesh: &TriMesh) -> Self {
        Self {
            reference_x: mesh.pos_x.clone(),
            reference_y: mesh.pos_y.clone(),
            previous_x: mesh.pos_x.clone(),
            previous_y: mesh.pos_y.clone(),
            current_x: mesh.pos_x.clone(),
            current_y: mesh.pos_y.clone(),
            velocity: VectorField::zeros(mesh.vertex_count()),
        }
    }

    /// Number of vertices covered.
    pub fn vertex_count(&self) -> usize {
        self.reference_x.len()
    }

    /// Installs freshly computed deformed coordinates and mesh velocity.
    pub fn apply(&mut self, update: &GeometryUpdate) {
        self.current_x.copy_from_slice(&update.positions_x);
        self.current_y.copy_from_slice(&update.positions_y);
        self.velocity.copy_from(&update.velocity);
    }

    /// Rolls the committed coordinates forward: `previous ← current`.
    ///
    /// Must run strictly after the fluid commit for the step.
    pub fn roll_previous(&mut self) {
        self.previous_x.copy_from_slice(&self.current_x);
        self.previous_y.copy_from_slice(&self.current_y);
    }
}

/// A self-contained deformed-geometry snapshot produced by the
/// mesh→fluid transfer.
#[derive(Debug, Clone)]
pub struct GeometryUpdate {
    /// New deformed x coordinates (after smoothing).
    pub positions_x: Vec<f64>,
    /// New deformed y coordinates (after smoothing).
    pub positions_y: Vec<f64>,
    /// Mesh velocity `(new − previous) / dt`.
    pub velocity: VectorField,
}
