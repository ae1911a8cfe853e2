//! Fluid subproblem adapter.
//!
//! Wraps a [`FluidEngine`] with the step/commit lifecycle and owns the
//! deformed-domain geometry exclusively. The mesh→fluid transfer hands
//! geometry in as a value; nothing else reads or writes it.

use fison_mesh::TriMesh;
use fison_types::{FisonError, FisonResult, SubproblemKind};

use crate::engine::FluidEngine;
use crate::geometry::{FluidGeometry, GeometryUpdate};
use crate::state::FluidFields;

/// Adapter around a black-box fluid solver.
pub struct FluidAdapter {
    engine: Box<dyn FluidEngine>,
    /// Fields committed at the last accepted time step.
    committed: FluidFields,
    /// Fields from the latest trial step, not yet committed.
    trial: Option<FluidFields>,
    /// Deformed-domain geometry, exclusively owned.
    geometry: FluidGeometry,
    /// Set by geometry updates, cleared when the engine consumes it.
    needs_reassembly: bool,
    /// Last committed time.
    time: f64,
}

impl FluidAdapter {
    /// Creates an adapter on an undeformed mesh with zero initial fields.
    pub fn new(engine: Box<dyn FluidEngine>, mesh: &TriMesh) -> Self {
        Self {
            engine,
            committed: FluidFields::zeros(mesh),
            trial: None,
            geometry: FluidGeometry::from_mesh(mesh),
            needs_reassembly: false,
            time: 0.0,
        }
    }

    /// Advances the fluid by one trial step of size `dt`.
    ///
    /// May be called repeatedly within one time step during coupling
    /// iteration; only `commit` accepts the result.
    pub fn step(&mut self, dt: f64) -> FisonResult<&FluidFields> {
        let fields = self
            .engine
            .advance(dt, &self.committed, &self.geometry, self.needs_reassembly)
            .map_err(|e| FisonError::EngineFailure {
                subproblem: SubproblemKind::Fluid,
                time: self.time + dt,
                message: e.to_string(),
            })?;
        self.needs_reassembly = false;
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
    pub fn solution(&self) -> &FluidFields {
        &self.committed
    }

    /// Latest trial fields, falling back to the committed state before
    /// the first step.
    pub fn latest(&self) -> &FluidFields {
        self.trial.as_ref().unwrap_or(&self.committed)
    }

    /// Installs a fresh deformed-geometry snapshot and marks the
    /// operator for reassembly.
    pub fn apply_interface_condition(&mut self, update: &GeometryUpdate) {
        self.geometry.apply(update);
        self.needs_reassembly = true;
    }

    /// Rolls the previous deformed coordinates forward.
    ///
    /// Must run strictly after `commit`; the next step's mesh velocity
    /// is measured against the coordinates frozen here.
    pub fn post_commit_housekeeping(&mut self) {
        self.geometry.roll_previous();
    }

    /// Read access to the deformed geometry (for transfers).
    pub fn geometry(&self) -> &FluidGeometry {
        &self.geometry
    }
}
