//! Stub engines.
//!
//! These implement the full engine contracts but skip the physics: the
//! identity engines return the previous committed fields unchanged, and
//! the scripted engines produce deliberately pathological sequences.
//! They validate the pipeline wiring (adapter → transfer → coupling loop)
//! before real solvers are plugged in, and drive the coupling-loop tests.

use fison_mesh::VectorField;
use fison_types::{FisonError, FisonResult};

use crate::engine::{FluidEngine, MeshMotionEngine, StructureEngine};
use crate::geometry::FluidGeometry;
use crate::state::{FluidFields, MeshFields, StructureFields};

/// Fluid engine that returns the previous committed fields verbatim.
#[derive(Debug, Default)]
pub struct IdentityFluidEngine;

impl FluidEngine for IdentityFluidEngine {
    fn advance(
        &mut self,
        _dt: f64,
        previous: &FluidFields,
        _geometry: &FluidGeometry,
        _needs_reassembly: bool,
    ) -> FisonResult<FluidFields> {
        Ok(previous.clone())
    }

    fn name(&self) -> &str {
        "identity_fluid"
    }
}

/// Structure engine that returns the previous committed fields verbatim.
///
/// With this engine the coupling increment is exactly zero, so the
/// fixed-point loop converges after a single iteration.
#[derive(Debug, Default)]
pub struct IdentityStructureEngine;

impl StructureEngine for IdentityStructureEngine {
    fn advance(
        &mut self,
        _dt: f64,
        previous: &StructureFields,
        _traction: &VectorField,
    ) -> FisonResult<StructureFields> {
        Ok(previous.clone())
    }

    fn name(&self) -> &str {
        "identity_structure"
    }
}

/// Mesh-motion engine that returns the previous committed fields verbatim.
#[derive(Debug, Default)]
pub struct IdentityMeshEngine;

impl MeshMotionEngine for IdentityMeshEngine {
    fn advance(
        &mut self,
        _dt: f64,
        previous: &MeshFields,
        _boundary_displacement: &VectorField,
    ) -> FisonResult<MeshFields> {
        Ok(previous.clone())
    }

    fn name(&self) -> &str {
        "identity_mesh"
    }
}

/// Structure engine whose displacement alternates between two constant
/// fields on every call.
///
/// The coupling increment never falls below any positive tolerance, so
/// the fixed-point loop must fail exactly at its iteration cap.
#[derive(Debug)]
pub struct OscillatingStructureEngine {
    amplitude: f64,
    calls: u64,
}

impl OscillatingStructureEngine {
    /// Creates an engine oscillating with the given amplitude.
    pub fn new(amplitude: f64) -> Self {
        Self {
            amplitude,
            calls: 0,
        }
    }
}

impl StructureEngine for OscillatingStructureEngine {
    fn advance(
        &mut self,
        _dt: f64,
        previous: &StructureFields,
        _traction: &VectorField,
    ) -> FisonResult<StructureFields> {
        let sign = if self.calls % 2 == 0 { 1.0 } else { -1.0 };
        self.calls += 1;

        let mut fields = previous.clone();
        for v in fields.displacement.x.iter_mut() {
            *v = sign * self.amplitude;
        }
        Ok(fields)
    }

    fn name(&self) -> &str {
        "oscillating_structure"
    }
}

/// Fluid engine that always fails its solve.
#[derive(Debug, Default)]
pub struct FailingFluidEngine;

impl FluidEngine for FailingFluidEngine {
    fn advance(
        &mut self,
        _dt: f64,
        _previous: &FluidFields,
        _geometry: &FluidGeometry,
        _needs_reassembly: bool,
    ) -> FisonResult<FluidFields> {
        Err(FisonError::Numerics("singular system".into()))
    }

    fn name(&self) -> &str {
        "failing_fluid"
    }
}
