//! Solve-engine traits — the black-box solver contracts.
//!
//! An engine advances one physics by one trial step. It sees the previous
//! committed fields and the boundary data the adapter has installed, and
//! returns fresh fields without mutating adapter state. The adapters own
//! the step/commit lifecycle around these calls.
//!
//! # Implementations
//!
//! - [`stub`](crate::stub) — identity and scripted engines that validate
//!   the coupling pipeline wiring
//! - `fison-cli`'s demo scenario ships analytic surrogate engines

use fison_mesh::VectorField;
use fison_types::FisonResult;

use crate::geometry::FluidGeometry;
use crate::state::{FluidFields, MeshFields, StructureFields};

/// Black-box fluid solver.
pub trait FluidEngine: Send {
    /// Advances the fluid by one trial step of size `dt` on the current
    /// deformed geometry.
    ///
    /// `needs_reassembly` signals that the geometry changed since the
    /// engine last assembled its operator.
    fn advance(
        &mut self,
        dt: f64,
        previous: &FluidFields,
        geometry: &FluidGeometry,
        needs_reassembly: bool,
    ) -> FisonResult<FluidFields>;

    /// Returns the engine's name.
    fn name(&self) -> &str;
}

/// Black-box structure solver.
pub trait StructureEngine: Send {
    /// Advances the structure by one trial step of size `dt` under the
    /// installed interface traction (Neumann data on the interface,
    /// zero elsewhere).
    fn advance(
        &mut self,
        dt: f64,
        previous: &StructureFields,
        traction: &VectorField,
    ) -> FisonResult<StructureFields>;

    /// Returns the engine's name.
    fn name(&self) -> &str;
}

/// Black-box mesh-motion solver.
pub trait MeshMotionEngine: Send {
    /// Advances the mesh displacement by one trial step of size `dt`
    /// under the installed Dirichlet data on the moving boundary
    /// (fluid-side numbering, zero off the interface).
    fn advance(
        &mut self,
        dt: f64,
        previous: &MeshFields,
        boundary_displacement: &VectorField,
    ) -> FisonResult<MeshFields>;

    /// Returns the engine's name.
    fn name(&self) -> &str;
}
