//! The channel-flap demo scenario.
//!
//! A shear flow over an elastic strip clamped along a channel bottom.
//! The engines are analytic surrogates — a stationary shear profile for
//! the fluid, a compliant quasi-static response for the structure, and
//! pass-through Dirichlet data for the mesh motion — chosen so the
//! coupling loop contracts quickly while still moving the interface.

use fison_adaptivity::{DecayingEstimator, ErrorEstimator};
use fison_coupling::EngineFactory;
use fison_mesh::generators::{fluid_channel, matched_interface_pairs};
use fison_mesh::{BoundaryEdge, BoundaryMarker, TriMesh, VectorField};
use fison_physics::{
    FluidEngine, FluidFields, FluidGeometry, MaterialParams, MeshFields, MeshMotionEngine,
    ProblemDefinition, SolutionState, StructureEngine, StructureFields,
};
use fison_types::{FisonError, FisonResult};

const CHANNEL_LENGTH: f64 = 4.0;
const CHANNEL_HEIGHT: f64 = 1.0;
const STRIP_THICKNESS: f64 = 0.25;

/// Stationary shear flow with a linear pressure drop along the channel.
pub struct ShearFlowEngine {
    peak_velocity: f64,
    pressure_drop: f64,
    mesh: TriMesh,
}

impl ShearFlowEngine {
    pub fn new(mesh: &TriMesh, peak_velocity: f64, pressure_drop: f64) -> Self {
        Self {
            peak_velocity,
            pressure_drop,
            mesh: mesh.clone(),
        }
    }
}

impl FluidEngine for ShearFlowEngine {
    fn advance(
        &mut self,
        _dt: f64,
        _previous: &FluidFields,
        _geometry: &FluidGeometry,
        _needs_reassembly: bool,
    ) -> FisonResult<FluidFields> {
        let n = self.mesh.vertex_count();
        let mut fields = FluidFields {
            velocity: VectorField::zeros(n),
            pressure: fison_mesh::ScalarField::zeros(n),
        };
        for i in 0..n {
            fields.velocity.x[i] = self.peak_velocity * self.mesh.pos_y[i] / CHANNEL_HEIGHT;
            fields.pressure.values[i] =
                self.pressure_drop * (1.0 - self.mesh.pos_x[i] / CHANNEL_LENGTH);
        }
        Ok(fields)
    }

    fn name(&self) -> &str {
        "shear_flow"
    }
}

/// Quasi-static compliant response: displacement proportional to the
/// installed traction. Small compliance keeps the coupling contractive.
pub struct CompliantStripEngine {
    compliance: f64,
}

impl CompliantStripEngine {
    pub fn new(compliance: f64) -> Self {
        Self { compliance }
    }
}

impl StructureEngine for CompliantStripEngine {
    fn advance(
        &mut self,
        _dt: f64,
        previous: &StructureFields,
        traction: &VectorField,
    ) -> FisonResult<StructureFields> {
        let mut fields = previous.clone();
        for i in 0..traction.len() {
            fields.displacement.x[i] = self.compliance * traction.x[i];
            fields.displacement.y[i] = self.compliance * traction.y[i];
        }
        Ok(fields)
    }

    fn name(&self) -> &str {
        "compliant_strip"
    }
}

/// Passes the interface Dirichlet data through; the transfer's Laplacian
/// smoothing spreads the motion into the interior.
pub struct PassThroughMeshEngine;

impl MeshMotionEngine for PassThroughMeshEngine {
    fn advance(
        &mut self,
        _dt: f64,
        _previous: &MeshFields,
        boundary_displacement: &VectorField,
    ) -> FisonResult<MeshFields> {
        Ok(MeshFields {
            displacement: boundary_displacement.clone(),
        })
    }

    fn name(&self) -> &str {
        "pass_through_mesh"
    }
}

/// Engine factory for the demo scenario.
pub struct DemoFactory;

impl EngineFactory for DemoFactory {
    fn fluid_engine(&self, mesh: &TriMesh) -> Box<dyn FluidEngine> {
        Box::new(ShearFlowEngine::new(mesh, 1.0, 0.5))
    }

    fn structure_engine(&self, _mesh: &TriMesh) -> Box<dyn StructureEngine> {
        Box::new(CompliantStripEngine::new(1e-3))
    }

    fn mesh_engine(&self, _mesh: &TriMesh) -> Box<dyn MeshMotionEngine> {
        Box::new(PassThroughMeshEngine)
    }
}

/// The channel-flap problem definition.
pub struct ChannelFlapProblem {
    fluid: TriMesh,
    structure: TriMesh,
    material: MaterialParams,
    pairs: Vec<(u32, u32)>,
    end_time: f64,
}

impl ChannelFlapProblem {
    /// Builds the scenario at the given base resolution.
    pub fn new(nx: usize, ny: usize, end_time: f64) -> FisonResult<Self> {
        let fluid = fluid_channel(nx, ny, CHANNEL_LENGTH, CHANNEL_HEIGHT);
        let structure = strip_below_interface(&fluid)?;
        let pairs = matched_interface_pairs(&fluid, &structure)?;
        Ok(Self {
            fluid,
            structure,
            material: MaterialParams::default(),
            pairs,
            end_time,
        })
    }
}

impl ProblemDefinition for ChannelFlapProblem {
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
        self.end_time
    }

    /// Mean vertical interface displacement of the strip.
    fn evaluate_functional(&self, state: &SolutionState, _t0: f64, _t1: f64) -> f64 {
        if self.pairs.is_empty() {
            return 0.0;
        }
        let sum: f64 = self
            .pairs
            .iter()
            .map(|&(_, sv)| state.structure_displacement.y[sv as usize])
            .sum();
        sum / self.pairs.len() as f64
    }

    fn interface_pairs(&self) -> &[(u32, u32)] {
        &self.pairs
    }

    fn init_meshes(&mut self, fluid_mesh: TriMesh) -> FisonResult<()> {
        let structure = strip_below_interface(&fluid_mesh)?;
        self.pairs = matched_interface_pairs(&fluid_mesh, &structure)?;
        self.fluid = fluid_mesh;
        self.structure = structure;
        Ok(())
    }
}

/// Rebuilds the strip mesh so its top row matches the fluid interface
/// vertex positions column for column.
///
/// Indicator-driven refinement can split interface edges unevenly; the
/// strip follows whatever x coordinates the fluid interface ends up with.
fn strip_below_interface(fluid: &TriMesh) -> FisonResult<TriMesh> {
    let mut xs: Vec<f64> = fluid
        .interface_vertices()
        .iter()
        .map(|&v| fluid.pos_x[v as usize])
        .collect();
    xs.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    if xs.len() < 2 {
        return Err(FisonError::InvalidMesh(
            "Fluid interface has fewer than two vertices".into(),
        ));
    }

    let cols = xs.len();
    let mut mesh = TriMesh::with_capacity(cols * 2, (cols - 1) * 2);

    // Bottom row, then top row at the interface line.
    for &x in &xs {
        mesh.pos_x.push(x);
        mesh.pos_y.push(-STRIP_THICKNESS);
    }
    for &x in &xs {
        mesh.pos_x.push(x);
        mesh.pos_y.push(0.0);
    }

    for i in 0..cols - 1 {
        let bl = i as u32;
        let br = bl + 1;
        let tl = bl + cols as u32;
        let tr = tl + 1;
        mesh.indices.extend_from_slice(&[bl, br, tr]);
        mesh.indices.extend_from_slice(&[bl, tr, tl]);
    }

    for i in 0..cols - 1 {
        mesh.boundary_edges.push(BoundaryEdge {
            v0: i as u32,
            v1: i as u32 + 1,
            marker: BoundaryMarker::Exterior,
        });
        mesh.boundary_edges.push(BoundaryEdge {
            v0: (cols + i) as u32,
            v1: (cols + i + 1) as u32,
            marker: BoundaryMarker::Interface,
        });
    }
    mesh.boundary_edges.push(BoundaryEdge {
        v0: 0,
        v1: cols as u32,
        marker: BoundaryMarker::Exterior,
    });
    mesh.boundary_edges.push(BoundaryEdge {
        v0: (cols - 1) as u32,
        v1: (2 * cols - 1) as u32,
        marker: BoundaryMarker::Exterior,
    });

    mesh.validate()?;
    Ok(mesh)
}

/// Estimator for the demo: starts above the tolerance and halves per
/// pass, exercising a couple of refinements before the loop stops.
pub fn demo_estimator(tolerance: f64) -> FisonResult<Box<dyn ErrorEstimator>> {
    Ok(Box::new(DecayingEstimator::new(4.0 * tolerance, 0.9)?))
}
