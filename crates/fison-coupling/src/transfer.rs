//! Interface transfer operators.
//!
//! Three pure operators pass data between the subproblem adapters:
//!
//! - fluid → structure: traction from the fluid stress on the reference
//!   configuration, projected onto the interface trace space
//! - structure → mesh: interface displacement remapped to fluid-side
//!   numbering, installed as Dirichlet data on the moving boundary
//! - mesh → fluid: smoothed deformed coordinates plus mesh velocity,
//!   packaged as a [`GeometryUpdate`]
//!
//! The traction projection solves the interface P1 mass-matrix system
//! instead of sampling nodal values, so the surface integral of the
//! transferred traction matches the integral of the raw fluid traction
//! exactly (partition of unity of the P1 basis on the interface).

use std::collections::HashMap;

use glam::{DMat2, DVec2};

use fison_math::{CholeskySolver, CsrMatrix, SparseSolver};
use fison_mesh::{laplacian_smooth, Topology, TriMesh, VectorField};
use fison_physics::{FluidFields, FluidGeometry, GeometryUpdate, ProblemDefinition};
use fison_types::constants::DEGENERATE_AREA_THRESHOLD;
use fison_types::{FisonError, FisonResult};

/// One interface edge with its adjacent fluid cell and outward normal.
#[derive(Debug, Clone, Copy)]
struct InterfaceEdge {
    v0: u32,
    v1: u32,
    cell: u32,
    /// Unit normal pointing out of the fluid domain.
    normal: DVec2,
    length: f64,
}

/// Fluid→structure traction operator for one fluid mesh.
///
/// Assembles and factorizes the interface mass matrix once per mesh;
/// `project` then costs two triangular solves per coupling iteration.
pub struct TractionProjector {
    interface_vertices: Vec<u32>,
    local_index: HashMap<u32, usize>,
    edges: Vec<InterfaceEdge>,
    solver: CholeskySolver,
    mass: CsrMatrix,
}

impl TractionProjector {
    /// Builds the projector for the given fluid mesh.
    pub fn new(mesh: &TriMesh) -> FisonResult<Self> {
        let interface_vertices = mesh.interface_vertices();
        if interface_vertices.is_empty() {
            return Err(FisonError::InvalidMesh(
                "Fluid mesh has no interface edges".into(),
            ));
        }
        let local_index: HashMap<u32, usize> = interface_vertices
            .iter()
            .enumerate()
            .map(|(i, &v)| (v, i))
            .collect();

        // Boundary edges have exactly one adjacent cell.
        let mut edge_cell: HashMap<(u32, u32), u32> = HashMap::new();
        for c in 0..mesh.cell_count() {
            let [a, b, d] = mesh.cell(c);
            for (u, v) in [(a, b), (b, d), (d, a)] {
                edge_cell.insert((u.min(v), u.max(v)), c as u32);
            }
        }

        let mut edges = Vec::new();
        for edge in mesh.interface_edges() {
            let key = (edge.v0.min(edge.v1), edge.v0.max(edge.v1));
            let cell = *edge_cell.get(&key).ok_or_else(|| {
                FisonError::InvalidMesh(format!(
                    "Interface edge ({}, {}) is not part of any cell",
                    edge.v0, edge.v1
                ))
            })?;

            let a = vertex(mesh, edge.v0);
            let b = vertex(mesh, edge.v1);
            let length = (b - a).length();
            if length < DEGENERATE_AREA_THRESHOLD {
                return Err(FisonError::InvalidMesh(format!(
                    "Degenerate interface edge ({}, {})",
                    edge.v0, edge.v1
                )));
            }

            // Outward: away from the third vertex of the adjacent cell.
            let [c0, c1, c2] = mesh.cell(cell as usize);
            let third = [c0, c1, c2]
                .into_iter()
                .find(|&v| v != edge.v0 && v != edge.v1)
                .ok_or_else(|| {
                    FisonError::InvalidMesh(format!(
                        "Cell {cell} does not span interface edge ({}, {})",
                        edge.v0, edge.v1
                    ))
                })?;
            let e = (b - a) / length;
            let mut normal = DVec2::new(e.y, -e.x);
            if normal.dot(vertex(mesh, third) - a) > 0.0 {
                normal = -normal;
            }

            edges.push(InterfaceEdge {
                v0: edge.v0,
                v1: edge.v1,
                cell,
                normal,
                length,
            });
        }

        // P1 mass matrix over the interface: |e|/6 · [[2, 1], [1, 2]].
        let mut triplets = Vec::with_capacity(edges.len() * 4);
        for edge in &edges {
            let i = local_index[&edge.v0];
            let j = local_index[&edge.v1];
            let w = edge.length / 6.0;
            triplets.push((i, i, 2.0 * w));
            triplets.push((j, j, 2.0 * w));
            triplets.push((i, j, w));
            triplets.push((j, i, w));
        }
        let n = interface_vertices.len();
        let mass = CsrMatrix::from_triplets(n, n, &triplets);

        let mut solver = CholeskySolver::new();
        solver
            .factorize(&mass)
            .map_err(FisonError::Numerics)?;

        Ok(Self {
            interface_vertices,
            local_index,
            edges,
            solver,
            mass,
        })
    }

    /// Number of interface vertices the projector covers.
    pub fn interface_vertex_count(&self) -> usize {
        self.interface_vertices.len()
    }

    /// Row sums of the interface mass matrix (the integrals of the P1
    /// basis functions over the interface).
    pub fn mass_row_sums(&self) -> Vec<f64> {
        self.mass.row_sums()
    }

    /// Projects the fluid traction onto the interface trace space.
    ///
    /// Returns a nodal traction field in fluid-mesh numbering, zero off
    /// the interface. `mesh_displacement` is the current mesh-motion
    /// iterate; the stress is computed on the reference configuration and
    /// mapped through the Piola transform the displacement induces.
    pub fn project(
        &self,
        mesh: &TriMesh,
        fluid: &FluidFields,
        mesh_displacement: &VectorField,
        viscosity: f64,
    ) -> FisonResult<VectorField> {
        let n = self.interface_vertices.len();
        let mut rhs_x = vec![0.0; n];
        let mut rhs_y = vec![0.0; n];

        for edge in &self.edges {
            let traction = self.edge_traction(mesh, edge, fluid, mesh_displacement, viscosity)?;
            let half = 0.5 * edge.length;
            let i = self.local_index[&edge.v0];
            let j = self.local_index[&edge.v1];
            rhs_x[i] += half * traction.x;
            rhs_x[j] += half * traction.x;
            rhs_y[i] += half * traction.y;
            rhs_y[j] += half * traction.y;
        }

        let mut sol_x = vec![0.0; n];
        let mut sol_y = vec![0.0; n];
        self.solver
            .solve(&rhs_x, &mut sol_x)
            .map_err(FisonError::Numerics)?;
        self.solver
            .solve(&rhs_y, &mut sol_y)
            .map_err(FisonError::Numerics)?;

        let mut out = VectorField::zeros(mesh.vertex_count());
        for (local, &v) in self.interface_vertices.iter().enumerate() {
            out.x[v as usize] = sol_x[local];
            out.y[v as usize] = sol_y[local];
        }
        Ok(out)
    }

    /// Surface integral of the raw (edge-wise constant) fluid traction.
    pub fn raw_traction_integral(
        &self,
        mesh: &TriMesh,
        fluid: &FluidFields,
        mesh_displacement: &VectorField,
        viscosity: f64,
    ) -> FisonResult<DVec2> {
        let mut total = DVec2::ZERO;
        for edge in &self.edges {
            let traction = self.edge_traction(mesh, edge, fluid, mesh_displacement, viscosity)?;
            total += traction * edge.length;
        }
        Ok(total)
    }

    /// Surface integral of a nodal interface field (exact for P1).
    pub fn nodal_traction_integral(&self, field: &VectorField) -> DVec2 {
        let mut total = DVec2::ZERO;
        for edge in &self.edges {
            let a = DVec2::new(field.x[edge.v0 as usize], field.y[edge.v0 as usize]);
            let b = DVec2::new(field.x[edge.v1 as usize], field.y[edge.v1 as usize]);
            total += (a + b) * (0.5 * edge.length);
        }
        total
    }

    /// Traction on one interface edge from the adjacent cell's stress.
    ///
    /// The normal is flipped to structure-outward, so the result is the
    /// force per unit length the fluid exerts on the structure.
    fn edge_traction(
        &self,
        mesh: &TriMesh,
        edge: &InterfaceEdge,
        fluid: &FluidFields,
        mesh_displacement: &VectorField,
        viscosity: f64,
    ) -> FisonResult<DVec2> {
        let piola = cell_piola_stress(mesh, edge.cell as usize, fluid, mesh_displacement, viscosity)?;
        Ok(-(piola * edge.normal))
    }
}

/// Mapped fluid stress `J σ F⁻ᵀ` on one cell of the reference mesh.
///
/// P1 fields have constant gradients per cell: `F = I + ∇U_M`,
/// `σ = μ (∇u F⁻¹ + F⁻ᵀ ∇uᵀ) − p̄ I` with the cell-average pressure `p̄`.
fn cell_piola_stress(
    mesh: &TriMesh,
    cell: usize,
    fluid: &FluidFields,
    mesh_displacement: &VectorField,
    viscosity: f64,
) -> FisonResult<DMat2> {
    let [i0, i1, i2] = mesh.cell(cell);
    let r0 = vertex(mesh, i0);
    let r1 = vertex(mesh, i1);
    let r2 = vertex(mesh, i2);

    let dm = DMat2::from_cols(r1 - r0, r2 - r0);
    let det = dm.determinant();
    if det.abs() < DEGENERATE_AREA_THRESHOLD {
        return Err(FisonError::Numerics(format!(
            "Degenerate cell {cell} in traction transfer"
        )));
    }
    let dm_inv = dm.inverse();

    let grad_u = DMat2::from_cols(
        field_at(&fluid.velocity, i1) - field_at(&fluid.velocity, i0),
        field_at(&fluid.velocity, i2) - field_at(&fluid.velocity, i0),
    ) * dm_inv;

    let grad_m = DMat2::from_cols(
        field_at(mesh_displacement, i1) - field_at(mesh_displacement, i0),
        field_at(mesh_displacement, i2) - field_at(mesh_displacement, i0),
    ) * dm_inv;

    let f = DMat2::IDENTITY + grad_m;
    let jacobian = f.determinant();
    if jacobian <= DEGENERATE_AREA_THRESHOLD {
        return Err(FisonError::Numerics(format!(
            "Mesh displacement inverts cell {cell} (J = {jacobian})"
        )));
    }
    let f_inv = f.inverse();

    let p_bar = (fluid.pressure.values[i0 as usize]
        + fluid.pressure.values[i1 as usize]
        + fluid.pressure.values[i2 as usize])
        / 3.0;

    let sigma = (grad_u * f_inv + f_inv.transpose() * grad_u.transpose()) * viscosity
        - DMat2::IDENTITY * p_bar;

    Ok(sigma * f_inv.transpose() * jacobian)
}

/// Fluid→structure transfer: projected traction remapped to
/// structure-side numbering.
pub fn fluid_to_structure(
    projector: &TractionProjector,
    problem: &dyn ProblemDefinition,
    fluid: &FluidFields,
    mesh_displacement: &VectorField,
) -> FisonResult<VectorField> {
    let on_fluid = projector.project(
        problem.fluid_mesh(),
        fluid,
        mesh_displacement,
        problem.material().fluid_viscosity,
    )?;
    Ok(problem.map_fluid_to_structure(&on_fluid))
}

/// Structure→mesh transfer: interface displacement in fluid-side
/// numbering, for the mesh-motion Dirichlet condition.
pub fn structure_to_mesh(
    problem: &dyn ProblemDefinition,
    structure_displacement: &VectorField,
) -> VectorField {
    problem.map_structure_to_fluid(structure_displacement)
}

/// Mesh→fluid transfer: deformed coordinates with smoothing, plus mesh
/// velocity against the last committed geometry.
pub fn mesh_to_fluid(
    mesh: &TriMesh,
    topology: &Topology,
    mesh_displacement: &VectorField,
    geometry: &FluidGeometry,
    dt: f64,
    num_smoothings: u32,
) -> FisonResult<GeometryUpdate> {
    if !(dt > 0.0) {
        return Err(FisonError::InvalidConfig(format!(
            "Mesh velocity needs a positive dt, got {dt}"
        )));
    }
    let n = mesh.vertex_count();
    if mesh_displacement.len() != n {
        return Err(FisonError::InvalidMesh(format!(
            "Mesh displacement length ({}) != vertex count ({n})",
            mesh_displacement.len()
        )));
    }

    let mut positions_x: Vec<f64> = (0..n)
        .map(|i| geometry.reference_x[i] + mesh_displacement.x[i])
        .collect();
    let mut positions_y: Vec<f64> = (0..n)
        .map(|i| geometry.reference_y[i] + mesh_displacement.y[i])
        .collect();

    laplacian_smooth(
        &mut positions_x,
        &mut positions_y,
        topology,
        &topology.on_boundary,
        num_smoothings,
    );

    let mut velocity = VectorField::zeros(n);
    for i in 0..n {
        velocity.x[i] = (positions_x[i] - geometry.previous_x[i]) / dt;
        velocity.y[i] = (positions_y[i] - geometry.previous_y[i]) / dt;
    }

    Ok(GeometryUpdate {
        positions_x,
        positions_y,
        velocity,
    })
}

#[inline]
fn vertex(mesh: &TriMesh, v: u32) -> DVec2 {
    DVec2::new(mesh.pos_x[v as usize], mesh.pos_y[v as usize])
}

#[inline]
fn field_at(field: &VectorField, v: u32) -> DVec2 {
    DVec2::new(field.x[v as usize], field.y[v as usize])
}
