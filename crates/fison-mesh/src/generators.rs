//! Procedural mesh generators for tests and the demo scenario.
//!
//! These generators produce deterministic, resolution-configurable meshes
//! with counter-clockwise winding and marked boundary edges. The channel /
//! strip pair share an interface line so their interface vertices can be
//! matched one-to-one by x coordinate.

use fison_types::{FisonError, FisonResult};

use crate::mesh::{BoundaryEdge, BoundaryMarker, TriMesh};

/// Per-side boundary markers for a rectangle, in order
/// bottom, right, top, left.
#[derive(Debug, Clone, Copy)]
struct SideMarkers {
    bottom: BoundaryMarker,
    right: BoundaryMarker,
    top: BoundaryMarker,
    left: BoundaryMarker,
}

/// Structured triangulation of the rectangle
/// `[x0, x0+width] × [y0, y0+height]` with `nx × ny` quads split into
/// two triangles each.
fn rect_grid(
    nx: usize,
    ny: usize,
    x0: f64,
    y0: f64,
    width: f64,
    height: f64,
    markers: SideMarkers,
) -> TriMesh {
    let verts_x = nx + 1;
    let verts_y = ny + 1;
    let mut mesh = TriMesh::with_capacity(verts_x * verts_y, nx * ny * 2);

    for j in 0..verts_y {
        for i in 0..verts_x {
            mesh.pos_x.push(x0 + width * i as f64 / nx as f64);
            mesh.pos_y.push(y0 + height * j as f64 / ny as f64);
        }
    }

    // Two counter-clockwise triangles per quad (y increases upward)
    for j in 0..ny {
        for i in 0..nx {
            let bl = (j * verts_x + i) as u32;
            let br = bl + 1;
            let tl = bl + verts_x as u32;
            let tr = tl + 1;

            mesh.indices.extend_from_slice(&[bl, br, tr]);
            mesh.indices.extend_from_slice(&[bl, tr, tl]);
        }
    }

    for i in 0..nx {
        let v0 = i as u32;
        mesh.boundary_edges.push(BoundaryEdge {
            v0,
            v1: v0 + 1,
            marker: markers.bottom,
        });
        let t0 = (ny * verts_x + i) as u32;
        mesh.boundary_edges.push(BoundaryEdge {
            v0: t0,
            v1: t0 + 1,
            marker: markers.top,
        });
    }
    for j in 0..ny {
        let l0 = (j * verts_x) as u32;
        mesh.boundary_edges.push(BoundaryEdge {
            v0: l0,
            v1: l0 + verts_x as u32,
            marker: markers.left,
        });
        let r0 = (j * verts_x + nx) as u32;
        mesh.boundary_edges.push(BoundaryEdge {
            v0: r0,
            v1: r0 + verts_x as u32,
            marker: markers.right,
        });
    }

    mesh
}

/// Unit square `[0,1]²`, all boundary edges exterior.
pub fn unit_square(nx: usize, ny: usize) -> TriMesh {
    rect_grid(
        nx,
        ny,
        0.0,
        0.0,
        1.0,
        1.0,
        SideMarkers {
            bottom: BoundaryMarker::Exterior,
            right: BoundaryMarker::Exterior,
            top: BoundaryMarker::Exterior,
            left: BoundaryMarker::Exterior,
        },
    )
}

/// Fluid channel `[0,length] × [0,height]` whose *bottom* edge is the
/// fluid–structure interface.
pub fn fluid_channel(nx: usize, ny: usize, length: f64, height: f64) -> TriMesh {
    rect_grid(
        nx,
        ny,
        0.0,
        0.0,
        length,
        height,
        SideMarkers {
            bottom: BoundaryMarker::Interface,
            right: BoundaryMarker::Exterior,
            top: BoundaryMarker::Exterior,
            left: BoundaryMarker::Exterior,
        },
    )
}

/// Elastic strip `[0,length] × [−thickness,0]` whose *top* edge is the
/// fluid–structure interface. Pairs with [`fluid_channel`] of the same
/// length and `nx`.
pub fn structure_strip(nx: usize, ny: usize, length: f64, thickness: f64) -> TriMesh {
    rect_grid(
        nx,
        ny,
        0.0,
        -thickness,
        length,
        thickness,
        SideMarkers {
            bottom: BoundaryMarker::Exterior,
            right: BoundaryMarker::Exterior,
            top: BoundaryMarker::Interface,
            left: BoundaryMarker::Exterior,
        },
    )
}

/// Matches interface vertices of a fluid mesh to interface vertices of a
/// structure mesh by x coordinate.
///
/// Returns pairs `(fluid_vertex, structure_vertex)`. Fails if the two
/// interfaces have different vertex counts or mismatched coordinates —
/// the dof maps of the problem definition require a one-to-one
/// correspondence.
pub fn matched_interface_pairs(fluid: &TriMesh, structure: &TriMesh) -> FisonResult<Vec<(u32, u32)>> {
    let mut fl: Vec<u32> = fluid.interface_vertices();
    let mut st: Vec<u32> = structure.interface_vertices();

    if fl.len() != st.len() {
        return Err(FisonError::InvalidProblem(format!(
            "Interface vertex counts differ: fluid {}, structure {}",
            fl.len(),
            st.len()
        )));
    }

    fl.sort_by(|&a, &b| {
        fluid.pos_x[a as usize]
            .partial_cmp(&fluid.pos_x[b as usize])
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    st.sort_by(|&a, &b| {
        structure.pos_x[a as usize]
            .partial_cmp(&structure.pos_x[b as usize])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let tol = 1.0e-10;
    let pairs: Vec<(u32, u32)> = fl.iter().copied().zip(st.iter().copied()).collect();
    for &(f, s) in &pairs {
        let dx = (fluid.pos_x[f as usize] - structure.pos_x[s as usize]).abs();
        if dx > tol {
            return Err(FisonError::InvalidProblem(format!(
                "Interface vertices do not line up: fluid x = {}, structure x = {}",
                fluid.pos_x[f as usize], structure.pos_x[s as usize]
            )));
        }
    }

    Ok(pairs)
}
