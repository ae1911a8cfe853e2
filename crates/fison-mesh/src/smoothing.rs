//! Laplacian mesh smoothing.
//!
//! The mesh-to-fluid transfer applies a configurable number of smoothing
//! passes to the deformed coordinates before computing mesh velocity, to
//! keep interior cells from tangling as the interface moves. Boundary
//! vertices (exterior and interface) are held fixed — their positions are
//! Dirichlet data owned by the mesh-motion subproblem.

use crate::topology::Topology;

/// Applies `passes` Jacobi-style Laplacian smoothing sweeps to the
/// coordinate buffers, moving each *interior* vertex to the centroid of its
/// 1-ring neighbors. Vertices with `fixed[i] == true` never move.
///
/// Operates in place on caller-owned buffers; the caller decides what
/// "fixed" means (typically: all boundary vertices).
pub fn laplacian_smooth(
    pos_x: &mut [f64],
    pos_y: &mut [f64],
    topology: &Topology,
    fixed: &[bool],
    passes: u32,
) {
    let n = pos_x.len();
    if n == 0 || passes == 0 {
        return;
    }

    let mut next_x = pos_x.to_vec();
    let mut next_y = pos_y.to_vec();

    for _ in 0..passes {
        for i in 0..n {
            if fixed[i] {
                continue;
            }
            let ring = &topology.vertex_neighbors[i];
            if ring.is_empty() {
                continue;
            }
            let inv = 1.0 / ring.len() as f64;
            let mut cx = 0.0;
            let mut cy = 0.0;
            for &j in ring {
                cx += pos_x[j as usize];
                cy += pos_y[j as usize];
            }
            next_x[i] = cx * inv;
            next_y[i] = cy * inv;
        }
        pos_x.copy_from_slice(&next_x);
        pos_y.copy_from_slice(&next_y);
    }
}
