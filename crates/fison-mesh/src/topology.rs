//! Mesh topology queries.
//!
//! Builds adjacency data structures from the cell index buffer, enabling
//! the neighbor queries the refiner and the smoother need
//! (vertex-to-cell, unique edges, edge-to-cell, vertex neighbors).

use std::collections::HashMap;

use crate::mesh::TriMesh;

/// Precomputed topology information for a triangle mesh.
///
/// Built once per mesh generation. Provides O(1) adjacency used by:
/// - Laplacian smoothing (vertex 1-ring)
/// - Longest-edge bisection (edge → adjacent cells)
/// - Boundary detection (edges with a single adjacent cell)
#[derive(Debug, Clone)]
pub struct Topology {
    /// For each vertex, the list of cells that contain it.
    pub vertex_cells: Vec<Vec<u32>>,

    /// Unique edges as `(v_min, v_max)` pairs.
    pub edges: Vec<[u32; 2]>,

    /// For each edge, the one or two adjacent cells.
    /// Boundary edges have exactly 1 adjacent cell.
    pub edge_cells: Vec<Vec<u32>>,

    /// For each vertex, its 1-ring neighbor vertices (sorted, unique).
    pub vertex_neighbors: Vec<Vec<u32>>,

    /// Whether each vertex lies on the mesh boundary
    /// (incident to an edge with a single adjacent cell).
    pub on_boundary: Vec<bool>,

    /// Edge lookup: `(v_min, v_max)` → edge index.
    edge_index: HashMap<(u32, u32), u32>,
}

impl Topology {
    /// Build topology from a triangle mesh.
    pub fn build(mesh: &TriMesh) -> Self {
        let vertex_count = mesh.vertex_count();
        let cell_count = mesh.cell_count();

        // Vertex → cell adjacency
        let mut vertex_cells: Vec<Vec<u32>> = vec![Vec::new(); vertex_count];
        for c in 0..cell_count {
            let [a, b, cc] = mesh.cell(c);
            vertex_cells[a as usize].push(c as u32);
            vertex_cells[b as usize].push(c as u32);
            vertex_cells[cc as usize].push(c as u32);
        }

        // Unique edges and edge → cell adjacency
        let mut edge_index: HashMap<(u32, u32), u32> = HashMap::new();
        let mut edges: Vec<[u32; 2]> = Vec::new();
        let mut edge_cells: Vec<Vec<u32>> = Vec::new();

        for c in 0..cell_count {
            let [a, b, cc] = mesh.cell(c);
            for (u, v) in [(a, b), (b, cc), (cc, a)] {
                let key = (u.min(v), u.max(v));
                let idx = *edge_index.entry(key).or_insert_with(|| {
                    edges.push([key.0, key.1]);
                    edge_cells.push(Vec::new());
                    (edges.len() - 1) as u32
                });
                edge_cells[idx as usize].push(c as u32);
            }
        }

        // Vertex 1-ring neighborhoods
        let mut vertex_neighbors: Vec<Vec<u32>> = vec![Vec::new(); vertex_count];
        for e in &edges {
            vertex_neighbors[e[0] as usize].push(e[1]);
            vertex_neighbors[e[1] as usize].push(e[0]);
        }
        for ring in &mut vertex_neighbors {
            ring.sort_unstable();
            ring.dedup();
        }

        // Boundary vertices: endpoints of edges with a single adjacent cell
        let mut on_boundary = vec![false; vertex_count];
        for (i, cells) in edge_cells.iter().enumerate() {
            if cells.len() == 1 {
                on_boundary[edges[i][0] as usize] = true;
                on_boundary[edges[i][1] as usize] = true;
            }
        }

        Self {
            vertex_cells,
            edges,
            edge_cells,
            vertex_neighbors,
            on_boundary,
            edge_index,
        }
    }

    /// Returns the edge index for the edge between `u` and `v`, if present.
    pub fn edge_between(&self, u: u32, v: u32) -> Option<u32> {
        self.edge_index.get(&(u.min(v), u.max(v))).copied()
    }

    /// Returns the cell on the other side of the edge `(u, v)` from `cell`,
    /// or `None` for a boundary edge.
    pub fn neighbor_across(&self, cell: u32, u: u32, v: u32) -> Option<u32> {
        let edge = self.edge_between(u, v)?;
        self.edge_cells[edge as usize]
            .iter()
            .copied()
            .find(|&c| c != cell)
    }

    /// Number of unique edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}
