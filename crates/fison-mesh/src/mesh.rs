//! Core 2D triangle mesh with SoA (Structure of Arrays) layout.
//!
//! The SoA layout stores each coordinate channel contiguously:
//! - `pos_x: [x0, x1, x2, ...]`
//! - `pos_y: [y0, y1, y2, ...]`
//!
//! Boundary edges carry markers distinguishing the exterior boundary from
//! the fluid–structure interface; the transfer operators and the mesh-motion
//! Dirichlet conditions key off these markers.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use fison_types::constants::DEGENERATE_AREA_THRESHOLD;
use fison_types::{FisonError, FisonResult};

/// Classification of a boundary edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BoundaryMarker {
    /// Exterior boundary (walls, inflow, outflow).
    Exterior,
    /// The shared fluid–structure interface.
    Interface,
}

/// A boundary edge between two vertices, with its marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundaryEdge {
    /// First endpoint (vertex index).
    pub v0: u32,
    /// Second endpoint (vertex index).
    pub v1: u32,
    /// Boundary classification.
    pub marker: BoundaryMarker,
}

/// A triangle mesh stored in Structure-of-Arrays layout.
///
/// Coordinates describe the *reference* configuration; deformed geometry
/// lives in the fluid adapter's exclusively-owned buffers, never here.
///
/// `generation` is bumped each time a refiner produces a new mesh, so the
/// outer adaptive loop can distinguish a frozen mesh (same generation)
/// from a refined replacement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriMesh {
    /// X coordinates of all vertices.
    pub pos_x: Vec<f64>,
    /// Y coordinates of all vertices.
    pub pos_y: Vec<f64>,

    /// Cell indices — each triangle is [v0, v1, v2], counter-clockwise.
    /// Stored flat: `[c0v0, c0v1, c0v2, c1v0, ...]`
    pub indices: Vec<u32>,

    /// Marked boundary edges.
    pub boundary_edges: Vec<BoundaryEdge>,

    /// Refinement generation. 0 for a freshly generated mesh,
    /// incremented by each refinement.
    pub generation: u64,
}

impl TriMesh {
    /// Creates an empty mesh with pre-allocated capacity.
    pub fn with_capacity(vertex_capacity: usize, cell_capacity: usize) -> Self {
        Self {
            pos_x: Vec::with_capacity(vertex_capacity),
            pos_y: Vec::with_capacity(vertex_capacity),
            indices: Vec::with_capacity(cell_capacity * 3),
            boundary_edges: Vec::new(),
            generation: 0,
        }
    }

    /// Returns the number of vertices.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.pos_x.len()
    }

    /// Returns the number of cells.
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Returns the position of vertex `i` as `[x, y]`.
    #[inline]
    pub fn position(&self, i: usize) -> [f64; 2] {
        [self.pos_x[i], self.pos_y[i]]
    }

    /// Returns the three vertex indices of cell `c`.
    #[inline]
    pub fn cell(&self, c: usize) -> [u32; 3] {
        let base = c * 3;
        [
            self.indices[base],
            self.indices[base + 1],
            self.indices[base + 2],
        ]
    }

    /// Signed area of cell `c` (positive for counter-clockwise winding).
    pub fn cell_area(&self, c: usize) -> f64 {
        let [a, b, cc] = self.cell(c);
        let (ax, ay) = (self.pos_x[a as usize], self.pos_y[a as usize]);
        let (bx, by) = (self.pos_x[b as usize], self.pos_y[b as usize]);
        let (cx, cy) = (self.pos_x[cc as usize], self.pos_y[cc as usize]);
        0.5 * ((bx - ax) * (cy - ay) - (cx - ax) * (by - ay))
    }

    /// Length of the edge between vertices `v0` and `v1`.
    pub fn edge_length(&self, v0: u32, v1: u32) -> f64 {
        let dx = self.pos_x[v1 as usize] - self.pos_x[v0 as usize];
        let dy = self.pos_y[v1 as usize] - self.pos_y[v0 as usize];
        (dx * dx + dy * dy).sqrt()
    }

    /// Interface vertices, sorted ascending and deduplicated.
    pub fn interface_vertices(&self) -> Vec<u32> {
        let set: BTreeSet<u32> = self
            .boundary_edges
            .iter()
            .filter(|e| e.marker == BoundaryMarker::Interface)
            .flat_map(|e| [e.v0, e.v1])
            .collect();
        set.into_iter().collect()
    }

    /// Interface edges only.
    pub fn interface_edges(&self) -> Vec<BoundaryEdge> {
        self.boundary_edges
            .iter()
            .copied()
            .filter(|e| e.marker == BoundaryMarker::Interface)
            .collect()
    }

    /// All boundary vertices (any marker), sorted and deduplicated.
    pub fn boundary_vertices(&self) -> Vec<u32> {
        let set: BTreeSet<u32> = self
            .boundary_edges
            .iter()
            .flat_map(|e| [e.v0, e.v1])
            .collect();
        set.into_iter().collect()
    }

    /// Total length of the interface boundary.
    pub fn interface_length(&self) -> f64 {
        self.interface_edges()
            .iter()
            .map(|e| self.edge_length(e.v0, e.v1))
            .sum()
    }

    /// Validates mesh integrity.
    ///
    /// Checks:
    /// - SoA arrays have the same length
    /// - Cell and boundary-edge indices are within bounds
    /// - No repeated vertex indices within a cell
    /// - No degenerate (near-zero area) or inverted cells
    pub fn validate(&self) -> FisonResult<()> {
        let n = self.pos_x.len();

        if self.pos_y.len() != n {
            return Err(FisonError::InvalidMesh(
                "Position arrays have inconsistent lengths".into(),
            ));
        }
        if self.indices.len() % 3 != 0 {
            return Err(FisonError::InvalidMesh(
                "Index count is not divisible by 3".into(),
            ));
        }

        for (i, &idx) in self.indices.iter().enumerate() {
            if idx as usize >= n {
                return Err(FisonError::InvalidMesh(format!(
                    "Cell index {idx} at position {i} is out of range (vertex count: {n})"
                )));
            }
        }

        for c in 0..self.cell_count() {
            let [a, b, cc] = self.cell(c);
            if a == b || b == cc || a == cc {
                return Err(FisonError::InvalidMesh(format!(
                    "Cell {c} has repeated vertex indices: [{a}, {b}, {cc}]"
                )));
            }
            let area = self.cell_area(c);
            if area <= DEGENERATE_AREA_THRESHOLD {
                return Err(FisonError::InvalidMesh(format!(
                    "Cell {c} is degenerate or inverted (signed area: {area:.3e})"
                )));
            }
        }

        for (i, e) in self.boundary_edges.iter().enumerate() {
            if e.v0 as usize >= n || e.v1 as usize >= n || e.v0 == e.v1 {
                return Err(FisonError::InvalidMesh(format!(
                    "Boundary edge {i} is invalid: [{}, {}]",
                    e.v0, e.v1
                )));
            }
        }

        Ok(())
    }

    /// Total number of vertices on the boundary with the given marker.
    pub fn marked_vertex_count(&self, marker: BoundaryMarker) -> usize {
        let set: BTreeSet<u32> = self
            .boundary_edges
            .iter()
            .filter(|e| e.marker == marker)
            .flat_map(|e| [e.v0, e.v1])
            .collect();
        set.len()
    }
}
