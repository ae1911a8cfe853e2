//! Mesh refinement.
//!
//! Two entry points, matching the two refinement policies the outer
//! adaptive loop selects between:
//!
//! - [`MeshRefiner::refine_uniform`] — red (1→4) subdivision of every cell,
//!   used by pure temporal-convergence studies.
//! - [`MeshRefiner::refine_by_indicators`] — Dörfler marking on per-cell
//!   error indicators followed by recursive longest-edge bisection with
//!   conforming closure.
//!
//! Both produce a new mesh with `generation` bumped by one; the input mesh
//! is never mutated, so the controller can compare generations to tell a
//! frozen mesh from a refined replacement.

use std::collections::{HashMap, HashSet};

use fison_types::{FisonError, FisonResult};

use crate::mesh::{BoundaryEdge, TriMesh};

/// Refinement collaborator contract.
///
/// The adaptive controller only ever calls one of these two operations per
/// refinement pass; which one is a configuration policy, not a fallback
/// chain.
pub trait MeshRefiner {
    /// Red (1→4) refinement of every cell.
    fn refine_uniform(&self, mesh: &TriMesh) -> FisonResult<TriMesh>;

    /// Indicator-driven refinement. `indicators` holds one non-negative
    /// value per cell; cells carrying the largest share of the total are
    /// refined.
    fn refine_by_indicators(&self, mesh: &TriMesh, indicators: &[f64]) -> FisonResult<TriMesh>;
}

/// Default refiner: red uniform subdivision and Dörfler-marked
/// longest-edge bisection.
#[derive(Debug, Clone)]
pub struct BisectionRefiner {
    /// Dörfler marking fraction θ ∈ (0, 1]: the smallest set of cells whose
    /// indicator sum reaches θ · total is marked for refinement.
    pub marking_fraction: f64,
}

impl Default for BisectionRefiner {
    fn default() -> Self {
        Self {
            marking_fraction: 0.5,
        }
    }
}

/// Growable coordinate buffers with deduplicated edge midpoints.
struct MidpointCache {
    pos_x: Vec<f64>,
    pos_y: Vec<f64>,
    midpoints: HashMap<(u32, u32), u32>,
}

impl MidpointCache {
    fn new(mesh: &TriMesh) -> Self {
        Self {
            pos_x: mesh.pos_x.clone(),
            pos_y: mesh.pos_y.clone(),
            midpoints: HashMap::new(),
        }
    }

    /// Vertex index of the midpoint of edge `(u, v)`, creating it on
    /// first use.
    fn midpoint(&mut self, u: u32, v: u32) -> u32 {
        let key = (u.min(v), u.max(v));
        if let Some(&m) = self.midpoints.get(&key) {
            return m;
        }
        let m = self.pos_x.len() as u32;
        self.pos_x
            .push(0.5 * (self.pos_x[u as usize] + self.pos_x[v as usize]));
        self.pos_y
            .push(0.5 * (self.pos_y[u as usize] + self.pos_y[v as usize]));
        self.midpoints.insert(key, m);
        m
    }
}

fn edge_key(u: u32, v: u32) -> (u32, u32) {
    (u.min(v), u.max(v))
}

impl BisectionRefiner {
    /// The longest edge of a cell, with a deterministic tie-break on the
    /// vertex-pair key so the closure iteration is reproducible.
    fn longest_edge(mesh: &TriMesh, cell: usize) -> (u32, u32) {
        let [a, b, c] = mesh.cell(cell);
        let mut best = edge_key(a, b);
        let mut best_len = mesh.edge_length(a, b);
        for (u, v) in [(b, c), (c, a)] {
            let len = mesh.edge_length(u, v);
            let key = edge_key(u, v);
            if len > best_len + 1.0e-15 || ((len - best_len).abs() <= 1.0e-15 && key < best) {
                best = key;
                best_len = len;
            }
        }
        best
    }

    /// Dörfler marking: smallest cell set whose indicator sum reaches
    /// `marking_fraction` of the total.
    fn mark_cells(&self, indicators: &[f64]) -> Vec<usize> {
        let total: f64 = indicators.iter().sum();
        if total <= 0.0 {
            return Vec::new();
        }

        let mut order: Vec<usize> = (0..indicators.len()).collect();
        order.sort_by(|&a, &b| {
            indicators[b]
                .partial_cmp(&indicators[a])
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let target = self.marking_fraction * total;
        let mut marked = Vec::new();
        let mut acc = 0.0;
        for c in order {
            if acc >= target {
                break;
            }
            acc += indicators[c];
            marked.push(c);
        }
        marked
    }

    /// Recursively bisect a (sub)triangle at the midpoints of its split
    /// original edges, preserving orientation. At most one original edge
    /// survives into each child, so the recursion depth is bounded by 3.
    fn subdivide(
        cache: &mut MidpointCache,
        split: &HashSet<(u32, u32)>,
        cell: [u32; 3],
        out: &mut Vec<u32>,
    ) {
        let [p0, p1, p2] = cell;
        let split_edge = [(p0, p1), (p1, p2), (p2, p0)]
            .into_iter()
            .find(|&(u, v)| split.contains(&edge_key(u, v)));

        match split_edge {
            None => out.extend_from_slice(&[p0, p1, p2]),
            Some((u, v)) => {
                // Opposite vertex of the bisected edge
                let w = if (u, v) == (p0, p1) {
                    p2
                } else if (u, v) == (p1, p2) {
                    p0
                } else {
                    p1
                };
                let m = cache.midpoint(u, v);
                Self::subdivide(cache, split, [u, m, w], out);
                Self::subdivide(cache, split, [m, v, w], out);
            }
        }
    }

    /// Rebuild the boundary-edge list, splitting edges in `split` at their
    /// midpoints and propagating markers to both halves.
    fn rebuild_boundary(
        cache: &mut MidpointCache,
        split: &HashSet<(u32, u32)>,
        boundary: &[BoundaryEdge],
    ) -> Vec<BoundaryEdge> {
        let mut out = Vec::with_capacity(boundary.len());
        for e in boundary {
            if split.contains(&edge_key(e.v0, e.v1)) {
                let m = cache.midpoint(e.v0, e.v1);
                out.push(BoundaryEdge {
                    v0: e.v0,
                    v1: m,
                    marker: e.marker,
                });
                out.push(BoundaryEdge {
                    v0: m,
                    v1: e.v1,
                    marker: e.marker,
                });
            } else {
                out.push(*e);
            }
        }
        out
    }
}

impl MeshRefiner for BisectionRefiner {
    fn refine_uniform(&self, mesh: &TriMesh) -> FisonResult<TriMesh> {
        mesh.validate()?;

        let mut cache = MidpointCache::new(mesh);
        let mut indices = Vec::with_capacity(mesh.indices.len() * 4);

        for c in 0..mesh.cell_count() {
            let [a, b, cc] = mesh.cell(c);
            let mab = cache.midpoint(a, b);
            let mbc = cache.midpoint(b, cc);
            let mca = cache.midpoint(cc, a);

            indices.extend_from_slice(&[a, mab, mca]);
            indices.extend_from_slice(&[mab, b, mbc]);
            indices.extend_from_slice(&[mca, mbc, cc]);
            indices.extend_from_slice(&[mab, mbc, mca]);
        }

        // Every edge is split, so every boundary edge is halved
        let split: HashSet<(u32, u32)> = mesh
            .boundary_edges
            .iter()
            .map(|e| edge_key(e.v0, e.v1))
            .collect();
        let boundary_edges = Self::rebuild_boundary(&mut cache, &split, &mesh.boundary_edges);

        Ok(TriMesh {
            pos_x: cache.pos_x,
            pos_y: cache.pos_y,
            indices,
            boundary_edges,
            generation: mesh.generation + 1,
        })
    }

    fn refine_by_indicators(&self, mesh: &TriMesh, indicators: &[f64]) -> FisonResult<TriMesh> {
        mesh.validate()?;

        if indicators.len() != mesh.cell_count() {
            return Err(FisonError::InvalidMesh(format!(
                "Indicator count ({}) != cell count ({})",
                indicators.len(),
                mesh.cell_count()
            )));
        }
        if indicators.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(FisonError::InvalidMesh(
                "Indicators must be finite and non-negative".into(),
            ));
        }

        let marked = self.mark_cells(indicators);
        if marked.is_empty() {
            // All indicators zero: nothing to refine, but the result is
            // still a new generation
            let mut out = mesh.clone();
            out.generation += 1;
            return Ok(out);
        }

        // Initial split set: longest edge of each marked cell
        let mut split: HashSet<(u32, u32)> = marked
            .iter()
            .map(|&c| Self::longest_edge(mesh, c))
            .collect();

        // Conforming closure: a cell with any split edge must also split
        // its longest edge. Iterate to a fixed point.
        loop {
            let mut changed = false;
            for c in 0..mesh.cell_count() {
                let [a, b, cc] = mesh.cell(c);
                let has_split = [(a, b), (b, cc), (cc, a)]
                    .into_iter()
                    .any(|(u, v)| split.contains(&edge_key(u, v)));
                if has_split && split.insert(Self::longest_edge(mesh, c)) {
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }

        let mut cache = MidpointCache::new(mesh);
        let mut indices = Vec::with_capacity(mesh.indices.len() * 2);
        for c in 0..mesh.cell_count() {
            Self::subdivide(&mut cache, &split, mesh.cell(c), &mut indices);
        }

        let boundary_edges = Self::rebuild_boundary(&mut cache, &split, &mesh.boundary_edges);

        Ok(TriMesh {
            pos_x: cache.pos_x,
            pos_y: cache.pos_y,
            indices,
            boundary_edges,
            generation: mesh.generation + 1,
        })
    }
}
