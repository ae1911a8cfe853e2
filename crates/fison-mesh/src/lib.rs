//! # fison-mesh
//!
//! 2D simplicial meshes with boundary markers, topology queries, nodal
//! fields, Laplacian smoothing, and error-driven refinement.
//!
//! ## Key Types
//!
//! - [`TriMesh`] — SoA triangle mesh with marked boundary edges
//! - [`Topology`] — precomputed adjacency (vertex→cell, edges, neighbors)
//! - [`ScalarField`] / [`VectorField`] — nodal data over a mesh
//! - [`MeshRefiner`] — refinement collaborator contract
//! - [`BisectionRefiner`] — red uniform / Dörfler + longest-edge bisection

pub mod fields;
pub mod generators;
pub mod mesh;
pub mod refine;
pub mod smoothing;
pub mod topology;

pub use fields::{ScalarField, VectorField};
pub use mesh::{BoundaryEdge, BoundaryMarker, TriMesh};
pub use refine::{BisectionRefiner, MeshRefiner};
pub use smoothing::laplacian_smooth;
pub use topology::Topology;
