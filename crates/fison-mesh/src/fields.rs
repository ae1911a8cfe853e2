//! Nodal fields over a mesh.
//!
//! A field stores one value (or one 2D vector, SoA) per mesh vertex.
//! Fields are plain data — they carry no reference to the mesh they live
//! on; length agreement is checked at the seams that combine them.

use serde::{Deserialize, Serialize};

/// A scalar nodal field (one value per vertex).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalarField {
    /// Per-vertex values.
    pub values: Vec<f64>,
}

impl ScalarField {
    /// All-zero field of the given length.
    pub fn zeros(len: usize) -> Self {
        Self {
            values: vec![0.0; len],
        }
    }

    /// Number of vertices covered.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the field has no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Euclidean norm of the value vector.
    pub fn l2_norm(&self) -> f64 {
        self.values.iter().map(|v| v * v).sum::<f64>().sqrt()
    }
}

/// A 2D vector nodal field in SoA layout (one vector per vertex).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorField {
    /// X components.
    pub x: Vec<f64>,
    /// Y components.
    pub y: Vec<f64>,
}

impl VectorField {
    /// All-zero field of the given length.
    pub fn zeros(len: usize) -> Self {
        Self {
            x: vec![0.0; len],
            y: vec![0.0; len],
        }
    }

    /// Number of vertices covered.
    #[inline]
    pub fn len(&self) -> usize {
        self.x.len()
    }

    /// Returns true if the field has no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Euclidean norm over both components.
    pub fn l2_norm(&self) -> f64 {
        let sx: f64 = self.x.iter().map(|v| v * v).sum();
        let sy: f64 = self.y.iter().map(|v| v * v).sum();
        (sx + sy).sqrt()
    }

    /// Maximum absolute component value.
    pub fn max_abs(&self) -> f64 {
        self.x
            .iter()
            .chain(self.y.iter())
            .fold(0.0f64, |m, v| m.max(v.abs()))
    }

    /// Norm of the difference `self − other`.
    ///
    /// This is the coupling-loop increment: the distance between two
    /// successive structure-displacement iterates.
    pub fn difference_norm(&self, other: &VectorField) -> f64 {
        debug_assert_eq!(self.len(), other.len());
        let mut sum = 0.0;
        for i in 0..self.len() {
            let dx = self.x[i] - other.x[i];
            let dy = self.y[i] - other.y[i];
            sum += dx * dx + dy * dy;
        }
        sum.sqrt()
    }

    /// Overwrite this field with another of the same length.
    pub fn copy_from(&mut self, other: &VectorField) {
        self.x.copy_from_slice(&other.x);
        self.y.copy_from_slice(&other.y);
    }
}
