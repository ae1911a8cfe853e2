//! Sparse matrix representation and solver interface.
//!
//! Provides a CSR (Compressed Sparse Row) matrix and a trait for sparse
//! SPD solvers. The interface mass matrices assembled by the transfer
//! operators are small (one row per interface vertex) but the consistency
//! invariant of the traction transfer demands an exact solve, not lumping.

use serde::{Deserialize, Serialize};

/// Compressed Sparse Row (CSR) matrix in double precision.
///
/// Row-major storage, the standard input format for sparse direct solvers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CsrMatrix {
    /// Number of rows.
    pub rows: usize,
    /// Number of columns.
    pub cols: usize,
    /// Row pointer array (length = rows + 1).
    /// `row_ptr[i]..row_ptr[i+1]` are the indices into `col_idx` and `values`
    /// for non-zeros in row `i`.
    pub row_ptr: Vec<usize>,
    /// Column indices of non-zero entries.
    pub col_idx: Vec<usize>,
    /// Non-zero values.
    pub values: Vec<f64>,
}

impl CsrMatrix {
    /// Creates an empty CSR matrix with the given dimensions.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            row_ptr: vec![0; rows + 1],
            col_idx: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Returns the number of non-zero entries.
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Creates a CSR matrix from triplets (row, col, value).
    ///
    /// Duplicate entries are summed, which is exactly what finite-element
    /// assembly over shared interface vertices needs.
    pub fn from_triplets(rows: usize, cols: usize, triplets: &[(usize, usize, f64)]) -> Self {
        // Count entries per row
        let mut row_counts = vec![0usize; rows];
        for &(r, _, _) in triplets {
            row_counts[r] += 1;
        }

        // Build row_ptr
        let mut row_ptr = vec![0usize; rows + 1];
        for i in 0..rows {
            row_ptr[i + 1] = row_ptr[i] + row_counts[i];
        }

        let nnz = row_ptr[rows];
        let mut col_idx = vec![0usize; nnz];
        let mut values = vec![0.0f64; nnz];

        // Fill in — use a per-row write cursor
        let mut cursor = row_ptr[..rows].to_vec();
        for &(r, c, v) in triplets {
            let pos = cursor[r];
            col_idx[pos] = c;
            values[pos] = v;
            cursor[r] += 1;
        }

        // Sort each row by column index and merge duplicates
        let mut merged_row_ptr = vec![0usize; rows + 1];
        let mut merged_cols: Vec<usize> = Vec::with_capacity(nnz);
        let mut merged_vals: Vec<f64> = Vec::with_capacity(nnz);

        for i in 0..rows {
            let start = row_ptr[i];
            let end = row_ptr[i + 1];
            let mut entries: Vec<(usize, f64)> = col_idx[start..end]
                .iter()
                .copied()
                .zip(values[start..end].iter().copied())
                .collect();
            entries.sort_by_key(|&(c, _)| c);

            let row_start = merged_cols.len();
            for (c, v) in entries {
                match merged_cols.last().copied() {
                    Some(last) if merged_cols.len() > row_start && last == c => {
                        if let Some(tail) = merged_vals.last_mut() {
                            *tail += v;
                        }
                    }
                    _ => {
                        merged_cols.push(c);
                        merged_vals.push(v);
                    }
                }
            }
            merged_row_ptr[i + 1] = merged_cols.len();
        }

        Self {
            rows,
            cols,
            row_ptr: merged_row_ptr,
            col_idx: merged_cols,
            values: merged_vals,
        }
    }

    /// Dense matrix-vector product `y = A x`.
    ///
    /// Used by tests and by the transfer consistency check.
    pub fn mul_vec(&self, x: &[f64]) -> Vec<f64> {
        let mut y = vec![0.0; self.rows];
        for row in 0..self.rows {
            let mut acc = 0.0;
            for idx in self.row_ptr[row]..self.row_ptr[row + 1] {
                acc += self.values[idx] * x[self.col_idx[idx]];
            }
            y[row] = acc;
        }
        y
    }

    /// Sum of each row — for a P1 mass matrix this equals the integral of
    /// the corresponding basis function over the interface.
    pub fn row_sums(&self) -> Vec<f64> {
        let mut sums = vec![0.0; self.rows];
        for row in 0..self.rows {
            for idx in self.row_ptr[row]..self.row_ptr[row + 1] {
                sums[row] += self.values[idx];
            }
        }
        sums
    }
}

/// Trait for sparse symmetric positive-definite solvers.
pub trait SparseSolver {
    /// Factorize the matrix. Call once per interface topology.
    fn factorize(&mut self, matrix: &CsrMatrix) -> Result<(), String>;

    /// Solve `A x = b` using the cached factorization.
    /// Returns `x` in the provided output buffer.
    fn solve(&self, rhs: &[f64], solution: &mut [f64]) -> Result<(), String>;

    /// Returns true if the solver holds a valid factorization.
    fn is_factorized(&self) -> bool;
}
