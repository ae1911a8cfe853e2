//! Sparse Cholesky solver backed by `faer`.
//!
//! Implements the [`SparseSolver`] trait using faer's supernodal LLᵀ
//! factorization.
//!
//! ## Workflow
//! 1. `factorize(matrix)` — converts CSR→CSC, computes symbolic + numeric LLᵀ
//! 2. `solve(rhs, solution)` — forward/backward substitution (cached factorization)
//! 3. Repeat `solve()` with different RHS without re-factorizing
//!
//! The interface mass matrix depends only on the interface geometry, which
//! is fixed within a refinement pass, so one factorization serves every
//! coupling iteration of a primal solve. The two traction components reuse
//! the same factorization as well.

use faer::Side;
use faer::linalg::solvers::Solve;
use faer::sparse::SparseColMat;
use faer::sparse::Triplet;
use faer::sparse::linalg::solvers::{Llt, SymbolicLlt};

use crate::sparse::{CsrMatrix, SparseSolver};

/// Sparse Cholesky (LLᵀ) solver using `faer`.
///
/// Stores the factorization for reuse across multiple solves.
pub struct CholeskySolver {
    /// Cached LLᵀ factorization.
    factorization: Option<Llt<usize, f64>>,
    /// Matrix dimension (N×N).
    dimension: usize,
}

impl CholeskySolver {
    /// Creates a new solver (unfactorized).
    pub fn new() -> Self {
        Self {
            factorization: None,
            dimension: 0,
        }
    }

    /// Convert our CSR matrix to faer's CSC format.
    ///
    /// Builds from faer `Triplet`s, which faer assembles into CSC.
    fn csr_to_csc(matrix: &CsrMatrix) -> Result<SparseColMat<usize, f64>, String> {
        let mut triplets: Vec<Triplet<usize, usize, f64>> = Vec::with_capacity(matrix.values.len());
        for row in 0..matrix.rows {
            for idx in matrix.row_ptr[row]..matrix.row_ptr[row + 1] {
                triplets.push(Triplet {
                    row,
                    col: matrix.col_idx[idx],
                    val: matrix.values[idx],
                });
            }
        }

        SparseColMat::try_new_from_triplets(matrix.rows, matrix.cols, &triplets)
            .map_err(|e| format!("Failed to construct faer CSC matrix: {e:?}"))
    }
}

impl Default for CholeskySolver {
    fn default() -> Self {
        Self::new()
    }
}

impl SparseSolver for CholeskySolver {
    fn factorize(&mut self, matrix: &CsrMatrix) -> Result<(), String> {
        if matrix.rows != matrix.cols {
            return Err(format!(
                "Matrix must be square, got {}×{}",
                matrix.rows, matrix.cols
            ));
        }
        if matrix.rows == 0 {
            return Err("Cannot factorize empty matrix".into());
        }

        self.dimension = matrix.rows;

        let csc = Self::csr_to_csc(matrix)?;

        // Symbolic analysis (ordering, fill-in prediction), then numeric
        // factorization using the symbolic structure.
        let symbolic = SymbolicLlt::try_new(csc.symbolic().as_ref(), Side::Upper)
            .map_err(|e| format!("Symbolic analysis failed: {e:?}"))?;
        let llt = Llt::try_new_with_symbolic(symbolic, csc.as_ref(), Side::Upper)
            .map_err(|e| format!("Cholesky factorization failed: {e:?}"))?;

        self.factorization = Some(llt);
        Ok(())
    }

    fn solve(&self, rhs: &[f64], solution: &mut [f64]) -> Result<(), String> {
        let llt = self
            .factorization
            .as_ref()
            .ok_or_else(|| "Solver not factorized. Call factorize() first.".to_string())?;

        if rhs.len() != self.dimension {
            return Err(format!(
                "RHS length ({}) != matrix dimension ({})",
                rhs.len(),
                self.dimension
            ));
        }
        if solution.len() != self.dimension {
            return Err(format!(
                "Solution length ({}) != matrix dimension ({})",
                solution.len(),
                self.dimension
            ));
        }

        let rhs_mat: faer::Mat<f64> = faer::Mat::from_fn(self.dimension, 1, |i, _| rhs[i]);

        // L Lᵀ x = b via the cached factorization
        let sol = llt.solve(&rhs_mat);

        for (i, out) in solution.iter_mut().enumerate() {
            *out = sol[(i, 0)];
        }

        Ok(())
    }

    fn is_factorized(&self) -> bool {
        self.factorization.is_some()
    }
}
