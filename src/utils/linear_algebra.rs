// src/utils/linear_algebra.rs

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

/// Compressed sparse row matrix of `f64` values.
///
/// Column indices are sorted within each row and carry no duplicates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CsrMatrix {
    pub rows: usize,
    pub cols: usize,
    /// `row_ptr[i]..row_ptr[i + 1]` indexes the entries of row `i`.
    pub row_ptr: Vec<usize>,
    pub col_idx: Vec<usize>,
    pub values: Vec<f64>,
}

impl CsrMatrix {
    /// Builds a CSR matrix from `(row, col, value)` triplets.
    ///
    /// Duplicate entries are summed.
    ///
    /// # Arguments
    ///
    /// * `rows` - Number of rows.
    /// * `cols` - Number of columns.
    /// * `triplets` - Entries in any order.
    ///
    /// # Returns
    ///
    /// * A `rows x cols` matrix holding the summed entries.
    pub fn from_triplets(rows: usize, cols: usize, triplets: &[(usize, usize, f64)]) -> Self {
        let mut per_row: Vec<Vec<(usize, f64)>> = vec![Vec::new(); rows];
        for &(r, c, v) in triplets {
            assert!(r < rows && c < cols, "triplet ({r}, {c}) outside {rows}x{cols}");
            per_row[r].push((c, v));
        }

        let mut row_ptr = Vec::with_capacity(rows + 1);
        let mut col_idx = Vec::with_capacity(triplets.len());
        let mut values = Vec::with_capacity(triplets.len());
        row_ptr.push(0);
        for mut entries in per_row {
            entries.sort_by_key(|&(c, _)| c);
            let start = col_idx.len();
            for (c, v) in entries {
                if col_idx.len() > start && col_idx.last() == Some(&c) {
                    let last = values.len() - 1;
                    values[last] += v;
                } else {
                    col_idx.push(c);
                    values.push(v);
                }
            }
            row_ptr.push(col_idx.len());
        }

        CsrMatrix { rows, cols, row_ptr, col_idx, values }
    }

    /// Number of stored entries.
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    /// Iterates `(row, col, value)` over stored entries in row order.
    pub fn triplets(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        (0..self.rows).flat_map(move |r| {
            (self.row_ptr[r]..self.row_ptr[r + 1]).map(move |k| (r, self.col_idx[k], self.values[k]))
        })
    }

    /// Entry `(r, c)`, zero when not stored.
    pub fn get(&self, r: usize, c: usize) -> f64 {
        let row = &self.col_idx[self.row_ptr[r]..self.row_ptr[r + 1]];
        match row.binary_search(&c) {
            Ok(k) => self.values[self.row_ptr[r] + k],
            Err(_) => 0.0,
        }
    }

    /// Computes `A x`.
    pub fn mul_vec(&self, x: &DVector<f64>) -> DVector<f64> {
        assert_eq!(x.len(), self.cols, "vector length must match matrix columns");
        DVector::from_fn(self.rows, |r, _| {
            (self.row_ptr[r]..self.row_ptr[r + 1])
                .map(|k| self.values[k] * x[self.col_idx[k]])
                .sum()
        })
    }

    /// Dense copy of the matrix.
    pub fn to_dense(&self) -> DMatrix<f64> {
        let mut dense = DMatrix::zeros(self.rows, self.cols);
        for (r, c, v) in self.triplets() {
            dense[(r, c)] = v;
        }
        dense
    }

    /// Computes `P A Pᵀ` for the symmetric permutation `perm`.
    ///
    /// Entry `(k, l)` of the result is entry `(perm[k], perm[l])` of `self`.
    pub fn permute_symmetric(&self, perm: &[usize]) -> Self {
        assert!(self.is_square());
        assert_eq!(perm.len(), self.rows);
        let mut inverse = vec![0usize; perm.len()];
        for (k, &p) in perm.iter().enumerate() {
            inverse[p] = k;
        }

        let mut row_ptr = Vec::with_capacity(self.rows + 1);
        let mut col_idx = Vec::with_capacity(self.nnz());
        let mut values = Vec::with_capacity(self.nnz());
        row_ptr.push(0);
        for &old_row in perm {
            let mut entries: Vec<(usize, f64)> = (self.row_ptr[old_row]..self.row_ptr[old_row + 1])
                .map(|k| (inverse[self.col_idx[k]], self.values[k]))
                .collect();
            entries.sort_by_key(|&(c, _)| c);
            for (c, v) in entries {
                col_idx.push(c);
                values.push(v);
            }
            row_ptr.push(col_idx.len());
        }

        CsrMatrix { rows: self.rows, cols: self.cols, row_ptr, col_idx, values }
    }
}

/// Element-wise closeness test `|a - b| <= atol + rtol * |b|`.
///
/// # Arguments
///
/// * `a` - Computed vector.
/// * `b` - Reference vector.
/// * `rtol` - Relative tolerance.
/// * `atol` - Absolute tolerance.
///
/// # Returns
///
/// * `true` when the vectors have the same length and every entry is close.
///   NaN entries are never close.
pub fn allclose(a: &DVector<f64>, b: &DVector<f64>, rtol: f64, atol: f64) -> bool {
    a.len() == b.len()
        && a
            .iter()
            .zip(b.iter())
            .all(|(x, y)| (x - y).abs() <= atol + rtol * y.abs())
}

/// Three-point coefficients of `-d²u/dx²` on a non-uniform grid.
///
/// # Arguments
///
/// * `left` - Spacing to the left neighbour.
/// * `right` - Spacing to the right neighbour.
///
/// # Returns
///
/// * `(lower, diagonal, upper)` so that
///   `lower * u[i-1] + diagonal * u[i] + upper * u[i+1] ≈ -u''(x[i])`.
pub fn second_difference(left: f64, right: f64) -> (f64, f64, f64) {
    let lower = -2.0 / (left * (left + right));
    let upper = -2.0 / (right * (left + right));
    let diagonal = 2.0 / (left * right);
    (lower, diagonal, upper)
}

/// Builds the symmetric block matrix `[[0, A], [Aᵀ, 0]]`.
///
/// Its eigenvalues are `±σ` for every singular value `σ` of `A`.
pub fn symmetric_block(a: &DMatrix<f64>) -> DMatrix<f64> {
    let (m, n) = a.shape();
    let mut block = DMatrix::zeros(m + n, m + n);
    block.slice_mut((0, m), (m, n)).copy_from(a);
    block.slice_mut((m, 0), (n, m)).copy_from(&a.transpose());
    block
}
