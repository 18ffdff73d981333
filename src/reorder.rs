// src/reorder.rs

use nalgebra::DVector;
use serde::{Deserialize, Serialize};

use crate::error::{LaplaceError, Result};
use crate::operator::LinearSystem;
use crate::utils::CsrMatrix;

/// Symmetric permutation `Q` stored as an index vector.
///
/// `(Q x)[k] = x[perm[k]]`, so `Q` has a single 1 at `(k, perm[k])`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permutation {
    perm: Vec<usize>,
}

impl Permutation {
    pub fn identity(n: usize) -> Self {
        Permutation { perm: (0..n).collect() }
    }

    /// Wraps an index vector, checking that it is a bijection on `0..len`.
    pub fn from_vec(perm: Vec<usize>) -> Result<Self> {
        let mut seen = vec![false; perm.len()];
        for &p in &perm {
            if p >= perm.len() || seen[p] {
                return Err(LaplaceError::InvalidProblem(format!(
                    "index {p} breaks a permutation of length {}",
                    perm.len()
                )));
            }
            seen[p] = true;
        }
        Ok(Permutation { perm })
    }

    pub fn len(&self) -> usize {
        self.perm.len()
    }

    pub fn is_empty(&self) -> bool {
        self.perm.is_empty()
    }

    pub fn indices(&self) -> &[usize] {
        &self.perm
    }

    pub fn is_identity(&self) -> bool {
        self.perm.iter().enumerate().all(|(k, &p)| k == p)
    }

    /// Computes `Q x`.
    pub fn forward(&self, x: &DVector<f64>) -> DVector<f64> {
        assert_eq!(x.len(), self.len());
        DVector::from_fn(self.len(), |k, _| x[self.perm[k]])
    }

    /// Computes `Qᵀ x`, the inverse of [`Permutation::forward`].
    pub fn backward(&self, x: &DVector<f64>) -> DVector<f64> {
        assert_eq!(x.len(), self.len());
        let mut out = DVector::zeros(self.len());
        for (k, &p) in self.perm.iter().enumerate() {
            out[p] = x[k];
        }
        out
    }

    /// Computes `Q A Qᵀ`.
    pub fn conjugate(&self, a: &CsrMatrix) -> CsrMatrix {
        a.permute_symmetric(&self.perm)
    }

    /// Explicit matrix `Q`, rebuilt from the index form stored in a case archive.
    pub fn to_matrix(&self) -> CsrMatrix {
        let triplets: Vec<(usize, usize, f64)> =
            self.perm.iter().enumerate().map(|(k, &p)| (k, p, 1.0)).collect();
        CsrMatrix::from_triplets(self.len(), self.len(), &triplets)
    }
}

/// Shell ordering of an `nx x ny x nz` structured mesh.
///
/// The shell of a node is its smallest index distance to a face, taken over
/// the axes that carry more than one point. Nodes are listed outermost shell
/// first and in natural order inside a shell.
pub fn shell_ordering(nx: usize, ny: usize, nz: usize) -> Permutation {
    let depth = |i: usize, n: usize| if n > 1 { Some(i.min(n - 1 - i)) } else { None };
    let mut keyed: Vec<(usize, usize)> = Vec::with_capacity(nx * ny * nz);
    for k in 0..nz {
        for j in 0..ny {
            for i in 0..nx {
                let shell = [depth(i, nx), depth(j, ny), depth(k, nz)]
                    .into_iter()
                    .flatten()
                    .min()
                    .unwrap_or(0);
                keyed.push((shell, i + nx * (j + ny * k)));
            }
        }
    }
    keyed.sort_by_key(|&(shell, _)| shell);
    Permutation { perm: keyed.into_iter().map(|(_, id)| id).collect() }
}

/// System after reordering, `A' = Q A Qᵀ` and `b' = Q b`.
#[derive(Debug, Clone, PartialEq)]
pub struct Reordered {
    pub q: Permutation,
    pub system: LinearSystem,
}

/// Reorders `system` with the shell ordering when `enabled`, with the identity otherwise.
///
/// `counts` are the per-axis point counts with unused axes set to 1.
pub fn reorder(system: &LinearSystem, counts: (usize, usize, usize), enabled: bool) -> Reordered {
    let (nx, ny, nz) = counts;
    assert_eq!(nx * ny * nz, system.size(), "point counts must match the system size");
    let q = if enabled {
        shell_ordering(nx, ny, nz)
    } else {
        Permutation::identity(system.size())
    };
    let a = q.conjugate(&system.a);
    let b = q.forward(&system.b);
    log::debug!("reordered system (identity: {})", q.is_identity());
    Reordered { q, system: LinearSystem { a, b } }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::DMatrix;
    use nalgebra::SymmetricEigen;

    fn sample_system() -> LinearSystem {
        let a = CsrMatrix::from_triplets(
            6,
            6,
            &[
                (0, 0, 4.0), (0, 1, -1.0), (0, 3, -1.0),
                (1, 0, -1.0), (1, 1, 4.0), (1, 2, -2.0), (1, 4, -1.0),
                (2, 1, -1.0), (2, 2, 4.0), (2, 5, -1.0),
                (3, 0, -1.0), (3, 3, 4.0), (3, 4, -1.0),
                (4, 1, -1.0), (4, 3, -1.0), (4, 4, 4.0), (4, 5, -1.0),
                (5, 2, -3.0), (5, 4, -1.0), (5, 5, 4.0),
            ],
        );
        let b = DVector::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        LinearSystem { a, b }
    }

    #[test]
    fn test_shell_ordering_line() {
        let q = shell_ordering(5, 1, 1);
        assert_eq!(q.indices(), &[0, 4, 1, 3, 2]);
    }

    #[test]
    fn test_shell_ordering_plane() {
        let q = shell_ordering(3, 3, 1);
        assert_eq!(q.indices(), &[0, 1, 2, 3, 5, 6, 7, 8, 4]);
        assert!(Permutation::from_vec(q.indices().to_vec()).is_ok());
    }

    #[test]
    fn test_shell_ordering_is_permutation() {
        for &(nx, ny, nz) in &[(1, 1, 1), (4, 1, 1), (4, 5, 1), (3, 4, 5), (1, 6, 2)] {
            let q = shell_ordering(nx, ny, nz);
            assert_eq!(q.len(), nx * ny * nz);
            assert!(Permutation::from_vec(q.indices().to_vec()).is_ok());
        }
    }

    #[test]
    fn test_round_trip() {
        let q = shell_ordering(3, 4, 2);
        let v = DVector::from_fn(24, |i, _| (i as f64).sin() + 0.5 * i as f64);
        assert_eq!(q.forward(&q.backward(&v)), v);
        assert_eq!(q.backward(&q.forward(&v)), v);
    }

    #[test]
    fn test_matrix_matches_index_form() {
        let q = shell_ordering(3, 2, 1);
        let dense = q.to_matrix().to_dense();
        let v = DVector::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(&dense * &v, q.forward(&v));
        assert_eq!(dense.transpose() * &v, q.backward(&v));
        assert_eq!(&dense * dense.transpose(), DMatrix::identity(6, 6));
    }

    #[test]
    fn test_disabled_reorder_is_identity() {
        let system = sample_system();
        let out = reorder(&system, (3, 2, 1), false);
        assert!(out.q.is_identity());
        assert_eq!(out.q.to_matrix().to_dense(), DMatrix::identity(6, 6));
        assert_eq!(out.system.a, system.a);
        assert_eq!(out.system.b, system.b);
    }

    #[test]
    fn test_reorder_conjugates() {
        let system = sample_system();
        let out = reorder(&system, (3, 2, 1), true);
        let qd = out.q.to_matrix().to_dense();
        let expected = &qd * system.a.to_dense() * qd.transpose();
        assert_eq!(out.system.a.to_dense(), expected);
        assert_eq!(out.system.b, &qd * &system.b);
    }

    #[test]
    fn test_reorder_preserves_spectrum() {
        // Symmetric part keeps the check on real eigenvalues.
        let a = DMatrix::from_row_slice(4, 4, &[
            3.0, -1.0, 0.0, -1.0,
            -1.0, 3.0, -1.0, 0.0,
            0.0, -1.0, 3.0, -1.0,
            -1.0, 0.0, -1.0, 5.0,
        ]);
        let mut triplets = Vec::new();
        for i in 0..4 {
            for j in 0..4 {
                if a[(i, j)] != 0.0 {
                    triplets.push((i, j, a[(i, j)]));
                }
            }
        }
        let system = LinearSystem { a: CsrMatrix::from_triplets(4, 4, &triplets), b: DVector::zeros(4) };
        let out = reorder(&system, (4, 1, 1), true);

        let mut before: Vec<f64> = SymmetricEigen::new(a).eigenvalues.iter().cloned().collect();
        let mut after: Vec<f64> = SymmetricEigen::new(out.system.a.to_dense())
            .eigenvalues
            .iter()
            .cloned()
            .collect();
        before.sort_by(|x, y| x.partial_cmp(y).unwrap());
        after.sort_by(|x, y| x.partial_cmp(y).unwrap());
        for (x, y) in before.iter().zip(after.iter()) {
            assert!((x - y).abs() < 1e-9);
        }
    }

    #[test]
    fn test_from_vec_rejects_duplicates() {
        assert!(Permutation::from_vec(vec![0, 2, 2]).is_err());
        assert!(Permutation::from_vec(vec![0, 3, 1]).is_err());
    }
}
