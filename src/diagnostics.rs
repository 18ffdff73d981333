// src/diagnostics.rs

use crate::utils::{symmetric_block, CsrMatrix};

/// Eigenvalue summary of the symmetrised operator.
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrum {
    /// Eigenvalues of `[[0, A], [Aᵀ, 0]]` in ascending order.
    pub eigenvalues: Vec<f64>,
    pub min_abs: f64,
    pub max_abs: f64,
    /// `max_abs / min_abs`, infinite for a singular operator.
    pub condition: f64,
}

/// Computes every eigenvalue of the dense block `[[0, A], [Aᵀ, 0]]`.
///
/// The block is Hermitian so its eigenvalue magnitudes are the singular values
/// of `A`, which makes `max|λ| / min|λ|` the 2-norm condition number of `A`.
/// Memory is quadratic and time cubic in the size of `A`.
pub fn eigen_analysis(a: &CsrMatrix) -> Spectrum {
    let mut eigenvalues: Vec<f64> = {
        let block = symmetric_block(&a.to_dense());
        log::debug!("eigen analysis of a {0}x{0} dense block", block.nrows());
        block.symmetric_eigenvalues().iter().cloned().collect()
    };
    eigenvalues.sort_by(|x, y| x.total_cmp(y));

    let abs = eigenvalues.iter().map(|l| l.abs());
    let min_abs = abs.clone().fold(f64::INFINITY, f64::min);
    let max_abs = abs.fold(0.0, f64::max);
    let condition = if min_abs > 0.0 { max_abs / min_abs } else { f64::INFINITY };

    Spectrum { eigenvalues, min_abs, max_abs, condition }
}

/// Runs [`eigen_analysis`] unless the operator is too large for a dense solve.
///
/// Warns above `warn` unknowns and skips above `limit` unknowns.
pub fn gated_eigen_analysis(a: &CsrMatrix, warn: usize, limit: usize) -> Option<Spectrum> {
    let n = a.rows;
    if n > limit {
        log::warn!(
            "skipping eigen analysis: {n} unknowns exceed the limit of {limit} \
             (dense {0}x{0} block)",
            2 * n
        );
        return None;
    }
    if n > warn {
        log::warn!(
            "eigen analysis on {n} unknowns needs a dense {0}x{0} block, this does not scale",
            2 * n
        );
    }
    Some(eigen_analysis(a))
}
