// src/operator/mod.rs

pub mod force;
pub mod stencil;

use nalgebra::DVector;

use crate::error::{LaplaceError, Result};
use crate::input::ForceSpec;
use crate::mesh::Mesh;
use crate::utils::CsrMatrix;

pub use force::apply_force;
pub use stencil::{axis_stencil, StencilRow};

/// Assembled system `A x = b`.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearSystem {
    pub a: CsrMatrix,
    pub b: DVector<f64>,
}

impl LinearSystem {
    pub fn size(&self) -> usize {
        self.b.len()
    }
}

/// Assembles the discrete `-∇²` operator and right-hand side over `mesh`.
///
/// The operator is the sum of the 1D second differences along every axis in
/// natural ordering (`x` fastest). Without a Dirichlet face the operator has
/// the constant vector as a null vector; this is rejected unless `degen` is set.
pub fn assemble(mesh: &Mesh, force: &ForceSpec, degen: bool) -> Result<LinearSystem> {
    let axes = mesh.axes();
    let dirichlet = axes
        .iter()
        .any(|axis| axis.lower.is_dirichlet() || axis.upper.is_dirichlet());
    if !dirichlet {
        if !degen {
            return Err(LaplaceError::Degenerate(
                "no Dirichlet boundary, the operator is singular".to_string(),
            ));
        }
        log::warn!("no Dirichlet boundary, assembling a singular operator");
    }

    let stencils: Vec<Vec<StencilRow>> = axes.iter().map(|axis| axis_stencil(axis)).collect();
    let (nx, ny, nz) = mesh.counts();
    let n = mesh.size();

    let mut triplets = Vec::with_capacity(n * (1 + 2 * axes.len()));
    let mut b = DVector::zeros(n);
    for k in 0..nz {
        for j in 0..ny {
            for i in 0..nx {
                let pos = [i, j, k];
                let row = mesh.index(i, j, k);
                let mut diagonal = 0.0;
                for (d, stencil) in stencils.iter().enumerate() {
                    let entry = &stencil[pos[d]];
                    diagonal += entry.diagonal;
                    b[row] += entry.rhs;
                    for (nb, coef) in entry.lower.iter().chain(entry.upper.iter()) {
                        let mut at = pos;
                        at[d] = *nb;
                        triplets.push((row, mesh.index(at[0], at[1], at[2]), *coef));
                    }
                }
                triplets.push((row, row, diagonal));
            }
        }
    }

    apply_force(mesh, force, &mut b)?;
    let a = CsrMatrix::from_triplets(n, n, &triplets);
    log::debug!("assembled {n}x{n} operator with {} nonzeros", a.nnz());
    Ok(LinearSystem { a, b })
}
