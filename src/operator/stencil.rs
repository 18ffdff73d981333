// src/operator/stencil.rs

use crate::input::Boundary;
use crate::mesh::AxisMesh;
use crate::utils::second_difference;

/// One row of the 1D operator along an axis.
#[derive(Debug, Clone, PartialEq)]
pub struct StencilRow {
    /// Left neighbour index and coefficient, `None` when folded into the boundary.
    pub lower: Option<(usize, f64)>,
    /// Right neighbour index and coefficient, `None` when folded into the boundary.
    pub upper: Option<(usize, f64)>,
    pub diagonal: f64,
    /// Boundary contribution moved to the right-hand side.
    pub rhs: f64,
}

/// Builds the rows of `-d²/dx²` along one axis, boundary conditions included.
///
/// Dirichlet values move to the right-hand side, Neumann ghost values are
/// eliminated with `u_ghost = u_edge + flux * h`, periodic ends wrap around.
pub fn axis_stencil(mesh: &AxisMesh) -> Vec<StencilRow> {
    let n = mesh.len();
    let mut rows = Vec::with_capacity(n);

    for i in 0..n {
        let (left, right) = mesh.spacing(i);
        let (cl, diag, cu) = second_difference(left, right);
        let mut row = StencilRow { lower: None, upper: None, diagonal: diag, rhs: 0.0 };

        if i > 0 {
            row.lower = Some((i - 1, cl));
        } else {
            match mesh.lower {
                Boundary::Dirichlet { value } => row.rhs -= cl * value,
                Boundary::Neumann { flux } => {
                    row.diagonal += cl;
                    row.rhs -= cl * flux * left;
                }
                Boundary::Periodic => row.lower = Some((n - 1, cl)),
            }
        }

        if i + 1 < n {
            row.upper = Some((i + 1, cu));
        } else {
            match mesh.upper {
                Boundary::Dirichlet { value } => row.rhs -= cu * value,
                Boundary::Neumann { flux } => {
                    row.diagonal += cu;
                    row.rhs -= cu * flux * right;
                }
                Boundary::Periodic => row.upper = Some((0, cu)),
            }
        }

        rows.push(row);
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::AxisSpec;
    use crate::mesh::generate_mesh;

    fn mesh(points: usize, lower: Boundary, upper: Boundary) -> AxisMesh {
        generate_mesh(&AxisSpec { min: 0.0, max: 1.0, points, ratio: 1.0, lower, upper })
    }

    #[test]
    fn test_dirichlet_rows() {
        // h = 1/4, coefficients (-16, 32, -16).
        let rows = axis_stencil(&mesh(
            3,
            Boundary::Dirichlet { value: 1.0 },
            Boundary::Dirichlet { value: 2.0 },
        ));
        assert_eq!(rows.len(), 3);
        assert!(rows[0].lower.is_none());
        assert!((rows[0].rhs - 16.0).abs() < 1e-9);
        assert!((rows[0].diagonal - 32.0).abs() < 1e-9);
        assert_eq!(rows[1].lower.map(|(j, _)| j), Some(0));
        assert_eq!(rows[1].upper.map(|(j, _)| j), Some(2));
        assert_eq!(rows[1].rhs, 0.0);
        assert!(rows[2].upper.is_none());
        assert!((rows[2].rhs - 32.0).abs() < 1e-9);
    }

    #[test]
    fn test_neumann_row_sums_to_zero() {
        let rows = axis_stencil(&mesh(
            3,
            Boundary::Neumann { flux: 0.5 },
            Boundary::Dirichlet { value: 0.0 },
        ));
        let first = &rows[0];
        let sum = first.diagonal + first.upper.map(|(_, c)| c).unwrap_or(0.0);
        assert!(sum.abs() < 1e-9);
        // -cl * flux * h = 16 * 0.5 * 0.25
        assert!((first.rhs - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_periodic_wraps() {
        let rows = axis_stencil(&mesh(4, Boundary::Periodic, Boundary::Periodic));
        assert_eq!(rows[0].lower.map(|(j, _)| j), Some(3));
        assert_eq!(rows[3].upper.map(|(j, _)| j), Some(0));
        for row in &rows {
            let sum = row.diagonal
                + row.lower.map(|(_, c)| c).unwrap_or(0.0)
                + row.upper.map(|(_, c)| c).unwrap_or(0.0);
            assert!(sum.abs() < 1e-9);
            assert_eq!(row.rhs, 0.0);
        }
    }
}
