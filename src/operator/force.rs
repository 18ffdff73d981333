// src/operator/force.rs

use nalgebra::DVector;

use crate::error::{LaplaceError, Result};
use crate::input::{ForceSpec, ForceTerm};
use crate::mesh::Mesh;

/// Adds every force term of `force` to the right-hand side `b`.
///
/// # Arguments
///
/// * `mesh` - Mesh the source terms are sampled on.
/// * `force` - Source terms of the problem.
/// * `b` - Right-hand side, one entry per mesh node.
///
/// # Returns
///
/// * `Err(Inconsistent)` when a term does not match the mesh dimensionality.
pub fn apply_force(mesh: &Mesh, force: &ForceSpec, b: &mut DVector<f64>) -> Result<()> {
    let ndims = mesh.ndims();
    let axes = mesh.axes();
    let (nx, ny, nz) = mesh.counts();

    for term in &force.terms {
        match term {
            ForceTerm::Uniform { value } => b.add_scalar_mut(*value),
            ForceTerm::Point { value, at } => {
                if at.len() != ndims {
                    return Err(LaplaceError::Inconsistent(format!(
                        "point force has {} coordinates for a {ndims}D mesh",
                        at.len()
                    )));
                }
                let mut pos = [0usize; 3];
                for (d, (axis, &coord)) in axes.iter().zip(at.iter()).enumerate() {
                    pos[d] = axis.nearest(coord);
                }
                b[mesh.index(pos[0], pos[1], pos[2])] += value;
            }
            ForceTerm::Profile { axis, at, value } => {
                let d = axis.index();
                if d >= ndims {
                    return Err(LaplaceError::Inconsistent(format!(
                        "profile force along '{}' on a {ndims}D mesh",
                        axis.name()
                    )));
                }
                if at.is_empty() || at.len() != value.len() {
                    return Err(LaplaceError::Inconsistent(format!(
                        "profile force table has {} positions and {} values",
                        at.len(),
                        value.len()
                    )));
                }
                if at.windows(2).any(|w| w[1] <= w[0]) {
                    return Err(LaplaceError::Inconsistent(
                        "profile force positions must be strictly increasing".to_string(),
                    ));
                }
                let coords = &axes[d].coords;
                for k in 0..nz {
                    for j in 0..ny {
                        for i in 0..nx {
                            let c = coords[[i, j, k][d]];
                            b[mesh.index(i, j, k)] += interpolate(at, value, c);
                        }
                    }
                }
            }
        }
    }
    Ok(())
}

/// Performs linear interpolation given vectors of x and y values and a target value.
///
/// # Arguments
///
/// * `x` - Slice of increasing x-values.
/// * `y` - Slice of y-values.
/// * `value` - Target x-value.
///
/// # Returns
///
/// * Interpolated y-value, clamped to the end values outside the table.
fn interpolate(x: &[f64], y: &[f64], value: f64) -> f64 {
    if value <= x[0] {
        y[0]
    } else if value >= x[x.len() - 1] {
        y[y.len() - 1]
    } else {
        for i in 0..x.len() - 1 {
            if value >= x[i] && value < x[i + 1] {
                let t = (value - x[i]) / (x[i + 1] - x[i]);
                return y[i] * (1.0 - t) + y[i + 1] * t;
            }
        }
        y[0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{Axis, AxisSpec, Boundary, ProblemSpec};

    fn axis(points: usize) -> AxisSpec {
        AxisSpec {
            min: 0.0,
            max: 1.0,
            points,
            ratio: 1.0,
            lower: Boundary::Dirichlet { value: 0.0 },
            upper: Boundary::Dirichlet { value: 0.0 },
        }
    }

    fn plane() -> Mesh {
        let spec = ProblemSpec {
            ndims: 2,
            x: Some(axis(3)),
            y: Some(axis(3)),
            z: None,
            force: Default::default(),
            settings: Default::default(),
        };
        Mesh::from_problem(&spec).unwrap()
    }

    #[test]
    fn test_interpolate() {
        let x = vec![0.0, 1.0, 2.0];
        let y = vec![0.0, 1.0, 0.0];
        assert_eq!(interpolate(&x, &y, -1.0), 0.0);
        assert_eq!(interpolate(&x, &y, 0.0), 0.0);
        assert_eq!(interpolate(&x, &y, 0.5), 0.5);
        assert_eq!(interpolate(&x, &y, 1.0), 1.0);
        assert_eq!(interpolate(&x, &y, 1.5), 0.5);
        assert_eq!(interpolate(&x, &y, 2.0), 0.0);
        assert_eq!(interpolate(&x, &y, 3.0), 0.0);
    }

    #[test]
    fn test_point_force_hits_nearest_node() {
        let mesh = plane();
        let force = ForceSpec {
            terms: vec![
                ForceTerm::Point { value: 2.0, at: vec![0.5, 0.74] },
                ForceTerm::Uniform { value: 1.0 },
            ],
        };
        let mut b = DVector::zeros(9);
        apply_force(&mesh, &force, &mut b).unwrap();
        let hit = mesh.index(1, 2, 0);
        for (i, v) in b.iter().enumerate() {
            let expected = if i == hit { 3.0 } else { 1.0 };
            assert_eq!(*v, expected);
        }
    }

    #[test]
    fn test_point_force_dimension_mismatch() {
        let force = ForceSpec { terms: vec![ForceTerm::Point { value: 1.0, at: vec![0.5] }] };
        let mut b = DVector::zeros(9);
        assert!(matches!(
            apply_force(&plane(), &force, &mut b),
            Err(LaplaceError::Inconsistent(_))
        ));
    }

    #[test]
    fn test_profile_force() {
        let mesh = plane();
        let force = ForceSpec {
            terms: vec![ForceTerm::Profile { axis: Axis::Y, at: vec![0.0, 1.0], value: vec![0.0, 4.0] }],
        };
        let mut b = DVector::zeros(9);
        apply_force(&mesh, &force, &mut b).unwrap();
        // y nodes at 0.25, 0.5, 0.75
        for i in 0..3 {
            assert!((b[mesh.index(i, 0, 0)] - 1.0).abs() < 1e-12);
            assert!((b[mesh.index(i, 1, 0)] - 2.0).abs() < 1e-12);
            assert!((b[mesh.index(i, 2, 0)] - 3.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_profile_axis_out_of_range() {
        let force = ForceSpec {
            terms: vec![ForceTerm::Profile { axis: Axis::Z, at: vec![0.0], value: vec![1.0] }],
        };
        let mut b = DVector::zeros(9);
        assert!(matches!(
            apply_force(&plane(), &force, &mut b),
            Err(LaplaceError::Inconsistent(_))
        ));
    }
}
