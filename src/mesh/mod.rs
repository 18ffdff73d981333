// src/mesh/mod.rs

use crate::error::{LaplaceError, Result};
use crate::input::{Axis, AxisSpec, Boundary, ProblemSpec};

/// Coordinates of the unknowns along one axis.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisMesh {
    /// Strictly increasing node coordinates.
    pub coords: Vec<f64>,
    /// Distance from the first node to the lower boundary (or across the periodic seam).
    pub lower_gap: f64,
    /// Distance from the last node to the upper boundary (or across the periodic seam).
    pub upper_gap: f64,
    pub lower: Boundary,
    pub upper: Boundary,
}

impl AxisMesh {
    pub fn len(&self) -> usize {
        self.coords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    pub fn is_periodic(&self) -> bool {
        self.lower.is_periodic()
    }

    /// Spacing to the left and right neighbour of node `i`.
    ///
    /// End nodes use the boundary gap, which on a periodic axis is the
    /// seam interval shared by the first and the last node.
    pub fn spacing(&self, i: usize) -> (f64, f64) {
        let n = self.coords.len();
        let left = if i == 0 {
            self.lower_gap
        } else {
            self.coords[i] - self.coords[i - 1]
        };
        let right = if i + 1 == n {
            self.upper_gap
        } else {
            self.coords[i + 1] - self.coords[i]
        };
        (left, right)
    }

    /// Length of one period, the span of the nodes plus the seam interval.
    pub fn period(&self) -> f64 {
        match (self.coords.first(), self.coords.last()) {
            (Some(first), Some(last)) => last - first + self.upper_gap,
            _ => 0.0,
        }
    }

    /// Distance from node `i` to `value`, measured across the seam on a periodic axis.
    fn distance(&self, i: usize, value: f64) -> f64 {
        let d = (self.coords[i] - value).abs();
        if self.is_periodic() {
            let d = d.rem_euclid(self.period());
            d.min(self.period() - d)
        } else {
            d
        }
    }

    /// Index of the node closest to `value`.
    pub fn nearest(&self, value: f64) -> usize {
        let mut best = 0;
        for i in 1..self.coords.len() {
            if self.distance(i, value) < self.distance(best, value) {
                best = i;
            }
        }
        best
    }

    /// Rejects gradings whose intervals collapse to zero or overflow.
    fn check_spacing(&self, axis: Axis) -> Result<()> {
        for i in 0..self.coords.len() {
            let (left, right) = self.spacing(i);
            if !(left > 0.0 && right > 0.0 && left.is_finite() && right.is_finite()) {
                return Err(LaplaceError::InvalidProblem(format!(
                    "axis '{}' stretch ratio produces degenerate intervals at node {i}",
                    axis.name()
                )));
            }
        }
        Ok(())
    }
}

/// Interval widths growing geometrically by `ratio` and summing to `length`.
fn interval_widths(length: f64, count: usize, ratio: f64) -> Vec<f64> {
    let first = if (ratio - 1.0).abs() < 1e-12 {
        length / count as f64
    } else {
        length * (1.0 - ratio) / (1.0 - ratio.powi(count as i32))
    };
    let mut widths = Vec::with_capacity(count);
    let mut w = first;
    for _ in 0..count {
        widths.push(w);
        w *= ratio;
    }
    widths
}

/// Generates the node coordinates described by an axis descriptor.
///
/// A non-periodic axis carries `points` interior nodes separated by
/// `points + 1` intervals, the boundary nodes themselves are not unknowns.
/// A periodic axis carries `points` nodes starting at `min`, with `max`
/// identified with `min`.
pub fn generate_mesh(spec: &AxisSpec) -> AxisMesh {
    let length = spec.max - spec.min;
    let n = spec.points;
    if spec.lower.is_periodic() {
        let widths = interval_widths(length, n, spec.ratio);
        let mut coords = Vec::with_capacity(n);
        let mut x = spec.min;
        for w in widths.iter().take(n) {
            coords.push(x);
            x += w;
        }
        let seam = widths[n - 1];
        AxisMesh {
            coords,
            lower_gap: seam,
            upper_gap: seam,
            lower: spec.lower,
            upper: spec.upper,
        }
    } else {
        let widths = interval_widths(length, n + 1, spec.ratio);
        let mut coords = Vec::with_capacity(n);
        let mut x = spec.min;
        for w in widths.iter().take(n) {
            x += w;
            coords.push(x);
        }
        AxisMesh {
            coords,
            lower_gap: widths[0],
            upper_gap: widths[n],
            lower: spec.lower,
            upper: spec.upper,
        }
    }
}

/// Structured mesh, one variant per dimensionality.
#[derive(Debug, Clone, PartialEq)]
pub enum Mesh {
    Line(AxisMesh),
    Plane(AxisMesh, AxisMesh),
    Volume(AxisMesh, AxisMesh, AxisMesh),
}

impl Mesh {
    /// Builds the mesh of every axis used by the problem.
    pub fn from_problem(spec: &ProblemSpec) -> Result<Self> {
        let gen = |axis: Axis| {
            let mesh = spec.axis(axis).map(generate_mesh).ok_or_else(|| {
                LaplaceError::Inconsistent(format!(
                    "{}D problem has no '{}' axis descriptor",
                    spec.ndims,
                    axis.name()
                ))
            })?;
            mesh.check_spacing(axis)?;
            Ok::<_, LaplaceError>(mesh)
        };
        match spec.ndims {
            1 => Ok(Mesh::Line(gen(Axis::X)?)),
            2 => Ok(Mesh::Plane(gen(Axis::X)?, gen(Axis::Y)?)),
            3 => Ok(Mesh::Volume(gen(Axis::X)?, gen(Axis::Y)?, gen(Axis::Z)?)),
            n => Err(LaplaceError::InvalidProblem(format!("unsupported ndims {n}"))),
        }
    }

    pub fn ndims(&self) -> usize {
        match self {
            Mesh::Line(..) => 1,
            Mesh::Plane(..) => 2,
            Mesh::Volume(..) => 3,
        }
    }

    pub fn axes(&self) -> Vec<&AxisMesh> {
        match self {
            Mesh::Line(x) => vec![x],
            Mesh::Plane(x, y) => vec![x, y],
            Mesh::Volume(x, y, z) => vec![x, y, z],
        }
    }

    /// Point counts `(nx, ny, nz)`, unused axes count as 1.
    pub fn counts(&self) -> (usize, usize, usize) {
        match self {
            Mesh::Line(x) => (x.len(), 1, 1),
            Mesh::Plane(x, y) => (x.len(), y.len(), 1),
            Mesh::Volume(x, y, z) => (x.len(), y.len(), z.len()),
        }
    }

    /// Total number of unknowns.
    pub fn size(&self) -> usize {
        let (nx, ny, nz) = self.counts();
        nx * ny * nz
    }

    /// Linear index of node `(i, j, k)`, `x` varies fastest.
    pub fn index(&self, i: usize, j: usize, k: usize) -> usize {
        let (nx, ny, _) = self.counts();
        i + nx * (j + ny * k)
    }
}
