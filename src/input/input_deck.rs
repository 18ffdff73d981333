// src/input/input_deck.rs
use serde::{Deserialize, Serialize};

/// Condition imposed at one end of an axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Boundary {
    /// Fixed value of the solution on the boundary.
    Dirichlet { value: f64 },
    /// Fixed outward normal derivative on the boundary.
    Neumann { flux: f64 },
    /// Axis wraps around; must be set on both ends.
    Periodic,
}

impl Boundary {
    pub fn is_dirichlet(&self) -> bool {
        matches!(self, Boundary::Dirichlet { .. })
    }

    pub fn is_periodic(&self) -> bool {
        matches!(self, Boundary::Periodic)
    }
}

fn default_ratio() -> f64 {
    1.0
}

/// Structured mesh descriptor for a single axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisSpec {
    pub min: f64,                     // Lower bound of the axis
    pub max: f64,                     // Upper bound of the axis
    pub points: usize,                // Number of unknowns along the axis
    #[serde(default = "default_ratio")]
    pub ratio: f64,                   // Growth ratio of consecutive intervals
    pub lower: Boundary,              // Condition at `min`
    pub upper: Boundary,              // Condition at `max`
}

/// One source contribution to the right-hand side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ForceTerm {
    /// Constant source over the whole domain.
    Uniform { value: f64 },
    /// Source applied at the mesh node closest to `at` (one coordinate per dimension).
    Point { value: f64, at: Vec<f64> },
    /// Piecewise-linear source varying along one axis, clamped outside the table.
    Profile {
        axis: Axis,
        at: Vec<f64>,
        value: Vec<f64>,
    },
}

/// Source term of the problem. An empty list means a homogeneous equation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ForceSpec {
    pub terms: Vec<ForceTerm>,
}

/// Coordinate axis name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        }
    }
}

fn default_rtol() -> f64 {
    1e-5
}

fn default_atol() -> f64 {
    1e-8
}

fn default_eigen_warn() -> usize {
    512
}

fn default_eigen_limit() -> usize {
    2048
}

/// Optional run settings stored alongside the problem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_rtol")]
    pub rtol: f64,                    // Relative tolerance of the residual check
    #[serde(default = "default_atol")]
    pub atol: f64,                    // Absolute tolerance of the residual check
    #[serde(default = "default_eigen_warn")]
    pub eigen_warn: usize,            // Unknown count above which diagnostics warn
    #[serde(default = "default_eigen_limit")]
    pub eigen_limit: usize,           // Unknown count above which diagnostics are skipped
    #[serde(default)]
    pub output_dir: Option<String>,   // Directory for persisted artifacts
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            rtol: default_rtol(),
            atol: default_atol(),
            eigen_warn: default_eigen_warn(),
            eigen_limit: default_eigen_limit(),
            output_dir: None,
        }
    }
}

/// Problem description read from a mesh file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblemSpec {
    pub ndims: usize,
    #[serde(default)]
    pub x: Option<AxisSpec>,
    #[serde(default)]
    pub y: Option<AxisSpec>,
    #[serde(default)]
    pub z: Option<AxisSpec>,
    #[serde(default)]
    pub force: ForceSpec,
    #[serde(default)]
    pub settings: Settings,
}

impl ProblemSpec {
    /// Descriptor of `axis`, or `None` when it is absent or unused by `ndims`.
    pub fn axis(&self, axis: Axis) -> Option<&AxisSpec> {
        if axis.index() >= self.ndims {
            return None;
        }
        match axis {
            Axis::X => self.x.as_ref(),
            Axis::Y => self.y.as_ref(),
            Axis::Z => self.z.as_ref(),
        }
    }
}
