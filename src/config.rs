// src/config.rs

use clap::Parser;
use std::path::PathBuf;

use crate::error::{LaplaceError, Result};
use crate::input::Axis;

/// Command line options of a run.
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "l-qles")]
#[command(
    version,
    about = "Generate 1D, 2D and 3D Laplacian test cases for linear equation solvers"
)]
pub struct RunConfig {
    /// Name of the input (mesh) file.
    #[arg(short = 'i', long = "input", alias = "i")]
    pub input: Option<PathBuf>,

    /// Cut slice of a 3D solution to be plotted.
    #[arg(short = 'c', long = "cut", alias = "c", value_enum, default_value_t = Axis::X)]
    pub cut: Axis,

    /// Allow degenerate matrices.
    #[arg(short = 'd', long = "degen")]
    pub degen: bool,

    /// Calculate eigenvalues and condition number.
    #[arg(short = 'e', long = "eigen")]
    pub eigen: bool,

    /// Split plots into separate files instead of a single one.
    #[arg(short = 'j', long = "split")]
    pub split: bool,

    /// Plot the matrix.
    #[arg(short = 'm', long = "plot-matrix")]
    pub plot_matrix: bool,

    /// Reorder matrix and rhs to use shell ordering of the mesh.
    #[arg(short = 'r', long = "reorder")]
    pub reorder: bool,

    /// Plot solution and mesh.
    #[arg(short = 's', long = "plot-solution")]
    pub plot_solution: bool,

    /// Directory for the case files, overrides the problem settings.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
}

impl RunConfig {
    /// Path of the input file, which must exist.
    pub fn input_file(&self) -> Result<PathBuf> {
        let path = self.input.clone().unwrap_or_default();
        if path.is_file() {
            Ok(path)
        } else {
            Err(LaplaceError::MissingInput(path))
        }
    }
}
