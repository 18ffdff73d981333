// src/error.rs

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while building, solving or persisting a Laplacian case.
#[derive(Debug, Error)]
pub enum LaplaceError {
    /// Declared problem file does not exist.
    #[error("file {} does not exist", .0.display())]
    MissingInput(PathBuf),

    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Problem file is not valid YAML for a `ProblemSpec`.
    #[error("cannot parse problem file: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// Problem description is malformed on its own (bad bounds, counts, ...).
    #[error("invalid problem: {0}")]
    InvalidProblem(String),

    /// Mesh and force descriptors disagree with each other.
    #[error("inconsistent problem: {0}")]
    Inconsistent(String),

    /// Operator is singular and degenerate matrices were not allowed.
    #[error("degenerate matrix: {0} (use -d to allow degenerate matrices)")]
    Degenerate(String),

    /// Sparse factorisation failed.
    #[error("solver error: {0}")]
    Solver(String),

    /// Binary case file is truncated or has the wrong layout.
    #[error("bad case file: {0}")]
    Format(String),
}

/// Convenience alias for `Result<T, LaplaceError>`.
pub type Result<T> = std::result::Result<T, LaplaceError>;
