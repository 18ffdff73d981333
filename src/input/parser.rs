// src/input/parser.rs

use serde_yaml;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{LaplaceError, Result};
use crate::input::input_deck::{Axis, AxisSpec, Settings};
use crate::input::ProblemSpec;

/// Parses a problem description from a YAML mesh file.
///
/// # Arguments
///
/// * `file_path` - Path to the YAML mesh file.
///
/// # Returns
///
/// * `Ok((casename, ndims, spec))` where `casename` is the file stem.
/// * `Err` if the file cannot be read, is not valid YAML, or describes an invalid mesh.
pub fn parse_meshfile<P: AsRef<Path>>(file_path: P) -> Result<(String, usize, ProblemSpec)> {
    let file_path = file_path.as_ref();
    if !file_path.is_file() {
        return Err(LaplaceError::MissingInput(file_path.to_path_buf()));
    }
    let mut file = File::open(file_path)?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)?;
    let spec = parse_problem(&contents)?;

    let casename = file_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("case")
        .to_string();
    log::info!("read {} ({}D case '{}')", file_path.display(), spec.ndims, casename);
    Ok((casename, spec.ndims, spec))
}

/// Parses and validates a problem description held in memory.
pub fn parse_problem(contents: &str) -> Result<ProblemSpec> {
    let spec: ProblemSpec = serde_yaml::from_str(contents)?;
    validate(&spec)?;
    Ok(spec)
}

fn validate(spec: &ProblemSpec) -> Result<()> {
    if !(1..=3).contains(&spec.ndims) {
        return Err(LaplaceError::InvalidProblem(format!(
            "ndims must be 1, 2 or 3, got {}",
            spec.ndims
        )));
    }
    for axis in [Axis::X, Axis::Y, Axis::Z].into_iter().take(spec.ndims) {
        let desc = spec.axis(axis).ok_or_else(|| {
            LaplaceError::InvalidProblem(format!(
                "{}D problem is missing the '{}' axis",
                spec.ndims,
                axis.name()
            ))
        })?;
        validate_axis(axis, desc)?;
    }
    let Settings { rtol, atol, .. } = &spec.settings;
    if *rtol < 0.0 || *atol < 0.0 {
        return Err(LaplaceError::InvalidProblem(
            "residual tolerances must be non-negative".to_string(),
        ));
    }
    Ok(())
}

fn validate_axis(axis: Axis, desc: &AxisSpec) -> Result<()> {
    let name = axis.name();
    if desc.points == 0 {
        return Err(LaplaceError::InvalidProblem(format!("axis '{name}' has no points")));
    }
    if !(desc.max > desc.min) {
        return Err(LaplaceError::InvalidProblem(format!(
            "axis '{name}' needs max > min, got [{}, {}]",
            desc.min, desc.max
        )));
    }
    if !(desc.ratio > 0.0) || !desc.ratio.is_finite() {
        return Err(LaplaceError::InvalidProblem(format!(
            "axis '{name}' stretch ratio must be positive, got {}",
            desc.ratio
        )));
    }
    if desc.lower.is_periodic() != desc.upper.is_periodic() {
        return Err(LaplaceError::InvalidProblem(format!(
            "axis '{name}' is periodic on one end only"
        )));
    }
    Ok(())
}
