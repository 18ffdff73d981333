// src/pipeline.rs

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::RunConfig;
use crate::diagnostics::{gated_eigen_analysis, Spectrum};
use crate::error::Result;
use crate::input::{parse_meshfile, ProblemSpec};
use crate::mesh::Mesh;
use crate::operator::{assemble, LinearSystem};
use crate::plot::{matrix_panel, solution_panels, write_panels};
use crate::reorder::{reorder, Reordered};
use crate::save::{case_save_bin, case_save_yaml, CaseRecord};
use crate::solve::{solve_system, Solution};

/// Assembled and solved case, before anything is written.
#[derive(Debug, Clone)]
pub struct Case {
    pub mesh: Mesh,
    pub system: LinearSystem,     // Unpermuted A and b
    pub reordered: Reordered,     // Q together with Q A Qᵀ and Q b
    pub solution: Solution,
}

impl Case {
    /// Archive record of this case.
    pub fn record(&self, casename: &str, degen: bool, order: bool) -> CaseRecord {
        CaseRecord {
            casename: casename.to_string(),
            n: self.system.size(),
            status: self.solution.status,
            degen,
            order,
            a: self.system.a.clone(),
            b: self.system.b.iter().cloned().collect(),
            s: self.solution.s.iter().cloned().collect(),
            q: self.reordered.q.clone(),
        }
    }
}

/// Builds the mesh, assembles `A s = b`, reorders it and solves it.
///
/// # Arguments
///
/// * `spec` - Validated problem description.
/// * `degen` - Allow operators without any Dirichlet boundary.
/// * `order` - Apply shell reordering before the solve.
pub fn solve_problem(spec: &ProblemSpec, degen: bool, order: bool) -> Result<Case> {
    let mesh = Mesh::from_problem(spec)?;
    let system = assemble(&mesh, &spec.force, degen)?;
    log::info!("assembled {} unknowns, {} non-zeros", system.size(), system.a.nnz());

    let reordered = reorder(&system, mesh.counts(), order);
    let solution = solve_system(&system, &reordered, spec.settings.rtol, spec.settings.atol)?;
    Ok(Case { mesh, system, reordered, solution })
}

/// Outcome of a full run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub record: CaseRecord,
    pub spectrum: Option<Spectrum>,
    pub artifacts: Vec<PathBuf>, // Every file written, in order
}

fn output_dir(config: &RunConfig, spec: &ProblemSpec) -> PathBuf {
    match (&config.output, &spec.settings.output_dir) {
        (Some(dir), _) => dir.clone(),
        (None, Some(dir)) => PathBuf::from(dir),
        (None, None) => PathBuf::from("."),
    }
}

/// Runs one case end to end: parse, assemble, solve, persist, then the
/// optional diagnostics and plots.
pub fn run(config: &RunConfig) -> Result<RunReport> {
    let input = config.input_file()?;
    let (casename, _ndims, spec) = parse_meshfile(&input)?;

    let case = solve_problem(&spec, config.degen, config.reorder)?;
    println!("solution status = {}", case.solution.status);

    let record = case.record(&casename, config.degen, config.reorder);
    let dir = output_dir(config, &spec);
    fs::create_dir_all(&dir)?;
    let mut artifacts = vec![case_save_yaml(&record, &dir)?, case_save_bin(&record, &dir)?];

    let spectrum = if config.eigen {
        report_spectrum(&case, &spec)
    } else {
        None
    };

    artifacts.extend(plot(config, &case, &casename, &dir)?);
    Ok(RunReport { record, spectrum, artifacts })
}

fn report_spectrum(case: &Case, spec: &ProblemSpec) -> Option<Spectrum> {
    let spectrum = gated_eigen_analysis(
        &case.system.a,
        spec.settings.eigen_warn,
        spec.settings.eigen_limit,
    )?;
    println!("condition number = {:.6e}", spectrum.condition);
    println!("min |eigenvalue| = {:.6e}", spectrum.min_abs);
    println!("max |eigenvalue| = {:.6e}", spectrum.max_abs);
    Some(spectrum)
}

fn plot(config: &RunConfig, case: &Case, casename: &str, dir: &Path) -> Result<Vec<PathBuf>> {
    let mut panels = Vec::new();
    if config.plot_solution {
        panels.extend(solution_panels(&case.mesh, &case.solution.s, config.cut));
    }
    if config.plot_matrix {
        panels.push(matrix_panel(&case.system.a));
    }
    if panels.is_empty() {
        return Ok(Vec::new());
    }
    write_panels(&panels, casename, dir, config.split, case.solution.status)
}
