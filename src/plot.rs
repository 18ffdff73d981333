// src/plot.rs

use nalgebra::DVector;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::input::Axis;
use crate::mesh::Mesh;
use crate::utils::CsrMatrix;

/// Table of plot data.
#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<f64>>,
}

impl Panel {
    fn new(name: &str, columns: &[&str]) -> Self {
        Panel {
            name: name.to_string(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    fn to_csv(&self) -> String {
        let mut out = self.columns.join(",");
        out.push('\n');
        for row in &self.rows {
            let line: Vec<String> = row.iter().map(|v| format!("{v:.12e}")).collect();
            let _ = writeln!(out, "{}", line.join(","));
        }
        out
    }
}

const AXES: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

/// Mesh and solution panels.
///
/// A 3D solution is restricted to the mid-plane normal to `cut`; `cut` is
/// ignored for 1D and 2D meshes.
pub fn solution_panels(mesh: &Mesh, s: &DVector<f64>, cut: Axis) -> Vec<Panel> {
    let axes = mesh.axes();
    let (nx, ny, nz) = mesh.counts();
    let counts = [nx, ny, nz];

    let shown: Vec<usize> = if mesh.ndims() == 3 {
        (0..3).filter(|&d| d != cut.index()).collect()
    } else {
        (0..mesh.ndims()).collect()
    };
    let slice = (mesh.ndims() == 3).then(|| (cut.index(), counts[cut.index()] / 2));

    let names: Vec<&str> = shown.iter().map(|&d| AXES[d].name()).collect();
    let mut solution_columns = names.clone();
    solution_columns.push("s");
    let mut mesh_panel = Panel::new("mesh", &names);
    let mut solution_panel = Panel::new("solution", &solution_columns);

    for k in 0..nz {
        for j in 0..ny {
            for i in 0..nx {
                let pos = [i, j, k];
                if let Some((d, at)) = slice {
                    if pos[d] != at {
                        continue;
                    }
                }
                let coords: Vec<f64> = shown.iter().map(|&d| axes[d].coords[pos[d]]).collect();
                let mut row = coords.clone();
                row.push(s[mesh.index(i, j, k)]);
                mesh_panel.rows.push(coords);
                solution_panel.rows.push(row);
            }
        }
    }

    vec![mesh_panel, solution_panel]
}

/// Sparsity pattern panel, one row per stored entry.
pub fn matrix_panel(a: &CsrMatrix) -> Panel {
    let mut panel = Panel::new("matrix", &["row", "col", "value"]);
    for (r, c, v) in a.triplets() {
        panel.rows.push(vec![r as f64, c as f64, v]);
    }
    panel
}

/// Writes panels to `dir`, combined in `<casename>_plot.csv` or one
/// `<casename>_<panel>.csv` file each when `split` is set.
pub fn write_panels(
    panels: &[Panel],
    casename: &str,
    dir: &Path,
    split: bool,
    status: bool,
) -> Result<Vec<PathBuf>> {
    let header = format!("# case: {casename}, solution status = {status}\n");
    let mut written = Vec::new();
    if split {
        for panel in panels {
            let path = dir.join(format!("{casename}_{}.csv", panel.name));
            fs::write(&path, format!("{header}{}", panel.to_csv()))?;
            written.push(path);
        }
    } else {
        let mut text = header;
        for panel in panels {
            let _ = writeln!(text, "# panel: {}", panel.name);
            text.push_str(&panel.to_csv());
        }
        let path = dir.join(format!("{casename}_plot.csv"));
        fs::write(&path, text)?;
        written.push(path);
    }
    for path in &written {
        log::info!("wrote {}", path.display());
    }
    Ok(written)
}
