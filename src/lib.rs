// src/lib.rs

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod input;
pub mod mesh;
pub mod operator;
pub mod pipeline;
pub mod plot;
pub mod reorder;
pub mod save;
pub mod solve;
pub mod utils;

pub use config::RunConfig;
pub use error::{LaplaceError, Result};
pub use pipeline::{run, solve_problem, Case, RunReport};
