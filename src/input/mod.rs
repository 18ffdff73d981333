// src/input/mod.rs

pub mod input_deck;
pub mod parser;

pub use input_deck::{Axis, AxisSpec, Boundary, ForceSpec, ForceTerm, ProblemSpec, Settings};
pub use parser::{parse_meshfile, parse_problem};
