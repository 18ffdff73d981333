// src/utils/mod.rs

pub mod linear_algebra;

// Re-export specific items for easier access
pub use linear_algebra::{
    allclose,
    second_difference,
    symmetric_block,
    CsrMatrix,
};
