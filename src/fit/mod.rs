//! Grid evaluation and model selection.
//!
//! Responsibilities:
//!
//! - build per-family parameter grids
//! - fit and score every config of a grid (parallel, order preserving)
//! - select one config per family under a complexity ceiling

pub mod grid;
pub mod param_grid;
pub mod selection;

pub use grid::*;
pub use param_grid::*;
pub use selection::*;
