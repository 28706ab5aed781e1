//! Mathematical utilities: spline basis, kernels, least squares, grids and
//! descriptive statistics.

pub mod basis;
pub mod grid;
pub mod kernel;
pub mod ols;
pub mod stats;

pub use basis::*;
pub use grid::*;
pub use kernel::*;
pub use ols::*;
pub use stats::*;
