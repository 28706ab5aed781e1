//! Terminal plotting of comparison reports.

pub mod ascii;

pub use ascii::*;
