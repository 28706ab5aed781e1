//! `series-smoothers` library crate.
//!
//! The binary (`smooth`) is a thin wrapper around this library so that:
//!
//! - every smoother and the selection logic are testable without spawning processes
//! - the comparison pipeline can be driven from other programs
//! - presentation (tables, plot, exports) stays separate from the math

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod models;
pub mod plot;
pub mod report;
