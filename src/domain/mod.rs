//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - smoother families and their configs (`FamilyTag`, `SmootherConfig`)
//! - penalty / bandwidth selection enums (`CvCriterion`, `Bandwidth`)
//! - series summary statistics (`SeriesStats`)

pub mod types;

pub use types::*;
