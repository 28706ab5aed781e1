//! Input/output helpers.
//!
//! - CSV series ingest + validation (`ingest`)
//! - comparison exports (CSV/JSON) and JSON read-back (`export`)

pub mod export;
pub mod ingest;

pub use export::*;
pub use ingest::*;
