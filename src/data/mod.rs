//! Input data: the `Series` type and the embedded dataset.

pub mod series;
pub mod uk_driver_deaths;

pub use series::Series;
