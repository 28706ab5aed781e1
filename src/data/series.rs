//! The observed series.
//!
//! A `Series` is created once and never mutated; every component borrows it.
//! Observations are addressed by a 1-based time index `t ∈ [1, N]`, which maps
//! to calendar months starting at the series' first period.

use std::ops::RangeInclusive;

use chrono::{Months, NaiveDate};

use crate::data::uk_driver_deaths;
use crate::domain::SeriesStats;
use crate::error::SeriesError;
use crate::math::{mean, min_max, sample_sd};

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    name: String,
    start_year: i32,
    start_month: u32,
    values: Vec<f64>,
}

impl Series {
    /// Build a monthly series starting at `start_year`-`start_month`.
    pub fn new(
        name: impl Into<String>,
        start_year: i32,
        start_month: u32,
        values: Vec<f64>,
    ) -> Result<Self, SeriesError> {
        if NaiveDate::from_ymd_opt(start_year, start_month, 1).is_none() {
            return Err(SeriesError::InvalidStart {
                year: start_year,
                month: start_month,
            });
        }
        if values.is_empty() {
            return Err(SeriesError::Empty);
        }
        if let Some(i) = values.iter().position(|v| !v.is_finite()) {
            return Err(SeriesError::NonFinite { time_index: i + 1 });
        }
        Ok(Self {
            name: name.into(),
            start_year,
            start_month,
            values,
        })
    }

    /// The embedded UK driver deaths series (192 months, 1969–1984).
    pub fn uk_driver_deaths() -> Self {
        Self {
            name: "UKDriverDeaths".to_string(),
            start_year: uk_driver_deaths::START_YEAR,
            start_month: uk_driver_deaths::START_MONTH,
            values: uk_driver_deaths::VALUES.to_vec(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of observations `N`.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always `false`: construction rejects empty series.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Observations in time order (`values()[t - 1]` is the value at `t`).
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Observation at 1-based time index `t`.
    pub fn value_at(&self, time_index: usize) -> Option<f64> {
        time_index
            .checked_sub(1)
            .and_then(|i| self.values.get(i))
            .copied()
    }

    /// The valid time indices, `1..=N`.
    pub fn time_indices(&self) -> RangeInclusive<usize> {
        1..=self.values.len()
    }

    /// Time indices as `f64`, the regressor every smoother works on.
    pub fn index_axis(&self) -> Vec<f64> {
        self.time_indices().map(|t| t as f64).collect()
    }

    /// First day of the calendar month observed at time index `t`.
    pub fn date_of(&self, time_index: usize) -> Option<NaiveDate> {
        if !self.time_indices().contains(&time_index) {
            return None;
        }
        let start = NaiveDate::from_ymd_opt(self.start_year, self.start_month, 1)?;
        let offset = u32::try_from(time_index - 1).ok()?;
        start.checked_add_months(Months::new(offset))
    }

    pub fn stats(&self) -> SeriesStats {
        let (min, max) = min_max(&self.values).unwrap_or((f64::NAN, f64::NAN));
        SeriesStats {
            n: self.values.len(),
            mean: mean(&self.values).unwrap_or(f64::NAN),
            sd: sample_sd(&self.values).unwrap_or(0.0),
            min,
            max,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_series_shape() {
        let s = Series::uk_driver_deaths();
        assert_eq!(s.len(), 192);
        assert_eq!(s.value_at(1), Some(1687.0));
        assert_eq!(s.value_at(192), Some(1763.0));
        assert_eq!(s.value_at(0), None);
        assert_eq!(s.value_at(193), None);
        assert!(s.values().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn dates_follow_months() {
        let s = Series::uk_driver_deaths();
        assert_eq!(s.date_of(1), NaiveDate::from_ymd_opt(1969, 1, 1));
        assert_eq!(s.date_of(13), NaiveDate::from_ymd_opt(1970, 1, 1));
        assert_eq!(s.date_of(192), NaiveDate::from_ymd_opt(1984, 12, 1));
        assert_eq!(s.date_of(193), None);
    }

    #[test]
    fn construction_validates_values() {
        assert_eq!(Series::new("x", 2000, 1, vec![]), Err(SeriesError::Empty));
        assert_eq!(
            Series::new("x", 2000, 1, vec![1.0, f64::NAN]),
            Err(SeriesError::NonFinite { time_index: 2 })
        );
        assert!(matches!(
            Series::new("x", 2000, 13, vec![1.0]),
            Err(SeriesError::InvalidStart { .. })
        ));
    }

    #[test]
    fn stats_cover_range() {
        let s = Series::uk_driver_deaths();
        let stats = s.stats();
        assert_eq!(stats.n, 192);
        assert_eq!(stats.min, 1057.0);
        assert_eq!(stats.max, 2654.0);
        assert!(stats.sd > 0.0);
    }
}
