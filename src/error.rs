//! Error types.
//!
//! Library code returns typed errors (`FitError`, `PredictionRangeError`,
//! `NoViableConfigError`, `SeriesError`). The binary boundary folds them into
//! `AppError`, which carries the process exit code:
//!
//! - `2`: invalid input or configuration
//! - `3`: no usable result
//! - `4`: numerical or internal failure

use thiserror::Error;

use crate::domain::FamilyTag;

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

/// A single configuration could not be fitted.
///
/// Recorded per config by the grid evaluator; never aborts a batch.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FitError {
    #[error("invalid {name} for {family}: {reason}")]
    InvalidParameter {
        family: FamilyTag,
        name: &'static str,
        reason: String,
    },

    #[error("config belongs to {found}, but {expected} was requested")]
    FamilyMismatch { expected: FamilyTag, found: FamilyTag },

    #[error("need at least {required} observations, got {actual}")]
    TooFewObservations { required: usize, actual: usize },

    #[error("singular basis: {0}")]
    SingularBasis(String),

    #[error("span {span} gives {neighbours} weighted neighbours at t={time_index}, degree {degree} needs {required}")]
    InsufficientSpan {
        span: f64,
        degree: usize,
        time_index: usize,
        neighbours: usize,
        required: usize,
    },

    #[error("numerical routine did not converge: {0}")]
    NonConvergence(String),

    #[error("non-finite fitted value at t={time_index}")]
    NonFinite { time_index: usize },
}

/// A prediction was requested outside the fitted domain `[1, len]`.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("time index {time_index} is outside the fitted range [1, {len}]")]
pub struct PredictionRangeError {
    pub time_index: usize,
    pub len: usize,
}

/// Why a family produced no selectable configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum NoViableReason {
    /// No configs were evaluated.
    Empty,
    /// Every config failed to fit.
    AllFailed { failed: usize },
    /// Some configs fitted, but all of them exceed the complexity ceiling.
    AboveCeiling { ceiling: f64, lowest_edf: f64 },
}

impl std::fmt::Display for NoViableReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NoViableReason::Empty => write!(f, "no configs were evaluated"),
            NoViableReason::AllFailed { failed } => {
                write!(f, "all {failed} configs failed to fit")
            }
            NoViableReason::AboveCeiling { ceiling, lowest_edf } => write!(
                f,
                "every fitted config exceeds the EDF ceiling {ceiling:.2} (lowest EDF {lowest_edf:.2})"
            ),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
#[error("no viable config for {}: {reason}", family_label(.family))]
pub struct NoViableConfigError {
    pub family: Option<FamilyTag>,
    pub reason: NoViableReason,
}

fn family_label(family: &Option<FamilyTag>) -> &'static str {
    family.as_ref().map(|f| f.display_name()).unwrap_or("empty input")
}

/// Invalid observed series.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SeriesError {
    #[error("series is empty")]
    Empty,
    #[error("non-finite observation at t={time_index}")]
    NonFinite { time_index: usize },
    #[error("invalid start period {year}-{month:02}")]
    InvalidStart { year: i32, month: u32 },
}

impl From<SeriesError> for AppError {
    fn from(err: SeriesError) -> Self {
        AppError::new(2, format!("Invalid series: {err}"))
    }
}

impl From<NoViableConfigError> for AppError {
    fn from(err: NoViableConfigError) -> Self {
        AppError::new(3, err.to_string())
    }
}

impl From<PredictionRangeError> for AppError {
    fn from(err: PredictionRangeError) -> Self {
        AppError::new(4, err.to_string())
    }
}

impl From<FitError> for AppError {
    fn from(err: FitError) -> Self {
        let code = match err {
            FitError::InvalidParameter { .. } | FitError::FamilyMismatch { .. } => 2,
            _ => 4,
        };
        AppError::new(code, err.to_string())
    }
}
