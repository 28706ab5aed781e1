//! Natural cubic regression spline with a fixed number of degrees of freedom.
//!
//! `df - 1` nested interior knots are placed at quantiles of the time index
//! (see [`NaturalSplineBasis`]) and the spline is fitted by ordinary least squares. Beyond the boundary knots the
//! curve is linear. The basis has `df + 1` columns (intercept included), which
//! is also the effective degrees of freedom.

use nalgebra::{DMatrix, DVector};

use crate::data::Series;
use crate::domain::{FamilyTag, SmootherConfig};
use crate::error::FitError;
use crate::math::{NaturalSplineBasis, column_rank, solve_least_squares};
use crate::models::model::{FitDetail, FittedModel};

pub fn fit(series: &Series, df: usize) -> Result<FittedModel, FitError> {
    let config = SmootherConfig::NaturalSpline { df };
    let n = series.len();

    if df == 0 {
        return Err(FitError::InvalidParameter {
            family: FamilyTag::NaturalSpline,
            name: "df",
            reason: "must be at least 1".to_string(),
        });
    }
    if df + 1 > n {
        return Err(FitError::InvalidParameter {
            family: FamilyTag::NaturalSpline,
            name: "df",
            reason: format!("df={df} needs at least {} observations, series has {n}", df + 1),
        });
    }

    let x = series.index_axis();
    let basis = NaturalSplineBasis::with_df(&x, df).ok_or_else(|| {
        FitError::SingularBasis(format!("cannot place {} distinct knots", df + 1))
    })?;

    let p = basis.n_columns();
    let mut design = DMatrix::<f64>::zeros(n, p);
    let mut row = vec![0.0; p];
    for (i, &xi) in x.iter().enumerate() {
        basis.fill_row(xi, &mut row);
        for (j, &v) in row.iter().enumerate() {
            design[(i, j)] = v;
        }
    }

    let rank = column_rank(&design);
    if rank < p {
        return Err(FitError::SingularBasis(format!(
            "design has rank {rank} but {p} columns"
        )));
    }

    let y = DVector::from_column_slice(series.values());
    let beta = solve_least_squares(&design, &y)
        .ok_or_else(|| FitError::SingularBasis("least squares solve failed".to_string()))?;
    let fitted = (&design * &beta).iter().copied().collect();

    FittedModel::new(
        config,
        fitted,
        p as f64,
        FitDetail::NaturalSpline {
            knots: basis.knots(),
            coefficients: beta.iter().copied().collect(),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::mean_squared_error;
    use approx::assert_relative_eq;

    fn line_series() -> Series {
        let values = (1..=40).map(|t| 3.0 + 0.5 * t as f64).collect();
        Series::new("line", 2000, 1, values).unwrap()
    }

    #[test]
    fn df_one_is_a_straight_line() {
        let s = line_series();
        let model = fit(&s, 1).unwrap();
        assert_eq!(model.effective_df(), 2.0);
        for (f, y) in model.fitted_values().iter().zip(s.values()) {
            assert_relative_eq!(*f, *y, epsilon = 1e-8);
        }
    }

    #[test]
    fn rejects_bad_df() {
        let s = line_series();
        assert!(matches!(
            fit(&s, 0),
            Err(FitError::InvalidParameter { name: "df", .. })
        ));
        assert!(matches!(
            fit(&s, 40),
            Err(FitError::InvalidParameter { name: "df", .. })
        ));
    }

    #[test]
    fn more_df_never_fits_worse() {
        let s = Series::uk_driver_deaths();
        let mut previous = f64::INFINITY;
        for df in 1..=8 {
            let model = fit(&s, df).unwrap();
            let mse = mean_squared_error(model.fitted_values(), s.values()).unwrap();
            assert!(mse <= previous * (1.0 + 1e-9), "df={df}: {mse} > {previous}");
            previous = mse;
        }
    }

    #[test]
    fn detail_reports_knots() {
        let s = line_series();
        let model = fit(&s, 4).unwrap();
        match model.detail() {
            FitDetail::NaturalSpline { knots, coefficients } => {
                assert_eq!(knots.len(), 5);
                assert_relative_eq!(knots[0], 1.0);
                assert_relative_eq!(knots[4], 40.0);
                assert_eq!(coefficients.len(), 5);
            }
            other => panic!("unexpected detail {other:?}"),
        }
    }
}
