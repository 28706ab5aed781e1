use approx::assert_relative_eq;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};

use series_smoothers::app::pipeline::{RunConfig, run_pipeline};
use series_smoothers::data::Series;
use series_smoothers::domain::{Bandwidth, FamilyTag, SmootherConfig};
use series_smoothers::fit::{
    DEFAULT_KERNEL_MAX_EDF, DEFAULT_LOESS_MAX_EDF, DEFAULT_NS_MAX_EDF, GridSpec, SelectionPolicy,
    SelectionPolicySet, evaluate, select,
};
use series_smoothers::models;

fn noisy_sine(n: usize, seed: u64) -> Series {
    let mut rng = StdRng::seed_from_u64(seed);
    let noise = Normal::new(0.0, 0.3).unwrap();
    let values = (1..=n)
        .map(|t| (t as f64 / 12.0).sin() * 2.0 + 10.0 + noise.sample(&mut rng))
        .collect();
    Series::new("noisy-sine", 2000, 1, values).unwrap()
}

fn default_policies() -> SelectionPolicySet {
    let mut policies = SelectionPolicySet::new();
    policies
        .set(FamilyTag::NaturalSpline, SelectionPolicy::with_ceiling(DEFAULT_NS_MAX_EDF))
        .set(FamilyTag::Loess, SelectionPolicy::with_ceiling(DEFAULT_LOESS_MAX_EDF))
        .set(FamilyTag::Kernel, SelectionPolicy::with_ceiling(DEFAULT_KERNEL_MAX_EDF));
    policies
}

#[test]
fn every_default_config_gives_finite_fits() {
    let series = Series::uk_driver_deaths();
    let grid = GridSpec::default();

    for family in FamilyTag::ALL {
        for scored in evaluate(&series, family, &grid.configs(family)) {
            let Some(score) = scored.score() else {
                panic!("{} failed: {:?}", scored.config, scored.error());
            };
            assert!(score.mse >= 0.0, "{}", scored.config);
            assert!(score.model.fitted_values().iter().all(|v| v.is_finite()));
            assert!(score.model.effective_df() > 0.0);
            assert!(score.model.effective_df() <= series.len() as f64 + 1e-6);
        }
    }
}

#[test]
fn natural_spline_error_falls_with_df() {
    let series = Series::uk_driver_deaths();
    let configs: Vec<_> = (3..=7).map(|df| SmootherConfig::NaturalSpline { df }).collect();
    let mses: Vec<f64> = evaluate(&series, FamilyTag::NaturalSpline, &configs)
        .iter()
        .map(|s| s.mse().unwrap())
        .collect();

    for pair in mses.windows(2) {
        assert!(pair[1] <= pair[0] * (1.0 + 1e-9), "{mses:?}");
    }
}

#[test]
fn loess_start_prediction_is_plausible() {
    let series = Series::uk_driver_deaths();
    let model = models::fit(&series, &SmootherConfig::Loess { span: 0.5, degree: 2 }).unwrap();
    let stats = series.stats();

    let first = model.predict(1).unwrap();
    assert!((first - stats.mean).abs() <= 3.0 * stats.sd, "{first}");

    let err = model.predict(0).unwrap_err();
    assert_eq!((err.time_index, err.len), (0, 192));
    assert!(model.predict(193).is_err());
    assert_relative_eq!(model.predict(192).unwrap(), *model.fitted_values().last().unwrap());
}

#[test]
fn invalid_config_is_recorded_not_fatal() {
    let series = Series::uk_driver_deaths();
    let configs = [
        SmootherConfig::Kernel { bandwidth: Bandwidth::Absolute(-1.0), degree: 1 },
        SmootherConfig::Kernel { bandwidth: Bandwidth::Absolute(4.0), degree: 1 },
        SmootherConfig::Kernel { bandwidth: Bandwidth::FractionOfSd(0.25), degree: 1 },
        SmootherConfig::Kernel { bandwidth: Bandwidth::PlugIn, degree: 1 },
    ];
    let scored = evaluate(&series, FamilyTag::Kernel, &configs);

    assert_eq!(scored.len(), 4);
    assert_eq!(scored.iter().filter(|s| s.error().is_some()).count(), 1);
    assert!(scored[0].error().is_some());

    let result = select(&scored, &SelectionPolicy::default()).unwrap();
    assert_ne!(result.selected.index, 0);
    assert_eq!(result.ranked.last().map(|s| s.index), Some(0));
}

#[test]
fn pipeline_respects_ceilings_on_noisy_data() {
    let series = noisy_sine(120, 7);
    let config = RunConfig {
        families: FamilyTag::ALL.to_vec(),
        grid: GridSpec::default(),
        policies: default_policies(),
    };
    let out = run_pipeline(&series, &config).unwrap();

    assert!(out.report.skipped.is_empty());
    assert_eq!(out.report.entries.len(), 4);

    for (family, result) in &out.results {
        let ceiling = config.policies.get(*family).ceiling.unwrap_or(f64::INFINITY);
        let selected = &result.selected;
        assert!(selected.model.effective_df() <= ceiling + 1e-9);

        // No admissible candidate beats the selected one.
        for scored in &result.ranked {
            if let (Some(mse), Some(edf)) = (scored.mse(), scored.effective_df()) {
                if edf <= ceiling + 1e-9 {
                    assert!(selected.mse <= mse, "{family}: {} beats selection", scored.config);
                }
            }
        }
    }

    for entry in &out.report.entries {
        assert_eq!(entry.predictions.len(), series.len());
        assert_relative_eq!(entry.rmse * entry.rmse, entry.mse, max_relative = 1e-9);
    }
}

#[test]
fn same_seed_same_selection() {
    let config = RunConfig {
        families: vec![FamilyTag::Loess, FamilyTag::SmoothingSpline],
        grid: GridSpec::default(),
        policies: default_policies(),
    };
    let a = run_pipeline(&noisy_sine(80, 11), &config).unwrap();
    let b = run_pipeline(&noisy_sine(80, 11), &config).unwrap();
    assert_eq!(a.report, b.report);
}
