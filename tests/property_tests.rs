//! Property-based tests for the cleaning, differencing and forecasting stages.
//!
//! These tests verify invariants that should hold for all valid inputs,
//! using randomly generated tables and series.

use commodity_arima::core::month::{month_start, monthly_range};
use commodity_arima::core::TimeSeries;
use commodity_arima::io::{Cell, RawTable};
use commodity_arima::models::arima::{difference, first_difference, ARIMASpec, ARIMA};
use commodity_arima::models::Forecaster;
use commodity_arima::pipeline::{fit_and_forecast, PipelineConfig};
use commodity_arima::transform::{clean, CleanOptions};
use commodity_arima::utils::mape;
use commodity_arima::validation::Stationarity;
use commodity_arima::ForecastError;
use proptest::prelude::*;

/// Create a monthly TimeSeries from a vector of values.
fn make_ts(values: &[f64]) -> TimeSeries {
    let start = month_start(1960, 1).unwrap();
    TimeSeries::univariate(monthly_range(start, values.len()).unwrap(), values.to_vec()).unwrap()
}

/// Strategy for price-like series: a positive random walk.
fn price_strategy(min_len: usize, max_len: usize) -> impl Strategy<Value = Vec<f64>> {
    (min_len..max_len).prop_flat_map(|len| {
        (20.0..200.0_f64, prop::collection::vec(-2.0..2.0_f64, len)).prop_map(|(base, steps)| {
            let mut level = base;
            steps
                .into_iter()
                .map(|s| {
                    level = (level + s).max(1.0);
                    level
                })
                .collect()
        })
    })
}

/// A value cell: a price, one of the ellipsis sentinels, or blank.
fn cell_strategy() -> impl Strategy<Value = Cell> {
    prop_oneof![
        6 => (1.0..500.0_f64).prop_map(Cell::Number),
        1 => Just(Cell::Text("\u{2026}".to_string())),
        1 => Just(Cell::Text("\u{e2}\u{20ac}\u{a6}".to_string())),
        1 => Just(Cell::Missing),
    ]
}

/// Rows in arbitrary order, possibly repeating a period.
fn raw_table_strategy() -> impl Strategy<Value = RawTable> {
    prop::collection::vec((1960i32..1965, 1u32..=12, cell_strategy()), 1..60).prop_map(|rows| {
        let rows = rows
            .into_iter()
            .map(|(year, month, cell)| {
                vec![Cell::Text(format!("{year}M{month:02}")), cell]
            })
            .collect();
        RawTable::new(vec!["Unnamed: 0".to_string(), "price".to_string()], rows)
    })
}

// =============================================================================
// Property: cleaned index is strictly increasing and gap-free
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    #[test]
    fn cleaned_index_is_strictly_increasing(raw in raw_table_strategy()) {
        let table = clean(&raw, &CleanOptions::default()).unwrap();
        let ts = table.timestamps();
        prop_assert!(ts.windows(2).all(|w| w[0] < w[1]));
        prop_assert_eq!(ts.len(), table.periods().len());
    }

    #[test]
    fn cleaned_series_has_no_missing_values(raw in raw_table_strategy()) {
        let has_number = raw.rows().iter().any(|r| matches!(r[1], Cell::Number(_)));
        prop_assume!(has_number);

        let table = clean(&raw, &CleanOptions::default()).unwrap();
        let series = table.series("price").unwrap();
        prop_assert!(!series.is_empty());
        prop_assert!(!series.has_missing_values());
        prop_assert!(series.timestamps().windows(2).all(|w| w[0] < w[1]));
    }
}

// =============================================================================
// Property: differencing shortens by one, twice gives second differences
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    #[test]
    fn first_difference_is_one_shorter(values in price_strategy(2, 80)) {
        let series = make_ts(&values);
        let diff = first_difference(&series).unwrap();
        prop_assert_eq!(diff.len(), series.len() - 1);
        prop_assert_eq!(diff.timestamps(), &series.timestamps()[1..]);
        for (i, d) in diff.values().iter().enumerate() {
            prop_assert!((d - (values[i + 1] - values[i])).abs() < 1e-9);
        }
    }

    #[test]
    fn double_difference_is_second_difference(values in price_strategy(3, 80)) {
        let series = make_ts(&values);
        let twice = first_difference(&first_difference(&series).unwrap()).unwrap();
        let second = difference(&values, 2);
        prop_assert_eq!(twice.len(), second.len());
        for (a, b) in twice.values().iter().zip(&second) {
            prop_assert!((a - b).abs() < 1e-9);
        }
    }
}

// =============================================================================
// Property: stationarity verdict depends only on the p-value
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn classification_is_strict_threshold(p in 0.0..1.0_f64) {
        let verdict = Stationarity::from_p_value(p, 0.05);
        prop_assert_eq!(verdict.is_stationary(), p < 0.05);
        prop_assert_eq!(
            verdict.label(),
            if p < 0.05 { "stationary" } else { "non-stationary" }
        );
    }
}

// =============================================================================
// Property: the model stage always forecasts 12 periods
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(30))]

    #[test]
    fn forecast_horizon_is_always_twelve(values in price_strategy(15, 120)) {
        let series = make_ts(&values);
        let report = fit_and_forecast(&series, ARIMASpec::new(0, 1, 0), &PipelineConfig::default())
            .unwrap();
        prop_assert_eq!(report.evaluation.forecast.horizon(), 12);
        prop_assert_eq!(report.future.horizon(), 12);
        prop_assert_eq!(report.evaluation.split_index, values.len() - 12);
    }

    #[test]
    fn short_series_cannot_be_split(values in price_strategy(1, 13)) {
        let series = make_ts(&values);
        let result = fit_and_forecast(&series, ARIMASpec::new(0, 1, 0), &PipelineConfig::default());
        let is_insufficient = matches!(result, Err(ForecastError::InsufficientData { .. }));
        prop_assert!(is_insufficient);
    }

    #[test]
    fn arima_intervals_ordered(
        values in price_strategy(30, 100),
        horizon in 1usize..20
    ) {
        let ts = make_ts(&values);
        let mut model = ARIMA::new(1, 1, 0);
        model.fit(&ts).unwrap();
        let forecast = model.predict_with_intervals(horizon, 0.95).unwrap();

        let lower = forecast.lower().unwrap();
        let upper = forecast.upper().unwrap();
        let point = forecast.primary();

        for i in 0..horizon {
            prop_assert!(
                lower[i] <= point[i],
                "Lower bound {} > point {} at horizon {}",
                lower[i], point[i], i
            );
            prop_assert!(
                point[i] <= upper[i],
                "Point {} > upper bound {} at horizon {}",
                point[i], upper[i], i
            );
        }
    }
}

// =============================================================================
// Property: MAPE is a non-negative mean of absolute ratios
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    #[test]
    fn mape_matches_definition(
        pairs in prop::collection::vec((1.0..100.0_f64, 0.0..150.0_f64), 1..30)
    ) {
        let (actual, predicted): (Vec<f64>, Vec<f64>) = pairs.into_iter().unzip();
        let m = mape(&actual, &predicted).unwrap();
        let expected = actual
            .iter()
            .zip(&predicted)
            .map(|(a, p)| ((a - p) / a).abs())
            .sum::<f64>()
            / actual.len() as f64
            * 100.0;
        prop_assert!(m >= 0.0);
        prop_assert!((m - expected).abs() < 1e-9);
    }
}
