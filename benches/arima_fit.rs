//! Benchmarks for the stationarity test and the fit/forecast stage.

use commodity_arima::core::month::{month_start, monthly_range};
use commodity_arima::core::TimeSeries;
use commodity_arima::models::arima::ARIMASpec;
use commodity_arima::pipeline::{fit_and_forecast, PipelineConfig};
use commodity_arima::validation::{adf_test, AdfConfig};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn generate_prices(n: usize) -> TimeSeries {
    let mut level = 60.0;
    let values: Vec<f64> = (0..n)
        .map(|i| {
            level += 0.2 + (i as f64 * 0.7).sin() + 0.5 * (i as f64 * 0.13).cos();
            level
        })
        .collect();
    let start = month_start(1960, 1).unwrap();
    TimeSeries::univariate(monthly_range(start, n).unwrap(), values).unwrap()
}

fn bench_adf(c: &mut Criterion) {
    let mut group = c.benchmark_group("adf_test");

    // Roughly 20, 40 and 65 years of monthly data.
    for size in [240, 480, 780].iter() {
        let series = generate_prices(*size);
        group.bench_with_input(BenchmarkId::new("autolag_aic", size), size, |b, _| {
            b.iter(|| adf_test(black_box(series.values()), &AdfConfig::default()))
        });
    }

    group.finish();
}

fn bench_fit_and_forecast(c: &mut Criterion) {
    let mut group = c.benchmark_group("fit_and_forecast");
    let config = PipelineConfig::default();

    for size in [240, 780].iter() {
        let series = generate_prices(*size);
        for order in [ARIMASpec::new(2, 1, 0), ARIMASpec::new(1, 1, 1)] {
            group.bench_with_input(
                BenchmarkId::new(format!("ARIMA{order}"), size),
                size,
                |b, _| b.iter(|| fit_and_forecast(black_box(&series), order, &config)),
            );
        }
    }

    group.finish();
}

criterion_group!(benches, bench_adf, bench_fit_and_forecast);
criterion_main!(benches);
