//! Run the full pipeline over a Pink Sheet workbook.
//!
//! ```text
//! cargo run --example forecast_workbook -- CMO-Historical-Data-Monthly.xlsx \
//!     "Monthly Prices" CRUDE_BRENT 2 1 0
//! ```

use commodity_arima::models::arima::ARIMASpec;
use commodity_arima::pipeline::{Pipeline, Selections};
use std::env;
use std::fs;
use std::process;

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    if args.len() != 3 && args.len() != 6 {
        eprintln!("usage: forecast_workbook <workbook.xlsx> <sheet> <column> [p d q]");
        process::exit(2);
    }

    let mut selections = Selections::new(&args[1], &args[2]).with_differencing(true);
    if args.len() == 6 {
        match args[3..].join(" ").parse::<ARIMASpec>() {
            Ok(order) => selections = selections.with_order(order),
            Err(e) => {
                eprintln!("error: {}", e);
                process::exit(2);
            }
        }
    }

    let bytes = match fs::read(&args[0]) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("cannot read {}: {}", args[0], e);
            process::exit(1);
        }
    };

    let report = match Pipeline::default().run(bytes, &selections) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    };

    println!("Sheets: {}", report.sheet_names.join(", "));
    println!(
        "Loaded {} months, {} columns",
        report.table.len(),
        report.table.columns().len()
    );
    for (i, period) in report.preview.periods().iter().enumerate() {
        let value = report
            .preview
            .column_values(&args[2])
            .ok()
            .and_then(|v| v.get(i).copied());
        match value {
            Some(v) => println!("  {:10} {:>10.2}", period, v),
            None => println!("  {:10} {:>10}", period, "-"),
        }
    }

    println!("\n{}", "=".repeat(60));
    println!("Stationarity of {}", args[2]);
    println!("{}", "=".repeat(60));
    match &report.stationarity {
        Ok(s) => {
            println!(
                "ADF statistic {:.4}, p-value {:.4}, {} lags",
                s.result.statistic, s.result.p_value, s.result.lags
            );
            println!("{}", s.recommendation());
        }
        Err(e) => println!("stationarity test failed: {}", e),
    }

    match &report.differencing {
        Some(Ok(d)) => {
            println!(
                "Differenced: p-value {:.4}",
                d.stationarity.result.p_value
            );
            println!("{}", d.stationarity.recommendation());
        }
        Some(Err(e)) => println!("differencing failed: {}", e),
        None => {}
    }

    match &report.correlation {
        Some(Ok(c)) => {
            println!("Significant ACF lags:  {:?}", c.significant_acf_lags());
            println!("Significant PACF lags: {:?}", c.significant_pacf_lags());
        }
        Some(Err(e)) => println!("correlation diagnostics failed: {}", e),
        None => {}
    }

    match &report.model {
        Some(Ok(model)) => {
            println!("\n{}", "=".repeat(60));
            println!(
                "ARIMA{} evaluation, ARIMA{} forecast",
                model.order, model.final_order
            );
            println!("{}", "=".repeat(60));
            let m = &model.evaluation.metrics;
            println!(
                "MAPE {:.2}%  MAE {:.4}  RMSE {:.4}",
                m.mape, m.mae, m.rmse
            );
            for (timestamp, value) in model.forecast_table() {
                println!("  {}  {:>10.2}", timestamp.format("%Y-%m"), value);
            }
        }
        Some(Err(e)) => println!("model stage failed: {}", e),
        None => println!("\nNo order selected; pass p d q to fit a model."),
    }
}
