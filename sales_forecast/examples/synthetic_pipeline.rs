use chrono::{Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sales_forecast::config::PipelineConfig;
use sales_forecast::{evaluate_model, forecast_future_sales, run_preprocessing, train_models};
use std::fs;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let workdir = tempfile::tempdir()?;
    let config = PipelineConfig::new(
        workdir.path().join("data"),
        workdir.path().join("models"),
        workdir.path().join("output"),
    );

    // Two years of weekly sales for five stores with a yearly cycle and noise
    let mut rng = StdRng::seed_from_u64(7);
    let start = NaiveDate::from_ymd_opt(2010, 2, 5).ok_or("bad start date")?;
    let mut csv = String::from("Store,Date,Weekly_Sales,Holiday_Flag,Temperature,Fuel_Price\n");
    for store in 1..=5 {
        let base = 20_000.0 * store as f64;
        for week in 0..104 {
            let date = start + Duration::weeks(week);
            let season = (week as f64 * std::f64::consts::TAU / 52.0).sin();
            let sales = base * (1.0 + 0.15 * season) + rng.gen_range(-500.0..500.0);
            csv.push_str(&format!(
                "{},{},{:.2},{},{:.1},{:.3}\n",
                store,
                date.format("%d-%m-%Y"),
                sales,
                u8::from(week % 52 == 42),
                60.0 + 25.0 * season,
                2.5 + rng.gen_range(0.0..0.5),
            ));
        }
    }
    fs::create_dir_all(&config.input_dir)?;
    fs::write(config.raw_path(), csv)?;
    println!("Wrote synthetic sales to {}", config.raw_path().display());

    let processed = run_preprocessing(&config)?;
    println!(
        "Processed {} rows with {} features",
        processed.len(),
        processed.feature_names().len()
    );

    let comparison = train_models(&config)?;
    println!("\nModel comparison (best first):");
    print!("{}", comparison);

    let report = evaluate_model(&config)?;
    println!("\nProduction model {}: {}", report.model, report.metrics);

    println!("\nForecast:");
    for record in forecast_future_sales(&config, 6)? {
        println!("Week {}: {:.2}", record.week_ahead, record.predicted_weekly_sales);
    }

    Ok(())
}
