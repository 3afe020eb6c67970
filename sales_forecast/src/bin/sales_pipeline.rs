//! # sales_pipeline
//!
//! Command-line entry points for the weekly sales pipeline stages.

use clap::{Parser, Subcommand};
use sales_forecast::config::PipelineConfig;
use sales_forecast::error::Result;
use sales_forecast::pipeline::run_pipeline;
use sales_forecast::{
    evaluate_model, forecast_future_sales, run_preprocessing, train_models, DataLoader,
    TableSummary,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, Level};

#[derive(Parser)]
#[command(name = "sales_pipeline")]
#[command(about = "Weekly sales preprocessing, training and forecasting", long_about = None)]
struct Cli {
    /// JSON configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding the raw sales table
    #[arg(long, global = true)]
    input_dir: Option<PathBuf>,

    /// Directory for models, scaler and metrics
    #[arg(long, global = true)]
    model_dir: Option<PathBuf>,

    /// Directory for the processed table and forecast
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarise the raw sales table
    Inspect,

    /// Build and scale features from the raw sales table
    Preprocess,

    /// Train every model and write the comparison table
    Train,

    /// Re-score the production model on the held-out weeks
    Evaluate,

    /// Forecast future weekly sales
    Forecast {
        /// Number of weeks to forecast
        #[arg(short, long)]
        weeks: Option<usize>,
    },

    /// Run all stages in order with retries
    Run,
}

fn resolve_config(cli: &Cli) -> Result<PipelineConfig> {
    let mut config = match &cli.config {
        Some(path) => PipelineConfig::load(path)?,
        None => PipelineConfig::new("data", "models", "output"),
    };
    if let Some(dir) = &cli.input_dir {
        config.input_dir = dir.clone();
    }
    if let Some(dir) = &cli.model_dir {
        config.model_dir = dir.clone();
    }
    if let Some(dir) = &cli.output_dir {
        config.output_dir = dir.clone();
    }
    config.validate()?;
    Ok(config)
}

fn execute(cli: &Cli) -> Result<()> {
    let config = resolve_config(cli)?;

    match &cli.command {
        Commands::Inspect => {
            let raw = DataLoader::from_csv(config.raw_path())?;
            print!("{}", TableSummary::of(&raw));
        }
        Commands::Preprocess => {
            let table = run_preprocessing(&config)?;
            println!(
                "Processed {} rows with {} features into {}",
                table.len(),
                table.feature_names().len(),
                config.processed_path().display()
            );
        }
        Commands::Train => {
            let comparison = train_models(&config)?;
            print!("{}", comparison);
        }
        Commands::Evaluate => {
            let report = evaluate_model(&config)?;
            println!("{}: {}", report.model, report.metrics);
            for (actual, predicted) in &report.samples {
                println!("Actual: {:.2} | Predicted: {:.2}", actual, predicted);
            }
        }
        Commands::Forecast { weeks } => {
            let weeks = weeks.unwrap_or(config.forecast_weeks);
            for record in forecast_future_sales(&config, weeks)? {
                println!("Week {}: {:.2}", record.week_ahead, record.predicted_weekly_sales);
            }
        }
        Commands::Run => run_pipeline(&config)?,
    }

    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt().with_max_level(level).init();

    match execute(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "pipeline failed");
            ExitCode::FAILURE
        }
    }
}
