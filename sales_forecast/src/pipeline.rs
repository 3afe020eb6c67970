//! Stage sequencing with a fixed retry budget
//!
//! Stages talk to each other only through the files they persist, so each
//! one can be run alone or as part of [`run_pipeline`].

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::evaluation::evaluate_model;
use crate::forecast::forecast_future_sales;
use crate::preprocess::run_preprocessing;
use crate::training::train_models;
use std::fmt;
use std::thread;
use std::time::Duration;
use tracing::{error, info, warn};

/// One step of the weekly sales pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Preprocess,
    Train,
    Evaluate,
    Forecast,
}

impl Stage {
    /// Every stage, in execution order
    pub const ALL: [Stage; 4] = [Stage::Preprocess, Stage::Train, Stage::Evaluate, Stage::Forecast];

    pub fn name(&self) -> &'static str {
        match self {
            Stage::Preprocess => "preprocess",
            Stage::Train => "train",
            Stage::Evaluate => "evaluate",
            Stage::Forecast => "forecast",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Run a single stage once
pub fn run_stage(config: &PipelineConfig, stage: Stage) -> Result<()> {
    match stage {
        Stage::Preprocess => run_preprocessing(config).map(|_| ()),
        Stage::Train => train_models(config).map(|_| ()),
        Stage::Evaluate => evaluate_model(config).map(|_| ()),
        Stage::Forecast => forecast_future_sales(config, config.forecast_weeks).map(|_| ()),
    }
}

/// Run `stage`, retrying after a fixed delay until the retry budget is spent
pub fn run_with_retry<F>(config: &PipelineConfig, stage: Stage, mut attempt: F) -> Result<()>
where
    F: FnMut(&PipelineConfig, Stage) -> Result<()>,
{
    let policy = config.retry;
    let mut tries = 0;
    loop {
        tries += 1;
        match attempt(config, stage) {
            Ok(()) => return Ok(()),
            Err(e) if tries <= policy.retries => {
                warn!(%stage, attempt = tries, error = %e, delay_secs = policy.delay_secs, "stage failed, retrying");
                thread::sleep(Duration::from_secs(policy.delay_secs));
            }
            Err(e) => {
                error!(%stage, attempts = tries, error = %e, "stage failed");
                return Err(e);
            }
        }
    }
}

/// Run preprocess, train, evaluate and forecast in order, stopping at the
/// first stage that fails after its retries.
pub fn run_pipeline(config: &PipelineConfig) -> Result<()> {
    config.validate()?;
    for stage in Stage::ALL {
        info!(%stage, "stage starting");
        run_with_retry(config, stage, run_stage)?;
        info!(%stage, "stage finished");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RetryPolicy;
    use crate::error::ForecastError;

    fn config(retries: u32) -> PipelineConfig {
        let mut config = PipelineConfig::new("in", "models", "out");
        config.retry = RetryPolicy {
            retries,
            delay_secs: 0,
        };
        config
    }

    #[test]
    fn test_retry_until_success() {
        let mut calls = 0;
        let result = run_with_retry(&config(2), Stage::Train, |_, _| {
            calls += 1;
            if calls < 3 {
                Err(ForecastError::ValidationError("flaky".to_string()))
            } else {
                Ok(())
            }
        });

        assert!(result.is_ok());
        assert_eq!(calls, 3);
    }

    #[test]
    fn test_retry_budget_exhausted() {
        let mut calls = 0;
        let result = run_with_retry(&config(2), Stage::Evaluate, |_, _| {
            calls += 1;
            Err(ForecastError::ValidationError("broken".to_string()))
        });

        assert!(matches!(result, Err(ForecastError::ValidationError(_))));
        assert_eq!(calls, 3);
    }

    #[test]
    fn test_stage_order() {
        let names: Vec<&str> = Stage::ALL.iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["preprocess", "train", "evaluate", "forecast"]);
    }

    #[test]
    fn test_pipeline_stops_at_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = PipelineConfig::new(dir.path(), dir.path(), dir.path());
        config.retry = RetryPolicy {
            retries: 0,
            delay_secs: 0,
        };

        assert!(matches!(
            run_pipeline(&config),
            Err(ForecastError::MissingArtifact { .. })
        ));
        assert!(!config.metrics_path().exists());
    }
}
