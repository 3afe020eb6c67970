//! Trailing window calculations over a single ordered series
//!
//! Contains the building blocks for time-series features:
//! - Simple Moving Average (SMA) with a fixed period
//! - Lagged copies of a series
//! - Trailing means that respect missing observations

use crate::{MathError, Result};
use std::collections::VecDeque;

/// Simple Moving Average (SMA) implementation
#[derive(Debug, Clone)]
pub struct SimpleMovingAverage {
    period: usize,
    values: VecDeque<f64>,
    sum: f64,
}

impl SimpleMovingAverage {
    /// Create a new Simple Moving Average with the specified period
    pub fn new(period: usize) -> Result<Self> {
        if period == 0 {
            return Err(MathError::InvalidInput(
                "Period must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            period,
            values: VecDeque::with_capacity(period),
            sum: 0.0,
        })
    }

    /// Update the SMA with a new value
    pub fn update(&mut self, value: f64) {
        self.values.push_back(value);
        self.sum += value;

        if self.values.len() > self.period {
            if let Some(old_value) = self.values.pop_front() {
                self.sum -= old_value;
            }
        }
    }

    /// Whether a full period of values has been seen since the last reset
    pub fn is_ready(&self) -> bool {
        self.values.len() == self.period
    }

    /// Get the current SMA value
    pub fn value(&self) -> Result<f64> {
        if !self.is_ready() {
            return Err(MathError::InsufficientData(format!(
                "Not enough data for SMA calculation. Need {} values, have {}.",
                self.period,
                self.values.len()
            )));
        }

        Ok(self.sum / self.period as f64)
    }

    /// Get the current period
    pub fn period(&self) -> usize {
        self.period
    }

    /// Reset the SMA, clearing all values
    pub fn reset(&mut self) {
        self.values.clear();
        self.sum = 0.0;
    }
}

/// Shift a series forward by `periods` steps.
///
/// Position `i` of the result holds `values[i - periods]`; the first
/// `periods` positions have no predecessor and are `None`.
pub fn lagged(values: &[Option<f64>], periods: usize) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|i| if i >= periods { values[i - periods] } else { None })
        .collect()
}

/// Trailing mean over `window` positions ending at each index (inclusive).
///
/// A position yields `None` until a full window of present values is
/// available; a missing value anywhere in the window makes the mean missing.
pub fn trailing_means(values: &[Option<f64>], window: usize) -> Result<Vec<Option<f64>>> {
    let mut sma = SimpleMovingAverage::new(window)?;
    let mut means = Vec::with_capacity(values.len());

    for value in values {
        match value {
            Some(v) => {
                sma.update(*v);
                means.push(if sma.is_ready() { Some(sma.value()?) } else { None });
            }
            None => {
                sma.reset();
                means.push(None);
            }
        }
    }

    Ok(means)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sma_calculation() {
        let mut sma = SimpleMovingAverage::new(3).unwrap();

        // Not enough data yet
        assert!(sma.value().is_err());

        sma.update(2.0);
        sma.update(4.0);
        assert!(sma.value().is_err());

        sma.update(6.0);
        assert_eq!(sma.value().unwrap(), 4.0); // (2 + 4 + 6) / 3

        // The window slides, dropping the oldest value
        sma.update(8.0);
        assert_eq!(sma.value().unwrap(), 6.0); // (4 + 6 + 8) / 3
    }

    #[test]
    fn test_zero_period_rejected() {
        assert!(SimpleMovingAverage::new(0).is_err());
        assert!(trailing_means(&[Some(1.0)], 0).is_err());
    }

    #[test]
    fn test_lagged() {
        let series = vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0)];

        assert_eq!(lagged(&series, 1), vec![None, Some(1.0), Some(2.0), Some(3.0)]);
        assert_eq!(lagged(&series, 2), vec![None, None, Some(1.0), Some(2.0)]);
        assert_eq!(lagged(&series, 5), vec![None; 4]);
    }

    #[test]
    fn test_trailing_means_on_shifted_series() {
        let sales: Vec<Option<f64>> = (1..=6).map(|v| Some(v as f64)).collect();
        let means = trailing_means(&lagged(&sales, 1), 2).unwrap();

        // Position i averages sales[i-2] and sales[i-1]
        assert_eq!(means, vec![None, None, Some(1.5), Some(2.5), Some(3.5), Some(4.5)]);
    }

    #[test]
    fn test_trailing_means_gap_restarts_window() {
        let series = vec![Some(1.0), Some(3.0), None, Some(5.0), Some(7.0), Some(9.0)];
        let means = trailing_means(&series, 2).unwrap();

        assert_eq!(means, vec![None, Some(2.0), None, None, Some(6.0), Some(8.0)]);
    }
}
