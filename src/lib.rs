//! # Weekly Sales
//!
//! Workspace facade for the weekly retail sales pipeline.
//!
//! - [`sales_math`]: window, statistics and regression-metric primitives
//! - [`sales_forecast`]: feature building, model training, evaluation and
//!   recursive forecasting
//!
//! ## Example
//!
//! ```
//! use weekly_sales_workspace::sales_math::{lagged, trailing_means};
//!
//! let sales = [Some(10.0), Some(12.0), Some(14.0), Some(16.0)];
//! let lag_1 = lagged(&sales, 1);
//! let means = trailing_means(&lag_1, 2).unwrap();
//!
//! assert_eq!(lag_1, vec![None, Some(10.0), Some(12.0), Some(14.0)]);
//! assert_eq!(means, vec![None, None, Some(11.0), Some(13.0)]);
//! ```

pub use sales_forecast;
pub use sales_math;
