//! Descriptive summary of the raw sales table

use crate::data::{RawSalesTable, TARGET_COLUMN};
use chrono::NaiveDate;
use statrs::statistics::{Data, Distribution, Max, Min};
use std::fmt;

/// Count, missing count and spread of one numeric column.
///
/// `std_dev` is the sample standard deviation and needs two values.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSummary {
    pub name: String,
    pub count: usize,
    pub missing: usize,
    pub mean: Option<f64>,
    pub std_dev: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl ColumnSummary {
    fn from_values(name: &str, values: &[Option<f64>]) -> Self {
        let present: Vec<f64> = values.iter().flatten().copied().collect();
        let count = present.len();
        let data = Data::new(present);
        let finite = |v: Option<f64>| v.filter(|v| v.is_finite());

        Self {
            name: name.to_string(),
            count,
            missing: values.len() - count,
            mean: finite(data.mean()),
            std_dev: finite(data.std_dev()),
            min: finite(Some(data.min())),
            max: finite(Some(data.max())),
        }
    }
}

/// Shape and per-column statistics of a raw table
#[derive(Debug, Clone, PartialEq)]
pub struct TableSummary {
    pub rows: usize,
    pub stores: usize,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    /// Target first, then regressors in input order
    pub columns: Vec<ColumnSummary>,
}

impl TableSummary {
    pub fn of(table: &RawSalesTable) -> Self {
        let records = table.records();

        let sales: Vec<Option<f64>> = records.iter().map(|r| r.weekly_sales).collect();
        let mut columns = vec![ColumnSummary::from_values(TARGET_COLUMN, &sales)];
        for (j, name) in table.regressor_names().iter().enumerate() {
            let values: Vec<Option<f64>> = records.iter().map(|r| r.regressors[j]).collect();
            columns.push(ColumnSummary::from_values(name, &values));
        }

        Self {
            rows: records.len(),
            stores: table.stores().len(),
            first_date: records.iter().map(|r| r.date).min(),
            last_date: records.iter().map(|r| r.date).max(),
            columns,
        }
    }
}

fn cell(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{:.2}", v))
}

impl fmt::Display for TableSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Rows: {} | Stores: {}", self.rows, self.stores)?;
        if let (Some(first), Some(last)) = (self.first_date, self.last_date) {
            writeln!(f, "Dates: {} to {}", first, last)?;
        }
        writeln!(
            f,
            "{:<16} {:>8} {:>8} {:>14} {:>14} {:>14} {:>14}",
            "column", "count", "missing", "mean", "std", "min", "max"
        )?;
        for c in &self.columns {
            writeln!(
                f,
                "{:<16} {:>8} {:>8} {:>14} {:>14} {:>14} {:>14}",
                c.name,
                c.count,
                c.missing,
                cell(c.mean),
                cell(c.std_dev),
                cell(c.min),
                cell(c.max)
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::SalesRecord;
    use approx::assert_relative_eq;

    fn table() -> RawSalesTable {
        let date = |d| NaiveDate::from_ymd_opt(2010, 2, d).unwrap();
        RawSalesTable::new(
            vec!["Temperature".to_string()],
            vec![
                SalesRecord {
                    store: 2,
                    date: date(12),
                    weekly_sales: Some(300.0),
                    regressors: vec![None],
                },
                SalesRecord {
                    store: 1,
                    date: date(5),
                    weekly_sales: Some(100.0),
                    regressors: vec![Some(40.0)],
                },
                SalesRecord {
                    store: 1,
                    date: date(19),
                    weekly_sales: None,
                    regressors: vec![Some(44.0)],
                },
            ],
        )
    }

    #[test]
    fn test_summary_counts() {
        let summary = TableSummary::of(&table());

        assert_eq!(summary.rows, 3);
        assert_eq!(summary.stores, 2);
        assert_eq!(summary.first_date, NaiveDate::from_ymd_opt(2010, 2, 5));
        assert_eq!(summary.last_date, NaiveDate::from_ymd_opt(2010, 2, 19));

        let sales = &summary.columns[0];
        assert_eq!((sales.count, sales.missing), (2, 1));
        assert_eq!(sales.mean, Some(200.0));
        assert_eq!((sales.min, sales.max), (Some(100.0), Some(300.0)));

        let temperature = &summary.columns[1];
        assert_eq!(temperature.name, "Temperature");
        assert_eq!(temperature.missing, 1);
        assert_relative_eq!(temperature.std_dev.unwrap(), 8.0_f64.sqrt());
        assert_eq!(sales.std_dev.map(|s| s.round()), Some(141.0));
    }

    #[test]
    fn test_empty_column_prints_dashes() {
        let summary = TableSummary::of(&RawSalesTable::new(vec![], vec![]));

        assert_eq!(summary.columns[0].mean, None);
        assert_eq!(summary.columns[0].min, None);
        assert!(summary.to_string().contains("Weekly_Sales"));
    }
}
