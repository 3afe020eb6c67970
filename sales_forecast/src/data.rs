//! Loading and persisting the sales tables
//!
//! Two tables flow between stages: the raw per-store weekly sales table
//! read by preprocessing, and the processed (scaled) feature table that
//! every later stage reads back from disk.

use crate::error::{ForecastError, Result};
use crate::utils::{require_artifact, write_atomic};
use chrono::NaiveDate;
use polars::prelude::*;
use std::collections::BTreeSet;
use std::fs::File;
use std::ops::Range;
use std::path::Path;

/// Store identifier column
pub const STORE_COLUMN: &str = "Store";
/// Week-ending date column
pub const DATE_COLUMN: &str = "Date";
/// Target column
pub const TARGET_COLUMN: &str = "Weekly_Sales";
/// Day-month-year pattern of the raw date column
pub const DATE_FORMAT: &str = "%d-%m-%Y";

/// One raw weekly observation for a store
#[derive(Debug, Clone, PartialEq)]
pub struct SalesRecord {
    pub store: i64,
    pub date: NaiveDate,
    pub weekly_sales: Option<f64>,
    /// Exogenous regressors, in the table's column order
    pub regressors: Vec<Option<f64>>,
}

/// Raw sales table for all stores
#[derive(Debug, Clone, PartialEq)]
pub struct RawSalesTable {
    regressor_names: Vec<String>,
    records: Vec<SalesRecord>,
}

/// Data loader for the raw sales table
#[derive(Debug)]
pub struct DataLoader;

impl DataLoader {
    /// Load the raw sales table from a CSV file
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<RawSalesTable> {
        let path = path.as_ref();
        require_artifact(path)?;

        let file = File::open(path)?;
        let df = CsvReader::new(file)
            .infer_schema(None)
            .has_header(true)
            .finish()?;

        Self::from_dataframe(&df)
    }

    /// Create the raw table from an existing DataFrame
    ///
    /// `Store`, `Date` and `Weekly_Sales` are required; every other column
    /// is treated as a numeric exogenous regressor.
    pub fn from_dataframe(df: &DataFrame) -> Result<RawSalesTable> {
        let names: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();
        for required in [STORE_COLUMN, DATE_COLUMN, TARGET_COLUMN] {
            if !names.iter().any(|n| n == required) {
                return Err(ForecastError::MissingColumn(required.to_string()));
            }
        }

        let stores = Self::column_as_i64(df, STORE_COLUMN)?;
        let dates = Self::column_as_dates(df, DATE_COLUMN)?;
        let sales = Self::column_as_f64(df, TARGET_COLUMN)?;

        let regressor_names: Vec<String> = names
            .into_iter()
            .filter(|n| n != STORE_COLUMN && n != DATE_COLUMN && n != TARGET_COLUMN)
            .collect();
        let regressors = regressor_names
            .iter()
            .map(|name| Self::column_as_f64(df, name))
            .collect::<Result<Vec<_>>>()?;

        let records = (0..df.height())
            .map(|i| SalesRecord {
                store: stores[i],
                date: dates[i],
                weekly_sales: sales[i],
                regressors: regressors.iter().map(|column| column[i]).collect(),
            })
            .collect();

        Ok(RawSalesTable::new(regressor_names, records))
    }

    /// Parse a raw day-month-year date
    pub fn parse_date(value: &str) -> Result<NaiveDate> {
        NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| {
            ForecastError::DateFormat {
                value: value.to_string(),
                expected: DATE_FORMAT.to_string(),
            }
        })
    }

    fn column_as_f64(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
        let series = df
            .column(name)?
            .strict_cast(&DataType::Float64)
            .map_err(|e| {
                ForecastError::SchemaError(format!("column '{}' is not numeric: {}", name, e))
            })?;
        let values = series.f64()?.into_iter().collect();
        Ok(values)
    }

    fn column_as_i64(df: &DataFrame, name: &str) -> Result<Vec<i64>> {
        let series = df
            .column(name)?
            .strict_cast(&DataType::Int64)
            .map_err(|e| {
                ForecastError::SchemaError(format!("column '{}' is not an integer id: {}", name, e))
            })?;
        let values = series.i64()?;
        values
            .into_iter()
            .enumerate()
            .map(|(row, v)| {
                v.ok_or_else(|| {
                    ForecastError::SchemaError(format!("column '{}' is null at row {}", name, row))
                })
            })
            .collect()
    }

    fn column_as_dates(df: &DataFrame, name: &str) -> Result<Vec<NaiveDate>> {
        let series = df.column(name)?;
        let values = series.utf8().map_err(|_| {
            ForecastError::SchemaError(format!(
                "column '{}' must hold {} text, found {}",
                name,
                DATE_FORMAT,
                series.dtype()
            ))
        })?;

        values
            .into_iter()
            .enumerate()
            .map(|(row, v)| match v {
                Some(text) => Self::parse_date(text),
                None => Err(ForecastError::SchemaError(format!(
                    "column '{}' is null at row {}",
                    name, row
                ))),
            })
            .collect()
    }
}

impl RawSalesTable {
    /// Create a raw table from records whose regressors follow `regressor_names`
    pub fn new(regressor_names: Vec<String>, records: Vec<SalesRecord>) -> Self {
        Self {
            regressor_names,
            records,
        }
    }

    pub fn regressor_names(&self) -> &[String] {
        &self.regressor_names
    }

    pub fn records(&self) -> &[SalesRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Sort by (store, date) ascending; ties keep their input order
    pub fn sort_by_store_and_date(&mut self) {
        self.records.sort_by_key(|r| (r.store, r.date));
    }

    /// Distinct store identifiers, ascending
    pub fn stores(&self) -> Vec<i64> {
        self.records
            .iter()
            .map(|r| r.store)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Consecutive row ranges sharing a store, assuming the table is sorted
    pub fn store_partitions(&self) -> Vec<(i64, Range<usize>)> {
        let mut partitions = Vec::new();
        let mut start = 0;

        for i in 1..=self.records.len() {
            if i == self.records.len() || self.records[i].store != self.records[start].store {
                partitions.push((self.records[start].store, start..i));
                start = i;
            }
        }

        partitions
    }
}

/// Scaled feature table plus the raw target, as persisted between stages
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedTable {
    feature_names: Vec<String>,
    rows: Vec<Vec<f64>>,
    target: Vec<f64>,
}

impl ProcessedTable {
    /// Create a processed table, checking every row has one value per feature
    pub fn new(feature_names: Vec<String>, rows: Vec<Vec<f64>>, target: Vec<f64>) -> Result<Self> {
        if rows.len() != target.len() {
            return Err(ForecastError::ValidationError(format!(
                "Rows length ({}) doesn't match target length ({})",
                rows.len(),
                target.len()
            )));
        }
        if let Some((i, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != feature_names.len())
        {
            return Err(ForecastError::ValidationError(format!(
                "Row {} has {} values, expected {}",
                i,
                row.len(),
                feature_names.len()
            )));
        }

        Ok(Self {
            feature_names,
            rows,
            target,
        })
    }

    /// Load a processed table written by [`ProcessedTable::save_csv`]
    pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        require_artifact(path)?;

        let file = File::open(path)?;
        let df = CsvReader::new(file)
            .infer_schema(None)
            .has_header(true)
            .finish()?;

        Self::from_dataframe(&df)
    }

    /// Write the table as CSV: feature columns in order, then the target
    pub fn save_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut df = self.to_dataframe()?;
        write_atomic(path.as_ref(), |writer| {
            CsvWriter::new(writer).has_header(true).finish(&mut df)?;
            Ok(())
        })
    }

    /// Build the table from a DataFrame holding `Weekly_Sales` and numeric features
    pub fn from_dataframe(df: &DataFrame) -> Result<Self> {
        let mut feature_names = Vec::new();
        let mut columns = Vec::new();
        let mut target = None;

        for series in df.get_columns() {
            let values = Self::non_null_f64(series)?;
            if series.name() == TARGET_COLUMN {
                target = Some(values);
            } else {
                feature_names.push(series.name().to_string());
                columns.push(values);
            }
        }

        let target = target.ok_or_else(|| ForecastError::MissingColumn(TARGET_COLUMN.to_string()))?;
        let rows = (0..df.height())
            .map(|i| columns.iter().map(|column| column[i]).collect())
            .collect();

        Self::new(feature_names, rows, target)
    }

    /// Convert to a DataFrame with the stable column order
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let mut columns: Vec<Series> = self
            .feature_names
            .iter()
            .enumerate()
            .map(|(j, name)| {
                Series::new(
                    name.as_str(),
                    self.rows.iter().map(|row| row[j]).collect::<Vec<f64>>(),
                )
            })
            .collect();
        columns.push(Series::new(TARGET_COLUMN, self.target.clone()));

        Ok(DataFrame::new(columns)?)
    }

    fn non_null_f64(series: &Series) -> Result<Vec<f64>> {
        let cast = series.strict_cast(&DataType::Float64).map_err(|e| {
            ForecastError::SchemaError(format!(
                "column '{}' is not numeric: {}",
                series.name(),
                e
            ))
        })?;
        let values = cast.f64()?;
        values
            .into_iter()
            .enumerate()
            .map(|(row, v)| {
                v.ok_or_else(|| {
                    ForecastError::SchemaError(format!(
                        "column '{}' is null at row {}",
                        series.name(),
                        row
                    ))
                })
            })
            .collect()
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Position of a feature column, if present
    pub fn feature_index(&self, name: &str) -> Option<usize> {
        self.feature_names.iter().position(|n| n == name)
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn target(&self) -> &[f64] {
        &self.target
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Feature rows and targets within `range`
    pub fn slice(&self, range: Range<usize>) -> (&[Vec<f64>], &[f64]) {
        (&self.rows[range.clone()], &self.target[range])
    }

    /// The most recent row and its target
    pub fn last(&self) -> Option<(&[f64], f64)> {
        self.rows
            .last()
            .zip(self.target.last())
            .map(|(row, target)| (row.as_slice(), *target))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{tempdir, NamedTempFile};

    fn sample_csv() -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "Store,Date,Weekly_Sales,Holiday_Flag,Temperature").unwrap();
        writeln!(file, "2,12-02-2010,200.5,1,38.5").unwrap();
        writeln!(file, "1,12-02-2010,100.0,1,40.1").unwrap();
        writeln!(file, "1,05-02-2010,90.0,0,42.3").unwrap();
        file
    }

    #[test]
    fn test_from_csv() {
        let file = sample_csv();
        let table = DataLoader::from_csv(file.path()).unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(table.regressor_names(), ["Holiday_Flag", "Temperature"]);
        assert_eq!(table.records()[0].store, 2);
        assert_eq!(
            table.records()[2].date,
            NaiveDate::from_ymd_opt(2010, 2, 5).unwrap()
        );
        assert_eq!(table.records()[1].regressors, vec![Some(1.0), Some(40.1)]);
        assert_eq!(table.stores(), vec![1, 2]);
    }

    #[test]
    fn test_sort_and_partitions() {
        let file = sample_csv();
        let mut table = DataLoader::from_csv(file.path()).unwrap();
        table.sort_by_store_and_date();

        let keys: Vec<(i64, f64)> = table
            .records()
            .iter()
            .map(|r| (r.store, r.weekly_sales.unwrap()))
            .collect();
        assert_eq!(keys, vec![(1, 90.0), (1, 100.0), (2, 200.5)]);
        assert_eq!(table.store_partitions(), vec![(1, 0..2), (2, 2..3)]);
    }

    #[test]
    fn test_missing_column() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "Store,Weekly_Sales").unwrap();
        writeln!(file, "1,100.0").unwrap();

        let result = DataLoader::from_csv(file.path());
        assert!(matches!(result, Err(ForecastError::MissingColumn(c)) if c == "Date"));
    }

    #[test]
    fn test_wrong_date_format() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "Store,Date,Weekly_Sales").unwrap();
        writeln!(file, "1,2010-02-05,100.0").unwrap();

        let result = DataLoader::from_csv(file.path());
        assert!(matches!(result, Err(ForecastError::DateFormat { .. })));
    }

    #[test]
    fn test_missing_input_file() {
        let result = DataLoader::from_csv("/nonexistent/walmart_sales.csv");
        assert!(matches!(result, Err(ForecastError::MissingArtifact { .. })));
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            DataLoader::parse_date("26-10-2012").unwrap(),
            NaiveDate::from_ymd_opt(2012, 10, 26).unwrap()
        );
        assert!(DataLoader::parse_date("10/26/2012").is_err());
    }

    #[test]
    fn test_processed_table_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("processed.csv");
        let table = ProcessedTable::new(
            vec!["a".to_string(), "b".to_string()],
            vec![vec![0.5, -1.25], vec![-0.5, 1.25]],
            vec![100.0, 101.5],
        )
        .unwrap();

        table.save_csv(&path).unwrap();
        let header = std::fs::read_to_string(&path).unwrap();
        assert!(header.starts_with("a,b,Weekly_Sales"));

        let loaded = ProcessedTable::load_csv(&path).unwrap();
        assert_eq!(loaded, table);
        assert_eq!(loaded.feature_index("b"), Some(1));
        assert_eq!(loaded.last(), Some((&[-0.5, 1.25][..], 101.5)));
    }

    #[test]
    fn test_processed_table_shape_checked() {
        let result = ProcessedTable::new(vec!["a".to_string()], vec![vec![1.0, 2.0]], vec![3.0]);
        assert!(matches!(result, Err(ForecastError::ValidationError(_))));
    }
}
