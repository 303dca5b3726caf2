//! Data Processor Module
//! Projects raw SOI records to (zip_code, year, income) and selects ZIP series.

use polars::prelude::*;
use thiserror::Error;
use tracing::{debug, info};

/// Canonical width of a ZIP code.
pub const ZIP_WIDTH: usize = 5;

pub const ZIP_COL: &str = "zip_code";
pub const YEAR_COL: &str = "year";
pub const INCOME_COL: &str = "income";

/// Cell text treated as a missing value.
pub const MISSING_VALUES: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

#[derive(Error, Debug)]
pub enum ProcessorError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("Missing required column '{0}'")]
    MissingColumn(String),
    #[error("Invalid value {value:?} in column '{column}' at row {row}")]
    InvalidValue {
        column: String,
        row: usize,
        value: String,
    },
}

/// Names of the source columns holding the three fields used downstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    pub zip: String,
    pub year: String,
    pub income: String,
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self {
            zip: "zipcode".to_string(),
            year: "year".to_string(),
            income: "A00100".to_string(),
        }
    }
}

/// One cleaned row of the income table.
#[derive(Debug, Clone, PartialEq)]
pub struct IncomeRecord {
    pub zip_code: String,
    pub year: i64,
    pub income: f64,
}

/// Handles data cleaning and selection operations.
pub struct DataProcessor;

impl DataProcessor {
    /// Zero-pad a ZIP code to 5 characters. Longer values are left as-is.
    pub fn normalize_zip(raw: &str) -> String {
        format!("{:0>width$}", raw.trim(), width = ZIP_WIDTH)
    }

    /// Fetch a column as strings, mapping absence to a schema error.
    fn string_column(df: &DataFrame, name: &str) -> Result<StringChunked, ProcessorError> {
        if !df.get_column_names().iter().any(|c| c.as_str() == name) {
            return Err(ProcessorError::MissingColumn(name.to_string()));
        }
        let column = df.column(name)?.cast(&DataType::String)?;
        Ok(column.str()?.clone())
    }

    /// Trimmed cell text, or `None` when the cell is blank or a missing marker.
    fn present(value: Option<&str>) -> Option<&str> {
        value
            .map(str::trim)
            .filter(|v| !v.is_empty() && !MISSING_VALUES.contains(v))
    }

    /// Parse a year, accepting integral floats such as `2020.0`.
    fn parse_year(column: &str, row: usize, value: &str) -> Result<i64, ProcessorError> {
        if let Ok(year) = value.parse::<i64>() {
            return Ok(year);
        }
        match value.parse::<f64>() {
            Ok(v) if v.is_finite() && v.fract() == 0.0 => Ok(v as i64),
            _ => Err(ProcessorError::InvalidValue {
                column: column.to_string(),
                row,
                value: value.to_string(),
            }),
        }
    }

    fn parse_field<T: std::str::FromStr>(
        column: &str,
        row: usize,
        value: &str,
    ) -> Result<T, ProcessorError> {
        value
            .parse::<T>()
            .map_err(|_| ProcessorError::InvalidValue {
                column: column.to_string(),
                row,
                value: value.to_string(),
            })
    }

    /// Project the raw table to income records, dropping incomplete rows.
    pub fn income_records(
        df: &DataFrame,
        columns: &ColumnMap,
    ) -> Result<Vec<IncomeRecord>, ProcessorError> {
        let zips = Self::string_column(df, &columns.zip)?;
        let years = Self::string_column(df, &columns.year)?;
        let incomes = Self::string_column(df, &columns.income)?;

        let mut records = Vec::with_capacity(df.height());
        let mut overlong = 0usize;

        for (row, ((zip, year), income)) in (&zips)
            .into_iter()
            .zip(&years)
            .zip(&incomes)
            .enumerate()
        {
            let (Some(zip), Some(year), Some(income)) =
                (Self::present(zip), Self::present(year), Self::present(income))
            else {
                continue;
            };

            let year = Self::parse_year(&columns.year, row, year)?;
            let income: f64 = Self::parse_field(&columns.income, row, income)?;
            if income.is_nan() {
                continue;
            }

            let zip_code = Self::normalize_zip(zip);
            if zip_code.chars().count() > ZIP_WIDTH {
                overlong += 1;
            }

            records.push(IncomeRecord {
                zip_code,
                year,
                income,
            });
        }

        if overlong > 0 {
            debug!(overlong, "ZIP codes longer than 5 characters kept as-is");
        }
        info!(
            kept = records.len(),
            dropped = df.height() - records.len(),
            "preprocessed income records"
        );

        Ok(records)
    }

    /// Build the income table: columns [zip_code, year, income].
    pub fn prepare_income(df: &DataFrame, columns: &ColumnMap) -> Result<DataFrame, ProcessorError> {
        let records = Self::income_records(df, columns)?;
        Ok(Self::records_to_frame(&records)?)
    }

    pub fn records_to_frame(records: &[IncomeRecord]) -> PolarsResult<DataFrame> {
        let zips: Vec<&str> = records.iter().map(|r| r.zip_code.as_str()).collect();
        let years: Vec<i64> = records.iter().map(|r| r.year).collect();
        let incomes: Vec<f64> = records.iter().map(|r| r.income).collect();

        DataFrame::new(vec![
            Column::new(ZIP_COL.into(), zips),
            Column::new(YEAR_COL.into(), years),
            Column::new(INCOME_COL.into(), incomes),
        ])
    }

    /// Rows for one ZIP code, sorted by year. An unknown ZIP yields an empty frame.
    pub fn filter_by_zip(df: &DataFrame, zip_code: &str) -> Result<DataFrame, ProcessorError> {
        let filtered = df
            .clone()
            .lazy()
            .filter(col(ZIP_COL).eq(lit(zip_code)))
            .sort([YEAR_COL], SortMultipleOptions::default())
            .collect()?;
        Ok(filtered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(zips: &[Option<&str>], years: &[Option<&str>], incomes: &[Option<&str>]) -> DataFrame {
        DataFrame::new(vec![
            Column::new("zipcode".into(), zips),
            Column::new("year".into(), years),
            Column::new("A00100".into(), incomes),
            Column::new("STATE".into(), vec![Some("NY"); zips.len()]),
        ])
        .unwrap()
    }

    #[test]
    fn pads_short_zip_codes() {
        assert_eq!(DataProcessor::normalize_zip("1"), "00001");
        assert_eq!(DataProcessor::normalize_zip("2134"), "02134");
        assert_eq!(DataProcessor::normalize_zip("10001"), "10001");
    }

    #[test]
    fn long_zip_codes_pass_through() {
        assert_eq!(DataProcessor::normalize_zip("100011234"), "100011234");
    }

    #[test]
    fn drops_rows_missing_income() {
        let df = raw(
            &[Some("1"), Some("2"), Some("3")],
            &[Some("2020"), Some("2020"), Some("2020")],
            &[Some("10"), None, Some("")],
        );
        let records = DataProcessor::income_records(&df, &ColumnMap::default()).unwrap();
        assert_eq!(
            records,
            vec![IncomeRecord {
                zip_code: "00001".to_string(),
                year: 2020,
                income: 10.0,
            }]
        );
    }

    #[test]
    fn drops_rows_with_nan_or_na_income() {
        let df = raw(
            &[Some("1"), Some("1"), Some("1"), Some("2")],
            &[Some("2020"), Some("2020"), Some("2021"), Some("2020")],
            &[Some("100"), Some("NaN"), Some("150"), Some("NA")],
        );
        let records = DataProcessor::income_records(&df, &ColumnMap::default()).unwrap();
        let incomes: Vec<_> = records.iter().map(|r| (r.year, r.income)).collect();
        assert_eq!(incomes, vec![(2020, 100.0), (2021, 150.0)]);
        assert!(records.iter().all(|r| r.zip_code == "00001"));
    }

    #[test]
    fn missing_markers_in_any_field_drop_the_row() {
        let df = raw(
            &[Some("N/A"), Some("3"), Some("4")],
            &[Some("2020"), Some("null"), Some("2020")],
            &[Some("1"), Some("2"), Some("-nan")],
        );
        let records = DataProcessor::income_records(&df, &ColumnMap::default()).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn integral_float_years_are_accepted() {
        let df = raw(&[Some("1")], &[Some("2020.0")], &[Some("5")]);
        let records = DataProcessor::income_records(&df, &ColumnMap::default()).unwrap();
        assert_eq!(records[0].year, 2020);

        let df = raw(&[Some("1")], &[Some("2020.5")], &[Some("5")]);
        let err = DataProcessor::income_records(&df, &ColumnMap::default()).unwrap_err();
        assert!(matches!(err, ProcessorError::InvalidValue { row: 0, .. }));
    }

    #[test]
    fn overlong_zip_counts_characters() {
        assert_eq!(DataProcessor::normalize_zip("é1").chars().count(), ZIP_WIDTH);
        assert_eq!(DataProcessor::normalize_zip("é1"), "000é1");
    }

    #[test]
    fn output_has_three_columns_in_row_order() {
        let df = raw(
            &[Some("20"), Some("10")],
            &[Some("2021"), Some("2020")],
            &[Some("1.5"), Some("2")],
        );
        let out = DataProcessor::prepare_income(&df, &ColumnMap::default()).unwrap();
        let names: Vec<_> = out.get_column_names().iter().map(|c| c.to_string()).collect();
        assert_eq!(names, vec![ZIP_COL, YEAR_COL, INCOME_COL]);
        let zips: Vec<_> = out.column(ZIP_COL).unwrap().str().unwrap().into_iter().collect();
        assert_eq!(zips, vec![Some("00020"), Some("00010")]);
        assert_eq!(out.column(INCOME_COL).unwrap().f64().unwrap().get(0), Some(1.5));
    }

    #[test]
    fn missing_column_is_schema_error() {
        let df = raw(&[Some("1")], &[Some("2020")], &[Some("5")]);
        let columns = ColumnMap {
            income: "N1".to_string(),
            ..ColumnMap::default()
        };
        let err = DataProcessor::prepare_income(&df, &columns).unwrap_err();
        assert!(matches!(err, ProcessorError::MissingColumn(name) if name == "N1"));
    }

    #[test]
    fn unparsable_year_is_reported() {
        let df = raw(&[Some("1")], &[Some("20x0")], &[Some("5")]);
        let err = DataProcessor::prepare_income(&df, &ColumnMap::default()).unwrap_err();
        assert!(matches!(err, ProcessorError::InvalidValue { row: 0, .. }));
    }

    #[test]
    fn filter_sorts_by_year_and_tolerates_unknown_zip() {
        let df = DataProcessor::records_to_frame(&[
            IncomeRecord { zip_code: "00001".into(), year: 2021, income: 2.0 },
            IncomeRecord { zip_code: "00002".into(), year: 2020, income: 3.0 },
            IncomeRecord { zip_code: "00001".into(), year: 2020, income: 1.0 },
        ])
        .unwrap();

        let one = DataProcessor::filter_by_zip(&df, "00001").unwrap();
        let years: Vec<_> = one.column(YEAR_COL).unwrap().i64().unwrap().into_iter().collect();
        assert_eq!(years, vec![Some(2020), Some(2021)]);

        let none = DataProcessor::filter_by_zip(&df, "99999").unwrap();
        assert_eq!(none.height(), 0);
    }
}
