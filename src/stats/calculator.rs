//! Income Change Calculator Module
//! Sums income per (ZIP, year) and computes year-over-year percentage change.

use crate::data::{INCOME_COL, YEAR_COL, ZIP_COL};
use polars::prelude::*;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::info;

pub const TOTAL_INCOME_COL: &str = "total_income";
pub const CHANGE_PCT_COL: &str = "change_pct";

#[derive(Error, Debug)]
pub enum AggregateError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("Missing required column '{0}'")]
    MissingColumn(&'static str),
}

/// Income totals for one (ZIP, year) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedRecord {
    pub zip_code: String,
    pub year: i64,
    pub total_income: f64,
    /// `None` for the first year of a ZIP, or when the previous total is zero.
    pub change_pct: Option<f64>,
}

/// Computes grouped income totals and their change over time.
pub struct ChangeCalculator;

impl ChangeCalculator {
    /// Percentage change from `prev` to `current`. Undefined for a zero base.
    pub fn percent_change(prev: f64, current: f64) -> Option<f64> {
        if prev == 0.0 {
            None
        } else {
            Some(100.0 * (current - prev) / prev)
        }
    }

    /// Sum income per (zip_code, year), ordered by ZIP then year.
    pub fn group_totals(df: &DataFrame) -> Result<BTreeMap<(String, i64), f64>, AggregateError> {
        for name in [ZIP_COL, YEAR_COL, INCOME_COL] {
            if !df.get_column_names().iter().any(|c| c.as_str() == name) {
                return Err(AggregateError::MissingColumn(name));
            }
        }

        let zips = df.column(ZIP_COL)?.str()?.clone();
        let years = df.column(YEAR_COL)?.cast(&DataType::Int64)?;
        let incomes = df.column(INCOME_COL)?.cast(&DataType::Float64)?;

        let mut totals: BTreeMap<(String, i64), f64> = BTreeMap::new();
        for ((zip, year), income) in (&zips)
            .into_iter()
            .zip(years.i64()?)
            .zip(incomes.f64()?)
        {
            if let (Some(zip), Some(year), Some(income)) = (zip, year, income) {
                *totals.entry((zip.to_string(), year)).or_insert(0.0) += income;
            }
        }
        Ok(totals)
    }

    /// Aggregate the income table into per-(ZIP, year) totals with change values.
    pub fn aggregate_records(df: &DataFrame) -> Result<Vec<AggregatedRecord>, AggregateError> {
        let totals = Self::group_totals(df)?;

        let mut records: Vec<AggregatedRecord> = Vec::with_capacity(totals.len());
        for ((zip_code, year), total_income) in totals {
            let change_pct = match records.last() {
                Some(prev) if prev.zip_code == zip_code => {
                    Self::percent_change(prev.total_income, total_income)
                }
                _ => None,
            };
            records.push(AggregatedRecord {
                zip_code,
                year,
                total_income,
                change_pct,
            });
        }
        Ok(records)
    }

    /// Build the aggregated table: [zip_code, year, total_income, change_pct].
    pub fn aggregate(df: &DataFrame) -> Result<DataFrame, AggregateError> {
        let records = Self::aggregate_records(df)?;

        let zips: Vec<&str> = records.iter().map(|r| r.zip_code.as_str()).collect();
        let years: Vec<i64> = records.iter().map(|r| r.year).collect();
        let totals: Vec<f64> = records.iter().map(|r| r.total_income).collect();
        let changes: Vec<Option<f64>> = records.iter().map(|r| r.change_pct).collect();

        let out = DataFrame::new(vec![
            Column::new(ZIP_COL.into(), zips),
            Column::new(YEAR_COL.into(), years),
            Column::new(TOTAL_INCOME_COL.into(), totals),
            Column::new(CHANGE_PCT_COL.into(), changes),
        ])?;

        info!(rows = out.height(), "aggregated income by ZIP and year");
        Ok(out)
    }
}
