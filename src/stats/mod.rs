//! Stats module - income aggregation and change computation

mod calculator;

pub use calculator::{ChangeCalculator, CHANGE_PCT_COL};
