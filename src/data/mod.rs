//! Data module - CSV loading and cleaning

mod loader;
mod processor;

pub use loader::DataLoader;
pub use processor::{ColumnMap, DataProcessor, INCOME_COL, YEAR_COL, ZIP_COL};
