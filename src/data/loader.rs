//! CSV Directory Loader Module
//! Reads every CSV file in a directory and concatenates them using Polars.

use super::processor::MISSING_VALUES;
use polars::functions::concat_df_diagonal;
use polars::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse CSV {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: PolarsError,
    },
    #[error("Failed to combine CSV files: {0}")]
    Concat(#[from] PolarsError),
    #[error("No CSV files found in {0}")]
    NoFiles(PathBuf),
}

/// Loads a directory of SOI CSV files into a single DataFrame.
#[derive(Default)]
pub struct DataLoader {
    df: Option<DataFrame>,
    files: Vec<PathBuf>,
}

impl DataLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// List the CSV files directly inside `dir`, sorted by file name.
    pub fn list_csv_files(dir: &Path) -> Result<Vec<PathBuf>, LoaderError> {
        let io_err = |source| LoaderError::Io {
            path: dir.to_path_buf(),
            source,
        };

        let mut files = Vec::new();
        for entry in fs::read_dir(dir).map_err(io_err)? {
            let path = entry.map_err(io_err)?.path();
            let is_csv = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
            if is_csv && path.is_file() {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    /// Read one CSV file. Every column is read as a string; typing is
    /// left to the processor.
    pub fn read_csv(path: &Path) -> Result<DataFrame, LoaderError> {
        let parse_err = |source| LoaderError::Parse {
            path: path.to_path_buf(),
            source,
        };

        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(0))
            .map_parse_options(|opts| {
                opts.with_null_values(Some(NullValues::AllColumns(
                    MISSING_VALUES.iter().map(|v| (*v).into()).collect(),
                )))
            })
            .try_into_reader_with_file_path(Some(path.to_path_buf()))
            .map_err(parse_err)?
            .finish()
            .map_err(parse_err)?;

        debug!(file = %path.display(), rows = df.height(), "read csv");
        Ok(df)
    }

    /// Load and concatenate every CSV file in `dir`, in file-then-row order.
    pub fn load_dir(&mut self, dir: &Path) -> Result<&DataFrame, LoaderError> {
        let files = Self::list_csv_files(dir)?;
        if files.is_empty() {
            return Err(LoaderError::NoFiles(dir.to_path_buf()));
        }

        let frames = files
            .iter()
            .map(|path| Self::read_csv(path))
            .collect::<Result<Vec<_>, _>>()?;

        let df = concat_df_diagonal(&frames)?;

        info!(
            dir = %dir.display(),
            files = files.len(),
            rows = df.height(),
            "loaded SOI records"
        );

        self.files = files;
        Ok(&*self.df.insert(df))
    }

    /// Get list of column names from loaded DataFrame.
    pub fn get_columns(&self) -> Vec<String> {
        self.df
            .as_ref()
            .map(|df| {
                df.get_column_names()
                    .iter()
                    .map(|s| s.to_string())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Get the number of rows in the DataFrame.
    pub fn get_row_count(&self) -> usize {
        self.df.as_ref().map(|df| df.height()).unwrap_or(0)
    }

    /// Files read by the last successful load.
    pub fn get_files(&self) -> &[PathBuf] {
        &self.files
    }
}
