//! Error handling for the member cleaner.
//!
//! Only the I/O collaborators, configuration loading and the validation
//! suite can fail. Field normalisation and classification degrade to
//! sentinel values instead of returning errors.

use std::io;
use std::path::PathBuf;

use arrow::error::ArrowError;
use parquet::errors::ParquetError;

use crate::algorithm::validation::ValidationReport;

/// Specialized error type for the cleaning pipeline
#[derive(Debug, thiserror::Error)]
pub enum CleanerError {
    /// Error opening, reading or creating a file
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    /// Error reading a source spreadsheet
    #[error("Spreadsheet error in {path}: {source}")]
    SpreadsheetError {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },

    /// Error writing the output workbook
    #[error("Workbook error: {0}")]
    WorkbookError(#[from] rust_xlsxwriter::XlsxError),

    /// Error building or reading Arrow data
    #[error("Arrow error: {0}")]
    ArrowError(#[from] ArrowError),

    /// Error writing Parquet output
    #[error("Parquet error: {0}")]
    ParquetError(#[from] ParquetError),

    /// Error converting between records and Arrow batches
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Invalid run configuration or reference data
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The raw table lacks columns the pipeline cannot do without
    #[error("Schema error: missing required columns {0:?}")]
    MissingColumns(Vec<String>),

    /// The input folder held no spreadsheets
    #[error("No input spreadsheets found in {}", .0.display())]
    NoInputFiles(PathBuf),

    /// The cleaned table violates one or more invariants
    #[error("Validation failed: {0}")]
    Validation(ValidationReport),
}

impl CleanerError {
    /// Create a configuration error from any displayable cause
    pub fn config<E: std::fmt::Display>(message: &str, error: E) -> Self {
        Self::ConfigError(format!("{message}: {error}"))
    }
}

impl From<serde_arrow::Error> for CleanerError {
    fn from(error: serde_arrow::Error) -> Self {
        Self::SerializationError(error.to_string())
    }
}

/// Result type for cleaner operations
pub type Result<T> = std::result::Result<T, CleanerError>;
