//! Arrow data handling utilities
//!
//! The raw spreadsheet table is held as an Arrow `RecordBatch` of nullable
//! string columns. These helpers build such batches and pull typed values
//! back out of them.

pub mod extractors;

// Re-export commonly used functions for convenience
pub use extractors::{align_to_columns, build_string_batch, extract_string, string_column};
