//! Field extraction utilities for Arrow record batches
//!
//! This module provides utilities for extracting string values from the raw
//! table and for building string batches from spreadsheet rows.

use std::sync::Arc;

use arrow::array::{Array, ArrayRef, StringArray, new_null_array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;

use crate::error::{CleanerError, Result};

/// Get a string column from a record batch by name
///
/// # Returns
///
/// * `Ok(Some(&StringArray))` - The column, if present
/// * `Ok(None)` - If the batch has no column with this name
///
/// # Errors
///
/// Returns an error if the column exists but is not a string column
pub fn string_column<'a>(batch: &'a RecordBatch, column_name: &str) -> Result<Option<&'a StringArray>> {
    let Ok(idx) = batch.schema().index_of(column_name) else {
        return Ok(None);
    };

    batch
        .column(idx)
        .as_any()
        .downcast_ref::<StringArray>()
        .map(Some)
        .ok_or_else(|| {
            CleanerError::SerializationError(format!(
                "Column '{column_name}' is {:?}, expected Utf8",
                batch.column(idx).data_type()
            ))
        })
}

/// Extract a trimmed, non-empty string value from an optional column
#[must_use]
pub fn extract_string(array: Option<&StringArray>, row: usize) -> Option<String> {
    let array = array?;
    if row >= array.len() || array.is_null(row) {
        return None;
    }

    let value = array.value(row).trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Build a record batch of nullable string columns from row-major cells
///
/// # Errors
///
/// Returns an error if a row's width differs from the header or Arrow
/// rejects the batch
pub fn build_string_batch(columns: &[String], rows: &[Vec<Option<String>>]) -> Result<RecordBatch> {
    if let Some(bad) = rows.iter().position(|row| row.len() != columns.len()) {
        return Err(CleanerError::SerializationError(format!(
            "Row {bad} has {} cells, header has {}",
            rows[bad].len(),
            columns.len()
        )));
    }

    let fields: Vec<Field> = columns
        .iter()
        .map(|name| Field::new(name, DataType::Utf8, true))
        .collect();

    let arrays: Vec<ArrayRef> = (0..columns.len())
        .map(|col| {
            let values: StringArray = rows.iter().map(|row| row[col].as_deref()).collect();
            Arc::new(values) as ArrayRef
        })
        .collect();

    Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)?)
}

/// Reorder a string batch to the given columns, null-filling missing ones
///
/// # Errors
///
/// Returns an error if Arrow rejects the realigned batch
pub fn align_to_columns(batch: &RecordBatch, columns: &[String]) -> Result<RecordBatch> {
    let fields: Vec<Field> = columns
        .iter()
        .map(|name| Field::new(name, DataType::Utf8, true))
        .collect();

    let arrays: Vec<ArrayRef> = columns
        .iter()
        .map(|name| match batch.schema().index_of(name) {
            Ok(idx) => batch.column(idx).clone(),
            Err(_) => new_null_array(&DataType::Utf8, batch.num_rows()),
        })
        .collect();

    Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_and_extract() {
        let columns = vec!["first_name".to_string(), "email".to_string()];
        let rows = vec![
            vec![Some("Jane".to_string()), Some("  ".to_string())],
            vec![None, Some(" jane@x.id ".to_string())],
        ];
        let batch = build_string_batch(&columns, &rows).unwrap();

        let email = string_column(&batch, "email").unwrap();
        assert_eq!(extract_string(email, 0), None);
        assert_eq!(extract_string(email, 1), Some("jane@x.id".to_string()));
        assert!(string_column(&batch, "mobile").unwrap().is_none());
    }

    #[test]
    fn test_align_null_fills_missing_columns() {
        let batch = build_string_batch(&["a".to_string()], &[vec![Some("1".to_string())]]).unwrap();
        let aligned = align_to_columns(&batch, &["b".to_string(), "a".to_string()]).unwrap();

        assert_eq!(aligned.num_columns(), 2);
        assert!(aligned.column(0).is_null(0));
        assert_eq!(extract_string(string_column(&aligned, "a").unwrap(), 0), Some("1".to_string()));
    }
}
