//! Spreadsheet ingestion for monthly member exports.
//!
//! Each export carries metadata rows above a header row. Everything is read
//! as text into an Arrow batch of nullable string columns; typing happens in
//! the normaliser.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::compute::concat_batches;
use arrow::datatypes::Schema;
use arrow::record_batch::RecordBatch;
use calamine::{Data, Reader, open_workbook_auto};
use itertools::Itertools;
use rayon::prelude::*;

use crate::config::PipelineConfig;
use crate::error::{CleanerError, Result};
use crate::utils::arrow::{align_to_columns, build_string_batch};
use crate::utils::logging::{
    create_main_progress_bar, finish_progress_bar, log_operation_complete, log_operation_start,
    log_warning,
};
use crate::utils::validate_directory;

/// Prefix of the lock files spreadsheet editors leave next to open workbooks
const LOCK_FILE_PREFIX: &str = "~$";

/// Normalise a header cell: trimmed, lowercase, spaces as underscores
#[must_use]
pub fn normalize_column_name(name: &str) -> String {
    name.trim().to_lowercase().split_whitespace().join("_")
}

/// Render a cell as trimmed text; empty and error cells become `None`
#[must_use]
pub fn cell_to_string(cell: &Data) -> Option<String> {
    let text = match cell {
        Data::Empty | Data::Error(_) => return None,
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => {
            if f.fract() == 0.0 && f.abs() < 1e15 {
                #[allow(clippy::cast_possible_truncation)]
                let whole = *f as i64;
                whole.to_string()
            } else {
                f.to_string()
            }
        }
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt.as_datetime().map_or_else(
            || dt.as_f64().to_string(),
            |datetime| datetime.format("%Y-%m-%d %H:%M:%S").to_string(),
        ),
    };
    (!text.is_empty()).then_some(text)
}

/// Build a string batch from sheet rows
///
/// Skips `header_rows` metadata rows, takes the next row as the header and
/// drops data rows whose every cell is empty. A sheet too short to hold a
/// header yields an empty batch with no columns.
///
/// # Errors
/// Returns an error if Arrow rejects the batch
pub fn table_from_rows<'a>(
    rows: impl IntoIterator<Item = &'a [Data]>,
    header_rows: usize,
) -> Result<RecordBatch> {
    let mut rows = rows.into_iter().skip(header_rows);

    let Some(header) = rows.next() else {
        return Ok(RecordBatch::new_empty(Arc::new(Schema::empty())));
    };

    let columns: Vec<String> = header
        .iter()
        .enumerate()
        .map(|(idx, cell)| {
            cell_to_string(cell)
                .map(|name| normalize_column_name(&name))
                .unwrap_or_else(|| format!("unnamed_{idx}"))
        })
        .collect();

    let data: Vec<Vec<Option<String>>> = rows
        .map(|row| {
            (0..columns.len())
                .map(|idx| row.get(idx).and_then(cell_to_string))
                .collect::<Vec<_>>()
        })
        .filter(|cells| cells.iter().any(Option::is_some))
        .collect();

    build_string_batch(&columns, &data)
}

/// List the spreadsheets in a folder, sorted by file name
///
/// # Arguments
/// * `dir` - Folder holding one month's exports
/// * `extensions` - Accepted file extensions, without the dot
///
/// # Errors
/// Returns an error if the folder does not exist or cannot be listed
pub fn find_input_files(dir: &Path, extensions: &[String]) -> Result<Vec<PathBuf>> {
    log_operation_start("Searching for spreadsheets in", dir);
    validate_directory(dir)?;

    let files = std::fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()?
        .into_iter()
        .filter(|path| path.is_file())
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| !name.starts_with(LOCK_FILE_PREFIX))
        })
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| extensions.iter().any(|wanted| wanted.eq_ignore_ascii_case(ext)))
        })
        .sorted_by(|a, b| a.file_name().cmp(&b.file_name()))
        .collect_vec();

    if files.is_empty() {
        log_warning("No spreadsheets found in directory", Some(dir));
    } else {
        log_operation_complete("found", dir, files.len(), "spreadsheets", None);
    }

    Ok(files)
}

/// Read the first worksheet of a spreadsheet into a string batch
///
/// # Errors
/// Returns an error if the workbook cannot be opened or has no worksheet
pub fn read_sheet(path: &Path, header_rows: usize) -> Result<RecordBatch> {
    let spreadsheet_error = |source| CleanerError::SpreadsheetError {
        path: path.to_path_buf(),
        source,
    };

    let mut workbook = open_workbook_auto(path).map_err(spreadsheet_error)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| {
            CleanerError::ConfigError(format!("Workbook {} has no worksheets", path.display()))
        })?
        .map_err(spreadsheet_error)?;

    let batch = table_from_rows(range.rows(), header_rows)?;
    if batch.num_columns() == 0 {
        log_warning("Sheet too short to hold a header row", Some(path));
    }
    log::debug!("Read {} rows from {}", batch.num_rows(), path.display());
    Ok(batch)
}

/// Read every export of the configured month into one batch
///
/// Files are read in parallel and concatenated in file-name order. Columns
/// missing from a file are null-filled.
///
/// # Errors
/// Returns `NoInputFiles` if the month folder holds no spreadsheets, or
/// the first error met while reading a file
pub fn load_month(config: &PipelineConfig) -> Result<RecordBatch> {
    let folder = config.input_folder();
    let files = find_input_files(&folder, &config.input_extensions)?;
    if files.is_empty() {
        return Err(CleanerError::NoInputFiles(folder));
    }

    let start = std::time::Instant::now();
    let pb = create_main_progress_bar(files.len() as u64, Some("Reading spreadsheets"));

    let batches = files
        .par_iter()
        .map(|path| {
            let batch = read_sheet(path, config.header_rows);
            pb.inc(1);
            batch
        })
        .collect::<Result<Vec<_>>>()?;

    finish_progress_bar(&pb, Some("Spreadsheets read"));

    let columns: Vec<String> = batches
        .iter()
        .flat_map(|batch| {
            batch
                .schema()
                .fields()
                .iter()
                .map(|field| field.name().clone())
                .collect_vec()
        })
        .unique()
        .collect();

    let aligned = batches
        .iter()
        .map(|batch| align_to_columns(batch, &columns))
        .collect::<Result<Vec<_>>>()?;

    let schema = aligned
        .first()
        .map_or_else(|| Arc::new(Schema::empty()), RecordBatch::schema);
    let combined = concat_batches(&schema, &aligned)?;

    log_operation_complete("read", &folder, combined.num_rows(), "rows", Some(start.elapsed()));
    Ok(combined)
}
