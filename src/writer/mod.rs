//! Output of the cleaned member table.
//!
//! Records go through one Arrow batch, which is then written as an Excel
//! workbook or a Parquet file. An existing output file is never replaced.

use std::fs::File;
use std::path::{Path, PathBuf};

use arrow::array::{Array, ArrayRef, BooleanArray, Date32Array, Float64Array, StringArray};
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use arrow::util::display::array_value_to_string;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use chrono::{Datelike, NaiveDate};
use rust_xlsxwriter::{ExcelDateTime, Format, Workbook, Worksheet};

use crate::config::OutputFormat;
use crate::error::{CleanerError, Result};
use crate::models::{ArrowSchema, StudentRecord};
use crate::utils::logging::{log_operation_complete, log_operation_start};

/// Name of the worksheet holding the cleaned table
pub const SHEET_NAME: &str = "members";

/// Excel number format applied to date cells
pub const DATE_FORMAT: &str = "yyyy-mm-dd";

/// What happened to the output file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The table was written
    Written { path: PathBuf, rows: usize },
    /// A file already sat at the path; nothing was written
    AlreadyExists(PathBuf),
}

/// Convert cleaned records to an Arrow batch in output column order
pub fn records_to_batch(records: &[StudentRecord]) -> Result<RecordBatch> {
    StudentRecord::to_record_batch(records)
}

fn cell_error(what: &str, index: usize) -> CleanerError {
    CleanerError::SerializationError(format!("{what} {index} exceeds the worksheet limits"))
}

fn excel_date(date: NaiveDate) -> Result<ExcelDateTime> {
    let year = u16::try_from(date.year())
        .map_err(|_| CleanerError::SerializationError(format!("Date {date} is out of range for Excel")))?;
    // month and day always fit in a u8
    #[allow(clippy::cast_possible_truncation)]
    let (month, day) = (date.month() as u8, date.day() as u8);
    Ok(ExcelDateTime::from_ymd(year, month, day)?)
}

fn write_column(
    sheet: &mut Worksheet,
    col: u16,
    array: &ArrayRef,
    date_format: &Format,
) -> Result<()> {
    for idx in 0..array.len() {
        if array.is_null(idx) {
            continue;
        }
        let row = u32::try_from(idx + 1).map_err(|_| cell_error("Row", idx))?;

        match array.data_type() {
            DataType::Utf8 => {
                if let Some(values) = array.as_any().downcast_ref::<StringArray>() {
                    sheet.write_string(row, col, values.value(idx))?;
                }
            }
            DataType::Boolean => {
                if let Some(values) = array.as_any().downcast_ref::<BooleanArray>() {
                    sheet.write_boolean(row, col, values.value(idx))?;
                }
            }
            DataType::Float64 => {
                if let Some(values) = array.as_any().downcast_ref::<Float64Array>() {
                    sheet.write_number(row, col, values.value(idx))?;
                }
            }
            DataType::Date32 => {
                if let Some(date) = array
                    .as_any()
                    .downcast_ref::<Date32Array>()
                    .and_then(|values| values.value_as_date(idx))
                {
                    sheet.write_datetime_with_format(row, col, &excel_date(date)?, date_format)?;
                }
            }
            _ => {
                sheet.write_string(row, col, array_value_to_string(array, idx)?)?;
            }
        }
    }
    Ok(())
}

/// Write a batch as a single-sheet Excel workbook with a bold header row
///
/// # Errors
/// Returns an error if the batch exceeds the worksheet limits or the
/// workbook cannot be saved
pub fn write_xlsx(batch: &RecordBatch, path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();
    let date_format = Format::new().set_num_format(DATE_FORMAT);

    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;

    for (idx, (field, array)) in batch.schema().fields().iter().zip(batch.columns()).enumerate() {
        let col = u16::try_from(idx).map_err(|_| cell_error("Column", idx))?;
        sheet.write_string_with_format(0, col, field.name(), &header_format)?;
        write_column(sheet, col, array, &date_format)?;
    }
    sheet.set_freeze_panes(1, 0)?;

    workbook.save(path)?;
    Ok(())
}

/// Write a batch as a Snappy-compressed Parquet file
///
/// # Errors
/// Returns an error if the file cannot be created or written
pub fn write_parquet(batch: &RecordBatch, path: &Path) -> Result<()> {
    let file = File::create(path)?;
    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();

    let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props))?;
    writer.write(batch)?;
    writer.close()?;
    Ok(())
}

/// Write the records unless a file already exists at `path`
///
/// Creates the parent folder when missing.
///
/// # Errors
/// Returns an error if the folder cannot be created or the write fails
pub fn write_if_absent(
    records: &[StudentRecord],
    path: &Path,
    format: OutputFormat,
) -> Result<WriteOutcome> {
    if path.exists() {
        log::info!("Output already exists, not overwriting: {}", path.display());
        return Ok(WriteOutcome::AlreadyExists(path.to_path_buf()));
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    log_operation_start("Writing cleaned table to", path);
    let start = std::time::Instant::now();

    let batch = records_to_batch(records)?;
    match format {
        OutputFormat::Xlsx => write_xlsx(&batch, path)?,
        OutputFormat::Parquet => write_parquet(&batch, path)?,
    }

    log_operation_complete("wrote", path, batch.num_rows(), "rows", Some(start.elapsed()));
    Ok(WriteOutcome::Written {
        path: path.to_path_buf(),
        rows: batch.num_rows(),
    })
}
