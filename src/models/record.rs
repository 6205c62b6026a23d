//! Student record representation
//!
//! `RawStudentRow` is one spreadsheet row as read from the month's export.
//! `StudentRecord` is one row of the cleaned table. Derivation steps consume
//! a record and hand back an enriched copy through the `with_*` builders.

use std::sync::Arc;

use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{CleanerError, Result};
use crate::models::traits::ArrowSchema;
use crate::models::types::{Membership, NONE};
use crate::utils::arrow::{extract_string, string_column};

/// Raw columns the pipeline cannot run without
pub const REQUIRED_COLUMNS: &[&str] = &[
    "last_name",
    "first_name",
    "student_code",
    "service_type",
    "consultant",
];

/// One raw row of a source spreadsheet, all values as trimmed text
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawStudentRow {
    pub last_name: Option<String>,
    pub first_name: Option<String>,
    /// Raw numeric/alphanumeric code, before composite-code construction
    pub student_code: Option<String>,
    pub service_type: Option<String>,
    pub consultant: Option<String>,
    pub email: Option<String>,
    pub mobile: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub date_of_birth: Option<String>,
    pub contract_status: Option<String>,
    pub start_level: Option<String>,
    pub current_level: Option<String>,
}

impl RawStudentRow {
    /// Read raw rows from a batch of string columns
    ///
    /// Column names are expected to be normalised already (lowercase,
    /// underscores). Optional columns that are absent read as null.
    ///
    /// # Errors
    /// Returns `MissingColumns` if any required column is absent, or an
    /// error if a column is not a string column
    pub fn from_record_batch(batch: &RecordBatch) -> Result<Vec<Self>> {
        let schema = batch.schema();
        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|name| schema.index_of(name).is_err())
            .map(|name| (*name).to_string())
            .collect();
        if !missing.is_empty() {
            return Err(CleanerError::MissingColumns(missing));
        }

        let last_name = string_column(batch, "last_name")?;
        let first_name = string_column(batch, "first_name")?;
        let student_code = string_column(batch, "student_code")?;
        let service_type = string_column(batch, "service_type")?;
        let consultant = string_column(batch, "consultant")?;
        let email = string_column(batch, "email")?;
        let mobile = string_column(batch, "mobile")?;
        let start_date = string_column(batch, "start_date")?;
        let end_date = string_column(batch, "end_date")?;
        let date_of_birth = string_column(batch, "date_of_birth")?;
        let contract_status = string_column(batch, "contract_status")?;
        let start_level = string_column(batch, "start_level")?;
        let current_level = string_column(batch, "current_level")?;

        let rows = (0..batch.num_rows())
            .map(|row| Self {
                last_name: extract_string(last_name, row),
                first_name: extract_string(first_name, row),
                student_code: extract_string(student_code, row),
                service_type: extract_string(service_type, row),
                consultant: extract_string(consultant, row),
                email: extract_string(email, row),
                mobile: extract_string(mobile, row),
                start_date: extract_string(start_date, row),
                end_date: extract_string(end_date, row),
                date_of_birth: extract_string(date_of_birth, row),
                contract_status: extract_string(contract_status, row),
                start_level: extract_string(start_level, row),
                current_level: extract_string(current_level, row),
            })
            .collect();

        Ok(rows)
    }
}

/// One row of the cleaned membership table
///
/// Field order is the output column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentRecord {
    /// Composite code `"SURNAME GIVEN - rawcode"`
    pub student_code: String,
    /// Given name and surname, used to tell apart records sharing a code
    pub student_name: String,
    pub service_type: Option<String>,
    pub membership: Membership,
    pub is_cpt: bool,
    pub consultant: Option<String>,
    pub center: String,
    pub area: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub date_of_birth: Option<NaiveDate>,
    pub email: Option<String>,
    pub mobile: Option<String>,
    pub contract_status: Option<String>,
    pub start_level: Option<f64>,
    pub current_level: Option<f64>,
}

impl StudentRecord {
    /// Create a record with no derived attributes yet
    #[must_use]
    pub fn new(student_code: String, student_name: String) -> Self {
        Self {
            student_code,
            student_name,
            service_type: None,
            membership: Membership::Unspecified,
            is_cpt: false,
            consultant: None,
            center: NONE.to_string(),
            area: NONE.to_string(),
            start_date: None,
            end_date: None,
            date_of_birth: None,
            email: None,
            mobile: None,
            contract_status: None,
            start_level: None,
            current_level: None,
        }
    }

    /// Set the membership tier
    #[must_use]
    pub fn with_membership(mut self, membership: Membership) -> Self {
        self.membership = membership;
        self
    }

    /// Set the corporate/CPT flag
    #[must_use]
    pub fn with_cpt(mut self, is_cpt: bool) -> Self {
        self.is_cpt = is_cpt;
        self
    }

    /// Set the resolved center
    #[must_use]
    pub fn with_center(mut self, center: String) -> Self {
        self.center = center;
        self
    }

    /// Set the resolved area
    #[must_use]
    pub fn with_area(mut self, area: String) -> Self {
        self.area = area;
        self
    }

    /// Student code uppercased for marker matching
    #[must_use]
    pub fn code_upper(&self) -> String {
        self.student_code.to_uppercase()
    }
}

impl ArrowSchema for StudentRecord {
    fn schema() -> Schema {
        Schema::new(vec![
            Field::new("student_code", DataType::Utf8, false),
            Field::new("student_name", DataType::Utf8, false),
            Field::new("service_type", DataType::Utf8, true),
            Field::new("membership", DataType::Utf8, false),
            Field::new("is_cpt", DataType::Boolean, false),
            Field::new("consultant", DataType::Utf8, true),
            Field::new("center", DataType::Utf8, false),
            Field::new("area", DataType::Utf8, false),
            Field::new("start_date", DataType::Date32, true),
            Field::new("end_date", DataType::Date32, true),
            Field::new("date_of_birth", DataType::Date32, true),
            Field::new("email", DataType::Utf8, true),
            Field::new("mobile", DataType::Utf8, true),
            Field::new("contract_status", DataType::Utf8, true),
            Field::new("start_level", DataType::Float64, true),
            Field::new("current_level", DataType::Float64, true),
        ])
    }

    fn from_record_batch(batch: &RecordBatch) -> Result<Vec<Self>> {
        Ok(serde_arrow::from_record_batch(batch)?)
    }

    fn to_record_batch(records: &[Self]) -> Result<RecordBatch> {
        let fields: Vec<Arc<Field>> = Self::schema().fields().iter().cloned().collect();
        Ok(serde_arrow::to_record_batch(&fields, &records)?)
    }
}
