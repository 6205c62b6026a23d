//! Per-field cleanup of raw rows
//!
//! Every function here is total: values that cannot be cleaned become
//! `None` (or blank segments in composite strings) and the record moves on.

use chrono::{NaiveDate, NaiveDateTime};

use crate::config::DateFormatConfig;
use crate::models::{RawStudentRow, StudentRecord};

/// Stateless field normaliser configured with the accepted date formats
#[derive(Debug, Clone, Default)]
pub struct FieldNormalizer {
    dates: DateFormatConfig,
}

impl FieldNormalizer {
    /// Create a normaliser that tries the given date formats
    #[must_use]
    pub const fn new(dates: DateFormatConfig) -> Self {
        Self { dates }
    }

    /// Build the composite student code `"SURNAME GIVEN - rawcode"`
    ///
    /// Missing parts become blank segments; the result is trimmed.
    #[must_use]
    pub fn build_student_code(
        last_name: Option<&str>,
        first_name: Option<&str>,
        raw_code: Option<&str>,
    ) -> String {
        format!(
            "{} {} - {}",
            last_name.unwrap_or_default().trim().to_uppercase(),
            first_name.unwrap_or_default().trim().to_uppercase(),
            raw_code.unwrap_or_default().trim()
        )
        .trim()
        .to_string()
    }

    /// Build the `"GIVEN SURNAME"` name used to tell apart records sharing a code
    #[must_use]
    pub fn build_student_name(first_name: Option<&str>, last_name: Option<&str>) -> String {
        format!(
            "{} {}",
            first_name.unwrap_or_default().trim().to_uppercase(),
            last_name.unwrap_or_default().trim().to_uppercase()
        )
        .trim()
        .to_string()
    }

    /// Strip `-` and `+` and surrounding whitespace from a phone number
    ///
    /// Whatever is left is kept as-is; the format is not validated.
    #[must_use]
    pub fn clean_phone(raw: Option<&str>) -> Option<String> {
        let cleaned: String = raw?.chars().filter(|c| !matches!(c, '-' | '+')).collect();
        let cleaned = cleaned.trim();
        (!cleaned.is_empty()).then(|| cleaned.to_string())
    }

    /// Lowercase and trim an email address
    #[must_use]
    pub fn normalize_email(raw: Option<&str>) -> Option<String> {
        let email = raw?.trim().to_lowercase();
        (!email.is_empty()).then_some(email)
    }

    /// Uppercase and trim a consultant name
    #[must_use]
    pub fn normalize_consultant(raw: Option<&str>) -> Option<String> {
        let consultant = raw?.trim().to_uppercase();
        (!consultant.is_empty()).then_some(consultant)
    }

    /// Parse a free-text date; unparsable values become `None`
    #[must_use]
    pub fn parse_date(&self, raw: Option<&str>) -> Option<NaiveDate> {
        let raw = raw?.trim();
        if raw.is_empty() {
            return None;
        }

        self.dates
            .date_formats
            .iter()
            .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
            .or_else(|| {
                self.dates
                    .datetime_formats
                    .iter()
                    .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
                    .map(|datetime| datetime.date())
            })
    }

    /// Parse a level column as a float; unparsable values become `None`
    #[must_use]
    pub fn parse_level(raw: Option<&str>) -> Option<f64> {
        raw?.trim().parse::<f64>().ok().filter(|level| level.is_finite())
    }

    /// Normalise every field of a raw row into a record with no derived attributes
    #[must_use]
    pub fn normalize(&self, raw: &RawStudentRow) -> StudentRecord {
        let student_code = Self::build_student_code(
            raw.last_name.as_deref(),
            raw.first_name.as_deref(),
            raw.student_code.as_deref(),
        );
        let student_name =
            Self::build_student_name(raw.first_name.as_deref(), raw.last_name.as_deref());

        StudentRecord {
            service_type: raw.service_type.as_ref().map(|s| s.trim().to_string()),
            consultant: Self::normalize_consultant(raw.consultant.as_deref()),
            start_date: self.parse_date(raw.start_date.as_deref()),
            end_date: self.parse_date(raw.end_date.as_deref()),
            date_of_birth: self.parse_date(raw.date_of_birth.as_deref()),
            email: Self::normalize_email(raw.email.as_deref()),
            mobile: Self::clean_phone(raw.mobile.as_deref()),
            contract_status: raw.contract_status.clone(),
            start_level: Self::parse_level(raw.start_level.as_deref()),
            current_level: Self::parse_level(raw.current_level.as_deref()),
            ..StudentRecord::new(student_code, student_name)
        }
    }
}
