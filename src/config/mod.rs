//! Configuration for a cleaning run.

pub mod reference;

pub use reference::ReferenceData;

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{CleanerError, Result};
use crate::models::types::{DedupKey, StreetTalkPolicy};

/// Format of the cleaned output file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// Excel workbook
    #[default]
    Xlsx,
    /// Parquet file
    Parquet,
}

/// Configuration for date format handling
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DateFormatConfig {
    /// Date formats tried in order
    pub date_formats: Vec<String>,
    /// Date-time formats tried in order when no date format matches
    pub datetime_formats: Vec<String>,
}

impl Default for DateFormatConfig {
    fn default() -> Self {
        Self {
            // Numeric day/month forms read month first, falling back to day
            // first when the leading number cannot be a month
            date_formats: vec![
                "%Y-%m-%d".to_string(), // ISO format: 2024-05-01
                "%m/%d/%Y".to_string(), // 05/01/2024
                "%d/%m/%Y".to_string(), // 31/05/2024
                "%m-%d-%Y".to_string(), // 05-01-2024
                "%d-%m-%Y".to_string(), // 31-05-2024
                "%m.%d.%Y".to_string(), // 05.01.2024
                "%d.%m.%Y".to_string(), // 31.05.2024
                "%Y/%m/%d".to_string(), // 2024/05/01
                "%Y%m%d".to_string(),   // Compact: 20240501
                "%d-%b-%Y".to_string(), // 01-May-2024
                "%d %b %Y".to_string(), // 01 May 2024
                "%d %B %Y".to_string(), // 01 May 2024, long month
            ],
            datetime_formats: vec![
                "%Y-%m-%d %H:%M:%S".to_string(),
                "%Y-%m-%dT%H:%M:%S".to_string(),
                "%Y-%m-%d %H:%M:%S%.f".to_string(),
                "%m/%d/%Y %H:%M:%S".to_string(),
                "%d/%m/%Y %H:%M:%S".to_string(),
                "%m/%d/%Y %H:%M".to_string(),
                "%d/%m/%Y %H:%M".to_string(),
            ],
        }
    }
}

/// Configuration for a monthly cleaning run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Month to clean, as `YYYY-MM`; names the input and output folders
    pub month: String,
    /// Root folder holding one subfolder of exports per month
    pub input_dir: PathBuf,
    /// Root folder receiving one subfolder of output per month
    pub output_dir: PathBuf,
    /// Output file name inside the month's output folder
    pub output_file: String,
    /// Output file format
    pub output_format: OutputFormat,
    /// Metadata rows above the header row in each export
    pub header_rows: usize,
    /// File extensions picked up from the input folder
    pub input_extensions: Vec<String>,
    /// Street Talk handling
    pub street_talk: StreetTalkPolicy,
    /// Date paired with the student code in the keep-first collapse
    pub dedup_key: DedupKey,
    /// Collapse exact re-submissions on `(student_code, student_name)`
    pub collapse_same_name: bool,
    /// Resolve codes carrying several names, and require one name per code
    pub disambiguate_names: bool,
    /// Free-text date parsing
    pub dates: DateFormatConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            month: "2024-05".to_string(),
            input_dir: PathBuf::from("input"),
            output_dir: PathBuf::from("output"),
            output_file: "coco_member.xlsx".to_string(),
            output_format: OutputFormat::Xlsx,
            header_rows: 6,
            input_extensions: vec!["xls".to_string(), "xlsx".to_string()],
            street_talk: StreetTalkPolicy::Classify,
            dedup_key: DedupKey::EndDate,
            collapse_same_name: true,
            disambiguate_names: true,
            dates: DateFormatConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Load a configuration from a TOML file; absent keys keep their defaults
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, does not parse, or
    /// names an invalid month
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)
            .map_err(|e| CleanerError::config(&format!("Failed to parse {}", path.display()), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Check the settings that cannot be expressed in the types
    ///
    /// # Errors
    /// Returns a configuration error for a malformed month, an empty output
    /// file name, or no input extensions
    pub fn validate(&self) -> Result<()> {
        NaiveDate::parse_from_str(&format!("{}-01", self.month), "%Y-%m-%d")
            .map_err(|e| CleanerError::config(&format!("Invalid month '{}'", self.month), e))?;

        if self.output_file.trim().is_empty() {
            return Err(CleanerError::ConfigError("Output file name is empty".to_string()));
        }
        if self.input_extensions.is_empty() {
            return Err(CleanerError::ConfigError("No input extensions configured".to_string()));
        }
        Ok(())
    }

    /// Folder holding this month's exports
    #[must_use]
    pub fn input_folder(&self) -> PathBuf {
        self.input_dir.join(&self.month)
    }

    /// Full path of this month's cleaned output
    #[must_use]
    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(&self.month).join(&self.output_file)
    }
}

impl fmt::Display for PipelineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Cleaning Configuration:")?;
        writeln!(f, "  Month: {}", self.month)?;
        writeln!(f, "  Input Folder: {}", self.input_folder().display())?;
        writeln!(f, "  Output Path: {}", self.output_path().display())?;
        writeln!(f, "  Output Format: {:?}", self.output_format)?;
        writeln!(f, "  Header Rows Skipped: {}", self.header_rows)?;
        writeln!(f, "  Street Talk: {:?}", self.street_talk)?;
        writeln!(f, "  Keep-First Key: {}", self.dedup_key)?;
        writeln!(f, "  Collapse Same Name: {}", self.collapse_same_name)?;
        writeln!(f, "  Disambiguate Names: {}", self.disambiguate_names)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: PipelineConfig =
            toml::from_str("month = \"2024-06\"\nstreet_talk = \"exclude\"\n").unwrap();

        assert_eq!(config.month, "2024-06");
        assert_eq!(config.street_talk, StreetTalkPolicy::Exclude);
        assert_eq!(config.header_rows, 6);
        assert_eq!(config.dedup_key, DedupKey::EndDate);
        assert_eq!(config.output_path(), PathBuf::from("output/2024-06/coco_member.xlsx"));
    }

    #[test]
    fn test_invalid_month_is_rejected() {
        let config = PipelineConfig {
            month: "2024-13".to_string(),
            ..PipelineConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
