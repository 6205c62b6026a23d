//! A Rust library for cleaning monthly student-membership spreadsheet
//! exports: rule-based tier, corporate and center classification,
//! deduplication, and invariant validation before output.

pub mod algorithm;
pub mod config;
pub mod error;
pub mod models;
pub mod reader;
pub mod utils;
pub mod writer;

use std::sync::Arc;

// Re-export the most common types for easier use
// Core types
pub use config::{OutputFormat, PipelineConfig, ReferenceData};
pub use error::{CleanerError, Result};
pub use models::{Membership, RawStudentRow, Resolution, StudentRecord, UnresolvedReason};

// Pipeline components
pub use algorithm::{
    AreaResolver, CenterResolver, CenterTaxonomy, CleaningPipeline, CleaningStats,
    CorporateClassifier, DeduplicationEngine, FieldNormalizer, MembershipClassifier,
    ValidationReport, ValidationSuite,
};

// I/O collaborators
pub use reader::load_month;
pub use writer::{WriteOutcome, write_if_absent};

// Arrow types
pub use arrow::record_batch::RecordBatch;

/// Result of cleaning one month
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub stats: CleaningStats,
    pub write: WriteOutcome,
}

/// Load, clean, validate and write one month of exports
///
/// # Errors
/// Returns an error if the configuration is invalid, the exports cannot be
/// read, any validation check fails, or the output cannot be written. An
/// existing output file is not an error.
pub fn run_month(config: &PipelineConfig, reference: Arc<ReferenceData>) -> Result<RunOutcome> {
    config.validate()?;

    let batch = load_month(config)?;
    let rows = RawStudentRow::from_record_batch(&batch)?;

    let pipeline = CleaningPipeline::new(config, reference);
    let (records, stats) = pipeline.run(&rows)?;

    let write = write_if_absent(&records, &config.output_path(), config.output_format)?;
    Ok(RunOutcome { stats, write })
}
