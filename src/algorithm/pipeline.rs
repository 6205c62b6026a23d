//! The cleaning pipeline
//!
//! Composes the components in a fixed order:
//! normalise → tier → CPT flag → center → area → deduplicate → validate.
//! Each stage returns new records; nothing is mutated in place across
//! stages. Per-record stages run on the rayon pool and keep source order.

use std::sync::Arc;

use rayon::prelude::*;

use crate::algorithm::area::AreaResolver;
use crate::algorithm::center::{CenterResolver, CenterSignals};
use crate::algorithm::corporate::CorporateClassifier;
use crate::algorithm::dedup::DeduplicationEngine;
use crate::algorithm::membership::MembershipClassifier;
use crate::algorithm::normalize::FieldNormalizer;
use crate::algorithm::statistics::CleaningStats;
use crate::algorithm::validation::{ValidationReport, ValidationSuite};
use crate::config::{PipelineConfig, ReferenceData};
use crate::error::Result;
use crate::models::{RawStudentRow, Resolution, StudentRecord};

/// A record with its derived fields and the decisions behind them
struct Classified {
    record: StudentRecord,
    center_rule: Option<&'static str>,
    center: Resolution<String>,
    area: Resolution<String>,
}

/// Turns raw export rows into a validated member table
#[derive(Debug)]
pub struct CleaningPipeline {
    normalizer: FieldNormalizer,
    membership: MembershipClassifier,
    corporate: CorporateClassifier,
    centers: CenterResolver,
    areas: AreaResolver,
    dedup: DeduplicationEngine,
    validation: ValidationSuite,
}

impl CleaningPipeline {
    /// Build a pipeline for one run configuration
    #[must_use]
    pub fn new(config: &PipelineConfig, reference: Arc<ReferenceData>) -> Self {
        Self {
            normalizer: FieldNormalizer::new(config.dates.clone()),
            membership: MembershipClassifier::new(),
            corporate: CorporateClassifier::new(Arc::clone(&reference)),
            centers: CenterResolver::with_policy(Arc::clone(&reference), config.street_talk),
            areas: AreaResolver::new(Arc::clone(&reference)),
            dedup: DeduplicationEngine::from_config(config),
            validation: ValidationSuite::new(reference, config.disambiguate_names),
        }
    }

    fn classify(&self, raw: &RawStudentRow) -> Classified {
        let record = self.normalizer.normalize(raw);
        let record = self.membership.apply(record);
        let record = self.corporate.apply(record);

        let (center_rule, center) = self
            .centers
            .resolve_with_rule(&CenterSignals::from_record(&record));
        let record = record.with_center(center.clone().into_value_or_sentinel());

        let area = self.areas.resolve(Some(&record.center));
        let record = record.with_area(area.clone().into_value_or_sentinel());

        Classified {
            record,
            center_rule,
            center,
            area,
        }
    }

    /// Normalise, classify and deduplicate the rows without validating
    #[must_use]
    pub fn clean(&self, rows: &[RawStudentRow]) -> (Vec<StudentRecord>, CleaningStats) {
        let mut stats = CleaningStats::new(rows.len());
        log::info!("Cleaning {} raw rows", rows.len());

        let classified: Vec<Classified> = rows.par_iter().map(|raw| self.classify(raw)).collect();

        let mut records = Vec::with_capacity(classified.len());
        for item in classified {
            stats.record_center(item.center_rule, &item.center);
            stats.record_area(&item.area);

            if let Resolution::Unresolved(reason) = &item.center {
                log::debug!("Center unresolved for {}: {reason}", item.record.student_code);
            }
            if let Resolution::Unresolved(reason) = &item.area {
                log::debug!("Area unresolved for {}: {reason}", item.record.student_code);
            }
            records.push(item.record);
        }
        log::info!("Classified {} records", records.len());

        for (reason, count) in &stats.unresolved_centers {
            log::warn!("{count} records without a center ({reason})");
        }
        for (reason, count) in &stats.unresolved_areas {
            log::warn!("{count} records without an area ({reason})");
        }

        let (records, report) = self.dedup.deduplicate(records);
        for code in &report.unresolved_codes {
            log::debug!("Code still carries several names after disambiguation: {code}");
        }
        if !report.unresolved_codes.is_empty() {
            log::warn!(
                "{} codes still carry several names after disambiguation",
                report.unresolved_codes.len()
            );
        }
        stats.dedup = report;
        stats.record_output(&records);
        log::info!("{} records after deduplication", records.len());

        (records, stats)
    }

    /// Run the invariant checks over a cleaned table
    #[must_use]
    pub fn validate(&self, records: &[StudentRecord]) -> ValidationReport {
        self.validation.run(records)
    }

    /// Clean the rows and validate the result
    ///
    /// # Errors
    /// Returns [`crate::error::CleanerError::Validation`] listing every
    /// violated invariant; no records are returned in that case
    pub fn run(&self, rows: &[RawStudentRow]) -> Result<(Vec<StudentRecord>, CleaningStats)> {
        let (records, stats) = self.clean(rows);
        self.validate(&records).into_result()?;
        log::info!("{}", stats.summary());
        Ok((records, stats))
    }
}
