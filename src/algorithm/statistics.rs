//! Run statistics for the cleaning pipeline
//!
//! Collects row counts per stage, unresolved classifications per reason,
//! the rules that decided each center, and the final tier distribution.

use std::collections::BTreeMap;
use std::fmt;

use crate::algorithm::dedup::DedupReport;
use crate::models::{Membership, Resolution, StudentRecord, UnresolvedReason};

/// Counters gathered over one cleaning run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleaningStats {
    /// Rows handed to the pipeline
    pub raw_rows: usize,
    /// Rows removed by each deduplication pass
    pub dedup: DedupReport,
    /// Centers left unresolved, per reason
    pub unresolved_centers: BTreeMap<UnresolvedReason, usize>,
    /// Areas left unresolved, per reason
    pub unresolved_areas: BTreeMap<UnresolvedReason, usize>,
    /// Records decided by each center rule
    pub center_rules: BTreeMap<&'static str, usize>,
    /// Surviving records per tier
    pub tiers: BTreeMap<Membership, usize>,
    /// Surviving CPT records
    pub cpt_rows: usize,
    /// Rows in the cleaned table
    pub output_rows: usize,
}

impl CleaningStats {
    /// Start counting a run over `raw_rows` rows
    #[must_use]
    pub fn new(raw_rows: usize) -> Self {
        Self {
            raw_rows,
            ..Self::default()
        }
    }

    /// Count a center decision
    pub fn record_center<T>(&mut self, rule: Option<&'static str>, resolution: &Resolution<T>) {
        if let Some(rule) = rule {
            *self.center_rules.entry(rule).or_insert(0) += 1;
        }
        if let Resolution::Unresolved(reason) = resolution {
            *self.unresolved_centers.entry(*reason).or_insert(0) += 1;
        }
    }

    /// Count an area decision
    pub fn record_area<T>(&mut self, resolution: &Resolution<T>) {
        if let Resolution::Unresolved(reason) = resolution {
            *self.unresolved_areas.entry(*reason).or_insert(0) += 1;
        }
    }

    /// Count the surviving records
    pub fn record_output(&mut self, records: &[StudentRecord]) {
        self.output_rows = records.len();
        self.cpt_rows = records.iter().filter(|r| r.is_cpt).count();
        self.tiers.clear();
        for record in records {
            *self.tiers.entry(record.membership).or_insert(0) += 1;
        }
    }

    /// Total unresolved centers and areas
    #[must_use]
    pub fn unresolved_total(&self) -> usize {
        self.unresolved_centers.values().sum::<usize>() + self.unresolved_areas.values().sum::<usize>()
    }

    /// Human-readable summary of the run
    #[must_use]
    pub fn summary(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for CleaningStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Cleaning Summary:")?;
        writeln!(f, "  Raw Rows: {}", self.raw_rows)?;
        writeln!(f, "  Street Talk Excluded: {}", self.dedup.street_talk_dropped)?;
        writeln!(f, "  Duplicate Code/Date Dropped: {}", self.dedup.duplicate_date_dropped)?;
        writeln!(f, "  Duplicate Code/Name Dropped: {}", self.dedup.duplicate_name_dropped)?;
        writeln!(f, "  Dropped by Disambiguation: {}", self.dedup.disambiguation_dropped)?;
        writeln!(f, "  Ambiguous Codes Left: {}", self.dedup.unresolved_codes.len())?;
        writeln!(f, "  Output Rows: {}", self.output_rows)?;
        writeln!(f, "  CPT Rows: {}", self.cpt_rows)?;

        if !self.tiers.is_empty() {
            writeln!(f, "\nMembership Distribution:")?;
            for (tier, count) in &self.tiers {
                let percentage = if self.output_rows > 0 {
                    (*count as f64 / self.output_rows as f64) * 100.0
                } else {
                    0.0
                };
                writeln!(f, "  {tier}: {count} ({percentage:.1}%)")?;
            }
        }

        if !self.center_rules.is_empty() {
            writeln!(f, "\nCenter Rules Applied:")?;
            for (rule, count) in &self.center_rules {
                writeln!(f, "  {rule}: {count}")?;
            }
        }

        if self.unresolved_total() > 0 {
            writeln!(f, "\nUnresolved:")?;
            for (reason, count) in &self.unresolved_centers {
                writeln!(f, "  center, {reason}: {count}")?;
            }
            for (reason, count) in &self.unresolved_areas {
                writeln!(f, "  area, {reason}: {count}")?;
            }
        }

        Ok(())
    }
}
