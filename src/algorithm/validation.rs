//! Post-pipeline invariant checks
//!
//! Each check is independent and reports the offending values rather than a
//! bare boolean. Any failure aborts the run before output is written.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use itertools::Itertools;
use rustc_hash::FxHashMap;

use crate::config::ReferenceData;
use crate::error::{CleanerError, Result};
use crate::models::types::CORPORATE;
use crate::models::{Membership, StudentRecord};

/// A violated invariant of the cleaned table
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationFailure {
    /// The distinct tiers differ from the valid tier set
    #[error("memberships_filled: unexpected tiers {unexpected:?}, missing tiers {missing:?}")]
    MembershipsNotFilled {
        unexpected: Vec<String>,
        missing: Vec<String>,
    },

    /// Centers outside the taxonomy
    #[error("centers_filled: centers not in taxonomy {0:?}")]
    CentersNotFilled(Vec<String>),

    /// Areas that are not taxonomy keys
    #[error("areas_filled: areas not in taxonomy {0:?}")]
    AreasNotFilled(Vec<String>),

    /// CPT codes placed outside the Corporate center or area
    #[error("cpt_in_corporate_area: CPT records outside Corporate {0:?}")]
    CptOutsideCorporate(Vec<String>),

    /// Non-CPT codes placed in the Corporate center or area
    #[error("non_cpt_not_in_corporate_area: non-CPT records in Corporate {0:?}")]
    NonCptInCorporate(Vec<String>),

    /// Codes mapping to more than one name
    #[error("one_code_one_name: codes with several names {0:?}")]
    MultipleNamesPerCode(Vec<String>),
}

impl ValidationFailure {
    /// Name of the violated check
    #[must_use]
    pub const fn check_name(&self) -> &'static str {
        match self {
            Self::MembershipsNotFilled { .. } => "memberships_filled",
            Self::CentersNotFilled(_) => "centers_filled",
            Self::AreasNotFilled(_) => "areas_filled",
            Self::CptOutsideCorporate(_) => "cpt_in_corporate_area",
            Self::NonCptInCorporate(_) => "non_cpt_not_in_corporate_area",
            Self::MultipleNamesPerCode(_) => "one_code_one_name",
        }
    }
}

/// All failures found in one validation run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub failures: Vec<ValidationFailure>,
}

impl ValidationReport {
    /// Check if every invariant held
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.failures.is_empty()
    }

    /// Convert the report into an error if any invariant failed
    pub fn into_result(self) -> Result<()> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(CleanerError::Validation(self))
        }
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.failures.is_empty() {
            return f.write_str("all checks passed");
        }
        write!(f, "{} check(s) failed", self.failures.len())?;
        for failure in &self.failures {
            write!(f, "\n  - {failure}")?;
        }
        Ok(())
    }
}

/// Invariant checks over a cleaned table
#[derive(Debug, Clone)]
pub struct ValidationSuite {
    reference: Arc<ReferenceData>,
    check_one_code_one_name: bool,
}

impl ValidationSuite {
    /// Create a suite; the one-code-one-name check runs only when enabled
    #[must_use]
    pub const fn new(reference: Arc<ReferenceData>, check_one_code_one_name: bool) -> Self {
        Self {
            reference,
            check_one_code_one_name,
        }
    }

    /// The distinct tiers must be exactly Deluxe, Go and VIP
    pub fn memberships_filled(records: &[StudentRecord]) -> std::result::Result<(), ValidationFailure> {
        let present: BTreeSet<Membership> = records.iter().map(|r| r.membership).collect();
        let valid: BTreeSet<Membership> = Membership::valid_tiers().into_iter().collect();

        if present == valid {
            return Ok(());
        }

        Err(ValidationFailure::MembershipsNotFilled {
            unexpected: present.difference(&valid).map(ToString::to_string).collect(),
            missing: valid.difference(&present).map(ToString::to_string).collect(),
        })
    }

    /// Every center must be declared in the taxonomy
    pub fn centers_filled(&self, records: &[StudentRecord]) -> std::result::Result<(), ValidationFailure> {
        let unknown = distinct_sorted(
            records
                .iter()
                .map(|r| r.center.as_str())
                .filter(|center| !self.reference.taxonomy.contains_center(center)),
        );

        if unknown.is_empty() {
            Ok(())
        } else {
            Err(ValidationFailure::CentersNotFilled(unknown))
        }
    }

    /// Every area must be a taxonomy key
    pub fn areas_filled(&self, records: &[StudentRecord]) -> std::result::Result<(), ValidationFailure> {
        let unknown = distinct_sorted(
            records
                .iter()
                .map(|r| r.area.as_str())
                .filter(|area| !self.reference.taxonomy.contains_area(area)),
        );

        if unknown.is_empty() {
            Ok(())
        } else {
            Err(ValidationFailure::AreasNotFilled(unknown))
        }
    }

    /// CPT records must sit in the Corporate center and area
    pub fn cpt_in_corporate_area(records: &[StudentRecord]) -> std::result::Result<(), ValidationFailure> {
        let offending = distinct_sorted(
            records
                .iter()
                .filter(|r| r.is_cpt && (r.center != CORPORATE || r.area != CORPORATE))
                .map(|r| r.student_code.as_str()),
        );

        if offending.is_empty() {
            Ok(())
        } else {
            Err(ValidationFailure::CptOutsideCorporate(offending))
        }
    }

    /// Non-CPT records must stay out of the Corporate center and area
    pub fn non_cpt_not_in_corporate_area(
        records: &[StudentRecord],
    ) -> std::result::Result<(), ValidationFailure> {
        let offending = distinct_sorted(
            records
                .iter()
                .filter(|r| !r.is_cpt && (r.center == CORPORATE || r.area == CORPORATE))
                .map(|r| r.student_code.as_str()),
        );

        if offending.is_empty() {
            Ok(())
        } else {
            Err(ValidationFailure::NonCptInCorporate(offending))
        }
    }

    /// Each student code must map to exactly one name
    pub fn one_code_one_name(records: &[StudentRecord]) -> std::result::Result<(), ValidationFailure> {
        let mut names: FxHashMap<&str, BTreeSet<&str>> = FxHashMap::default();
        for record in records {
            names
                .entry(record.student_code.as_str())
                .or_default()
                .insert(record.student_name.as_str());
        }

        let offending = distinct_sorted(
            names
                .into_iter()
                .filter(|(_, names)| names.len() > 1)
                .map(|(code, _)| code),
        );

        if offending.is_empty() {
            Ok(())
        } else {
            Err(ValidationFailure::MultipleNamesPerCode(offending))
        }
    }

    /// Run every enabled check and collect the failures
    #[must_use]
    pub fn run(&self, records: &[StudentRecord]) -> ValidationReport {
        let mut checks = vec![
            Self::memberships_filled(records),
            self.centers_filled(records),
            self.areas_filled(records),
            Self::cpt_in_corporate_area(records),
            Self::non_cpt_not_in_corporate_area(records),
        ];
        if self.check_one_code_one_name {
            checks.push(Self::one_code_one_name(records));
        }

        let failures: Vec<ValidationFailure> = checks.into_iter().filter_map(|check| check.err()).collect();

        for failure in &failures {
            log::error!("Validation check {} failed: {failure}", failure.check_name());
        }
        if failures.is_empty() {
            log::info!("All validation checks passed for {} records", records.len());
        }

        ValidationReport { failures }
    }
}

fn distinct_sorted<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    values.sorted().dedup().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_display_lists_failures() {
        let report = ValidationReport {
            failures: vec![ValidationFailure::CentersNotFilled(vec!["NONE".to_string()])],
        };
        let text = report.to_string();
        assert!(text.starts_with("1 check(s) failed"));
        assert!(text.contains("centers_filled"));
        assert!(text.contains("NONE"));
    }

    #[test]
    fn test_empty_report_is_ok() {
        assert!(ValidationReport::default().into_result().is_ok());
    }

    #[test]
    fn test_distinct_sorted() {
        let values = ["b", "a", "b", "c"];
        assert_eq!(distinct_sorted(values.into_iter()), vec!["a", "b", "c"]);
    }
}
