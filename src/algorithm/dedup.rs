//! Deduplication of student records
//!
//! Passes, in order:
//!
//! 1. Street Talk exclusion (only under [`StreetTalkPolicy::Exclude`])
//! 2. Keep-first collapse on `(student_code, date)`
//! 3. Keep-first collapse on `(student_code, student_name)`
//! 4. Multi-name disambiguation for codes still carrying several names
//!
//! Every pass keeps source order. Codes the heuristics cannot settle are
//! reported, not fixed; validation rejects them.

use itertools::Itertools;
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;

use crate::config::PipelineConfig;
use crate::models::{DedupKey, StreetTalkPolicy, StudentRecord};

/// Markers that exclude a record under the exclusion policy
pub const STREET_TALK_EXCLUSION_MARKERS: &[&str] = &["STREET TALK", "STREETTALK"];

/// Name fragments marking frozen accounts and corporate-sales aliases
const ALIAS_NAME_MARKERS: &[&str] = &["freeze", "cad_sales", "cad sales"];

/// Contract status of records dropped when a code has several emails
const INVALID_CONTRACT: &str = "Invalid";

/// Rows removed by each pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DedupReport {
    pub street_talk_dropped: usize,
    pub duplicate_date_dropped: usize,
    pub duplicate_name_dropped: usize,
    pub disambiguation_dropped: usize,
    /// Codes still carrying more than one name after disambiguation
    pub unresolved_codes: Vec<String>,
}

impl DedupReport {
    /// Total rows removed
    #[must_use]
    pub const fn total_dropped(&self) -> usize {
        self.street_talk_dropped
            + self.duplicate_date_dropped
            + self.duplicate_name_dropped
            + self.disambiguation_dropped
    }
}

/// Collapses records that describe the same enrollment or person
#[derive(Debug, Clone)]
pub struct DeduplicationEngine {
    street_talk: StreetTalkPolicy,
    key: DedupKey,
    collapse_same_name: bool,
    disambiguate: bool,
}

impl Default for DeduplicationEngine {
    fn default() -> Self {
        Self::from_config(&PipelineConfig::default())
    }
}

impl DeduplicationEngine {
    /// Create an engine with explicit policies
    #[must_use]
    pub const fn new(
        street_talk: StreetTalkPolicy,
        key: DedupKey,
        collapse_same_name: bool,
        disambiguate: bool,
    ) -> Self {
        Self {
            street_talk,
            key,
            collapse_same_name,
            disambiguate,
        }
    }

    /// Create an engine with the policies of a run configuration
    #[must_use]
    pub const fn from_config(config: &PipelineConfig) -> Self {
        Self::new(
            config.street_talk,
            config.dedup_key,
            config.collapse_same_name,
            config.disambiguate_names,
        )
    }

    /// Drop records whose code carries a Street Talk marker
    ///
    /// Returns the surviving records and the number dropped.
    #[must_use]
    pub fn exclude_street_talk(records: Vec<StudentRecord>) -> (Vec<StudentRecord>, usize) {
        let before = records.len();
        let kept: Vec<StudentRecord> = records
            .into_iter()
            .filter(|record| {
                let code = record.code_upper();
                !STREET_TALK_EXCLUSION_MARKERS
                    .iter()
                    .any(|marker| code.contains(marker))
            })
            .collect();
        let dropped = before - kept.len();
        (kept, dropped)
    }

    /// Keep the first record per `(student_code, date)`; null dates compare equal
    #[must_use]
    pub fn collapse_on_date(&self, records: Vec<StudentRecord>) -> (Vec<StudentRecord>, usize) {
        let key = self.key;
        keep_first(records, |record| {
            let date = match key {
                DedupKey::EndDate => record.end_date,
                DedupKey::StartDate => record.start_date,
            };
            (record.student_code.clone(), date)
        })
    }

    /// Keep the first record per `(student_code, student_name)`
    #[must_use]
    pub fn collapse_on_name(records: Vec<StudentRecord>) -> (Vec<StudentRecord>, usize) {
        keep_first(records, |record| {
            (record.student_code.clone(), record.student_name.clone())
        })
    }

    /// Settle codes that map to more than one name
    ///
    /// With a single distinct email under the code, frozen-account and
    /// corporate-sales aliases are dropped; otherwise records with an
    /// invalid contract are dropped. A group the heuristic would empty is
    /// left untouched.
    ///
    /// Returns the surviving records, the number dropped, and the codes
    /// that still carry several names.
    #[must_use]
    pub fn disambiguate_names(
        records: Vec<StudentRecord>,
    ) -> (Vec<StudentRecord>, usize, Vec<String>) {
        let groups = group_by_code(&records);
        let mut drop: FxHashSet<usize> = FxHashSet::default();
        let mut unresolved = Vec::new();

        for (code, indices) in &groups {
            if distinct_names(&records, indices.iter().copied()) < 2 {
                continue;
            }

            let emails = indices
                .iter()
                .map(|&idx| records[idx].email.as_deref())
                .unique()
                .count();

            let doomed: SmallVec<[usize; 4]> = indices
                .iter()
                .copied()
                .filter(|&idx| {
                    let record = &records[idx];
                    if emails == 1 {
                        is_alias_name(&record.student_name)
                    } else {
                        record.contract_status.as_deref() == Some(INVALID_CONTRACT)
                    }
                })
                .collect();

            if doomed.len() == indices.len() {
                log::debug!("Disambiguation would empty code {code}; leaving it for validation");
            } else {
                drop.extend(doomed.iter().copied());
            }

            let survivors = indices.iter().copied().filter(|idx| !drop.contains(idx));
            if distinct_names(&records, survivors) > 1 {
                unresolved.push((*code).to_string());
            }
        }

        let before = records.len();
        let kept: Vec<StudentRecord> = records
            .into_iter()
            .enumerate()
            .filter(|(idx, _)| !drop.contains(idx))
            .map(|(_, record)| record)
            .collect();
        let dropped = before - kept.len();

        (kept, dropped, unresolved)
    }

    /// Run every enabled pass in order
    #[must_use]
    pub fn deduplicate(&self, records: Vec<StudentRecord>) -> (Vec<StudentRecord>, DedupReport) {
        let mut report = DedupReport::default();

        let records = if self.street_talk == StreetTalkPolicy::Exclude {
            let (kept, dropped) = Self::exclude_street_talk(records);
            report.street_talk_dropped = dropped;
            kept
        } else {
            records
        };

        let (records, dropped) = self.collapse_on_date(records);
        report.duplicate_date_dropped = dropped;

        let records = if self.collapse_same_name {
            let (kept, dropped) = Self::collapse_on_name(records);
            report.duplicate_name_dropped = dropped;
            kept
        } else {
            records
        };

        let records = if self.disambiguate {
            let (kept, dropped, unresolved) = Self::disambiguate_names(records);
            report.disambiguation_dropped = dropped;
            report.unresolved_codes = unresolved;
            kept
        } else {
            records
        };

        log::info!(
            "Deduplication removed {} records ({} Street Talk, {} same {}, {} same name, {} disambiguated)",
            report.total_dropped(),
            report.street_talk_dropped,
            report.duplicate_date_dropped,
            self.key,
            report.duplicate_name_dropped,
            report.disambiguation_dropped
        );

        (records, report)
    }
}

/// Keep the first record for each key, in source order
fn keep_first<K, F>(records: Vec<StudentRecord>, key: F) -> (Vec<StudentRecord>, usize)
where
    K: std::hash::Hash + Eq,
    F: Fn(&StudentRecord) -> K,
{
    let before = records.len();
    let kept = records.into_iter().unique_by(|record| key(record)).collect_vec();
    let dropped = before - kept.len();
    (kept, dropped)
}

/// Record indices per student code, codes in order of first appearance
fn group_by_code(records: &[StudentRecord]) -> Vec<(&str, SmallVec<[usize; 4]>)> {
    let mut positions: FxHashMap<&str, usize> = FxHashMap::default();
    let mut groups: Vec<(&str, SmallVec<[usize; 4]>)> = Vec::new();

    for (idx, record) in records.iter().enumerate() {
        let code = record.student_code.as_str();
        let slot = *positions.entry(code).or_insert_with(|| {
            groups.push((code, SmallVec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(idx);
    }

    groups
}

fn distinct_names(records: &[StudentRecord], indices: impl Iterator<Item = usize>) -> usize {
    indices
        .map(|idx| records[idx].student_name.as_str())
        .unique()
        .count()
}

fn is_alias_name(name: &str) -> bool {
    let name = name.to_lowercase();
    ALIAS_NAME_MARKERS.iter().any(|marker| name.contains(marker))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alias_names() {
        assert!(is_alias_name("JOHN DOE FREEZE"));
        assert!(is_alias_name("JOHN CAD_SALES"));
        assert!(is_alias_name("John Cad Sales"));
        assert!(!is_alias_name("JOHN DOE"));
    }

    #[test]
    fn test_groups_keep_first_appearance_order() {
        let records = vec![
            StudentRecord::new("B - 1".to_string(), "X".to_string()),
            StudentRecord::new("A - 1".to_string(), "Y".to_string()),
            StudentRecord::new("B - 1".to_string(), "Z".to_string()),
        ];
        let groups = group_by_code(&records);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, "B - 1");
        assert_eq!(groups[0].1.as_slice(), &[0, 2]);
        assert_eq!(groups[1].1.as_slice(), &[1]);
    }
}
