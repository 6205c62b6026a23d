//! Corporate/CPT classification

use std::sync::{Arc, LazyLock};

use regex::Regex;

use crate::config::ReferenceData;
use crate::models::StudentRecord;

/// `cpt` as a whole word in a lowercased student code
static CPT_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bcpt\b").expect("CPT token pattern is valid"));

/// Flags corporate/professional-training enrollments
#[derive(Debug, Clone)]
pub struct CorporateClassifier {
    reference: Arc<ReferenceData>,
}

impl CorporateClassifier {
    /// Create a classifier backed by the CPT consultant allow-list
    #[must_use]
    pub const fn new(reference: Arc<ReferenceData>) -> Self {
        Self { reference }
    }

    /// A record is CPT if its consultant is on the allow-list or its code
    /// carries the `cpt` token
    #[must_use]
    pub fn classify(&self, consultant: Option<&str>, student_code: &str) -> bool {
        consultant.is_some_and(|c| self.reference.is_cpt_consultant(c))
            || CPT_TOKEN.is_match(&student_code.to_lowercase())
    }

    /// Return the record with its CPT flag filled in
    #[must_use]
    pub fn apply(&self, record: StudentRecord) -> StudentRecord {
        let is_cpt = self.classify(record.consultant.as_deref(), &record.student_code);
        record.with_cpt(is_cpt)
    }
}
