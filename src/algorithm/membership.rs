//! Membership tier classification
//!
//! Since early 2023 online-only members carry a `(GO` marker in their code,
//! which is the only way to tell them apart from `Standard` Deluxe members.

use crate::algorithm::rules::{Rule, RuleCascade};
use crate::models::{Membership, StudentRecord};

/// Marker placed in the codes of Go (online-only) members
pub const GO_MARKER: &str = "(GO";
/// Marker placed in the codes of Deluxe members
pub const DELUXE_MARKER: &str = "(DLX";

/// The inputs the tier rules look at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MembershipSignals {
    /// Raw service type, e.g. `"Standard"` or `"VIP"`
    pub service_type: Option<String>,
    /// Student code, uppercased
    pub code_upper: String,
}

impl MembershipSignals {
    /// Collect the signals from a normalised record
    #[must_use]
    pub fn from_record(record: &StudentRecord) -> Self {
        Self {
            service_type: record.service_type.clone(),
            code_upper: record.code_upper(),
        }
    }

    fn service_is(&self, service_type: &str) -> bool {
        self.service_type.as_deref() == Some(service_type)
    }
}

/// Derives the membership tier from the service type and code markers
#[derive(Debug)]
pub struct MembershipClassifier {
    rules: RuleCascade<MembershipSignals, Membership>,
}

impl Default for MembershipClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl MembershipClassifier {
    /// Create the classifier with its fixed rule order
    #[must_use]
    pub fn new() -> Self {
        let rules = RuleCascade::new(vec![
            Rule::when(
                "go-marker",
                |s: &MembershipSignals| s.code_upper.contains(GO_MARKER),
                Membership::Go,
            ),
            Rule::when(
                "standard-service",
                |s: &MembershipSignals| s.service_is("Standard"),
                Membership::Deluxe,
            ),
            Rule::when(
                "deluxe-marker",
                |s: &MembershipSignals| s.code_upper.contains(DELUXE_MARKER),
                Membership::Deluxe,
            ),
            Rule::when(
                "vip-service",
                |s: &MembershipSignals| s.service_is("VIP"),
                Membership::Vip,
            ),
        ]);

        Self { rules }
    }

    /// Classify a record's tier; `Unspecified` when no rule applies
    #[must_use]
    pub fn classify(&self, signals: &MembershipSignals) -> Membership {
        self.rules
            .evaluate(signals)
            .map_or(Membership::Unspecified, |(_, tier)| tier)
    }

    /// Return the record with its tier filled in
    #[must_use]
    pub fn apply(&self, record: StudentRecord) -> StudentRecord {
        let membership = self.classify(&MembershipSignals::from_record(&record));
        record.with_membership(membership)
    }
}
