//! Center resolution
//!
//! Resolution order, first match wins:
//!
//! 1. CPT members → `Corporate`
//! 2. Go members → `Online Center`
//! 3. Street Talk marker in the code → `Street Talk` (classify policy only)
//! 4. No center code anywhere in the code → consultant lookup (may be unmapped)
//! 5. Deluxe or VIP → center code inside the first matching parenthesised group
//! 6. Otherwise unresolved

use std::sync::{Arc, LazyLock};

use regex::Regex;

use crate::algorithm::rules::{Rule, RuleCascade};
use crate::config::ReferenceData;
use crate::models::types::{CORPORATE, ONLINE_CENTER, STREET_TALK};
use crate::models::{Membership, Resolution, StreetTalkPolicy, StudentRecord, UnresolvedReason};

/// Markers identifying Street Talk members in an uppercased code
pub const STREET_TALK_MARKERS: &[&str] = &["STREET TALK", "STREETTALK", "(ST)"];

static PARENTHESISED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(([^()]*)\)").expect("parenthesised group pattern is valid"));

/// The inputs the center rules look at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CenterSignals {
    pub is_cpt: bool,
    pub membership: Membership,
    /// Student code, uppercased
    pub code_upper: String,
    /// Consultant, uppercased
    pub consultant: Option<String>,
}

impl CenterSignals {
    /// Collect the signals from a record whose tier and CPT flag are set
    #[must_use]
    pub fn from_record(record: &StudentRecord) -> Self {
        Self {
            is_cpt: record.is_cpt,
            membership: record.membership,
            code_upper: record.code_upper(),
            consultant: record.consultant.clone(),
        }
    }
}

/// Marker codes in taxonomy declaration order, with their uppercased form
#[derive(Debug, Clone)]
struct MarkerCodes {
    codes: Vec<(String, String)>,
}

impl MarkerCodes {
    fn from_reference(reference: &ReferenceData) -> Self {
        let codes = reference
            .taxonomy
            .marker_codes()
            .map(|code| (code.to_uppercase(), code.to_string()))
            .collect();
        Self { codes }
    }

    /// Check if any center code occurs anywhere in the code
    fn any_in(&self, code_upper: &str) -> bool {
        self.codes.iter().any(|(upper, _)| code_upper.contains(upper.as_str()))
    }

    /// Find the center named by the first parenthesised group that names one
    ///
    /// Within a group an exact match wins, then the first code in
    /// declaration order that occurs as a substring.
    fn in_parentheses(&self, code_upper: &str) -> Option<String> {
        PARENTHESISED
            .captures_iter(code_upper)
            .filter_map(|caps| caps.get(1))
            .find_map(|group| {
                let group = group.as_str().trim();
                self.codes
                    .iter()
                    .find(|(upper, _)| upper == group)
                    .or_else(|| self.codes.iter().find(|(upper, _)| group.contains(upper.as_str())))
                    .map(|(_, code)| code.clone())
            })
    }
}

/// Check if an uppercased code carries a Street Talk marker
#[must_use]
pub fn has_street_talk_marker(code_upper: &str) -> bool {
    STREET_TALK_MARKERS
        .iter()
        .any(|marker| code_upper.contains(marker))
}

/// Derives a record's center from its tier, CPT flag, code and consultant
#[derive(Debug)]
pub struct CenterResolver {
    rules: RuleCascade<CenterSignals, Resolution<String>>,
}

impl CenterResolver {
    /// Create a resolver that classifies Street Talk members into their own center
    #[must_use]
    pub fn new(reference: Arc<ReferenceData>) -> Self {
        Self::with_policy(reference, StreetTalkPolicy::Classify)
    }

    /// Create a resolver for the given Street Talk policy
    ///
    /// Under [`StreetTalkPolicy::Exclude`] the marked rows are dropped before
    /// deduplication, so the `street-talk-marker` rule is left out and any
    /// remaining `(ST)` codes fall through to the consultant lookup.
    #[must_use]
    pub fn with_policy(reference: Arc<ReferenceData>, policy: StreetTalkPolicy) -> Self {
        let markers = Arc::new(MarkerCodes::from_reference(&reference));
        let lookup_markers = Arc::clone(&markers);
        let lookup = Arc::clone(&reference);

        let mut rules = vec![
            Rule::when(
                "cpt",
                |s: &CenterSignals| s.is_cpt,
                Resolution::Resolved(CORPORATE.to_string()),
            ),
            Rule::when(
                "go-membership",
                |s: &CenterSignals| s.membership == Membership::Go,
                Resolution::Resolved(ONLINE_CENTER.to_string()),
            ),
        ];
        if policy == StreetTalkPolicy::Classify {
            rules.push(Rule::when(
                "street-talk-marker",
                |s: &CenterSignals| has_street_talk_marker(&s.code_upper),
                Resolution::Resolved(STREET_TALK.to_string()),
            ));
        }
        rules.push(Rule::new("consultant-lookup", move |s: &CenterSignals| {
            if lookup_markers.any_in(&s.code_upper) {
                return None;
            }
            let center = s
                .consultant
                .as_deref()
                .and_then(|consultant| lookup.center_for_consultant(consultant));
            Some(center.map_or(
                Resolution::Unresolved(UnresolvedReason::UnmappedConsultant),
                |center| Resolution::Resolved(center.to_string()),
            ))
        }));
        rules.push(Rule::new("code-marker", move |s: &CenterSignals| {
            if !matches!(s.membership, Membership::Deluxe | Membership::Vip) {
                return None;
            }
            Some(markers.in_parentheses(&s.code_upper).map_or(
                Resolution::Unresolved(UnresolvedReason::NoCenterMarker),
                Resolution::Resolved,
            ))
        }));

        Self {
            rules: RuleCascade::new(rules),
        }
    }

    /// Resolve a center, reporting which rule decided it
    ///
    /// The rule name is `None` when no rule applied.
    #[must_use]
    pub fn resolve_with_rule(&self, signals: &CenterSignals) -> (Option<&'static str>, Resolution<String>) {
        match self.rules.evaluate(signals) {
            Some((rule, resolution)) => (Some(rule), resolution),
            None => (None, Resolution::Unresolved(UnresolvedReason::NoRuleMatched)),
        }
    }

    /// Names of the active rules in precedence order
    pub fn rule_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.rules.rule_names()
    }

    /// Resolve a center
    #[must_use]
    pub fn resolve(&self, signals: &CenterSignals) -> Resolution<String> {
        self.resolve_with_rule(signals).1
    }
}
