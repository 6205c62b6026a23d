//! Common domain type definitions
//!
//! This module contains the enum types and sentinel values shared by the
//! classifiers, the resolvers and the validation suite.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Center and area assigned to corporate/CPT members
pub const CORPORATE: &str = "Corporate";
/// Center and area assigned to online-only members
pub const ONLINE_CENTER: &str = "Online Center";
/// Center assigned to Street Talk members
pub const STREET_TALK: &str = "Street Talk";
/// Center or area that could not be resolved
pub const NONE: &str = "NONE";

/// Membership tier of a student
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Membership {
    /// Online and offline classes
    Deluxe,
    /// Online classes only
    Go,
    /// Premium tier
    Vip,
    /// No tier rule matched
    #[default]
    Unspecified,
}

impl Membership {
    /// Get the label written to the cleaned table
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Deluxe => "Deluxe",
            Self::Go => "Go",
            Self::Vip => "VIP",
            Self::Unspecified => "Unspecified",
        }
    }

    /// Get all tiers that may appear in a valid output
    #[must_use]
    pub fn valid_tiers() -> Vec<Self> {
        vec![Self::Deluxe, Self::Go, Self::Vip]
    }

    /// Check if this is a valid tier (not Unspecified)
    #[must_use]
    pub fn is_valid(self) -> bool {
        self != Self::Unspecified
    }
}

impl fmt::Display for Membership {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Membership {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Deluxe" => Ok(Self::Deluxe),
            "Go" | "GO" => Ok(Self::Go),
            "VIP" => Ok(Self::Vip),
            "Unspecified" | "Error" | "" => Ok(Self::Unspecified),
            other => Err(format!("unknown membership tier: {other}")),
        }
    }
}

impl Serialize for Membership {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Membership {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        label.parse().map_err(serde::de::Error::custom)
    }
}

/// Why a derived field could not be resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum UnresolvedReason {
    /// The code carries no center marker and the consultant is not in the lookup table
    UnmappedConsultant,
    /// No parenthesised group of the code names a known center
    NoCenterMarker,
    /// No resolution rule applied to the record
    NoRuleMatched,
    /// The center is missing, so no area can be derived
    MissingCenter,
    /// The center belongs to no declared area
    UnknownCenter,
}

impl UnresolvedReason {
    /// Get a short description of this reason
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::UnmappedConsultant => "consultant not in center lookup",
            Self::NoCenterMarker => "no center code in parenthesised group",
            Self::NoRuleMatched => "no center rule matched",
            Self::MissingCenter => "center missing",
            Self::UnknownCenter => "center not in taxonomy",
        }
    }
}

impl fmt::Display for UnresolvedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Outcome of deriving a field: a value, or the reason there is none
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution<T> {
    /// A value was derived
    Resolved(T),
    /// No value could be derived
    Unresolved(UnresolvedReason),
}

impl<T> Resolution<T> {
    /// Check if a value was derived
    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }

    /// Get the derived value, if any
    #[must_use]
    pub const fn value(&self) -> Option<&T> {
        match self {
            Self::Resolved(value) => Some(value),
            Self::Unresolved(_) => None,
        }
    }

    /// Get the reason the value is missing, if it is
    #[must_use]
    pub const fn reason(&self) -> Option<UnresolvedReason> {
        match self {
            Self::Resolved(_) => None,
            Self::Unresolved(reason) => Some(*reason),
        }
    }
}

impl Resolution<String> {
    /// Get the value to store, falling back to the `NONE` sentinel
    #[must_use]
    pub fn into_value_or_sentinel(self) -> String {
        match self {
            Self::Resolved(value) => value,
            Self::Unresolved(_) => NONE.to_string(),
        }
    }
}

/// How Street Talk members are treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreetTalkPolicy {
    /// Keep them and resolve their center to `Street Talk`
    #[default]
    Classify,
    /// Drop them before identity collapse
    Exclude,
}

/// Which date column the keep-first collapse pairs with the student code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DedupKey {
    /// One record per `(student_code, end_date)`
    #[default]
    EndDate,
    /// One record per `(student_code, start_date)`
    StartDate,
}

impl fmt::Display for DedupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EndDate => write!(f, "(student_code, end_date)"),
            Self::StartDate => write!(f, "(student_code, start_date)"),
        }
    }
}
