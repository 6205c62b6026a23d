//! Domain models for the member cleaner
//!
//! This module contains the raw row read from a source spreadsheet, the
//! cleaned student record, and the tier/sentinel types derived in between.

pub mod record;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use record::{RawStudentRow, StudentRecord};
pub use traits::ArrowSchema;
pub use types::{DedupKey, Membership, Resolution, StreetTalkPolicy, UnresolvedReason};
