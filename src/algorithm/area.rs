//! Area resolution: map a resolved center to its taxonomy area.

use std::sync::Arc;

use crate::config::ReferenceData;
use crate::models::types::NONE;
use crate::models::{Resolution, StudentRecord, UnresolvedReason};

/// Maps centers to areas through the center taxonomy
#[derive(Debug, Clone)]
pub struct AreaResolver {
    reference: Arc<ReferenceData>,
}

impl AreaResolver {
    /// Create a resolver over the given reference data
    #[must_use]
    pub const fn new(reference: Arc<ReferenceData>) -> Self {
        Self { reference }
    }

    /// Resolve the area of a center; never fails
    #[must_use]
    pub fn resolve(&self, center: Option<&str>) -> Resolution<String> {
        match center {
            None | Some(NONE) => Resolution::Unresolved(UnresolvedReason::MissingCenter),
            Some(center) => self.reference.taxonomy.area_of(center).map_or(
                Resolution::Unresolved(UnresolvedReason::UnknownCenter),
                |area| Resolution::Resolved(area.to_string()),
            ),
        }
    }

    /// Return the record with its area filled in
    #[must_use]
    pub fn apply(&self, record: StudentRecord) -> StudentRecord {
        let area = self.resolve(Some(&record.center)).into_value_or_sentinel();
        record.with_area(area)
    }
}
