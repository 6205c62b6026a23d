//! Trait definitions for domain models
//!
//! This module defines the conversion trait shared by models that are
//! exchanged with the I/O collaborators as Arrow record batches.

use crate::error::Result;
use arrow::datatypes::Schema;
use arrow::record_batch::RecordBatch;

/// A trait for models that can be converted to and from Arrow `RecordBatch`.
///
/// `ArrowSchema` provides methods for working with Arrow data structures,
/// supporting serialization and deserialization of models to/from `RecordBatch`.
pub trait ArrowSchema: Sized {
    /// Get the Arrow schema for this model
    fn schema() -> Schema;

    /// Convert a `RecordBatch` to a vector of this model
    fn from_record_batch(batch: &RecordBatch) -> Result<Vec<Self>>;

    /// Convert a slice of this model to a `RecordBatch`
    fn to_record_batch(models: &[Self]) -> Result<RecordBatch>;

    /// Get the schema as Arc<Schema>
    fn schema_ref() -> std::sync::Arc<Schema> {
        std::sync::Arc::new(Self::schema())
    }
}
