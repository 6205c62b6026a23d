//! Cleaning algorithms for monthly member exports
//!
//! The classifiers and resolvers never fail: malformed input degrades to a
//! sentinel value and the record keeps moving. Correctness is checked once,
//! by the validation suite, at the end of the pipeline.

pub mod area;
pub mod center;
pub mod corporate;
pub mod dedup;
pub mod membership;
pub mod normalize;
pub mod pipeline;
pub mod rules;
pub mod statistics;
pub mod taxonomy;
pub mod validation;

pub use area::AreaResolver;
pub use center::{CenterResolver, CenterSignals};
pub use corporate::CorporateClassifier;
pub use dedup::{DedupReport, DeduplicationEngine};
pub use membership::{MembershipClassifier, MembershipSignals};
pub use normalize::FieldNormalizer;
pub use pipeline::CleaningPipeline;
pub use rules::{Rule, RuleCascade};
pub use statistics::CleaningStats;
pub use taxonomy::{AreaDefinition, CenterTaxonomy};
pub use validation::{ValidationFailure, ValidationReport, ValidationSuite};
