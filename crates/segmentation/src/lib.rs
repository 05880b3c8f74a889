//! Rule-based segmentation: maps CRM attributes plus the social score onto
//! exactly one marketing segment with a fixed confidence and justification.

pub mod engine;
pub mod predicates;

pub use engine::{SegmentClassifier, SegmentRule};
