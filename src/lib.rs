//! Deterministic semantic classification of job-application form fields.
//!
//! A pass takes one document snapshot, enumerates the eligible controls,
//! gathers weighted signals for each one and resolves them into a field type
//! with a bounded confidence and a full audit trail.

pub mod board;
pub mod cli;
pub mod detect;
pub mod dom;
pub mod field;
pub mod registry;
pub mod report;
pub mod resolve;
pub mod signal;
pub mod trace;

pub use detect::aggregate::{AggregatedDetection, ContextSnapshot, detect_across_contexts};
pub use detect::detector::{Detector, detect_form_fields};
pub use detect::error::DetectError;
pub use detect::result_model::{DetectionResult, MappedField};
pub use dom::snapshot_model::{DocumentSnapshot, DomNode};
pub use field::field_types::{FieldCategory, FieldType};
pub use registry::registry_model::{Registry, RegistryEntry};
