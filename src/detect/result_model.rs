use serde::{Deserialize, Serialize};

use crate::field::field_types::{FieldCategory, FieldType};
use crate::signal::signal_model::Signal;

/// The decision for one field, with its full audit trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappedField {
    pub stable_id: String,
    /// Canonical selector; unique within one result.
    pub selector: String,
    pub label: String,
    pub field_type: FieldType,
    pub confidence: f64,
    pub category: FieldCategory,
    pub is_required: bool,
    pub is_visible: bool,
    /// Always false: disabled controls are never reported.
    pub is_disabled: bool,
    pub current_value: String,
    pub input_type: String,
    /// Every signal evaluated, matched or not.
    pub signals: Vec<Signal>,
    pub registry_entry_id: Option<String>,
    pub board: Option<String>,
    /// Execution context the field came from; 0 is the top-level document.
    pub frame_id: u32,
}

impl MappedField {
    pub fn matched_signals(&self) -> impl Iterator<Item = &Signal> {
        self.signals.iter().filter(|s| s.matched)
    }
}

/// Atomic output of one detection pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionResult {
    pub fields: Vec<MappedField>,
    pub board: Option<String>,
    pub url: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    pub duration_ms: u64,
    /// Shape-eligible elements seen, before any exclusion.
    pub total_elements_scanned: usize,
}

impl DetectionResult {
    pub fn field(&self, selector: &str) -> Option<&MappedField> {
        self.fields.iter().find(|f| f.selector == selector)
    }

    pub fn unknown_count(&self) -> usize {
        self.fields
            .iter()
            .filter(|f| f.field_type == FieldType::Unknown)
            .count()
    }
}
