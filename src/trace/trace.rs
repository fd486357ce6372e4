use serde::Serialize;

use crate::detect::aggregate::AggregatedDetection;
use crate::detect::result_model::{DetectionResult, MappedField};
use crate::signal::weights::WEIGHTS_VERSION;

/// One line of the decision trace: a whole detection pass.
#[derive(Debug, Serialize)]
pub struct TraceEvent {
    pub timestamp_ms: i64,
    pub url: String,
    pub board: Option<String>,

    pub weights_version: u32,
    pub registry_fingerprint: String,

    pub duration_ms: u64,
    pub total_elements_scanned: usize,

    pub decisions: Vec<FieldDecision>,
    pub failed_contexts: Vec<u32>,
}

/// Compact per-field summary; the full signal list stays in the result.
#[derive(Debug, Serialize)]
pub struct FieldDecision {
    pub frame_id: u32,
    pub selector: String,
    pub field_type: String,
    pub confidence: f64,
    pub registry_entry_id: Option<String>,
    /// `kind:type` for every matched signal, in vote order.
    pub votes: Vec<String>,
}

impl FieldDecision {
    fn from_field(field: &MappedField) -> Self {
        Self {
            frame_id: field.frame_id,
            selector: field.selector.clone(),
            field_type: field.field_type.to_string(),
            confidence: field.confidence,
            registry_entry_id: field.registry_entry_id.clone(),
            votes: field
                .matched_signals()
                .map(|s| format!("{}:{}", s.signal.as_str(), s.suggested_type))
                .collect(),
        }
    }
}

impl TraceEvent {
    pub fn for_pass(result: &DetectionResult, registry_fingerprint: &str) -> Self {
        Self {
            timestamp_ms: result.timestamp,
            url: result.url.clone(),
            board: result.board.clone(),
            weights_version: WEIGHTS_VERSION,
            registry_fingerprint: registry_fingerprint.to_string(),
            duration_ms: result.duration_ms,
            total_elements_scanned: result.total_elements_scanned,
            decisions: result.fields.iter().map(FieldDecision::from_field).collect(),
            failed_contexts: vec![],
        }
    }

    pub fn for_aggregate(result: &AggregatedDetection, registry_fingerprint: &str) -> Self {
        Self {
            timestamp_ms: result.timestamp,
            url: result.url.clone(),
            board: result.board.clone(),
            weights_version: WEIGHTS_VERSION,
            registry_fingerprint: registry_fingerprint.to_string(),
            duration_ms: result.duration_ms,
            total_elements_scanned: result.total_elements_scanned,
            decisions: result.fields.iter().map(FieldDecision::from_field).collect(),
            failed_contexts: result.failed_contexts.iter().map(|f| f.frame_id).collect(),
        }
    }
}
