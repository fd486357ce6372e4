use serde::{Deserialize, Serialize};

use crate::detect::aggregate::{AggregatedDetection, FailedContext};
use crate::detect::result_model::{DetectionResult, MappedField};
use crate::field::field_types::{FieldCategory, FieldType};

// ============================================================================
// Detection report: one pass or an aggregate, with summary counts
// ============================================================================

/// Fields below this confidence are flagged for review.
pub const LOW_CONFIDENCE: f64 = 0.7;

/// Summary view over a detection, consumed by the reporters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionReport {
    pub url: String,
    pub board: Option<String>,

    /// Number of classified fields
    pub total: usize,

    /// Fields that resolved to `unknown`
    pub unknown: usize,

    /// Known fields below [`LOW_CONFIDENCE`]
    pub low_confidence: usize,

    /// Field count per category, in category order
    pub by_category: Vec<(FieldCategory, usize)>,

    pub duration_ms: u64,
    pub total_elements_scanned: usize,

    pub fields: Vec<MappedField>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failed_contexts: Vec<FailedContext>,
}

impl DetectionReport {
    pub fn from_result(result: &DetectionResult) -> Self {
        Self::build(
            &result.url,
            result.board.clone(),
            result.fields.clone(),
            result.duration_ms,
            result.total_elements_scanned,
            vec![],
        )
    }

    pub fn from_aggregate(result: &AggregatedDetection) -> Self {
        Self::build(
            &result.url,
            result.board.clone(),
            result.fields.clone(),
            result.duration_ms,
            result.total_elements_scanned,
            result.failed_contexts.clone(),
        )
    }

    fn build(
        url: &str,
        board: Option<String>,
        fields: Vec<MappedField>,
        duration_ms: u64,
        total_elements_scanned: usize,
        failed_contexts: Vec<FailedContext>,
    ) -> Self {
        let unknown = fields
            .iter()
            .filter(|f| f.field_type == FieldType::Unknown)
            .count();
        let low_confidence = fields
            .iter()
            .filter(|f| f.field_type != FieldType::Unknown && f.confidence < LOW_CONFIDENCE)
            .count();
        let by_category = FieldCategory::ALL
            .iter()
            .map(|c| (*c, fields.iter().filter(|f| f.category == *c).count()))
            .filter(|(_, n)| *n > 0)
            .collect();

        Self {
            url: url.to_string(),
            board,
            total: fields.len(),
            unknown,
            low_confidence,
            by_category,
            duration_ms,
            total_elements_scanned,
            fields,
            failed_contexts,
        }
    }

    /// Every field resolved to a known type and no context failed.
    pub fn fully_classified(&self) -> bool {
        self.unknown == 0 && self.failed_contexts.is_empty()
    }
}
