use std::time::Instant;

use tracing::debug;

use crate::detect::error::DetectError;
use crate::detect::result_model::{DetectionResult, MappedField};
use crate::dom::document::Document;
use crate::dom::snapshot_model::DocumentSnapshot;
use crate::field::candidate::{FieldCandidate, enumerate_candidates};
use crate::registry::registry_model::RegistryEntry;
use crate::registry::resolver::ActiveRegistry;
use crate::resolve::voting::resolve_field_type;
use crate::signal::evaluators::{EvalContext, SignalEvaluator, default_evaluators, evaluate_all};

/// Classify every eligible field in one document snapshot.
///
/// Returns the complete result or an error, never a partial result. Only a
/// snapshot that cannot be enumerated fails the pass; problems inside single
/// evaluators are downgraded to unmatched signals.
pub fn detect_form_fields(
    snapshot: &DocumentSnapshot,
    board: Option<&str>,
    registry: &[RegistryEntry],
) -> Result<DetectionResult, DetectError> {
    Detector::new(registry, board).detect(snapshot)
}

/// A configured detector: registry filtered for one board plus the
/// evaluator set. Reusable across snapshots of the same board.
pub struct Detector<'r> {
    board: Option<String>,
    registry: ActiveRegistry<'r>,
    evaluators: Vec<Box<dyn SignalEvaluator>>,
}

impl<'r> Detector<'r> {
    pub fn new(registry: &'r [RegistryEntry], board: Option<&str>) -> Self {
        Self {
            board: board.map(str::to_string),
            registry: ActiveRegistry::new(registry, board),
            evaluators: default_evaluators(),
        }
    }

    /// Replace the built-in evaluators (the registry signal always runs first).
    pub fn with_evaluators(mut self, evaluators: Vec<Box<dyn SignalEvaluator>>) -> Self {
        self.evaluators = evaluators;
        self
    }

    pub fn detect(&self, snapshot: &DocumentSnapshot) -> Result<DetectionResult, DetectError> {
        let started = Instant::now();

        let doc = Document::build(snapshot)?;
        let enumeration = enumerate_candidates(&doc);

        debug!(
            url = %doc.url(),
            board = self.board.as_deref().unwrap_or("-"),
            candidates = enumeration.candidates.len(),
            registry_entries = self.registry.len(),
            "detection pass started"
        );

        let fields: Vec<MappedField> = enumeration
            .candidates
            .iter()
            .map(|candidate| self.classify(&doc, candidate))
            .collect();

        let duration_ms = started.elapsed().as_millis() as u64;
        debug!(
            fields = fields.len(),
            duration_ms, "detection pass finished"
        );

        Ok(DetectionResult {
            fields,
            board: self.board.clone(),
            url: doc.url().to_string(),
            timestamp: chrono::Utc::now().timestamp_millis(),
            duration_ms,
            total_elements_scanned: enumeration.total_elements_scanned,
        })
    }

    fn classify(&self, doc: &Document, candidate: &FieldCandidate) -> MappedField {
        let mut signals = Vec::new();
        let mut registry_entry_id = None;

        if let Some(hit) = self.registry.resolve(doc, candidate.node) {
            registry_entry_id = Some(hit.entry_id);
            signals.push(hit.signal);
        }

        let cx = EvalContext { doc, candidate };
        signals.extend(evaluate_all(&self.evaluators, &cx));

        let resolution = resolve_field_type(&signals);

        MappedField {
            stable_id: candidate.stable_id.clone(),
            selector: candidate.selector.clone(),
            label: candidate.label.clone(),
            field_type: resolution.field_type,
            confidence: resolution.confidence,
            category: resolution.field_type.category(),
            is_required: candidate.is_required,
            is_visible: candidate.is_visible,
            is_disabled: false,
            current_value: candidate.current_value.clone(),
            input_type: candidate.input_type.clone(),
            signals,
            registry_entry_id,
            board: self.board.clone(),
            frame_id: 0,
        }
    }
}
