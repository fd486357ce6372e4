use std::collections::HashSet;
use std::thread;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::board::board_detector::detect_board;
use crate::detect::detector::detect_form_fields;
use crate::detect::error::DetectError;
use crate::detect::result_model::{DetectionResult, MappedField};
use crate::dom::snapshot_model::DocumentSnapshot;
use crate::registry::registry_model::RegistryEntry;

/// One isolated execution context (top-level document or frame).
#[derive(Debug, Clone)]
pub struct ContextSnapshot {
    /// 0 is the top-level document.
    pub frame_id: u32,
    /// Overrides the caller's board for this context only.
    pub board: Option<String>,
    pub snapshot: DocumentSnapshot,
}

impl ContextSnapshot {
    pub fn new(frame_id: u32, snapshot: DocumentSnapshot) -> Self {
        Self {
            frame_id,
            board: None,
            snapshot,
        }
    }

    pub fn with_board(mut self, board: &str) -> Self {
        self.board = Some(board.to_string());
        self
    }
}

/// A context whose pass failed; its fields are absent from the merge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedContext {
    pub frame_id: u32,
    pub url: String,
    pub error: String,
}

/// Fields from every context, deduplicated by selector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedDetection {
    pub fields: Vec<MappedField>,
    /// Board of the primary context.
    pub board: Option<String>,
    /// URL of the primary context.
    pub url: String,
    pub timestamp: i64,
    pub duration_ms: u64,
    pub total_elements_scanned: usize,
    pub failed_contexts: Vec<FailedContext>,
}

/// Run one detection pass per context concurrently, then merge.
///
/// The primary context (frame 0) is authoritative: on a selector conflict its
/// field is kept, then frames follow in ascending id. A failed context is
/// reported and skipped without affecting the others.
pub fn detect_across_contexts(
    contexts: &[ContextSnapshot],
    board: Option<&str>,
    registry: &[RegistryEntry],
) -> AggregatedDetection {
    let started = Instant::now();

    let outcomes: Vec<(&ContextSnapshot, Result<DetectionResult, DetectError>)> =
        thread::scope(|scope| {
            let handles: Vec<_> = contexts
                .iter()
                .map(|context| {
                    let context_board = context
                        .board
                        .as_deref()
                        .or(board)
                        .or_else(|| detect_board(&context.snapshot.url));
                    let handle = scope.spawn(move || {
                        detect_form_fields(&context.snapshot, context_board, registry)
                    });
                    (context, handle)
                })
                .collect();

            handles
                .into_iter()
                .map(|(context, handle)| {
                    let outcome = handle.join().unwrap_or(Err(DetectError::TaskPanicked {
                        frame_id: context.frame_id,
                    }));
                    (context, outcome)
                })
                .collect()
        });

    merge(outcomes, board, started)
}

fn merge(
    mut outcomes: Vec<(&ContextSnapshot, Result<DetectionResult, DetectError>)>,
    board: Option<&str>,
    started: Instant,
) -> AggregatedDetection {
    outcomes.sort_by_key(|(context, _)| context.frame_id);

    let mut seen: HashSet<String> = HashSet::new();
    let mut fields = Vec::new();
    let mut failed_contexts = Vec::new();
    let mut total_elements_scanned = 0;
    let mut primary: Option<(Option<String>, String)> = None;

    for (context, outcome) in outcomes {
        let result = match outcome {
            Ok(result) => result,
            Err(err) => {
                warn!(
                    frame_id = context.frame_id,
                    url = %context.snapshot.url,
                    error = %err,
                    "detection failed for context; skipping"
                );
                failed_contexts.push(FailedContext {
                    frame_id: context.frame_id,
                    url: context.snapshot.url.clone(),
                    error: err.to_string(),
                });
                continue;
            }
        };

        if primary.is_none() {
            primary = Some((result.board.clone(), result.url.clone()));
        }
        total_elements_scanned += result.total_elements_scanned;

        for mut field in result.fields {
            if !seen.insert(field.selector.clone()) {
                debug!(
                    frame_id = context.frame_id,
                    selector = %field.selector,
                    "selector already claimed by an earlier context"
                );
                continue;
            }
            field.frame_id = context.frame_id;
            fields.push(field);
        }
    }

    let (primary_board, url) =
        primary.unwrap_or_else(|| (board.map(str::to_string), String::new()));

    AggregatedDetection {
        fields,
        board: primary_board,
        url,
        timestamp: chrono::Utc::now().timestamp_millis(),
        duration_ms: started.elapsed().as_millis() as u64,
        total_elements_scanned,
        failed_contexts,
    }
}
