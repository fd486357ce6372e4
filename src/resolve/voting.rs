use serde::{Deserialize, Serialize};

use crate::field::field_types::FieldType;
use crate::signal::signal_model::Signal;
use crate::signal::weights::{CONFIDENCE_CEILING, CORROBORATION_DECAY, CORROBORATION_FACTOR};

/// Outcome of fusing one candidate's signals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resolution {
    pub field_type: FieldType,
    pub confidence: f64,
}

impl Resolution {
    pub fn unknown() -> Self {
        Self {
            field_type: FieldType::Unknown,
            confidence: 0.0,
        }
    }
}

/// Weighted vote over the matched signals.
///
/// Each suggested type scores the sum of its signals' weights; the highest
/// score wins and on a tie the type that was voted for first keeps the lead.
/// Confidence starts at the strongest winning signal and every further
/// winning signal, strongest first, adds `weight * 0.1 * 0.5^(rank-1)`,
/// capped at [`CONFIDENCE_CEILING`].
pub fn resolve_field_type(signals: &[Signal]) -> Resolution {
    let matched: Vec<&Signal> = signals.iter().filter(|s| s.matched).collect();
    if matched.is_empty() {
        return Resolution::unknown();
    }

    // Insertion-ordered tally keeps the tie-break deterministic
    let mut votes: Vec<(FieldType, f64)> = Vec::new();
    for signal in &matched {
        match votes.iter_mut().find(|(t, _)| *t == signal.suggested_type) {
            Some((_, score)) => *score += signal.weight,
            None => votes.push((signal.suggested_type, signal.weight)),
        }
    }

    let mut best = FieldType::Unknown;
    let mut best_score = 0.0_f64;
    for (field_type, score) in votes {
        if score > best_score {
            best = field_type;
            best_score = score;
        }
    }

    let mut weights: Vec<f64> = matched
        .iter()
        .filter(|s| s.suggested_type == best)
        .map(|s| s.weight)
        .collect();
    weights.sort_by(|a, b| b.total_cmp(a));

    let Some((&strongest, rest)) = weights.split_first() else {
        return Resolution::unknown();
    };

    let mut confidence = strongest;
    let mut share = CORROBORATION_FACTOR;
    for weight in rest {
        confidence += weight * share;
        share *= CORROBORATION_DECAY;
    }

    Resolution {
        field_type: best,
        confidence: confidence.min(CONFIDENCE_CEILING),
    }
}
