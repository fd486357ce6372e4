use thiserror::Error;
use tracing::debug;

use crate::dom::document::{Document, NodeId};
use crate::field::candidate::{ancestor_label, container_label, for_label, FieldCandidate};
use crate::field::field_types::FieldType;
use crate::signal::patterns::{
    LABEL_PATTERNS, NAME_ID_PATTERNS, PatternRule, SECTION_PATTERNS, autocomplete_type,
    input_kind_type, match_patterns,
};
use crate::signal::signal_model::{Signal, SignalKind};

/// How far up the tree section context is searched.
const SECTION_SEARCH_DEPTH: usize = 10;

const CSS_RAW_LIMIT: usize = 100;
const SECTION_RAW_LIMIT: usize = 80;
const SECTION_REASON_LIMIT: usize = 40;
const LABEL_REASON_LIMIT: usize = 50;

// ============================================================================
// SignalEvaluator trait
// ============================================================================

/// Everything an evaluator may look at for one candidate.
pub struct EvalContext<'d, 'a> {
    pub doc: &'d Document<'a>,
    pub candidate: &'d FieldCandidate,
}

impl EvalContext<'_, '_> {
    fn node(&self) -> NodeId {
        self.candidate.node
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("{evaluator}: matched signal suggests `unknown`")]
    UnknownSuggestion { evaluator: &'static str },

    #[error("{evaluator}: weight {weight} outside (0, 1]")]
    WeightOutOfRange { evaluator: &'static str, weight: f64 },

    #[error("{evaluator}: {message}")]
    Failed {
        evaluator: &'static str,
        message: String,
    },
}

/// Inspects one attribute/context source and emits at most one signal.
pub trait SignalEvaluator: Send + Sync {
    fn name(&self) -> &'static str;

    /// The kind reported when this evaluator's output has to be downgraded.
    fn kind(&self) -> SignalKind;

    fn evaluate(&self, cx: &EvalContext<'_, '_>) -> Result<Option<Signal>, EvalError>;
}

/// The built-in evaluators in vote order (the registry signal is resolved
/// separately and always comes first).
pub fn default_evaluators() -> Vec<Box<dyn SignalEvaluator>> {
    vec![
        Box::new(AutocompleteEvaluator),
        Box::new(NameIdEvaluator),
        Box::new(InputKindEvaluator),
        Box::new(PlaceholderEvaluator),
        Box::new(AriaLabelEvaluator),
        Box::new(LabelEvaluator),
        Box::new(CssDataAttrEvaluator),
        Box::new(SectionContextEvaluator),
    ]
}

/// Run every evaluator against a candidate. A failing evaluator, or one whose
/// output breaks the signal contract, is recorded as an unmatched signal.
pub fn evaluate_all(
    evaluators: &[Box<dyn SignalEvaluator>],
    cx: &EvalContext<'_, '_>,
) -> Vec<Signal> {
    let mut signals = Vec::new();
    for evaluator in evaluators {
        let outcome = evaluator
            .evaluate(cx)
            .and_then(|signal| match signal {
                Some(s) => check_signal(evaluator.name(), &s).map(|()| Some(s)),
                None => Ok(None),
            });

        match outcome {
            Ok(Some(signal)) => signals.push(signal),
            Ok(None) => {}
            Err(err) => {
                debug!(
                    selector = %cx.candidate.selector,
                    error = %err,
                    "signal evaluation failed; treating as not matched"
                );
                signals.push(Signal::unmatched(
                    evaluator.kind(),
                    "",
                    format!("evaluation failed: {}", err),
                ));
            }
        }
    }
    signals
}

fn check_signal(evaluator: &'static str, signal: &Signal) -> Result<(), EvalError> {
    if !(signal.weight > 0.0 && signal.weight <= 1.0) {
        return Err(EvalError::WeightOutOfRange {
            evaluator,
            weight: signal.weight,
        });
    }
    if signal.matched && signal.suggested_type == FieldType::Unknown {
        return Err(EvalError::UnknownSuggestion { evaluator });
    }
    Ok(())
}

/// Match `text` against a table and build a matched/unmatched signal.
fn prose_signal(
    kind: SignalKind,
    raw: &str,
    rules: &[PatternRule],
    what: &str,
) -> Signal {
    match match_patterns(raw, rules) {
        Some(hit) => Signal::matched(
            kind,
            raw,
            hit.field_type,
            format!("{} matched /{}/", what, hit.pattern),
        ),
        None => Signal::unmatched(kind, raw, format!("{}=\"{}\": no match", what, raw)),
    }
}

fn truncate(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}

// ============================================================================
// Attribute evaluators
// ============================================================================

/// Standard autofill hint; only the last token carries the field name
/// (`"shipping email"` → `email`).
pub struct AutocompleteEvaluator;

impl SignalEvaluator for AutocompleteEvaluator {
    fn name(&self) -> &'static str {
        "autocomplete"
    }

    fn kind(&self) -> SignalKind {
        SignalKind::Autocomplete
    }

    fn evaluate(&self, cx: &EvalContext<'_, '_>) -> Result<Option<Signal>, EvalError> {
        let raw = cx.candidate.autocomplete.as_str();
        if raw.is_empty() {
            return Ok(None);
        }

        let lowered = raw.trim().to_lowercase();
        let mapped = lowered.split_whitespace().last().and_then(autocomplete_type);

        Ok(Some(match mapped {
            Some(field_type) => Signal::matched(
                SignalKind::Autocomplete,
                raw,
                field_type,
                format!("autocomplete=\"{}\" → {}", raw, field_type),
            ),
            None => Signal::unmatched(
                SignalKind::Autocomplete,
                raw,
                format!("autocomplete=\"{}\" not in map", raw),
            ),
        }))
    }
}

pub struct NameIdEvaluator;

impl SignalEvaluator for NameIdEvaluator {
    fn name(&self) -> &'static str {
        "name-id"
    }

    fn kind(&self) -> SignalKind {
        SignalKind::NameIdRegex
    }

    fn evaluate(&self, cx: &EvalContext<'_, '_>) -> Result<Option<Signal>, EvalError> {
        let c = cx.candidate;
        let text = format!("{} {}", c.name, c.id);
        let raw = text.trim();

        Ok(Some(match match_patterns(&text, &NAME_ID_PATTERNS) {
            Some(hit) => Signal::matched(
                SignalKind::NameIdRegex,
                raw,
                hit.field_type,
                format!("name/id matched /{}/", hit.pattern),
            ),
            None => Signal::unmatched(
                SignalKind::NameIdRegex,
                raw,
                format!("name=\"{}\" id=\"{}\": no pattern match", c.name, c.id),
            ),
        }))
    }
}

pub struct InputKindEvaluator;

impl SignalEvaluator for InputKindEvaluator {
    fn name(&self) -> &'static str {
        "input-kind"
    }

    fn kind(&self) -> SignalKind {
        SignalKind::InputType
    }

    fn evaluate(&self, cx: &EvalContext<'_, '_>) -> Result<Option<Signal>, EvalError> {
        let kind = cx.candidate.input_type.as_str();
        Ok(Some(match input_kind_type(kind) {
            Some(field_type) => Signal::matched(
                SignalKind::InputType,
                kind,
                field_type,
                format!("type=\"{}\" → {}", kind, field_type),
            ),
            None => Signal::unmatched(
                SignalKind::InputType,
                kind,
                format!("type=\"{}\" not in type map", kind),
            ),
        }))
    }
}

pub struct PlaceholderEvaluator;

impl SignalEvaluator for PlaceholderEvaluator {
    fn name(&self) -> &'static str {
        "placeholder"
    }

    fn kind(&self) -> SignalKind {
        SignalKind::Placeholder
    }

    fn evaluate(&self, cx: &EvalContext<'_, '_>) -> Result<Option<Signal>, EvalError> {
        let raw = cx.candidate.placeholder.as_str();
        if raw.is_empty() {
            return Ok(None);
        }
        Ok(Some(prose_signal(
            SignalKind::Placeholder,
            raw,
            &LABEL_PATTERNS,
            "placeholder",
        )))
    }
}

pub struct AriaLabelEvaluator;

impl SignalEvaluator for AriaLabelEvaluator {
    fn name(&self) -> &'static str {
        "aria-label"
    }

    fn kind(&self) -> SignalKind {
        SignalKind::AriaLabel
    }

    fn evaluate(&self, cx: &EvalContext<'_, '_>) -> Result<Option<Signal>, EvalError> {
        let raw = cx.candidate.aria_label.as_str();
        if raw.is_empty() {
            return Ok(None);
        }
        Ok(Some(prose_signal(
            SignalKind::AriaLabel,
            raw,
            &LABEL_PATTERNS,
            "aria-label",
        )))
    }
}

// ============================================================================
// Context evaluators
// ============================================================================

/// Associated label text.
///
/// Sources, in order: `label[for]`, the enclosing `<label>`, then the first
/// label of the nearest Ashby (`data-ui`) or Workday (`data-automation-id`)
/// container. The first source whose text matches wins; otherwise the first
/// non-empty source is reported as unmatched.
pub struct LabelEvaluator;

impl SignalEvaluator for LabelEvaluator {
    fn name(&self) -> &'static str {
        "label"
    }

    fn kind(&self) -> SignalKind {
        SignalKind::LabelFor
    }

    fn evaluate(&self, cx: &EvalContext<'_, '_>) -> Result<Option<Signal>, EvalError> {
        let doc = cx.doc;
        let node = cx.node();

        let sources = [
            (for_label(doc, node), SignalKind::LabelFor, "label[for]"),
            (ancestor_label(doc, node), SignalKind::ParentLabel, "parent label"),
            (
                container_label(doc, node, "data-ui"),
                SignalKind::ParentLabel,
                "[data-ui] container label",
            ),
            (
                container_label(doc, node, "data-automation-id"),
                SignalKind::ParentLabel,
                "[data-automation-id] container label",
            ),
        ];

        let mut first_unmatched: Option<Signal> = None;

        for (label, kind, what) in sources {
            let Some(label) = label else { continue };
            let text = doc.normalized_text(label);
            if text.is_empty() {
                continue;
            }

            if let Some(hit) = match_patterns(&text, &LABEL_PATTERNS) {
                return Ok(Some(Signal::matched(
                    kind,
                    text,
                    hit.field_type,
                    format!("{} matched /{}/", what, hit.pattern),
                )));
            }

            if first_unmatched.is_none() {
                let reason = format!(
                    "{} \"{}\": no match",
                    what,
                    truncate(&text, LABEL_REASON_LIMIT)
                );
                first_unmatched = Some(Signal::unmatched(kind, text, reason));
            }
        }

        Ok(first_unmatched)
    }
}

/// Class names and `data-*` attributes, matched like machine identifiers.
/// Data attributes are joined in name order before the raw value is cut.
pub struct CssDataAttrEvaluator;

impl SignalEvaluator for CssDataAttrEvaluator {
    fn name(&self) -> &'static str {
        "css-data-attr"
    }

    fn kind(&self) -> SignalKind {
        SignalKind::CssDataAttr
    }

    fn evaluate(&self, cx: &EvalContext<'_, '_>) -> Result<Option<Signal>, EvalError> {
        let node = cx.doc.node(cx.node());
        let class = node.attr("class").unwrap_or("");
        let data_attrs = node
            .attributes
            .iter()
            .filter(|(name, _)| name.starts_with("data-"))
            .map(|(name, value)| format!("{}={}", name, value))
            .collect::<Vec<_>>()
            .join(" ");

        let text = format!("{} {}", class, data_attrs);
        let raw = truncate(text.trim(), CSS_RAW_LIMIT);
        if raw.is_empty() {
            return Ok(None);
        }

        Ok(Some(match match_patterns(&text, &NAME_ID_PATTERNS) {
            Some(hit) => Signal::matched(
                SignalKind::CssDataAttr,
                raw,
                hit.field_type,
                format!("CSS/data-attr matched /{}/", hit.pattern),
            ),
            None => Signal::unmatched(
                SignalKind::CssDataAttr,
                raw,
                "No CSS class/data-attr pattern match",
            ),
        }))
    }
}

/// Nearest group caption: a fieldset legend (heading context) or the first
/// heading inside an enclosing section (section context). Only nudges.
pub struct SectionContextEvaluator;

impl SignalEvaluator for SectionContextEvaluator {
    fn name(&self) -> &'static str {
        "section-context"
    }

    fn kind(&self) -> SignalKind {
        SignalKind::SectionContext
    }

    fn evaluate(&self, cx: &EvalContext<'_, '_>) -> Result<Option<Signal>, EvalError> {
        let Some((kind, text)) = find_section_context(cx.doc, cx.node()) else {
            return Ok(None);
        };

        let raw = truncate(&text, SECTION_RAW_LIMIT);
        let short = truncate(&text, SECTION_REASON_LIMIT);

        Ok(Some(match match_patterns(&text, &SECTION_PATTERNS) {
            Some(hit) => Signal::matched(
                kind,
                raw,
                hit.field_type,
                format!("Section heading \"{}\" indicates {}", short, hit.field_type),
            ),
            None => Signal::unmatched(
                kind,
                raw,
                format!("Section heading \"{}\": no category match", short),
            ),
        }))
    }
}

fn find_section_context(doc: &Document, node: NodeId) -> Option<(SignalKind, String)> {
    for ancestor in doc.ancestors(node).take(SECTION_SEARCH_DEPTH) {
        if doc.tag(ancestor) == "fieldset" {
            if let Some(legend) = doc.find_descendant(ancestor, |n| doc.tag(n) == "legend") {
                let text = doc.normalized_text(legend);
                if !text.is_empty() {
                    return Some((SignalKind::HeadingContext, text));
                }
            }
        }

        let heading = doc.find_descendant(ancestor, |n| {
            matches!(doc.tag(n), "h2" | "h3" | "h4") || doc.attr(n, "role") == Some("heading")
        });
        if let Some(heading) = heading {
            let text = doc.normalized_text(heading);
            if !text.is_empty() {
                return Some((SignalKind::SectionContext, text));
            }
        }
    }
    None
}
