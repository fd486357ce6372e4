use serde::{Deserialize, Serialize};

use crate::field::field_types::FieldType;
use crate::signal::weights;

/// Source a piece of evidence was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SignalKind {
    BoardSelector,
    Autocomplete,
    NameIdRegex,
    InputType,
    LabelFor,
    ParentLabel,
    AriaLabel,
    Placeholder,
    CssDataAttr,
    HeadingContext,
    SectionContext,
}

impl SignalKind {
    /// Pinned weight for this kind.
    pub fn weight(self) -> f64 {
        match self {
            SignalKind::BoardSelector => weights::BOARD_SELECTOR,
            SignalKind::Autocomplete => weights::AUTOCOMPLETE,
            SignalKind::NameIdRegex => weights::NAME_ID_REGEX,
            SignalKind::InputType => weights::INPUT_TYPE,
            SignalKind::LabelFor => weights::LABEL_FOR,
            SignalKind::ParentLabel => weights::PARENT_LABEL,
            SignalKind::AriaLabel => weights::ARIA_LABEL,
            SignalKind::Placeholder => weights::PLACEHOLDER,
            SignalKind::CssDataAttr => weights::CSS_DATA_ATTR,
            SignalKind::HeadingContext => weights::HEADING_CONTEXT,
            SignalKind::SectionContext => weights::SECTION_CONTEXT,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SignalKind::BoardSelector => "board-selector",
            SignalKind::Autocomplete => "autocomplete",
            SignalKind::NameIdRegex => "name-id-regex",
            SignalKind::InputType => "input-type",
            SignalKind::LabelFor => "label-for",
            SignalKind::ParentLabel => "parent-label",
            SignalKind::AriaLabel => "aria-label",
            SignalKind::Placeholder => "placeholder",
            SignalKind::CssDataAttr => "css-data-attr",
            SignalKind::HeadingContext => "heading-context",
            SignalKind::SectionContext => "section-context",
        }
    }
}

/// One piece of weighted evidence about a candidate.
///
/// Unmatched signals are kept in the audit trail as negative evidence; only
/// matched ones vote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Signal {
    pub signal: SignalKind,
    pub raw_value: String,
    pub suggested_type: FieldType,
    pub weight: f64,
    pub matched: bool,
    pub reason: String,
}

impl Signal {
    pub fn matched(
        kind: SignalKind,
        raw_value: impl Into<String>,
        suggested_type: FieldType,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            signal: kind,
            raw_value: raw_value.into(),
            suggested_type,
            weight: kind.weight(),
            matched: true,
            reason: reason.into(),
        }
    }

    pub fn unmatched(
        kind: SignalKind,
        raw_value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            signal: kind,
            raw_value: raw_value.into(),
            suggested_type: FieldType::Unknown,
            weight: kind.weight(),
            matched: false,
            reason: reason.into(),
        }
    }
}
