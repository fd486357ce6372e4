//! Pinned signal weights and confidence constants.
//!
//! These values are tuned configuration. Any change must bump
//! [`WEIGHTS_VERSION`] and the equivalence tests that pin them.

pub const WEIGHTS_VERSION: u32 = 1;

pub const AUTOCOMPLETE: f64 = 0.95;
pub const NAME_ID_REGEX: f64 = 0.85;
pub const BOARD_SELECTOR: f64 = 0.85;
pub const INPUT_TYPE: f64 = 0.80;
pub const LABEL_FOR: f64 = 0.75;
pub const ARIA_LABEL: f64 = 0.75;
pub const PARENT_LABEL: f64 = 0.70;
pub const PLACEHOLDER: f64 = 0.65;
pub const CSS_DATA_ATTR: f64 = 0.50;
pub const HEADING_CONTEXT: f64 = 0.40;
pub const SECTION_CONTEXT: f64 = 0.30;

/// Confidence never reaches certainty.
pub const CONFIDENCE_CEILING: f64 = 0.99;

/// Share of a corroborating signal's weight added to the confidence.
pub const CORROBORATION_FACTOR: f64 = 0.1;

/// Each further corroborating signal counts half as much as the previous.
pub const CORROBORATION_DECAY: f64 = 0.5;
