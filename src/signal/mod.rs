pub mod evaluators;
pub mod patterns;
pub mod signal_model;
pub mod weights;
