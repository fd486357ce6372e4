pub mod document;
pub mod selector;
pub mod snapshot_model;
