pub mod candidate;
pub mod field_types;
