pub mod aggregate;
pub mod detector;
pub mod error;
pub mod result_model;
