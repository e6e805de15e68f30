//! Macro implementations

pub mod indexed_model;

pub use indexed_model::expand_indexed_model;
