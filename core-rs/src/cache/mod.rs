//! Cache module for vocabulary labels
//!
//! Holds the notice-type and form-type label tables, loaded once per
//! process from the SPARQL endpoint.

pub mod labels;

pub use labels::{LabelCache, LabelMap, DEFAULT_LANGUAGE, UNKNOWN_LABEL};
