//! Comparison, link validation and phrase search

pub mod batch;
pub mod comparators;
pub mod discrepancy;
pub mod link_validator;
pub mod options;
pub mod orchestrator;
pub mod phrases;
pub mod http_check;
