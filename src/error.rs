use crate::types::Criterion;
use thiserror::Error;

/// Contract violations raised by the scorer. Nothing is scored when one of
/// these is returned.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScoringError {
    #[error("no regions to score")]
    NoRegions,
    #[error("region #{index} has an empty name")]
    UnnamedRegion { index: usize },
    #[error("duplicate region name '{0}'")]
    DuplicateRegion(String),
    #[error("region '{region}' is missing required field '{field}'")]
    MissingField { region: String, field: &'static str },
    #[error("region '{region}' has a non-finite value for '{field}': {value}")]
    NonFiniteValue {
        region: String,
        field: &'static str,
        value: f64,
    },
    #[error("weight for '{criterion}' must be a finite non-negative number, got {weight}")]
    InvalidWeight { criterion: Criterion, weight: f64 },
}

/// File-level failures while reading census or site tables.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A site jitter amplitude that cannot be sampled from.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
#[error("jitter amplitude must be a finite non-negative number, got {0}")]
pub struct InvalidJitter(pub f64);
