//! Multi-criteria EV charging site suitability analysis for Lahore tehsils.
//!
//! [`scoring::score`] is the pure core; the other modules load census and
//! candidate-site tables, derive site recommendations and write reports.
pub mod config;
pub mod error;
pub mod loader;
pub mod output;
pub mod reports;
pub mod scoring;
pub mod sites;
pub mod types;
pub mod util;

pub use error::{LoadError, ScoringError};
pub use scoring::{score, score_detailed, DegenerateCriterion, Scorecard};
pub use types::{CriteriaWeights, Criterion, RegionInput, RegionResult};
