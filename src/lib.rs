//! # repo_health_score
//!
//! Health scoring and lifecycle classification for software repositories,
//! computed from activity metrics gathered over four trailing six-month periods:
//! - **Classification**: Active, Declining or Abandoned, with evidence text and
//!   official deprecation overrides
//! - **Health scoring**: weighted velocity, collaboration, quality and
//!   evolvability sub-scores plus trend and recency modifiers, banded into
//!   Healthy, Moderate, Declining or Critical
//!
//! Both are pure functions of `(snapshot, evaluation_time, config)`.
//!
//! ## Quick Start
//!
//! ```no_run
//! use repo_health_score::{evaluate_records, read_records, EngineConfig};
//! use chrono::Utc;
//! use std::path::Path;
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = EngineConfig::default();
//! let records = read_records(Path::new("repo_data.json"))?;
//! let report = evaluate_records(records, &config, Utc::now())?;
//!
//! for eval in &report.evaluations {
//!     println!(
//!         "{}: {} (score: {})",
//!         eval.name, eval.classification.classification, eval.score.health_score
//!     );
//! }
//! # Ok(())
//! # }
//! ```

mod calibration;
mod classify;
mod config;
mod error;
mod evaluate;
mod normalise;
mod period;
mod scoring;
mod snapshot;
mod types;

#[cfg(test)]
mod testing;

// Re-export public API
pub use calibration::{agrees, calibrate};
pub use classify::{classify, classify_with_config};
pub use config::{
    BandThresholds, CategoryWeights, ClassifierThresholds, CollaborationCaps, EngineConfig,
    EngineConfigBuilder, EvolvabilityCaps, ModifierPolicy, PeriodLayout, QualityPolicy,
    VelocityCaps, ABANDONED_EVOLVABILITY_SCORE, ABANDONED_QUALITY_SCORE, NEUTRAL_SCORE,
};
pub use error::{EngineError, Result};
pub use evaluate::{
    augment_record, evaluate_record, evaluate_records, evaluate_records_concurrent,
    evaluate_snapshot, ERROR_FIELD, OUTPUT_FIELDS,
};
pub use normalise::{handle_zero, normalise_higher, normalise_lower};
pub use period::{period_windows, ByPeriod, Period, PeriodWindow};
pub use scoring::{
    bug_closure_component, category_scores, determine_band, growth_component, is_abandoned,
    merge_time_component, response_component, review_component, score, CategoryScores,
};
pub use snapshot::{parse_records, parse_snapshot, read_records, required_paths};
pub use types::*;
