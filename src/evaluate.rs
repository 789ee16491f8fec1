//! Batch evaluation: classify and score every repository record

use crate::calibration::calibrate;
use crate::classify::classify_with_config;
use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::period::period_windows;
use crate::scoring::score;
use crate::snapshot::{parse_snapshot, record_name};
use crate::types::{
    EvaluationFailure, EvaluationReport, EvaluationSummary, RepositoryEvaluation,
    RepositoryMetricsSnapshot,
};
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Fields the engine writes onto a record
pub const OUTPUT_FIELDS: &[&str] = &[
    "classification",
    "classification_evidence",
    "official_statement",
    "velocity_score",
    "collaboration_score",
    "quality_score",
    "evolvability_score",
    "trend_modifier",
    "recency_bonus",
    "raw_score",
    "health_score",
    "health_band",
];

/// Field set on records that could not be evaluated
pub const ERROR_FIELD: &str = "evaluation_error";

/// Run the classifier and the scorer on one snapshot
pub fn evaluate_snapshot(
    repo: &RepositoryMetricsSnapshot,
    config: &EngineConfig,
    now: DateTime<Utc>,
) -> RepositoryEvaluation {
    RepositoryEvaluation {
        name: repo.name.clone(),
        days_since_last_commit: repo.days_since_last_commit(now),
        classification: classify_with_config(repo, config, now),
        score: score(repo, config, now),
    }
}

/// Decode and evaluate one collector record
pub fn evaluate_record(
    record: &Value,
    config: &EngineConfig,
    now: DateTime<Utc>,
) -> Result<RepositoryEvaluation> {
    let snapshot = parse_snapshot(record)?;
    Ok(evaluate_snapshot(&snapshot, config, now))
}

/// Write classification and score fields onto a record, replacing earlier ones
pub fn augment_record(record: &mut Value, evaluation: &RepositoryEvaluation) {
    let Some(fields) = record.as_object_mut() else {
        return;
    };

    let outcome = &evaluation.classification;
    let score = &evaluation.score;

    fields.remove(ERROR_FIELD);
    fields.insert("classification".into(), json!(outcome.classification));
    fields.insert("classification_evidence".into(), json!(outcome.evidence));
    match &outcome.official_statement {
        Some(url) => {
            fields.insert("official_statement".into(), json!(url));
        }
        None => {
            fields.remove("official_statement");
        }
    }

    fields.insert("velocity_score".into(), json!(score.velocity_score));
    fields.insert("collaboration_score".into(), json!(score.collaboration_score));
    fields.insert("quality_score".into(), json!(score.quality_score));
    fields.insert("evolvability_score".into(), json!(score.evolvability_score));
    fields.insert("trend_modifier".into(), json!(score.trend_modifier));
    fields.insert("recency_bonus".into(), json!(score.recency_bonus));
    fields.insert("raw_score".into(), json!(score.raw_score));
    fields.insert("health_score".into(), json!(score.health_score));
    fields.insert("health_band".into(), json!(score.health_band));
}

/// Strip stale output fields from a record and record why it failed.
///
/// A record that is not an object is replaced by one holding only the error.
fn mark_failed(record: &mut Value, error: &EngineError) {
    match record.as_object_mut() {
        Some(fields) => {
            for field in OUTPUT_FIELDS {
                fields.remove(*field);
            }
            fields.insert(ERROR_FIELD.into(), json!(error.to_string()));
        }
        None => *record = json!({ ERROR_FIELD: error.to_string() }),
    }
}

/// Evaluate a batch of records one after another
pub fn evaluate_records(
    records: Vec<Value>,
    config: &EngineConfig,
    now: DateTime<Utc>,
) -> Result<EvaluationReport> {
    config.validate()?;
    info!("Evaluating {} repositories at {}", records.len(), now);

    let outcomes = records
        .iter()
        .map(|record| evaluate_record(record, config, now))
        .collect();

    Ok(assemble_report(records, outcomes, config, now))
}

/// Evaluate a batch with one blocking task per repository.
///
/// Output is identical to [`evaluate_records`].
pub async fn evaluate_records_concurrent(
    records: Vec<Value>,
    config: &EngineConfig,
    now: DateTime<Utc>,
) -> Result<EvaluationReport> {
    config.validate()?;
    info!(
        "Evaluating {} repositories concurrently at {}",
        records.len(),
        now
    );

    let records = Arc::new(records);
    let shared_config = Arc::new(config.clone());
    let mut tasks = Vec::with_capacity(records.len());

    for index in 0..records.len() {
        let records = Arc::clone(&records);
        let config = Arc::clone(&shared_config);
        tasks.push(tokio::task::spawn_blocking(move || {
            evaluate_record(&records[index], &config, now)
        }));
    }

    // Collect in input order
    let mut outcomes = Vec::with_capacity(tasks.len());
    for task in tasks {
        match task.await {
            Ok(outcome) => outcomes.push(outcome),
            Err(e) => {
                warn!("Task failed: {}", e);
                outcomes.push(Err(EngineError::TaskFailed(e.to_string())));
            }
        }
    }

    let records = Arc::try_unwrap(records).unwrap_or_else(|shared| (*shared).clone());
    Ok(assemble_report(records, outcomes, config, now))
}

fn assemble_report(
    mut records: Vec<Value>,
    outcomes: Vec<Result<RepositoryEvaluation>>,
    config: &EngineConfig,
    now: DateTime<Utc>,
) -> EvaluationReport {
    let mut evaluations = Vec::new();
    let mut failures = Vec::new();

    for (index, (record, outcome)) in records.iter_mut().zip(outcomes).enumerate() {
        match outcome {
            Ok(evaluation) => {
                debug!(
                    "{}: {} / {} ({})",
                    evaluation.name,
                    evaluation.classification.classification,
                    evaluation.score.health_band,
                    evaluation.score.health_score
                );
                augment_record(record, &evaluation);
                evaluations.push(evaluation);
            }
            Err(e) => {
                warn!("Failed to evaluate record {}: {}", index, e);
                mark_failed(record, &e);
                failures.push(EvaluationFailure {
                    index,
                    repository: e
                        .repository()
                        .or_else(|| record_name(record))
                        .map(String::from),
                    message: e.to_string(),
                });
            }
        }
    }

    let calibration = calibrate(&evaluations);
    let mut report = EvaluationReport {
        evaluation_time: now,
        periods: period_windows(now, &config.periods),
        repositories: records,
        evaluations,
        failures,
        summary: EvaluationSummary::default(),
        calibration,
    };
    report.compute_summary();

    info!(
        "Evaluation complete: {} active, {} declining, {} abandoned, {} failed of {}",
        report.summary.active,
        report.summary.declining,
        report.summary.abandoned,
        report.summary.failed,
        report.summary.total_repositories,
    );

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{at, snapshot};
    use crate::types::{Classification, HealthBand};

    fn records() -> Vec<Value> {
        vec![
            serde_json::to_value(snapshot("octo/active", [40, 45, 48, 50])).unwrap(),
            serde_json::to_value(snapshot("atom/atom", [100, 100, 100, 100])).unwrap(),
            json!({ "name": "octo/broken", "velocity": { "last_commit_date": "2025-02-01" } }),
            serde_json::to_value(snapshot("octo/dead", [0, 0, 0, 0])).unwrap(),
        ]
    }

    fn now() -> DateTime<Utc> {
        at(&snapshot("octo/active", [0, 0, 0, 0]), 5)
    }

    #[test]
    fn test_batch_continues_past_failures() {
        let report = evaluate_records(records(), &EngineConfig::default(), now()).unwrap();

        assert_eq!(report.repositories.len(), 4);
        assert_eq!(report.evaluations.len(), 3);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].index, 2);
        assert_eq!(report.failures[0].repository.as_deref(), Some("octo/broken"));
        assert!(report.repositories[2][ERROR_FIELD]
            .as_str()
            .unwrap()
            .contains("velocity.period_metrics.period_1"));
        assert!(report.repositories[2].get("health_score").is_none());
    }

    #[test]
    fn test_non_object_record_carries_error_field() {
        let mut records = records();
        records.push(json!(42));
        let report = evaluate_records(records, &EngineConfig::default(), now()).unwrap();

        let failed = &report.repositories[4];
        assert!(failed.is_object());
        assert!(failed[ERROR_FIELD]
            .as_str()
            .unwrap()
            .contains("Invalid repository record"));
        assert_eq!(report.failures.len(), 2);
        assert_eq!(report.failures[1].index, 4);
        assert_eq!(report.failures[1].repository, None);
    }

    #[test]
    fn test_records_are_augmented() {
        let report = evaluate_records(records(), &EngineConfig::default(), now()).unwrap();

        let active = &report.repositories[0];
        assert_eq!(active["classification"], "Active");
        assert_eq!(active["health_band"], "Healthy");
        assert!(active.get("official_statement").is_none());
        // Input fields survive
        assert_eq!(active["velocity"]["releases_last_year"], 4);

        let atom = &report.repositories[1];
        assert_eq!(atom["classification"], "Abandoned");
        assert!(atom["official_statement"].as_str().unwrap().contains("sunsetting-atom"));
    }

    #[test]
    fn test_summary_and_calibration() {
        let report = evaluate_records(records(), &EngineConfig::default(), now()).unwrap();
        let summary = &report.summary;

        assert_eq!(summary.total_repositories, 4);
        assert_eq!(summary.evaluated, 3);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.active, 1);
        assert_eq!(summary.abandoned, 1);
        assert_eq!(summary.declining, 1);
        assert_eq!(report.calibration.evaluated, 3);
        assert!(report.calibration.disagreements.contains(&"atom/atom".to_string()));
        assert_eq!(report.periods.len(), 4);
    }

    #[test]
    fn test_reevaluation_is_idempotent() {
        let config = EngineConfig::default();
        let first = evaluate_records(records(), &config, now()).unwrap();
        let second = evaluate_records(first.repositories.clone(), &config, now()).unwrap();

        assert_eq!(
            serde_json::to_string(&first.repositories).unwrap(),
            serde_json::to_string(&second.repositories).unwrap()
        );
    }

    #[test]
    fn test_stale_fields_removed_when_no_longer_deprecated() {
        let mut config = EngineConfig::default();
        let first = evaluate_records(records(), &config, now()).unwrap();

        config.known_deprecations.clear();
        let second = evaluate_records(first.repositories, &config, now()).unwrap();
        let atom = &second.repositories[1];
        assert!(atom.get("official_statement").is_none());
        assert_ne!(atom["classification"], "Abandoned");
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = EngineConfig::default();
        config.weights.velocity = 0.9;
        assert!(evaluate_records(records(), &config, now()).is_err());
    }

    #[test]
    fn test_evaluate_snapshot_outputs() {
        let repo = snapshot("octo/dead", [0, 0, 0, 0]);
        let evaluation = evaluate_snapshot(&repo, &EngineConfig::default(), at(&repo, 5));
        assert_eq!(evaluation.days_since_last_commit, 5);
        assert_eq!(evaluation.classification.classification, Classification::Declining);
        assert_eq!(evaluation.score.trend_modifier, 0.0);
        assert_eq!(evaluation.score.recency_bonus, 0.0);
        assert_ne!(evaluation.score.health_band, HealthBand::Healthy);
    }

    #[tokio::test]
    async fn test_concurrent_matches_sequential() {
        let config = EngineConfig::default();
        let sequential = evaluate_records(records(), &config, now()).unwrap();
        let concurrent = evaluate_records_concurrent(records(), &config, now())
            .await
            .unwrap();

        assert_eq!(sequential.repositories, concurrent.repositories);
        assert_eq!(sequential.summary, concurrent.summary);
        assert_eq!(sequential.failures, concurrent.failures);
    }
}
