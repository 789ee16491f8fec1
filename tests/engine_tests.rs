//! Integration tests for classification and scoring over collector output

use chrono::{DateTime, NaiveDate, Utc};
use repo_health_score::{
    classify_with_config, evaluate_records, evaluate_records_concurrent, parse_records,
    parse_snapshot, read_records, score, Classification, ClassificationRule, EngineConfig,
    EngineError, HealthBand, RepositoryMetricsSnapshot,
};
use serde_json::Value;
use std::path::PathBuf;

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("repos.json")
}

fn fixture_records() -> Vec<Value> {
    read_records(&fixture_path()).expect("fixture should parse")
}

fn fixture(name: &str) -> RepositoryMetricsSnapshot {
    let record = fixture_records()
        .into_iter()
        .find(|r| r["name"] == name)
        .expect("fixture record exists");
    parse_snapshot(&record).expect("fixture record is valid")
}

fn evaluation_time() -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(2025, 3, 6)
        .and_then(|d| d.and_hms_opt(9, 0, 0))
        .expect("valid date")
        .and_utc()
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 0.051,
        "expected {} to be close to {}",
        actual,
        expected
    );
}

#[test]
fn test_active_scenario() {
    let config = EngineConfig::default();
    let repo = fixture("octo/active");
    let now = evaluation_time();

    let outcome = classify_with_config(&repo, &config, now);
    assert_eq!(outcome.classification, Classification::Active);

    let result = score(&repo, &config, now);
    assert_eq!(result.trend_modifier, 10.0);
    assert_eq!(result.recency_bonus, 5.0);
    assert_close(result.velocity_score, 70.3);
    assert_close(result.health_score, 90.0);
    assert_eq!(result.health_band, HealthBand::Healthy);
}

#[test]
fn test_deprecated_repository_is_abandoned_despite_activity() {
    let config = EngineConfig::default();
    let repo = fixture("atom/atom");
    let outcome = classify_with_config(&repo, &config, evaluation_time());

    assert_eq!(repo.velocity.period_metrics.period_4.commit_count, 100);
    assert_eq!(outcome.classification, Classification::Abandoned);
    assert_eq!(outcome.rule, ClassificationRule::OfficialDeprecation);
    assert!(outcome.official_statement.is_some());
}

#[test]
fn test_declining_via_trend_scenario() {
    let config = EngineConfig::default();
    let repo = fixture("octo/fading");
    let now = evaluation_time();

    let outcome = classify_with_config(&repo, &config, now);
    assert_eq!(outcome.classification, Classification::Declining);
    assert_eq!(outcome.rule, ClassificationRule::TrendingDown);
    assert_eq!(score(&repo, &config, now).trend_modifier, 0.0);
}

#[test]
fn test_zero_baseline_growth_scenario() {
    let config = EngineConfig::default();
    let repo = fixture("octo/newcomer");
    let result = score(&repo, &config, evaluation_time());

    assert_eq!(result.trend_modifier, 10.0);
    // No merges in the latest period: merge component sits at the neutral 0.5
    assert_close(result.velocity_score, 19.0);
    assert_eq!(result.health_band, HealthBand::Moderate);
}

#[test]
fn test_long_dead_repository() {
    let config = EngineConfig::default();
    let repo = fixture("octo/dead");
    let now = evaluation_time();

    let outcome = classify_with_config(&repo, &config, now);
    assert_eq!(outcome.classification, Classification::Abandoned);
    assert_eq!(outcome.rule, ClassificationRule::HardDead);

    let result = score(&repo, &config, now);
    assert_eq!(result.quality_score, 10.0);
    assert_eq!(result.evolvability_score, 0.0);
    assert_eq!(result.health_band, HealthBand::Critical);
}

#[test]
fn test_fixture_batch() {
    let report = evaluate_records(fixture_records(), &EngineConfig::default(), evaluation_time())
        .expect("batch evaluates");

    assert_eq!(report.summary.total_repositories, 6);
    assert_eq!(report.summary.evaluated, 5);
    assert_eq!(report.summary.failed, 1);
    assert_eq!(report.summary.active, 1);
    assert_eq!(report.summary.declining, 2);
    assert_eq!(report.summary.abandoned, 2);
    assert_eq!(report.summary.healthy_band, 2);
    assert_eq!(report.summary.moderate_band, 2);
    assert_eq!(report.summary.critical_band, 1);

    let failure = &report.failures[0];
    assert_eq!(failure.repository.as_deref(), Some("octo/broken"));
    assert!(failure
        .message
        .contains("velocity.pr_metrics_by_period.period_4"));

    assert_eq!(report.calibration.agreeing, 4);
    assert_eq!(report.calibration.disagreements, vec!["atom/atom".to_string()]);
}

#[test]
fn test_bounds_hold_for_every_fixture() {
    let report = evaluate_records(fixture_records(), &EngineConfig::default(), evaluation_time())
        .expect("batch evaluates");

    for eval in &report.evaluations {
        let s = &eval.score;
        for sub in [
            s.velocity_score,
            s.collaboration_score,
            s.quality_score,
            s.evolvability_score,
        ] {
            assert!((0.0..=100.0).contains(&sub), "{}: {}", eval.name, sub);
        }
        assert!((0.0..=100.0).contains(&s.health_score));
    }
}

#[test]
fn test_missing_period_is_a_typed_error() {
    let records = fixture_records();
    let broken = records
        .iter()
        .find(|r| r["name"] == "octo/broken")
        .expect("broken fixture exists");

    match parse_snapshot(broken) {
        Err(EngineError::MissingMetric { repository, path }) => {
            assert_eq!(repository, "octo/broken");
            assert_eq!(path, "velocity.pr_metrics_by_period.period_4");
        }
        other => panic!("expected missing metric, got {:?}", other),
    }
}

#[test]
fn test_output_is_byte_identical_across_runs() {
    let config = EngineConfig::default();
    let first = evaluate_records(fixture_records(), &config, evaluation_time()).unwrap();
    let second = evaluate_records(fixture_records(), &config, evaluation_time()).unwrap();

    let first = serde_json::to_string_pretty(&first.repositories).unwrap();
    let second = serde_json::to_string_pretty(&second.repositories).unwrap();
    assert_eq!(first, second);

    // Feeding the output back in changes nothing
    let rerun =
        evaluate_records(parse_records(&first).unwrap(), &config, evaluation_time()).unwrap();
    assert_eq!(first, serde_json::to_string_pretty(&rerun.repositories).unwrap());
}

#[test]
fn test_concurrent_batch_matches_sequential() {
    let config = EngineConfig::default();
    let sequential = evaluate_records(fixture_records(), &config, evaluation_time()).unwrap();

    let runtime = tokio::runtime::Runtime::new().unwrap();
    let concurrent = runtime
        .block_on(evaluate_records_concurrent(
            fixture_records(),
            &config,
            evaluation_time(),
        ))
        .unwrap();

    assert_eq!(sequential.repositories, concurrent.repositories);
    assert_eq!(sequential.calibration, concurrent.calibration);
}

#[test]
fn test_concurrent_batch_with_tokio_test() {
    let config = EngineConfig::default();
    let report = tokio_test::block_on(evaluate_records_concurrent(
        Vec::new(),
        &config,
        evaluation_time(),
    ))
    .unwrap();

    assert_eq!(report.summary.total_repositories, 0);
    assert_eq!(report.summary.average_health_score, 0.0);
    assert_eq!(report.calibration.accuracy, 0.0);
}

#[test]
fn test_evaluation_time_changes_outcome() {
    let config = EngineConfig::default();
    let repo = fixture("octo/active");
    let later = evaluation_time() + chrono::Duration::days(60);

    assert_eq!(
        classify_with_config(&repo, &config, later).classification,
        Classification::Abandoned
    );
    assert_eq!(score(&repo, &config, later).recency_bonus, 0.0);
}
