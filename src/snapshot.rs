//! Decoding collector output into typed snapshots
//!
//! The collector hands over a JSON array of loosely typed records. Every
//! metric the engine consumes is checked by path before decoding, so a
//! missing field is reported as `velocity.period_metrics.period_4.commit_count`
//! rather than silently read as zero.

use crate::error::{EngineError, Result};
use crate::period::Period;
use crate::types::RepositoryMetricsSnapshot;
use chrono::NaiveDate;
use serde_json::Value;
use std::path::Path;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Per-period metric families and the leaves the engine reads from each period
const PERIOD_FIELDS: &[(&str, &[&str])] = &[
    ("velocity.period_metrics", &["commit_count", "total_changes"]),
    (
        "velocity.pr_metrics_by_period",
        &["merged_count", "avg_merge_time_hours"],
    ),
    (
        "collaboration.contributor_metrics_by_period",
        &["total_contributors", "retention_rate"],
    ),
    (
        "collaboration.pr_review_by_period",
        &["total_prs", "avg_reviews_per_pr"],
    ),
    (
        "collaboration.issue_response_by_period",
        &["issues_created", "avg_response_time_hours"],
    ),
    (
        "quality.bug_feature_by_period",
        &["bugs_opened", "bug_closure_rate"],
    ),
    ("quality.issue_accumulation_by_period", &["accumulation_rate"]),
    ("quality.breaking_changes_by_period", &["breaking_change_rate"]),
    ("quality.regression_by_period", &["regression_rate"]),
    (
        "evolvability.refactoring_by_period",
        &["refactoring_rate", "dependency_update_rate"],
    ),
    ("evolvability.feature_growth_by_period", &["net_loc_change"]),
];

const SCALAR_FIELDS: &[&str] = &[
    "velocity.last_commit_date",
    "velocity.commits_last_3_months",
    "velocity.releases_last_year",
    "collaboration.active_contributors_last_3_months",
];

/// Date fields; `last_commit_date` is required, the others may be null
const DATE_FIELDS: &[&str] = &[
    "velocity.last_commit_date",
    "velocity.latest_release_date",
    "evolvability.created_date",
];

/// Name of a record, if it has one
pub fn record_name(record: &Value) -> Option<&str> {
    record.get("name").and_then(Value::as_str)
}

/// Decode one collector record into a typed snapshot
pub fn parse_snapshot(record: &Value) -> Result<RepositoryMetricsSnapshot> {
    if !record.is_object() {
        return Err(EngineError::InvalidRecord(
            "repository record must be a JSON object".to_string(),
        ));
    }
    let name = record_name(record).ok_or_else(|| {
        EngineError::InvalidRecord("repository record has no string 'name' field".to_string())
    })?;

    check_required_paths(name, record)?;
    check_dates(name, record)?;

    serde_json::from_value(record.clone()).map_err(|e| EngineError::malformed(name, e.to_string()))
}

/// Every metric path the engine reads, in dotted form
pub fn required_paths() -> Vec<String> {
    let mut paths: Vec<String> = SCALAR_FIELDS.iter().map(|p| p.to_string()).collect();
    for (family, leaves) in PERIOD_FIELDS {
        for period in Period::ALL {
            for leaf in leaves.iter() {
                paths.push(format!("{}.{}.{}", family, period.key(), leaf));
            }
        }
    }
    paths
}

fn check_required_paths(name: &str, record: &Value) -> Result<()> {
    for (family, leaves) in PERIOD_FIELDS {
        for period in Period::ALL {
            let period_path = format!("{}.{}", family, period.key());
            if lookup(record, &period_path).is_none() {
                return Err(EngineError::missing(name, period_path));
            }
            for leaf in leaves.iter() {
                let path = format!("{}.{}", period_path, leaf);
                if lookup(record, &path).is_none() {
                    return Err(EngineError::missing(name, path));
                }
            }
        }
    }

    for path in SCALAR_FIELDS {
        if lookup(record, path).is_none() {
            return Err(EngineError::missing(name, *path));
        }
    }
    Ok(())
}

fn check_dates(name: &str, record: &Value) -> Result<()> {
    for path in DATE_FIELDS {
        match lookup(record, path) {
            None => {}
            Some(Value::String(raw)) => {
                NaiveDate::parse_from_str(raw, DATE_FORMAT)
                    .map_err(|_| EngineError::invalid_date(name, *path, raw.as_str()))?;
            }
            Some(other) => {
                return Err(EngineError::invalid_date(name, *path, other.to_string()));
            }
        }
    }
    Ok(())
}

/// Walk a dotted path; JSON null counts as absent
fn lookup<'a>(record: &'a Value, dotted: &str) -> Option<&'a Value> {
    dotted
        .split('.')
        .try_fold(record, |node, key| node.get(key))
        .filter(|v| !v.is_null())
}

/// Parse a JSON document holding an array of snapshot records
pub fn parse_records(json: &str) -> Result<Vec<Value>> {
    match serde_json::from_str::<Value>(json)? {
        Value::Array(records) => Ok(records),
        _ => Err(EngineError::InvalidRecord(
            "input must be a JSON array of repository records".to_string(),
        )),
    }
}

/// Read snapshot records from a JSON file
pub fn read_records(path: &Path) -> Result<Vec<Value>> {
    let content = std::fs::read_to_string(path)?;
    parse_records(&content)
}
