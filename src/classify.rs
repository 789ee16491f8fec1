//! Lifecycle classification: Active, Declining or Abandoned

use crate::config::{ClassifierThresholds, EngineConfig};
use crate::types::{
    Classification, ClassificationOutcome, ClassificationRule, RepositoryMetricsSnapshot,
};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use tracing::debug;

/// The numbers every rule looks at
#[derive(Debug, Clone, Copy)]
struct Signals<'a> {
    official_statement: Option<&'a str>,
    days_since_last_commit: i64,
    recent_commits: u64,
    baseline_commits: u64,
}

/// A guarded rule; the table is evaluated top to bottom and the first match wins
struct Rule {
    id: ClassificationRule,
    outcome: Classification,
    matches: fn(&Signals<'_>, &ClassifierThresholds) -> bool,
}

const RULES: [Rule; 6] = [
    Rule {
        id: ClassificationRule::OfficialDeprecation,
        outcome: Classification::Abandoned,
        matches: officially_deprecated,
    },
    Rule {
        id: ClassificationRule::HardDead,
        outcome: Classification::Abandoned,
        matches: hard_dead,
    },
    Rule {
        id: ClassificationRule::Active,
        outcome: Classification::Active,
        matches: active,
    },
    Rule {
        id: ClassificationRule::TrendingDown,
        outcome: Classification::Declining,
        matches: trending_down,
    },
    Rule {
        id: ClassificationRule::Quiet,
        outcome: Classification::Declining,
        matches: quiet,
    },
    Rule {
        id: ClassificationRule::Fallback,
        outcome: Classification::Abandoned,
        matches: always,
    },
];

fn officially_deprecated(s: &Signals<'_>, _: &ClassifierThresholds) -> bool {
    s.official_statement.is_some()
}

fn hard_dead(s: &Signals<'_>, t: &ClassifierThresholds) -> bool {
    s.days_since_last_commit > t.dead_after_days && s.recent_commits == 0
}

fn active(s: &Signals<'_>, t: &ClassifierThresholds) -> bool {
    s.recent_commits > t.active_min_commits
        && s.days_since_last_commit < t.active_max_days
        && (!t.require_sustained_activity
            || holds_up(s.recent_commits, s.baseline_commits, t.sustained_ratio))
}

fn trending_down(s: &Signals<'_>, t: &ClassifierThresholds) -> bool {
    s.recent_commits > 0 && fell_below(s.recent_commits, s.baseline_commits, t.decline_ratio)
}

/// Low but nonzero activity, or silent for less than the dead threshold
fn quiet(s: &Signals<'_>, t: &ClassifierThresholds) -> bool {
    (s.recent_commits > 0 && s.recent_commits <= t.active_min_commits)
        || (s.recent_commits == 0 && s.days_since_last_commit <= t.dead_after_days)
}

fn always(_: &Signals<'_>, _: &ClassifierThresholds) -> bool {
    true
}

/// Whether `recent` reaches `ratio × baseline`.
///
/// Any activity against a zero baseline is growth.
pub(crate) fn holds_up(recent: u64, baseline: u64, ratio: f64) -> bool {
    if baseline == 0 {
        recent > 0
    } else {
        recent as f64 >= ratio * baseline as f64
    }
}

/// Whether `recent` dropped under `ratio × baseline`; never true for a zero baseline
fn fell_below(recent: u64, baseline: u64, ratio: f64) -> bool {
    baseline > 0 && (recent as f64) < ratio * baseline as f64
}

/// Classify a repository's lifecycle stage at `now`
pub fn classify(
    repo: &RepositoryMetricsSnapshot,
    known_deprecations: &BTreeMap<String, String>,
    thresholds: &ClassifierThresholds,
    now: DateTime<Utc>,
) -> ClassificationOutcome {
    let signals = Signals {
        official_statement: known_deprecations.get(&repo.name).map(String::as_str),
        days_since_last_commit: repo.days_since_last_commit(now),
        recent_commits: repo.recent_commits(),
        baseline_commits: repo.baseline_commits(),
    };

    // The last rule always matches
    let rule = RULES
        .iter()
        .find(|rule| (rule.matches)(&signals, thresholds))
        .unwrap_or(&RULES[RULES.len() - 1]);

    debug!("Classified {} as {} via {:?}", repo.name, rule.outcome, rule.id);

    ClassificationOutcome {
        classification: rule.outcome,
        evidence: build_evidence(repo, signals.days_since_last_commit),
        official_statement: signals.official_statement.map(String::from),
        rule: rule.id,
    }
}

/// Classify with the thresholds and deprecation list from `config`
pub fn classify_with_config(
    repo: &RepositoryMetricsSnapshot,
    config: &EngineConfig,
    now: DateTime<Utc>,
) -> ClassificationOutcome {
    classify(repo, &config.known_deprecations, &config.classifier, now)
}

fn build_evidence(repo: &RepositoryMetricsSnapshot, days_since_last_commit: i64) -> String {
    let contributors = &repo.collaboration.contributor_metrics_by_period;
    let mut parts = vec![
        format!(
            "{} commits in last 6 months vs {} 18-24 months ago",
            repo.recent_commits(),
            repo.baseline_commits()
        ),
        format!(
            "{} contributors in last 6 months vs {} 18-24 months ago",
            contributors.latest().total_contributors,
            contributors.baseline().total_contributors
        ),
    ];

    let commits = repo.velocity.commits_last_3_months;
    if commits > 0 {
        parts.push(format!("{} commits in last 3 months", commits));
    } else {
        parts.push("No commits in last 3 months".to_string());
    }

    let releases = repo.velocity.releases_last_year;
    if releases > 0 {
        parts.push(format!("{} releases in last year", releases));
    } else {
        parts.push("No releases in last year".to_string());
    }

    let active = repo.collaboration.active_contributors_last_3_months;
    if active > 0 {
        parts.push(format!("{} active contributors", active));
    }

    parts.push(format!("last commit {} days ago", days_since_last_commit));
    parts.join(", ")
}
