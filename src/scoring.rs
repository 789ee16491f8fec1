//! Health scoring algorithms for repositories

use crate::classify::holds_up;
use crate::config::{BandThresholds, EngineConfig};
use crate::normalise::{
    clamp_rate, handle_zero, inverse_rate, mean, normalise_higher, normalise_lower, round1,
};
use crate::types::{HealthBand, RepositoryMetricsSnapshot, ScoreResult};
use chrono::{DateTime, Utc};
use tracing::debug;

/// Category sub-scores in [0, 1] before weighting
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CategoryScores {
    pub velocity: f64,
    pub collaboration: f64,
    pub quality: f64,
    pub evolvability: f64,
}

/// Calculate the health score for a repository at `now`
pub fn score(
    repo: &RepositoryMetricsSnapshot,
    config: &EngineConfig,
    now: DateTime<Utc>,
) -> ScoreResult {
    let days_since_last_commit = repo.days_since_last_commit(now);
    let abandoned = is_abandoned(repo, config, days_since_last_commit);
    let categories = category_scores(repo, config, abandoned);

    let weights = &config.weights;
    let raw = 100.0
        * (categories.velocity * weights.velocity
            + categories.collaboration * weights.collaboration
            + categories.quality * weights.quality
            + categories.evolvability * weights.evolvability);

    let trend = trend_modifier(repo, config);
    let recency = recency_bonus(repo, config, days_since_last_commit);
    let health_score = round1((raw + trend + recency).clamp(0.0, 100.0));

    debug!(
        "Scored {}: raw {:.1}, trend {}, recency {}, final {}",
        repo.name, raw, trend, recency, health_score
    );

    ScoreResult {
        velocity_score: round1(categories.velocity * 100.0),
        collaboration_score: round1(categories.collaboration * 100.0),
        quality_score: round1(categories.quality * 100.0),
        evolvability_score: round1(categories.evolvability * 100.0),
        trend_modifier: trend,
        recency_bonus: recency,
        raw_score: round1(raw),
        health_score,
        health_band: determine_band(health_score, &config.bands),
    }
}

/// Compute all four category sub-scores
pub fn category_scores(
    repo: &RepositoryMetricsSnapshot,
    config: &EngineConfig,
    abandoned: bool,
) -> CategoryScores {
    CategoryScores {
        velocity: score_velocity(repo, config),
        collaboration: score_collaboration(repo, config),
        quality: if abandoned {
            config.quality.abandoned_score
        } else {
            score_quality(repo)
        },
        evolvability: if abandoned {
            config.evolvability.abandoned_score
        } else {
            score_evolvability(repo, config)
        },
    }
}

/// Whether the repository has gone silent for scoring purposes.
///
/// Independent of the lifecycle classifier, which uses its own thresholds.
pub fn is_abandoned(
    repo: &RepositoryMetricsSnapshot,
    config: &EngineConfig,
    days_since_last_commit: i64,
) -> bool {
    let commits = &repo.velocity.period_metrics;
    commits.latest().commit_count == 0
        && (commits.previous().commit_count == 0
            || days_since_last_commit > config.evolvability.abandoned_after_days)
}

/// Velocity: commits, churn, PR merge time
pub fn score_velocity(repo: &RepositoryMetricsSnapshot, config: &EngineConfig) -> f64 {
    let caps = &config.velocity;
    let commits = repo.velocity.period_metrics.latest();
    let prs = repo.velocity.pr_metrics_by_period.latest();

    let commit_score = normalise_higher(commits.commit_count as f64, caps.commit_count);
    let churn_score = normalise_higher(commits.total_changes as f64, caps.total_changes);
    let merge_score =
        merge_time_component(prs.merged_count, prs.avg_merge_time_hours, caps.merge_time_hours);

    mean(&[commit_score, churn_score, merge_score])
}

/// Merge latency component; neutral when nothing was merged
pub fn merge_time_component(merged_count: u64, avg_merge_time_hours: f64, cap: f64) -> f64 {
    handle_zero(merged_count, || normalise_lower(avg_merge_time_hours, cap))
}

/// Collaboration: contributors, retention, reviews, response time
pub fn score_collaboration(repo: &RepositoryMetricsSnapshot, config: &EngineConfig) -> f64 {
    let caps = &config.collaboration;
    let collab = &repo.collaboration;
    let contributors = collab.contributor_metrics_by_period.latest();
    let reviews = collab.pr_review_by_period.latest();
    let issues = collab.issue_response_by_period.latest();

    let contributor_score =
        normalise_higher(contributors.total_contributors as f64, caps.contributors);
    let retention_score = clamp_rate(contributors.retention_rate);
    let review_score =
        review_component(reviews.total_prs, reviews.avg_reviews_per_pr, caps.reviews_per_pr);
    let response_score = response_component(
        issues.issues_created,
        issues.avg_response_time_hours,
        caps.response_time_hours,
    );

    mean(&[contributor_score, retention_score, review_score, response_score])
}

/// Review depth component; neutral when no PRs were opened
pub fn review_component(total_prs: u64, avg_reviews_per_pr: f64, cap: f64) -> f64 {
    handle_zero(total_prs, || normalise_higher(avg_reviews_per_pr, cap))
}

/// Issue response component; neutral when no issues were created
pub fn response_component(issues_created: u64, avg_response_time_hours: f64, cap: f64) -> f64 {
    handle_zero(issues_created, || normalise_lower(avg_response_time_hours, cap))
}

/// Quality: bug closure, issue accumulation, breaking changes, regressions
pub fn score_quality(repo: &RepositoryMetricsSnapshot) -> f64 {
    let quality = &repo.quality;
    let bugs = quality.bug_feature_by_period.latest();

    let bug_score = bug_closure_component(bugs.bugs_opened, bugs.bug_closure_rate);
    let accumulation_score =
        inverse_rate(quality.issue_accumulation_by_period.latest().accumulation_rate);
    let breaking_score =
        inverse_rate(quality.breaking_changes_by_period.latest().breaking_change_rate);
    let regression_score = inverse_rate(quality.regression_by_period.latest().regression_rate);

    mean(&[bug_score, accumulation_score, breaking_score, regression_score])
}

/// Bug closure component; neutral when no bugs were opened
pub fn bug_closure_component(bugs_opened: u64, bug_closure_rate: f64) -> f64 {
    handle_zero(bugs_opened, || clamp_rate(bug_closure_rate))
}

/// Evolvability: refactoring, dependency updates, codebase growth
pub fn score_evolvability(repo: &RepositoryMetricsSnapshot, config: &EngineConfig) -> f64 {
    let caps = &config.evolvability;
    let refactoring = repo.evolvability.refactoring_by_period.latest();
    let growth = repo.evolvability.feature_growth_by_period.latest();

    let refactoring_score = normalise_higher(refactoring.refactoring_rate, caps.refactoring_rate);
    let dependency_score =
        normalise_higher(refactoring.dependency_update_rate, caps.dependency_update_rate);
    let growth_score = growth_component(growth.net_loc_change, caps.net_loc_change);

    mean(&[refactoring_score, dependency_score, growth_score])
}

/// Codebase growth component; shrinking counts as no growth
pub fn growth_component(net_loc_change: i64, cap: f64) -> f64 {
    normalise_higher(net_loc_change.max(0) as f64, cap)
}

/// Bonus points when recent commits hold up against the 18-24 month baseline
pub fn trend_modifier(repo: &RepositoryMetricsSnapshot, config: &EngineConfig) -> f64 {
    let modifiers = &config.modifiers;
    if holds_up(repo.recent_commits(), repo.baseline_commits(), modifiers.trend_ratio) {
        modifiers.trend_bonus
    } else {
        0.0
    }
}

/// Bonus points for a recent commit
pub fn recency_bonus(
    repo: &RepositoryMetricsSnapshot,
    config: &EngineConfig,
    days_since_last_commit: i64,
) -> f64 {
    let modifiers = &config.modifiers;
    if days_since_last_commit < modifiers.recency_max_days && repo.recent_commits() > 0 {
        modifiers.recency_bonus
    } else {
        0.0
    }
}

/// Determine the health band from a rounded health score
pub fn determine_band(score: f64, bands: &BandThresholds) -> HealthBand {
    if score >= bands.healthy {
        HealthBand::Healthy
    } else if score >= bands.moderate {
        HealthBand::Moderate
    } else if score >= bands.declining {
        HealthBand::Declining
    } else {
        HealthBand::Critical
    }
}
