//! Core data types: metrics snapshots in, classifications and scores out

use crate::period::{ByPeriod, PeriodWindow};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Activity metrics for one repository, as produced by the collector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryMetricsSnapshot {
    /// Unique identifier, e.g. `owner/repo`
    pub name: String,
    pub evolvability: EvolvabilityMetrics,
    pub velocity: VelocityMetrics,
    pub collaboration: CollaborationMetrics,
    pub quality: QualityMetrics,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvolvabilityMetrics {
    #[serde(default)]
    pub created_date: Option<NaiveDate>,
    #[serde(default)]
    pub age_days: Option<u64>,
    #[serde(default)]
    pub stars: Option<u64>,
    #[serde(default)]
    pub forks: Option<u64>,
    #[serde(default)]
    pub watchers: Option<u64>,
    pub refactoring_by_period: ByPeriod<RefactoringPeriod>,
    pub feature_growth_by_period: ByPeriod<FeatureGrowthPeriod>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VelocityMetrics {
    pub last_commit_date: NaiveDate,
    pub commits_last_3_months: u64,
    pub period_metrics: ByPeriod<CommitPeriod>,
    pub pr_metrics_by_period: ByPeriod<PullRequestMergePeriod>,
    pub releases_last_year: u64,
    #[serde(default)]
    pub latest_release_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollaborationMetrics {
    #[serde(default)]
    pub total_contributors: Option<u64>,
    pub active_contributors_last_3_months: u64,
    pub contributor_metrics_by_period: ByPeriod<ContributorPeriod>,
    #[serde(default)]
    pub pull_requests_open: Option<u64>,
    #[serde(default)]
    pub pull_requests_closed: Option<u64>,
    pub issue_response_by_period: ByPeriod<IssueResponsePeriod>,
    pub pr_review_by_period: ByPeriod<PullRequestReviewPeriod>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityMetrics {
    #[serde(default)]
    pub issues_open: Option<u64>,
    #[serde(default)]
    pub issues_closed_last_3_months: Option<u64>,
    pub bug_feature_by_period: ByPeriod<BugFeaturePeriod>,
    pub issue_accumulation_by_period: ByPeriod<IssueAccumulationPeriod>,
    pub breaking_changes_by_period: ByPeriod<BreakingChangePeriod>,
    pub regression_by_period: ByPeriod<RegressionPeriod>,
}

/// Commits and code churn in one period
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommitPeriod {
    pub commit_count: u64,
    #[serde(default)]
    pub additions: Option<u64>,
    #[serde(default)]
    pub deletions: Option<u64>,
    /// Lines added plus lines removed
    pub total_changes: u64,
    #[serde(default)]
    pub churn_rate: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PullRequestMergePeriod {
    pub merged_count: u64,
    #[serde(default)]
    pub closed_without_merge: Option<u64>,
    /// Zero when nothing was merged
    pub avg_merge_time_hours: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContributorPeriod {
    pub total_contributors: u64,
    /// Fraction of this period's contributors also active in the previous one
    pub retention_rate: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PullRequestReviewPeriod {
    pub total_prs: u64,
    pub avg_reviews_per_pr: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IssueResponsePeriod {
    pub issues_created: u64,
    pub avg_response_time_hours: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BugFeaturePeriod {
    pub bugs_opened: u64,
    #[serde(default)]
    pub bugs_closed: Option<u64>,
    #[serde(default)]
    pub features_opened: Option<u64>,
    #[serde(default)]
    pub features_closed: Option<u64>,
    pub bug_closure_rate: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IssueAccumulationPeriod {
    pub accumulation_rate: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BreakingChangePeriod {
    pub breaking_change_rate: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegressionPeriod {
    pub regression_rate: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RefactoringPeriod {
    pub refactoring_rate: f64,
    pub dependency_update_rate: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureGrowthPeriod {
    /// Lines added minus lines removed; negative when the codebase shrinks
    pub net_loc_change: i64,
}

impl RepositoryMetricsSnapshot {
    /// Whole days between the last commit and the evaluation instant
    pub fn days_since_last_commit(&self, now: DateTime<Utc>) -> i64 {
        (now.date_naive() - self.velocity.last_commit_date).num_days()
    }

    /// Commit count of the most recent period
    pub fn recent_commits(&self) -> u64 {
        self.velocity.period_metrics.latest().commit_count
    }

    /// Commit count of the oldest period (18-24 months ago)
    pub fn baseline_commits(&self) -> u64 {
        self.velocity.period_metrics.baseline().commit_count
    }
}

/// Lifecycle classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Classification {
    Active,
    Declining,
    Abandoned,
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "Active"),
            Self::Declining => write!(f, "Declining"),
            Self::Abandoned => write!(f, "Abandoned"),
        }
    }
}

/// Classifier rule that produced a classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationRule {
    OfficialDeprecation,
    HardDead,
    Active,
    TrendingDown,
    Quiet,
    Fallback,
}

/// Classifier output for one repository
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationOutcome {
    pub classification: Classification,
    /// Human-readable numbers behind the decision
    pub evidence: String,
    pub official_statement: Option<String>,
    pub rule: ClassificationRule,
}

/// Health band derived from the rounded health score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HealthBand {
    Healthy,
    Moderate,
    Declining,
    Critical,
}

impl std::fmt::Display for HealthBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Healthy => write!(f, "Healthy"),
            Self::Moderate => write!(f, "Moderate"),
            Self::Declining => write!(f, "Declining"),
            Self::Critical => write!(f, "Critical"),
        }
    }
}

/// Scorer output for one repository.
///
/// Sub-scores are on a 0-100 scale rounded to one decimal; modifiers are
/// in score points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub velocity_score: f64,
    pub collaboration_score: f64,
    pub quality_score: f64,
    pub evolvability_score: f64,
    pub trend_modifier: f64,
    pub recency_bonus: f64,
    /// Weighted score before modifiers
    pub raw_score: f64,
    /// Final score after modifiers and clamping (0-100)
    pub health_score: f64,
    pub health_band: HealthBand,
}

/// Both engine outputs for one repository
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryEvaluation {
    pub name: String,
    pub days_since_last_commit: i64,
    pub classification: ClassificationOutcome,
    pub score: ScoreResult,
}

/// A record that could not be evaluated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationFailure {
    /// Position of the record in the input
    pub index: usize,
    pub repository: Option<String>,
    pub message: String,
}

/// Result of evaluating a batch of snapshot records
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub evaluation_time: DateTime<Utc>,
    /// Calendar windows the `*_by_period` fields were interpreted over
    pub periods: Vec<PeriodWindow>,
    /// Input records, augmented with classification and score fields
    pub repositories: Vec<serde_json::Value>,
    #[serde(skip)]
    pub evaluations: Vec<RepositoryEvaluation>,
    pub failures: Vec<EvaluationFailure>,
    pub summary: EvaluationSummary,
    pub calibration: CalibrationCheck,
}

/// Summary statistics for a batch
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationSummary {
    pub total_repositories: usize,
    pub evaluated: usize,
    pub failed: usize,
    pub active: usize,
    pub declining: usize,
    pub abandoned: usize,
    pub healthy_band: usize,
    pub moderate_band: usize,
    pub declining_band: usize,
    pub critical_band: usize,
    pub average_health_score: f64,
}

/// Agreement between lifecycle labels and health bands across a batch
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CalibrationCheck {
    pub evaluated: usize,
    pub agreeing: usize,
    /// `agreeing / evaluated`, 0 when nothing was evaluated
    pub accuracy: f64,
    /// Repositories whose label and band disagree
    pub disagreements: Vec<String>,
}

impl EvaluationReport {
    /// Compute summary statistics from evaluations and failures
    pub fn compute_summary(&mut self) {
        let mut summary = EvaluationSummary {
            total_repositories: self.repositories.len(),
            evaluated: self.evaluations.len(),
            failed: self.failures.len(),
            ..EvaluationSummary::default()
        };
        let mut total_score = 0.0;

        for eval in &self.evaluations {
            match eval.classification.classification {
                Classification::Active => summary.active += 1,
                Classification::Declining => summary.declining += 1,
                Classification::Abandoned => summary.abandoned += 1,
            }

            match eval.score.health_band {
                HealthBand::Healthy => summary.healthy_band += 1,
                HealthBand::Moderate => summary.moderate_band += 1,
                HealthBand::Declining => summary.declining_band += 1,
                HealthBand::Critical => summary.critical_band += 1,
            }

            total_score += eval.score.health_score;
        }

        summary.average_health_score = if summary.evaluated > 0 {
            total_score / summary.evaluated as f64
        } else {
            0.0
        };

        self.summary = summary;
    }
}
