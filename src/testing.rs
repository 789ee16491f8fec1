//! Snapshot builders shared by unit tests

use crate::period::ByPeriod;
use crate::types::*;
use chrono::{DateTime, Duration, NaiveDate, Utc};

pub(crate) fn last_commit() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
}

/// Evaluation instant `days_ago` days after the snapshot's last commit
pub(crate) fn at(repo: &RepositoryMetricsSnapshot, days_ago: i64) -> DateTime<Utc> {
    let noon = repo.velocity.last_commit_date.and_hms_opt(12, 0, 0).unwrap();
    noon.and_utc() + Duration::days(days_ago)
}

/// A reasonably healthy repository with the given commit counts, oldest period first
pub(crate) fn snapshot(name: &str, commits: [u64; 4]) -> RepositoryMetricsSnapshot {
    let commit_period = |count: u64| CommitPeriod {
        commit_count: count,
        additions: Some(count * 80),
        deletions: Some(count * 40),
        total_changes: count * 120,
        churn_rate: Some(if count > 0 { 120.0 } else { 0.0 }),
    };

    RepositoryMetricsSnapshot {
        name: name.to_string(),
        evolvability: EvolvabilityMetrics {
            created_date: NaiveDate::from_ymd_opt(2019, 5, 20),
            age_days: Some(2112),
            stars: Some(1200),
            forks: Some(140),
            watchers: Some(1200),
            refactoring_by_period: ByPeriod::uniform(RefactoringPeriod {
                refactoring_rate: 0.12,
                dependency_update_rate: 0.25,
            }),
            feature_growth_by_period: ByPeriod::uniform(FeatureGrowthPeriod {
                net_loc_change: 5000,
            }),
        },
        velocity: VelocityMetrics {
            last_commit_date: last_commit(),
            commits_last_3_months: commits[3] / 2,
            period_metrics: ByPeriod {
                period_1: commit_period(commits[0]),
                period_2: commit_period(commits[1]),
                period_3: commit_period(commits[2]),
                period_4: commit_period(commits[3]),
            },
            pr_metrics_by_period: ByPeriod::uniform(PullRequestMergePeriod {
                merged_count: 10,
                closed_without_merge: Some(2),
                avg_merge_time_hours: 24.0,
            }),
            releases_last_year: 4,
            latest_release_date: NaiveDate::from_ymd_opt(2025, 1, 15),
        },
        collaboration: CollaborationMetrics {
            total_contributors: Some(60),
            active_contributors_last_3_months: 6,
            contributor_metrics_by_period: ByPeriod::uniform(ContributorPeriod {
                total_contributors: 25,
                retention_rate: 0.9,
            }),
            pull_requests_open: Some(12),
            pull_requests_closed: Some(340),
            issue_response_by_period: ByPeriod::uniform(IssueResponsePeriod {
                issues_created: 5,
                avg_response_time_hours: 10.0,
            }),
            pr_review_by_period: ByPeriod::uniform(PullRequestReviewPeriod {
                total_prs: 10,
                avg_reviews_per_pr: 2.0,
            }),
        },
        quality: QualityMetrics {
            issues_open: Some(30),
            issues_closed_last_3_months: Some(25),
            bug_feature_by_period: ByPeriod::uniform(BugFeaturePeriod {
                bugs_opened: 6,
                bugs_closed: Some(5),
                features_opened: Some(4),
                features_closed: Some(3),
                bug_closure_rate: 0.8,
            }),
            issue_accumulation_by_period: ByPeriod::uniform(IssueAccumulationPeriod {
                accumulation_rate: 0.1,
            }),
            breaking_changes_by_period: ByPeriod::uniform(BreakingChangePeriod {
                breaking_change_rate: 0.05,
            }),
            regression_by_period: ByPeriod::uniform(RegressionPeriod {
                regression_rate: 0.05,
            }),
        },
    }
}
