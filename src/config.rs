//! Configuration for scoring heuristics and classification thresholds

use crate::error::{EngineError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Score given to a component when there is nothing to measure
pub const NEUTRAL_SCORE: f64 = 0.5;

/// Quality sub-score assigned to abandoned repositories
pub const ABANDONED_QUALITY_SCORE: f64 = 0.1;

/// Evolvability sub-score assigned to abandoned repositories
pub const ABANDONED_EVOLVABILITY_SCORE: f64 = 0.0;

/// Main configuration for the scoring engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Category weights for the health score
    pub weights: CategoryWeights,
    /// Normalization caps for velocity components
    pub velocity: VelocityCaps,
    /// Normalization caps for collaboration components
    pub collaboration: CollaborationCaps,
    /// Quality scoring policy
    pub quality: QualityPolicy,
    /// Normalization caps for evolvability components
    pub evolvability: EvolvabilityCaps,
    /// Lifecycle classification thresholds
    pub classifier: ClassifierThresholds,
    /// Trend and recency modifiers
    pub modifiers: ModifierPolicy,
    /// Health band thresholds
    pub bands: BandThresholds,
    /// Period boundaries relative to evaluation time
    pub periods: PeriodLayout,
    /// Repository name -> official deprecation statement URL
    pub known_deprecations: BTreeMap<String, String>,
}

/// Weights for the four category sub-scores
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryWeights {
    pub velocity: f64,
    pub collaboration: f64,
    pub quality: f64,
    pub evolvability: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VelocityCaps {
    /// Commits in the most recent period that saturate the commit component
    pub commit_count: f64,
    /// Lines added plus removed that saturate the churn component
    pub total_changes: f64,
    /// Average hours to merge at which the merge component reaches zero
    pub merge_time_hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollaborationCaps {
    pub contributors: f64,
    pub reviews_per_pr: f64,
    /// Hours to first response at which the response component reaches zero
    pub response_time_hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityPolicy {
    /// Quality sub-score used when the repository is abandoned
    pub abandoned_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolvabilityCaps {
    pub refactoring_rate: f64,
    pub dependency_update_rate: f64,
    pub net_loc_change: f64,
    /// Evolvability sub-score used when the repository is abandoned
    pub abandoned_score: f64,
    /// Days without commits after which a repository with no recent commits
    /// counts as abandoned for scoring
    pub abandoned_after_days: i64,
}

/// Thresholds for the lifecycle classifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierThresholds {
    /// Days since last commit beyond which a silent repository is dead
    pub dead_after_days: i64,
    /// Recent commits must exceed this to be Active
    pub active_min_commits: u64,
    /// Last commit must be fewer days ago than this to be Active
    pub active_max_days: i64,
    /// Recent commits below this fraction of the baseline mean Declining
    pub decline_ratio: f64,
    /// Require recent commits to hold up against the baseline to be Active
    pub require_sustained_activity: bool,
    /// Fraction of the baseline recent commits must reach when
    /// `require_sustained_activity` is set
    pub sustained_ratio: f64,
}

/// Additive modifiers in score points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModifierPolicy {
    /// Recent/baseline commit ratio that earns the trend bonus
    pub trend_ratio: f64,
    pub trend_bonus: f64,
    /// Last commit must be fewer days ago than this for the recency bonus
    pub recency_max_days: i64,
    pub recency_bonus: f64,
}

/// Lower bounds (inclusive) of the health bands
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BandThresholds {
    pub healthy: f64,
    pub moderate: f64,
    pub declining: f64,
}

/// Start of each period, in days before evaluation time, oldest first.
/// Each period ends where the next begins; the last ends at evaluation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeriodLayout {
    pub start_offset_days: [i64; 4],
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            weights: CategoryWeights::default(),
            velocity: VelocityCaps::default(),
            collaboration: CollaborationCaps::default(),
            quality: QualityPolicy::default(),
            evolvability: EvolvabilityCaps::default(),
            classifier: ClassifierThresholds::default(),
            modifiers: ModifierPolicy::default(),
            bands: BandThresholds::default(),
            periods: PeriodLayout::default(),
            known_deprecations: default_known_deprecations(),
        }
    }
}

impl Default for CategoryWeights {
    fn default() -> Self {
        Self {
            velocity: 0.35,
            collaboration: 0.25,
            quality: 0.25,
            evolvability: 0.15,
        }
    }
}

impl CategoryWeights {
    fn sum(&self) -> f64 {
        self.velocity + self.collaboration + self.quality + self.evolvability
    }

    /// Validate that weights are non-negative and sum to approximately 1.0
    pub fn validate(&self) -> std::result::Result<(), String> {
        let all = [self.velocity, self.collaboration, self.quality, self.evolvability];
        if all.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err("Category weights must be finite and non-negative".to_string());
        }
        let sum = self.sum();
        if (sum - 1.0).abs() > 0.01 {
            return Err(format!("Category weights must sum to 1.0, got {}", sum));
        }
        Ok(())
    }

    /// Normalize weights to sum to 1.0
    pub fn normalize(&mut self) {
        let sum = self.sum();
        if sum > 0.0 {
            self.velocity /= sum;
            self.collaboration /= sum;
            self.quality /= sum;
            self.evolvability /= sum;
        }
    }
}

impl Default for VelocityCaps {
    fn default() -> Self {
        Self {
            commit_count: 90.0,
            total_changes: 8000.0,
            merge_time_hours: 500.0,
        }
    }
}

impl Default for CollaborationCaps {
    fn default() -> Self {
        Self {
            contributors: 20.0,
            reviews_per_pr: 1.0,
            response_time_hours: 100.0,
        }
    }
}

impl Default for QualityPolicy {
    fn default() -> Self {
        Self {
            abandoned_score: ABANDONED_QUALITY_SCORE,
        }
    }
}

impl Default for EvolvabilityCaps {
    fn default() -> Self {
        Self {
            refactoring_rate: 0.10,
            dependency_update_rate: 0.20,
            net_loc_change: 3000.0,
            abandoned_score: ABANDONED_EVOLVABILITY_SCORE,
            abandoned_after_days: 280,
        }
    }
}

impl Default for ClassifierThresholds {
    fn default() -> Self {
        Self {
            dead_after_days: 730, // 2 years
            active_min_commits: 20,
            active_max_days: 30,
            decline_ratio: 0.5,
            require_sustained_activity: false,
            sustained_ratio: 0.8,
        }
    }
}

impl Default for ModifierPolicy {
    fn default() -> Self {
        Self {
            trend_ratio: 1.2,
            trend_bonus: 10.0,
            recency_max_days: 30,
            recency_bonus: 5.0,
        }
    }
}

impl Default for BandThresholds {
    fn default() -> Self {
        Self {
            healthy: 75.0,
            moderate: 50.0,
            declining: 25.0,
        }
    }
}

impl Default for PeriodLayout {
    fn default() -> Self {
        Self {
            start_offset_days: [730, 547, 365, 183],
        }
    }
}

/// Official deprecation statements known ahead of time
pub fn default_known_deprecations() -> BTreeMap<String, String> {
    BTreeMap::from([
        (
            "atom/atom".to_string(),
            "https://github.blog/2022-06-08-sunsetting-atom/".to_string(),
        ),
        (
            "angular/angular.js".to_string(),
            "https://blog.angular.io/discontinued-long-term-support-for-angularjs-cc066b82e65a"
                .to_string(),
        ),
        (
            "bower/bower".to_string(),
            "https://bower.io/blog/2017/how-to-migrate-away-from-bower/".to_string(),
        ),
    ])
}

impl EngineConfig {
    /// Create a new builder for EngineConfig
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::default()
    }

    /// Parse a TOML document; missing sections take their defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Check the configuration for values the engine cannot work with
    pub fn validate(&self) -> Result<()> {
        self.weights.validate().map_err(EngineError::config)?;

        let bands = &self.bands;
        if !(bands.healthy > bands.moderate && bands.moderate > bands.declining) {
            return Err(EngineError::config(format!(
                "Band thresholds must be strictly decreasing, got {} / {} / {}",
                bands.healthy, bands.moderate, bands.declining
            )));
        }

        let offsets = &self.periods.start_offset_days;
        if offsets.windows(2).any(|w| w[0] <= w[1]) || offsets[3] <= 0 {
            return Err(EngineError::config(format!(
                "Period start offsets must be positive and strictly decreasing, got {:?}",
                offsets
            )));
        }

        let caps = [
            ("velocity.commit_count", self.velocity.commit_count),
            ("velocity.total_changes", self.velocity.total_changes),
            ("velocity.merge_time_hours", self.velocity.merge_time_hours),
            ("collaboration.contributors", self.collaboration.contributors),
            ("collaboration.reviews_per_pr", self.collaboration.reviews_per_pr),
            ("collaboration.response_time_hours", self.collaboration.response_time_hours),
            ("evolvability.refactoring_rate", self.evolvability.refactoring_rate),
            ("evolvability.dependency_update_rate", self.evolvability.dependency_update_rate),
            ("evolvability.net_loc_change", self.evolvability.net_loc_change),
            ("classifier.decline_ratio", self.classifier.decline_ratio),
            ("classifier.sustained_ratio", self.classifier.sustained_ratio),
            ("modifiers.trend_ratio", self.modifiers.trend_ratio),
        ];
        if let Some((key, value)) = caps.iter().find(|(_, v)| !v.is_finite()) {
            return Err(EngineError::config(format!(
                "{} must be a finite number, got {}",
                key, value
            )));
        }

        let abandoned = [
            ("quality.abandoned_score", self.quality.abandoned_score),
            ("evolvability.abandoned_score", self.evolvability.abandoned_score),
        ];
        if let Some((key, value)) = abandoned
            .iter()
            .find(|(_, v)| !(0.0..=1.0).contains(v))
        {
            return Err(EngineError::config(format!(
                "{} must be within [0, 1], got {}",
                key, value
            )));
        }

        let bonuses = [
            ("modifiers.trend_bonus", self.modifiers.trend_bonus),
            ("modifiers.recency_bonus", self.modifiers.recency_bonus),
        ];
        if let Some((key, value)) = bonuses
            .iter()
            .find(|(_, v)| !v.is_finite() || *v < 0.0)
        {
            return Err(EngineError::config(format!(
                "{} must be finite and non-negative, got {}",
                key, value
            )));
        }

        Ok(())
    }

    /// Official statement URL for a repository, if it is known to be deprecated
    pub fn official_statement(&self, name: &str) -> Option<&str> {
        self.known_deprecations.get(name).map(String::as_str)
    }
}

/// Builder for EngineConfig
#[derive(Default)]
pub struct EngineConfigBuilder {
    weights: Option<CategoryWeights>,
    classifier: Option<ClassifierThresholds>,
    modifiers: Option<ModifierPolicy>,
    bands: Option<BandThresholds>,
    known_deprecations: Option<BTreeMap<String, String>>,
    extra_deprecations: BTreeMap<String, String>,
}

impl EngineConfigBuilder {
    pub fn weights(mut self, weights: CategoryWeights) -> Self {
        self.weights = Some(weights);
        self
    }

    pub fn classifier(mut self, thresholds: ClassifierThresholds) -> Self {
        self.classifier = Some(thresholds);
        self
    }

    pub fn modifiers(mut self, modifiers: ModifierPolicy) -> Self {
        self.modifiers = Some(modifiers);
        self
    }

    pub fn bands(mut self, bands: BandThresholds) -> Self {
        self.bands = Some(bands);
        self
    }

    /// Replace the default deprecation list entirely
    pub fn known_deprecations(mut self, deprecations: BTreeMap<String, String>) -> Self {
        self.known_deprecations = Some(deprecations);
        self
    }

    /// Add one deprecation on top of the defaults (or the replaced list)
    pub fn deprecate(mut self, name: impl Into<String>, statement_url: impl Into<String>) -> Self {
        self.extra_deprecations.insert(name.into(), statement_url.into());
        self
    }

    pub fn build(self) -> EngineConfig {
        let mut known_deprecations = self
            .known_deprecations
            .unwrap_or_else(default_known_deprecations);
        known_deprecations.extend(self.extra_deprecations);

        EngineConfig {
            weights: self.weights.unwrap_or_default(),
            classifier: self.classifier.unwrap_or_default(),
            modifiers: self.modifiers.unwrap_or_default(),
            bands: self.bands.unwrap_or_default(),
            known_deprecations,
            ..EngineConfig::default()
        }
    }
}
