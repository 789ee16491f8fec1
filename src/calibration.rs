//! Agreement check between lifecycle labels and health bands
//!
//! Used to tune thresholds; it never alters a label or a score.

use crate::types::{CalibrationCheck, Classification, HealthBand, RepositoryEvaluation};

/// Whether a lifecycle label and a health band tell a consistent story
pub fn agrees(classification: Classification, band: HealthBand) -> bool {
    match classification {
        Classification::Active => matches!(band, HealthBand::Healthy | HealthBand::Moderate),
        Classification::Declining => matches!(band, HealthBand::Moderate | HealthBand::Declining),
        Classification::Abandoned => matches!(band, HealthBand::Declining | HealthBand::Critical),
    }
}

/// Compare every evaluation's label against its band
pub fn calibrate(evaluations: &[RepositoryEvaluation]) -> CalibrationCheck {
    let disagreements: Vec<String> = evaluations
        .iter()
        .filter(|e| !agrees(e.classification.classification, e.score.health_band))
        .map(|e| e.name.clone())
        .collect();

    let evaluated = evaluations.len();
    let agreeing = evaluated - disagreements.len();

    CalibrationCheck {
        evaluated,
        agreeing,
        accuracy: if evaluated > 0 {
            agreeing as f64 / evaluated as f64
        } else {
            0.0
        },
        disagreements,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::evaluate::evaluate_snapshot;
    use crate::testing::{at, snapshot};

    #[test]
    fn test_agreement_table() {
        assert!(agrees(Classification::Active, HealthBand::Healthy));
        assert!(!agrees(Classification::Active, HealthBand::Critical));
        assert!(agrees(Classification::Declining, HealthBand::Moderate));
        assert!(!agrees(Classification::Declining, HealthBand::Healthy));
        assert!(agrees(Classification::Abandoned, HealthBand::Critical));
        assert!(!agrees(Classification::Abandoned, HealthBand::Moderate));
    }

    #[test]
    fn test_deprecated_but_healthy_repository_disagrees() {
        let config = EngineConfig::default();
        let active = snapshot("octo/active", [40, 45, 48, 50]);
        let atom = snapshot("atom/atom", [100, 100, 100, 100]);

        let evaluations = vec![
            evaluate_snapshot(&active, &config, at(&active, 5)),
            evaluate_snapshot(&atom, &config, at(&atom, 5)),
        ];
        let check = calibrate(&evaluations);

        assert_eq!(check.evaluated, 2);
        assert_eq!(check.agreeing, 1);
        assert_eq!(check.accuracy, 0.5);
        assert_eq!(check.disagreements, vec!["atom/atom".to_string()]);
    }

    #[test]
    fn test_empty_batch() {
        let check = calibrate(&[]);
        assert_eq!(check.accuracy, 0.0);
        assert!(check.disagreements.is_empty());
    }
}
