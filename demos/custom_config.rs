//! Example showing custom configuration

use chrono::{NaiveDate, Utc};
use repo_health_score::{
    evaluate_records_concurrent, read_records, CategoryWeights, ClassifierThresholds,
    EngineConfig,
};
use std::path::Path;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Create custom configuration
    let mut config = EngineConfig::builder()
        .weights(CategoryWeights {
            velocity: 0.50, // Emphasize velocity more
            collaboration: 0.25,
            quality: 0.15,
            evolvability: 0.05,
        })
        .classifier(ClassifierThresholds {
            require_sustained_activity: true, // No "Active" label for a burst after a long decline
            ..ClassifierThresholds::default()
        })
        .deprecate(
            "request/request",
            "https://github.com/request/request/issues/3142",
        )
        .build();

    // Weights above sum to 0.95
    config.weights.normalize();
    config.validate()?;

    // Pin the evaluation instant so re-runs are reproducible
    let now = NaiveDate::from_ymd_opt(2025, 3, 6)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .unwrap_or_else(Utc::now);

    let records = read_records(Path::new("repo_data.json"))?;
    println!("Scoring {} repositories with custom configuration...\n", records.len());

    let report = evaluate_records_concurrent(records, &config, now).await?;

    println!("=== Custom Health Results ===");
    println!("Average health score: {:.1}", report.summary.average_health_score);
    println!(
        "Label/band agreement: {:.0}%",
        report.calibration.accuracy * 100.0
    );

    if !report.calibration.disagreements.is_empty() {
        println!("\n⚠  Label and band disagree for:");
        for name in &report.calibration.disagreements {
            println!("  - {}", name);
        }
    }

    std::fs::write("repo_data.scored.json", serde_json::to_string_pretty(&report.repositories)?)?;
    println!("\nAugmented records written to repo_data.scored.json");

    Ok(())
}
