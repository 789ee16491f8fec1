//! Basic example of using the scoring API

use chrono::Utc;
use repo_health_score::{evaluate_records, read_records, Classification, EngineConfig};
use std::path::Path;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Use default configuration
    let config = EngineConfig::default();

    let input = Path::new("repo_data.json");
    println!("Scoring repositories from: {}", input.display());

    let records = read_records(input)?;
    let report = evaluate_records(records, &config, Utc::now())?;

    println!("\n=== Health Results ===");
    println!("Repositories: {}", report.summary.total_repositories);
    println!();

    println!("Lifecycle Summary:");
    println!("  Active: {}", report.summary.active);
    println!("  Declining: {}", report.summary.declining);
    println!("  Abandoned: {}", report.summary.abandoned);
    println!("  Average score: {:.1}", report.summary.average_health_score);
    println!();

    let at_risk: Vec<_> = report
        .evaluations
        .iter()
        .filter(|e| e.classification.classification != Classification::Active)
        .collect();

    if !at_risk.is_empty() {
        println!("Declining/Abandoned Repositories:");
        for eval in at_risk {
            println!(
                "  - {}: score {} ({}, {})",
                eval.name,
                eval.score.health_score,
                eval.classification.classification,
                eval.score.health_band
            );
            println!("    {}", eval.classification.evidence);
        }
    } else {
        println!("✓ Every repository is active!");
    }

    for failure in &report.failures {
        println!("⚠  record {}: {}", failure.index, failure.message);
    }

    Ok(())
}
