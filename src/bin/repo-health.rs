//! CLI tool for scoring repository health

use anyhow::Context;
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use repo_health_score::{
    evaluate_records_concurrent, read_records, Classification, EngineConfig, EngineError,
    EvaluationReport, HealthBand,
};
use std::path::{Path, PathBuf};
use std::process;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "repo-health")]
#[command(about = "Classify and score the health of software repositories from activity metrics", long_about = None)]
#[command(version)]
struct Cli {
    /// JSON array of repository metrics snapshots
    #[arg(short = 'i', long, default_value = "repo_data.json")]
    input: PathBuf,

    /// Path to custom configuration file (TOML)
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Evaluate as of this date (YYYY-MM-DD) or instant (RFC 3339); defaults to now
    #[arg(short = 't', long)]
    evaluation_time: Option<String>,

    /// Enable verbose logging
    #[arg(short = 'v', long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate all repositories and display a summary
    Scan {
        /// Fail if any repository has a health score below this threshold (0-100)
        #[arg(long)]
        fail_threshold: Option<f64>,

        /// Display detailed information for each repository
        #[arg(long)]
        detailed: bool,
    },

    /// Write the input records augmented with classifications and scores
    Report {
        /// Output file (default: stdout)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,

        /// Write the full batch report (summary, calibration, periods) instead
        #[arg(long)]
        summary: bool,
    },

    /// Check repositories against thresholds (exit code based)
    Check {
        /// Minimum acceptable health score (0-100)
        #[arg(long, default_value = "50")]
        min_health_score: f64,

        /// Fail on repositories classified as Abandoned
        #[arg(long)]
        fail_on_abandoned: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose);

    let config = match &cli.config {
        Some(path) => match load_config(path) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("{} Failed to load config: {:#}", "Error:".red().bold(), e);
                process::exit(1);
            }
        },
        None => EngineConfig::default(),
    };

    let now = match cli.evaluation_time.as_deref().map(parse_evaluation_time) {
        Some(Ok(at)) => at,
        Some(Err(e)) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            process::exit(2);
        }
        None => Utc::now(),
    };

    let records = match load_records(&cli.input) {
        Ok(records) => records,
        Err(e) => {
            eprintln!("{} Failed to read input: {:#}", "Error:".red().bold(), e);
            process::exit(1);
        }
    };

    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message("Scoring repositories...");
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));

    let result = evaluate_records_concurrent(records, &config, now).await;

    spinner.finish_and_clear();

    let report = match result {
        Ok(report) => report,
        Err(e) => {
            eprintln!("{} Evaluation failed: {}", "Error:".red().bold(), e);
            process::exit(1);
        }
    };

    match cli.command {
        Commands::Scan {
            fail_threshold,
            detailed,
        } => {
            display_summary(&report);

            if detailed {
                println!();
                display_detailed(&report);
            }

            if let Some(threshold) = fail_threshold {
                let failing: Vec<_> = report
                    .evaluations
                    .iter()
                    .filter(|e| e.score.health_score < threshold)
                    .collect();

                if !failing.is_empty() || !report.failures.is_empty() {
                    eprintln!(
                        "\n{} {} repositories below threshold {}, {} not evaluated:",
                        "Failed:".red().bold(),
                        failing.len(),
                        threshold,
                        report.failures.len()
                    );
                    for eval in &failing {
                        eprintln!("  - {}: score {}", eval.name, eval.score.health_score);
                    }
                    process::exit(1);
                }
            }
        }

        Commands::Report { output, summary } => {
            let content = if summary {
                serde_json::to_string_pretty(&report)
            } else {
                serde_json::to_string_pretty(&report.repositories)
            };
            let content = match content {
                Ok(content) => content,
                Err(e) => {
                    eprintln!("{} Failed to serialize report: {}", "Error:".red().bold(), e);
                    process::exit(1);
                }
            };

            if let Some(output_path) = output {
                match std::fs::write(&output_path, content) {
                    Ok(_) => info!("Report written to: {}", output_path.display()),
                    Err(e) => {
                        eprintln!("{} Failed to write report: {}", "Error:".red().bold(), e);
                        process::exit(1);
                    }
                }
            } else {
                println!("{}", content);
            }
        }

        Commands::Check {
            min_health_score,
            fail_on_abandoned,
        } => {
            let mut failures = Vec::new();

            for eval in &report.evaluations {
                if eval.score.health_score < min_health_score {
                    failures.push(format!(
                        "  - {}: health score {} < {}",
                        eval.name, eval.score.health_score, min_health_score
                    ));
                }

                if fail_on_abandoned
                    && eval.classification.classification == Classification::Abandoned
                {
                    failures.push(format!("  - {}: classified as Abandoned", eval.name));
                }
            }

            for failure in &report.failures {
                failures.push(format!(
                    "  - record {}: {}",
                    failure.index, failure.message
                ));
            }

            if !failures.is_empty() {
                eprintln!("{} {} check failures:", "Failed:".red().bold(), failures.len());
                for failure in failures {
                    eprintln!("{}", failure);
                }
                process::exit(1);
            } else {
                println!("{} All checks passed!", "Success:".green().bold());
            }
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_config(path: &Path) -> anyhow::Result<EngineConfig> {
    EngineConfig::load(path).with_context(|| format!("reading {}", path.display()))
}

fn load_records(path: &Path) -> anyhow::Result<Vec<serde_json::Value>> {
    read_records(path).with_context(|| format!("reading {}", path.display()))
}

/// Accept a calendar date (midnight UTC) or an RFC 3339 instant
fn parse_evaluation_time(raw: &str) -> Result<DateTime<Utc>, EngineError> {
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc());
        }
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|at| at.with_timezone(&Utc))
        .map_err(|_| {
            EngineError::InvalidEvaluationTime(format!(
                "{:?} is neither YYYY-MM-DD nor RFC 3339",
                raw
            ))
        })
}

fn percent(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}

fn display_summary(report: &EvaluationReport) {
    let summary = &report.summary;
    let total = summary.evaluated;

    println!("\n{}", "=== Repository Health Summary ===".bold());
    println!("Evaluated at: {}", report.evaluation_time.to_rfc3339().cyan());
    println!(
        "Repositories: {} ({} evaluated, {} failed)",
        summary.total_repositories, summary.evaluated, summary.failed
    );
    println!();

    println!("Classification:");
    println!(
        "  {} {} ({:.1}%)",
        "●".green(),
        format!("Active: {}", summary.active).green(),
        percent(summary.active, total)
    );
    println!(
        "  {} {} ({:.1}%)",
        "●".yellow(),
        format!("Declining: {}", summary.declining).yellow(),
        percent(summary.declining, total)
    );
    println!(
        "  {} {} ({:.1}%)",
        "●".red(),
        format!("Abandoned: {}", summary.abandoned).red(),
        percent(summary.abandoned, total)
    );
    println!();

    println!("Health Bands:");
    println!("  {} Healthy: {}", "●".green(), summary.healthy_band);
    println!("  {} Moderate: {}", "●".yellow(), summary.moderate_band);
    println!(
        "  {} Declining: {}",
        "●".truecolor(255, 165, 0), // Orange
        summary.declining_band
    );
    println!("  {} Critical: {}", "●".red(), summary.critical_band);
    println!();

    println!("Average health score: {:.1}", summary.average_health_score);
    println!(
        "Label/band agreement: {}/{} ({:.1}%)",
        report.calibration.agreeing,
        report.calibration.evaluated,
        report.calibration.accuracy * 100.0
    );
}

fn display_detailed(report: &EvaluationReport) {
    println!("{}", "=== Detailed Results ===".bold());

    for eval in &report.evaluations {
        let score = &eval.score;
        let band = match score.health_band {
            HealthBand::Healthy => score.health_band.to_string().green(),
            HealthBand::Moderate => score.health_band.to_string().yellow(),
            HealthBand::Declining => score.health_band.to_string().truecolor(255, 165, 0),
            HealthBand::Critical => score.health_band.to_string().red(),
        };

        println!(
            "\n{} [{}] {} Score: {}",
            eval.name.bold(),
            eval.classification.classification,
            band,
            score.health_score
        );
        println!(
            "  Velocity {} | Collaboration {} | Quality {} | Evolvability {}",
            score.velocity_score,
            score.collaboration_score,
            score.quality_score,
            score.evolvability_score
        );
        println!(
            "  Raw {} + trend {} + recency {}",
            score.raw_score, score.trend_modifier, score.recency_bonus
        );
        println!("  Evidence: {}", eval.classification.evidence);

        if let Some(statement) = &eval.classification.official_statement {
            println!("  Official statement: {}", statement.cyan());
        }
    }

    for failure in &report.failures {
        println!(
            "\n{} record {}: {}",
            "Not evaluated".red().bold(),
            failure.index,
            failure.message.yellow()
        );
    }
}
