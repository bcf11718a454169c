//! Evaluation CLI for the trademark risk-scoring engine.
//!
//! Usage:
//!     clearmark assess "NIKE" --candidates results.json --classes 025,018
//!     clearmark check "NIKE" "NYKE"
//!
//! The candidates file is a JSON array of normalized trademark records as
//! produced by the retrieval layer.

use std::fs;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use clearmark_model::{CandidateTrademark, RiskAssessment};
use clearmark_scoring::{overall_risk, RiskScorer};
use clearmark_similarity::{default_strategy, normalize_mark};

#[derive(Parser)]
#[command(name = "clearmark")]
#[command(about = "Assess trademark conflict risk for a proposed mark")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score a batch of candidate trademarks against a proposed mark
    Assess {
        /// Proposed mark text
        query: String,

        /// Path to a JSON file of candidate records
        #[arg(short = 'f', long)]
        candidates: String,

        /// Intended Nice classes (comma-separated)
        #[arg(short, long)]
        classes: Option<String>,

        /// Output format (text, json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Show the similarity factor breakdown for a single pair of marks
    Check {
        /// Proposed mark text
        query: String,

        /// Existing mark text
        mark: String,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("clearmark=debug".parse()?),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Assess {
            query,
            candidates,
            classes,
            format,
        } => run_assess(&query, &candidates, classes, &format),
        Commands::Check { query, mark } => run_check(&query, &mark),
    }
}

fn parse_classes(classes: Option<String>) -> Vec<String> {
    classes
        .map(|s| {
            s.split(',')
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

fn run_assess(query: &str, candidates_path: &str, classes: Option<String>, format: &str) -> Result<()> {
    let query_classes = parse_classes(classes);

    let raw = fs::read_to_string(candidates_path)
        .with_context(|| format!("reading candidates file {candidates_path}"))?;
    let candidates: Vec<CandidateTrademark> =
        serde_json::from_str(&raw).context("parsing candidates JSON")?;

    let scorer = RiskScorer::new();
    let outcome = scorer.assess_batch(query, &query_classes, &candidates);
    let partition = outcome.partition();
    let counts = partition.counts();
    let overall = overall_risk(&counts);

    if format == "json" {
        let report = serde_json::json!({
            "query": query,
            "query_classes": query_classes,
            "overall_risk_level": overall,
            "risk_distribution": counts,
            "results_by_tier": partition,
            "skipped": outcome.skipped,
            "total_analyzed": outcome.assessments.len(),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Query: {query}");
    if !query_classes.is_empty() {
        println!("Classes: {}", query_classes.join(", "));
    }
    println!(
        "Analyzed {} candidates ({} skipped)",
        outcome.assessments.len(),
        outcome.skipped.len()
    );
    println!(
        "Overall risk: {} (critical: {}, high: {}, medium: {}, low: {})",
        overall.as_str().to_uppercase(),
        counts.critical,
        counts.high,
        counts.medium,
        counts.low
    );

    for (tier, assessments) in [
        ("CRITICAL", &partition.critical),
        ("HIGH", &partition.high),
        ("MEDIUM", &partition.medium),
        ("LOW", &partition.low),
    ] {
        if assessments.is_empty() {
            continue;
        }
        println!("\n=== {tier} ===");
        // Display order only; equal scores carry no ordering guarantee
        let mut sorted: Vec<&RiskAssessment> = assessments.iter().collect();
        sorted.sort_by(|a, b| {
            b.risk_score
                .partial_cmp(&a.risk_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        for assessment in sorted {
            print_assessment(assessment);
        }
    }

    if !outcome.skipped.is_empty() {
        println!("\n=== SKIPPED ===");
        for skipped in &outcome.skipped {
            println!("{}: {}", skipped.serial_number, skipped.reason);
        }
    }

    Ok(())
}

fn print_assessment(assessment: &RiskAssessment) {
    println!(
        "\n{} (Serial: {}, {})",
        assessment.mark_text,
        assessment.serial_number,
        assessment.status.as_str()
    );
    println!("   Risk Score: {:.1}/100", assessment.risk_score);
    println!(
        "   Factors: similarity {:.1} | class overlap {:.1} | status {:.1} | commerce {:.1}",
        assessment.risk_factors.similarity_score,
        assessment.risk_factors.class_overlap_score,
        assessment.risk_factors.status_strength_score,
        assessment.risk_factors.use_commerce_score
    );
    println!("   Reason: {}", assessment.conflict_reason);
    for recommendation in &assessment.recommendations {
        println!("   - {recommendation}");
    }
}

fn run_check(query: &str, mark: &str) -> Result<()> {
    let strategy = default_strategy();
    let score = strategy.score(query, mark);

    println!("Strategy: {}", strategy.name());
    println!(
        "Normalized: '{}' vs '{}'",
        normalize_mark(query),
        normalize_mark(mark)
    );
    println!("Similarity: {score:.1}/100");

    Ok(())
}
