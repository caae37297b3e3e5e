//! Evaluation commands: ground truth and offline metric runs.

use std::path::PathBuf;

use colored::Colorize;

use super::{build_pipeline, data_dir};
use crate::cli::EvaluateCommands;
use crate::error::{Error, Result};
use crate::evaluation::EvaluationHarness;
use crate::model::evaluation::{EvaluationSummary, GroundTruth};

pub fn execute(
    command: &EvaluateCommands,
    db: Option<&PathBuf>,
    data: Option<&PathBuf>,
    json: bool,
) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| Error::Other(format!("Failed to create async runtime: {e}")))?;
    rt.block_on(execute_async(command, db, data, json))
}

async fn execute_async(
    command: &EvaluateCommands,
    db: Option<&PathBuf>,
    data: Option<&PathBuf>,
    json: bool,
) -> Result<()> {
    let data_dir = data_dir(data)?;

    match command {
        EvaluateCommands::Import { file } => {
            let raw = std::fs::read_to_string(file)?;
            let entries: Vec<GroundTruth> = serde_json::from_str(&raw)?;
            let count = entries.len();

            let mut harness = EvaluationHarness::open(&data_dir)?;
            harness.save_ground_truth(entries)?;

            if json {
                println!("{}", serde_json::json!({ "imported": count }));
            } else {
                println!("Imported {count} ground-truth queries.");
            }
            Ok(())
        }

        EvaluateCommands::Show => {
            let harness = EvaluationHarness::open(&data_dir)?;
            let entries = harness.ground_truth();

            if json {
                println!("{}", serde_json::to_string_pretty(entries)?);
            } else if entries.is_empty() {
                println!("No ground truth loaded. Import with `assessrec evaluate import <file>`.");
            } else {
                for entry in entries {
                    println!(
                        "{}  {}  ({} relevant)",
                        entry.id.bold(),
                        entry.query,
                        entry.relevant_assessments.len()
                    );
                }
            }
            Ok(())
        }

        EvaluateCommands::Run { k } => {
            let pipeline = build_pipeline(db)?;
            let harness = EvaluationHarness::open(&data_dir)?;
            let summary = harness.evaluate_all(&pipeline, *k).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                print_summary(&summary);
            }
            Ok(())
        }

        EvaluateCommands::Query { query_id, k } => {
            let pipeline = build_pipeline(db)?;
            let harness = EvaluationHarness::open(&data_dir)?;
            let result = harness.evaluate_query(&pipeline, query_id, *k).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("{}  {}", result.query_id.bold(), result.query_text);
                println!("  Recall@{k}: {:.3}", result.recall_at_k);
                println!("  AP:        {:.3}", result.average_precision);
                println!(
                    "  Hit {}/{} relevant",
                    result.relevant_recommended.len(),
                    result.total_relevant
                );
            }
            Ok(())
        }

        EvaluateCommands::History => {
            let harness = EvaluationHarness::open(&data_dir)?;
            let runs = harness.history()?;

            if json {
                println!("{}", serde_json::to_string_pretty(&runs)?);
            } else if runs.is_empty() {
                println!("No evaluation runs yet. Run `assessrec evaluate run`.");
            } else {
                for run in &runs {
                    println!(
                        "{}  recall@{} {:.3}  MAP {:.3}  ({} queries)",
                        run["filename"].as_str().unwrap_or("?"),
                        run["k_value"].as_u64().unwrap_or(0),
                        run["mean_recall_at_k"].as_f64().unwrap_or(0.0),
                        run["mean_average_precision"].as_f64().unwrap_or(0.0),
                        run["total_queries"].as_u64().unwrap_or(0),
                    );
                }
            }
            Ok(())
        }
    }
}

fn print_summary(summary: &EvaluationSummary) {
    println!("Evaluation @ K={}", summary.k_value);
    println!("  Queries:      {}", summary.total_queries);
    println!("  Mean Recall:  {:.3}", summary.mean_recall_at_k);
    println!("  MAP:          {:.3}", summary.mean_average_precision);
    println!();
    for result in &summary.evaluation_results {
        let marker = if result.recall_at_k > 0.0 {
            "✓".green()
        } else {
            "✗".red()
        };
        println!(
            "  {} {}  recall {:.2}  ap {:.2}",
            marker, result.query_id, result.recall_at_k, result.average_precision
        );
    }
}
