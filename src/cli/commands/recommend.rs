//! Recommend command: run one query through the pipeline.

use std::path::PathBuf;

use colored::Colorize;

use super::build_pipeline;
use crate::api;
use crate::cli::RecommendArgs;
use crate::error::{Error, Result};
use crate::model::recommendation::{Filters, RecommendationRequest};

pub fn execute(db: Option<&PathBuf>, args: &RecommendArgs, json: bool) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| Error::Other(format!("Failed to create async runtime: {e}")))?;
    rt.block_on(execute_async(db, args, json))
}

fn filters_from_args(args: &RecommendArgs) -> Option<Filters> {
    let filters = Filters {
        job_levels: args.job_levels.clone(),
        test_types: args.test_types.clone(),
        languages: args.languages.clone(),
        max_duration_minutes: args.max_duration,
        duration_type: None,
        min_similarity: args.min_similarity,
        remote_testing: args.remote,
    };
    (!filters.is_empty()).then_some(filters)
}

async fn execute_async(db: Option<&PathBuf>, args: &RecommendArgs, json: bool) -> Result<()> {
    let pipeline = build_pipeline(db)?;

    if args.simple {
        let response = api::recommend_simple(
            &pipeline,
            api::SimpleRecommendRequest {
                query: args.query.clone(),
            },
        )
        .await;
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    let request = RecommendationRequest {
        query: args.query.clone(),
        top_k: args.top_k.unwrap_or(pipeline.settings().default_top_k),
        filters: filters_from_args(args),
    };

    let response = api::recommend(&pipeline, request).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    if response.recommendations.is_empty() {
        println!("No matching assessments.");
        return Ok(());
    }

    println!(
        "Searched {} candidates in {:.2}s\n",
        response.total_assessments, response.processing_time
    );
    for item in &response.recommendations {
        let a = &item.assessment;
        println!(
            "{:>2}. {}  {}",
            item.rank,
            a.name.bold(),
            format!("(similarity {:.2})", item.similarity_score).dimmed()
        );
        println!("    {}", a.duration.render());
        if !a.test_types.is_empty() {
            println!("    {}", a.test_types.join(", "));
        }
        println!("    {}", a.absolute_url().underline());
    }
    Ok(())
}
