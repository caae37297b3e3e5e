//! Catalog inspection commands.

use std::path::PathBuf;

use colored::Colorize;

use super::open_store;
use crate::catalog::CatalogQuery;
use crate::cli::CatalogCommands;
use crate::error::{Error, Result};

pub fn execute(command: &CatalogCommands, db: Option<&PathBuf>, json: bool) -> Result<()> {
    match command {
        CatalogCommands::List {
            job_level,
            test_type,
            language,
            remote,
            skip,
            limit,
        } => {
            let store = open_store(db)?;
            let query = CatalogQuery {
                job_level: job_level.clone(),
                test_type: test_type.clone(),
                language: language.clone(),
                remote_testing: *remote,
            };
            let assessments = store.list(&query, *skip, *limit)?;

            if json {
                println!("{}", serde_json::to_string(&assessments)?);
            } else if assessments.is_empty() {
                println!("No assessments match.");
            } else {
                for a in &assessments {
                    let vector = if a.embedding.is_some() { "●" } else { "○" };
                    println!(
                        "{:>4}  {} {}  {}",
                        a.id,
                        vector,
                        a.name.bold(),
                        a.duration.render().dimmed()
                    );
                }
            }
            Ok(())
        }

        CatalogCommands::Show { id } => {
            let store = open_store(db)?;
            let assessment = store.get(*id)?.ok_or(Error::AssessmentNotFound { id: *id })?;

            if json {
                println!("{}", serde_json::to_string_pretty(&assessment)?);
            } else {
                println!("{}  (id {})", assessment.name.bold(), assessment.id);
                if !assessment.description.is_empty() {
                    println!("  {}", assessment.description);
                }
                println!("  URL:        {}", assessment.absolute_url());
                println!("  Duration:   {}", assessment.duration.render());
                println!("  Remote:     {}", if assessment.remote_testing { "yes" } else { "no" });
                println!("  Adaptive:   {}", if assessment.adaptive_irt { "yes" } else { "no" });
                if !assessment.test_types.is_empty() {
                    println!("  Test types: {}", assessment.test_types.join(", "));
                }
                if !assessment.job_levels.is_empty() {
                    println!("  Job levels: {}", assessment.job_levels.join(", "));
                }
                if !assessment.languages.is_empty() {
                    println!("  Languages:  {}", assessment.languages.join(", "));
                }
                println!(
                    "  Embedding:  {}",
                    assessment
                        .embedding
                        .as_ref()
                        .map_or("missing".to_string(), |e| format!("{} dims", e.len()))
                );
            }
            Ok(())
        }
    }
}
