//! Catalog ingestion.
//!
//! Two offline jobs feed the catalog:
//!
//! - [`load_csv`] parses the scraper CSV into assessment rows. The format
//!   is messy by nature: list columns arrive either as JSON-array strings
//!   or comma-separated values, booleans in half a dozen spellings, and
//!   test types sometimes as single-letter codes. Everything normalizes
//!   on ingest; a malformed row is recorded and skipped, never fatal.
//! - [`regenerate_embeddings`] batch-embeds descriptions through the
//!   configured provider with a pacing delay between calls. Idempotent:
//!   without `force` only rows missing a vector are processed.

use std::path::Path;

use tracing::{info, warn};

use crate::catalog::{CatalogStore, UpsertStats};
use crate::config::{EMBED_BATCH_SIZE, EMBED_PACING};
use crate::duration::DurationInfo;
use crate::error::{Error, Result};
use crate::model::assessment::{dedupe_ordered, normalize_test_type, NewAssessment};
use crate::providers::BoxedEmbedder;

/// Outcome of a CSV load.
#[derive(Debug, Clone, Copy, Default, serde::Serialize)]
pub struct LoadStats {
    /// Rows parsed and upserted.
    pub loaded: usize,
    /// Malformed rows recorded and skipped.
    pub skipped: usize,
    /// Upsert failures inside the store.
    pub errors: usize,
}

/// Outcome of an embedding regeneration run.
#[derive(Debug, Clone, Copy, Default, serde::Serialize)]
pub struct EmbedJobStats {
    pub processed: usize,
    pub failed: usize,
    /// Rows left alone because they already carry a vector.
    pub skipped: usize,
}

/// Parse a list cell: JSON array string or delimiter-separated values.
#[must_use]
pub fn parse_list(raw: &str) -> Vec<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("n/a") || trimmed.eq_ignore_ascii_case("na")
    {
        return Vec::new();
    }

    if trimmed.starts_with('[') && trimmed.ends_with(']') {
        if let Ok(values) = serde_json::from_str::<Vec<String>>(trimmed) {
            return dedupe_ordered(values);
        }
        // Scrapers sometimes emit Python-style lists with single quotes.
        let relaxed = trimmed.replace('\'', "\"");
        if let Ok(values) = serde_json::from_str::<Vec<String>>(&relaxed) {
            return dedupe_ordered(values);
        }
    }

    dedupe_ordered(
        trimmed
            .split(',')
            .map(|v| v.trim().to_string())
            .collect::<Vec<_>>(),
    )
}

/// Parse a boolean cell in its common spellings.
#[must_use]
pub fn parse_bool_cell(raw: &str) -> bool {
    matches!(
        raw.trim().to_lowercase().as_str(),
        "true" | "yes" | "y" | "1" | "t"
    )
}

/// Map raw test-type values onto the vocabulary, dropping strays.
fn normalize_test_types(raw: Vec<String>) -> Vec<String> {
    raw.into_iter()
        .filter_map(|value| {
            let normalized = normalize_test_type(&value);
            if normalized.is_none() {
                warn!(value, "unknown test type dropped during ingest");
            }
            normalized
        })
        .collect()
}

/// Read an assessment CSV into rows plus a skipped-row count.
///
/// Expected columns: `name, url, remote_testing, adaptive_irt,
/// test_types, description, job_levels, duration, languages,
/// key_features, source`. Missing columns read as empty.
///
/// # Errors
///
/// Only a file-level failure (unreadable file, no header row) errors;
/// malformed rows are skipped and counted.
pub fn load_csv(path: &Path) -> Result<(Vec<NewAssessment>, usize)> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|e| Error::Data(format!("cannot read {}: {e}", path.display())))?;

    let headers = reader
        .headers()
        .map_err(|e| Error::Data(format!("missing CSV header row: {e}")))?
        .clone();
    let column = |name: &str| -> Option<usize> {
        headers
            .iter()
            .position(|h| h.trim().to_lowercase().replace(' ', "_") == name)
    };

    let columns: std::collections::HashMap<&str, Option<usize>> = [
        "name",
        "url",
        "remote_testing",
        "adaptive_irt",
        "test_types",
        "description",
        "job_levels",
        "duration",
        "languages",
        "key_features",
    ]
    .into_iter()
    .map(|name| (name, column(name)))
    .collect();
    let cell = |record: &csv::StringRecord, name: &str| -> String {
        columns
            .get(name)
            .copied()
            .flatten()
            .and_then(|idx| record.get(idx))
            .unwrap_or_default()
            .trim()
            .to_string()
    };

    let mut rows = Vec::new();
    let mut skipped = 0usize;

    for (line, record) in reader.records().enumerate() {
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                warn!(line = line + 2, error = %e, "unreadable CSV row skipped");
                skipped += 1;
                continue;
            }
        };

        let name = cell(&record, "name");
        if name.is_empty() {
            warn!(line = line + 2, "row without a name skipped");
            skipped += 1;
            continue;
        }

        let url = cell(&record, "url");
        rows.push(NewAssessment {
            name,
            description: cell(&record, "description"),
            url: (!url.is_empty()).then_some(url),
            remote_testing: parse_bool_cell(&cell(&record, "remote_testing")),
            adaptive_irt: parse_bool_cell(&cell(&record, "adaptive_irt")),
            test_types: normalize_test_types(parse_list(&cell(&record, "test_types"))),
            job_levels: parse_list(&cell(&record, "job_levels")),
            languages: parse_list(&cell(&record, "languages")),
            key_features: parse_list(&cell(&record, "key_features")),
            duration: DurationInfo::parse(&cell(&record, "duration")),
            embedding: None,
        });
    }

    info!(
        loaded = rows.len(),
        skipped,
        path = %path.display(),
        "parsed catalog CSV"
    );
    Ok((rows, skipped))
}

/// Load a CSV straight into the catalog via batch upsert.
///
/// # Errors
///
/// Returns an error only for file-level or store-level infrastructure
/// failures; row problems are counted in the stats.
pub fn load_into_store(store: &mut CatalogStore, path: &Path) -> Result<LoadStats> {
    let (rows, skipped) = load_csv(path)?;
    let UpsertStats {
        success_count,
        error_count,
    } = store.batch_upsert(rows)?;
    Ok(LoadStats {
        loaded: success_count,
        skipped,
        errors: error_count,
    })
}

/// Regenerate catalog embeddings through the given provider.
///
/// Processes rows in batches (default [`EMBED_BATCH_SIZE`]) with an
/// [`EMBED_PACING`] delay between provider calls to respect rate limits.
/// Per-row failures are tolerated and aggregated. Without `force` only
/// rows missing a vector are touched, so re-running is cheap.
///
/// # Errors
///
/// Returns an error if the store cannot be read.
pub async fn regenerate_embeddings(
    store: &mut CatalogStore,
    embedder: &BoxedEmbedder,
    force: bool,
    batch_size: Option<usize>,
) -> Result<EmbedJobStats> {
    let batch_size = batch_size.unwrap_or(EMBED_BATCH_SIZE).max(1);
    let targets = if force {
        store.all()?
    } else {
        store.missing_embedding(None)?
    };
    let counts = store.embedding_counts()?;
    let mut stats = EmbedJobStats {
        skipped: if force { 0 } else { counts.with_embeddings },
        ..EmbedJobStats::default()
    };

    if targets.is_empty() {
        info!("no assessments need embedding");
        return Ok(stats);
    }

    info!(
        total = targets.len(),
        provider = %embedder.info().name,
        force,
        "regenerating embeddings"
    );

    for batch in targets.chunks(batch_size) {
        for assessment in batch {
            // The description is the primary embedding text; fall back to
            // the name for rows scraped without one.
            let text = if assessment.description.is_empty() {
                assessment.name.as_str()
            } else {
                assessment.description.as_str()
            };

            match embedder.embed(text).await {
                Ok(vector) => match store.set_embedding(assessment.id, &vector) {
                    Ok(()) => stats.processed += 1,
                    Err(e) => {
                        warn!(assessment = %assessment.name, error = %e, "storing embedding failed");
                        stats.failed += 1;
                    }
                },
                Err(e) => {
                    warn!(assessment = %assessment.name, error = %e, "embedding failed");
                    stats.failed += 1;
                }
            }

            tokio::time::sleep(EMBED_PACING).await;
        }
    }

    info!(
        processed = stats.processed,
        failed = stats.failed,
        "embedding regeneration complete"
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{create_mock_providers, Providers};
    use std::io::Write;

    #[test]
    fn test_parse_list_json_and_csv_forms() {
        assert_eq!(
            parse_list(r#"["English (USA)", "French"]"#),
            vec!["English (USA)".to_string(), "French".to_string()]
        );
        assert_eq!(
            parse_list("['Entry-Level', 'Graduate']"),
            vec!["Entry-Level".to_string(), "Graduate".to_string()]
        );
        assert_eq!(
            parse_list("English, French , English"),
            vec!["English".to_string(), "French".to_string()]
        );
        assert!(parse_list(" ").is_empty());
        assert!(parse_list("n/a").is_empty());
    }

    #[test]
    fn test_parse_bool_cell() {
        assert!(parse_bool_cell("Yes"));
        assert!(parse_bool_cell("TRUE"));
        assert!(parse_bool_cell("1"));
        assert!(!parse_bool_cell("No"));
        assert!(!parse_bool_cell(""));
    }

    fn write_csv(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_csv_parses_and_skips_bad_rows() {
        let file = write_csv(
            "name,url,remote_testing,adaptive_irt,test_types,description,job_levels,duration,languages,key_features,source\n\
             Java Test,/view/java/,Yes,No,\"K, P\",Core Java knowledge,\"['Graduate']\",30,English,Autoscored,shl\n\
             ,,Yes,No,K,missing name,,30,,,shl\n\
             Untimed Survey,,no,no,X,opinion survey,,Untimed,English,,shl\n",
        );

        let (rows, skipped) = load_csv(file.path()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(skipped, 1);

        let java = &rows[0];
        assert_eq!(java.name, "Java Test");
        assert!(java.remote_testing);
        assert!(!java.adaptive_irt);
        assert_eq!(
            java.test_types,
            vec![
                "Knowledge & Skills".to_string(),
                "Personality & Behavior".to_string()
            ]
        );
        assert_eq!(java.job_levels, vec!["Graduate".to_string()]);
        assert_eq!(java.duration.duration_max_minutes, Some(30));

        // Unknown test-type code dropped, untimed duration recognized.
        let survey = &rows[1];
        assert!(survey.test_types.is_empty());
        assert!(survey.duration.is_untimed);
    }

    #[test]
    fn test_load_round_trips_through_store() {
        let file = write_csv(
            "name,url,remote_testing,adaptive_irt,test_types,description,job_levels,duration,languages,key_features,source\n\
             Round Trip,/view/rt/,yes,yes,A,some description,\"Graduate, Executive\",15 to 35,\"English, French\",Feature one,shl\n",
        );
        let (rows, _) = load_csv(file.path()).unwrap();

        let mut store = CatalogStore::open_memory().unwrap();
        store.batch_upsert(rows.clone()).unwrap();
        let stored = store.get_by_name("Round Trip").unwrap().unwrap();

        assert_eq!(stored.description, rows[0].description);
        assert_eq!(stored.test_types, rows[0].test_types);
        assert_eq!(stored.job_levels, rows[0].job_levels);
        assert_eq!(stored.languages, rows[0].languages);
        assert_eq!(stored.duration, rows[0].duration);
    }

    #[tokio::test]
    async fn test_regenerate_embeddings_only_fills_missing_rows() {
        let settings = crate::testutil::mock_settings();
        let Providers { embedder, .. } = create_mock_providers(&settings);
        let mut store = CatalogStore::open_memory().unwrap();

        for name in ["One", "Two"] {
            store
                .create(NewAssessment {
                    name: name.to_string(),
                    description: format!("{name} description"),
                    ..NewAssessment::default()
                })
                .unwrap();
        }
        let one_id = store.get_by_name("One").unwrap().unwrap().id;
        store.set_embedding(one_id, &[1.0, 0.0]).unwrap();

        let stats = regenerate_embeddings(&mut store, &embedder, false, None)
            .await
            .unwrap();
        assert_eq!(stats.processed, 1);
        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.failed, 0);

        // Untouched row keeps its old vector without --force.
        let one = store.get_by_name("One").unwrap().unwrap();
        assert_eq!(one.embedding.unwrap().len(), 2);

        let stats = regenerate_embeddings(&mut store, &embedder, true, None)
            .await
            .unwrap();
        assert_eq!(stats.processed, 2);
        let one = store.get_by_name("One").unwrap().unwrap();
        assert_eq!(one.embedding.unwrap().len(), embedder.dimensions());
    }
}
