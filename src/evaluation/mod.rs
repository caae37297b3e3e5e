//! Offline evaluation against a labeled ground-truth set.
//!
//! Ground truth lives in a single JSON file; every evaluation run writes
//! one timestamped artifact into a results directory, which doubles as an
//! append-only history (the filename is also the sort key). Ground truth
//! never constrains the pipeline - it only scores it.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{error, info, warn};

use crate::error::{Error, Result};
use crate::model::evaluation::{EvaluationResult, EvaluationSummary, GroundTruth};
use crate::model::recommendation::RecommendationRequest;
use crate::pipeline::Pipeline;

/// Harness for scoring the pipeline against ground truth.
pub struct EvaluationHarness {
    ground_truth_path: PathBuf,
    results_dir: PathBuf,
    entries: Vec<GroundTruth>,
}

impl EvaluationHarness {
    /// Open the harness rooted at a data directory.
    ///
    /// Creates `<data>/evaluation/results/` as needed and loads any
    /// existing ground-truth file; a missing file is an empty set.
    ///
    /// # Errors
    ///
    /// Returns an error if the directories cannot be created or an
    /// existing ground-truth file fails to parse.
    pub fn open(data_dir: &Path) -> Result<Self> {
        let evaluation_dir = data_dir.join("evaluation");
        let results_dir = evaluation_dir.join("results");
        fs::create_dir_all(&results_dir)?;

        let ground_truth_path = evaluation_dir.join("ground_truth.json");
        let entries = if ground_truth_path.exists() {
            let raw = fs::read_to_string(&ground_truth_path)?;
            serde_json::from_str(&raw)?
        } else {
            Vec::new()
        };

        Ok(Self {
            ground_truth_path,
            results_dir,
            entries,
        })
    }

    /// The loaded ground-truth entries.
    #[must_use]
    pub fn ground_truth(&self) -> &[GroundTruth] {
        &self.entries
    }

    /// Replace the ground-truth set and persist it.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save_ground_truth(&mut self, entries: Vec<GroundTruth>) -> Result<()> {
        fs::write(
            &self.ground_truth_path,
            serde_json::to_string_pretty(&entries)?,
        )?;
        info!(
            count = entries.len(),
            path = %self.ground_truth_path.display(),
            "ground truth saved"
        );
        self.entries = entries;
        Ok(())
    }

    /// Evaluate a single ground-truth query at cutoff `k`.
    ///
    /// # Errors
    ///
    /// Returns `GroundTruthNotFound` for an unknown id and propagates
    /// pipeline failures.
    pub async fn evaluate_query(
        &self,
        pipeline: &Pipeline,
        query_id: &str,
        k: usize,
    ) -> Result<EvaluationResult> {
        let entry = self
            .entries
            .iter()
            .find(|e| e.id == query_id)
            .ok_or_else(|| Error::GroundTruthNotFound {
                query_id: query_id.to_string(),
            })?;

        let outcome = pipeline
            .recommend(RecommendationRequest {
                query: entry.query.clone(),
                top_k: k,
                filters: None,
            })
            .await?;

        let recommended: Vec<String> = outcome
            .items
            .iter()
            .map(|item| item.assessment.name.clone())
            .collect();

        Ok(score_query(entry, &recommended))
    }

    /// Evaluate every ground-truth query and persist one run artifact.
    ///
    /// A query that fails inside the run is recorded as a zero-result
    /// entry; it never aborts the run.
    ///
    /// # Errors
    ///
    /// Returns `Data` when no ground truth is loaded, or an I/O error if
    /// the artifact cannot be written.
    pub async fn evaluate_all(&self, pipeline: &Pipeline, k: usize) -> Result<EvaluationSummary> {
        if self.entries.is_empty() {
            return Err(Error::Data("no ground-truth entries loaded".into()));
        }

        let mut results = Vec::with_capacity(self.entries.len());
        for entry in &self.entries {
            match self.evaluate_query(pipeline, &entry.id, k).await {
                Ok(result) => results.push(result),
                Err(e) => {
                    error!(query_id = %entry.id, error = %e, "query evaluation failed, recording zero result");
                    results.push(score_query(entry, &[]));
                }
            }
        }

        let total = results.len();
        #[allow(clippy::cast_precision_loss)]
        let denom = total as f64;
        let summary = EvaluationSummary {
            mean_recall_at_k: results.iter().map(|r| r.recall_at_k).sum::<f64>() / denom,
            mean_average_precision: results.iter().map(|r| r.average_precision).sum::<f64>()
                / denom,
            k_value: k,
            total_queries: total,
            timestamp: Utc::now(),
            evaluation_results: results,
        };

        self.persist_run(&summary)?;
        Ok(summary)
    }

    fn persist_run(&self, summary: &EvaluationSummary) -> Result<()> {
        let filename = format!(
            "evaluation_{}.json",
            summary.timestamp.format("%Y%m%d_%H%M%S")
        );
        let path = self.results_dir.join(filename);
        fs::write(&path, serde_json::to_string_pretty(summary)?)?;
        info!(path = %path.display(), "evaluation run saved");
        Ok(())
    }

    /// Past evaluation runs, newest first, with the filename attached.
    ///
    /// # Errors
    ///
    /// Returns an error if the results directory cannot be read.
    pub fn history(&self) -> Result<Vec<serde_json::Value>> {
        let mut runs = Vec::new();
        for entry in fs::read_dir(&self.results_dir)? {
            let entry = entry?;
            let filename = entry.file_name().to_string_lossy().to_string();
            if !filename.starts_with("evaluation_") || !filename.ends_with(".json") {
                continue;
            }
            match fs::read_to_string(entry.path())
                .map_err(Error::from)
                .and_then(|raw| serde_json::from_str::<serde_json::Value>(&raw).map_err(Error::from))
            {
                Ok(mut value) => {
                    value["filename"] = serde_json::Value::String(filename);
                    runs.push(value);
                }
                Err(e) => warn!(filename, error = %e, "skipping unreadable run artifact"),
            }
        }

        runs.sort_by(|a, b| {
            let key = |v: &serde_json::Value| {
                v.get("timestamp")
                    .and_then(|t| t.as_str())
                    .map(ToString::to_string)
                    .unwrap_or_default()
            };
            key(b).cmp(&key(a))
        });
        Ok(runs)
    }
}

/// Score one query's recommendations against its relevant set.
///
/// Matching is exact and case-sensitive on assessment names.
#[must_use]
pub fn score_query(entry: &GroundTruth, recommended: &[String]) -> EvaluationResult {
    let relevant: HashSet<&str> = entry
        .relevant_assessments
        .iter()
        .map(String::as_str)
        .collect();

    let relevant_recommended: Vec<String> = recommended
        .iter()
        .filter(|name| relevant.contains(name.as_str()))
        .cloned()
        .collect();

    #[allow(clippy::cast_precision_loss)]
    let recall_at_k = if relevant.is_empty() {
        0.0
    } else {
        relevant_recommended.len() as f64 / relevant.len() as f64
    };

    let mut precision_at_k = Vec::with_capacity(recommended.len());
    let mut hits = 0usize;
    let mut ap_sum = 0.0;
    for (i, name) in recommended.iter().enumerate() {
        if relevant.contains(name.as_str()) {
            hits += 1;
            #[allow(clippy::cast_precision_loss)]
            {
                ap_sum += hits as f64 / (i + 1) as f64;
            }
        }
        #[allow(clippy::cast_precision_loss)]
        precision_at_k.push(hits as f64 / (i + 1) as f64);
    }

    #[allow(clippy::cast_precision_loss)]
    let average_precision = if relevant.is_empty() {
        0.0
    } else {
        ap_sum / relevant.len() as f64
    };

    EvaluationResult {
        query_id: entry.id.clone(),
        query_text: entry.query.clone(),
        recall_at_k,
        precision_at_k,
        average_precision,
        recommended_assessments: recommended.to_vec(),
        relevant_recommended,
        total_relevant: relevant.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil;

    fn entry(id: &str, query: &str, relevant: &[&str]) -> GroundTruth {
        GroundTruth {
            id: id.to_string(),
            query: query.to_string(),
            relevant_assessments: relevant.iter().map(ToString::to_string).collect(),
            description: None,
        }
    }

    #[test]
    fn test_score_query_known_values() {
        let gt = entry("q", "query", &["A", "C"]);
        let recommended: Vec<String> = ["A", "B", "C"].iter().map(ToString::to_string).collect();
        let result = score_query(&gt, &recommended);

        assert!((result.recall_at_k - 1.0).abs() < 1e-9);
        assert_eq!(result.precision_at_k.len(), 3);
        assert!((result.precision_at_k[0] - 1.0).abs() < 1e-9);
        assert!((result.precision_at_k[1] - 0.5).abs() < 1e-9);
        assert!((result.precision_at_k[2] - 2.0 / 3.0).abs() < 1e-9);
        // AP = (1/1 + 2/3) / 2
        assert!((result.average_precision - 5.0 / 6.0).abs() < 1e-9);
        assert_eq!(result.relevant_recommended, vec!["A", "C"]);
    }

    #[test]
    fn test_score_query_empty_relevant_is_zero() {
        let gt = entry("q", "query", &[]);
        let result = score_query(&gt, &["A".to_string()]);
        assert_eq!(result.recall_at_k, 0.0);
        assert_eq!(result.average_precision, 0.0);
    }

    #[test]
    fn test_score_query_matching_is_case_sensitive() {
        let gt = entry("q", "query", &["Coding Skills Assessment"]);
        let result = score_query(&gt, &["coding skills assessment".to_string()]);
        assert_eq!(result.recall_at_k, 0.0);
        assert!(result.relevant_recommended.is_empty());
    }

    #[test]
    fn test_metrics_stay_in_unit_interval() {
        let gt = entry("q", "query", &["A", "B", "C", "D"]);
        let recommended: Vec<String> = ["X", "A", "Y", "B"].iter().map(ToString::to_string).collect();
        let result = score_query(&gt, &recommended);
        assert!((0.0..=1.0).contains(&result.recall_at_k));
        assert!((0.0..=1.0).contains(&result.average_precision));
        assert!(result.precision_at_k.iter().all(|p| (0.0..=1.0).contains(p)));
    }

    #[tokio::test]
    async fn test_run_scores_programming_query_and_persists_artifact() {
        let pipeline = testutil::seeded_pipeline().await;
        let dir = tempfile::tempdir().unwrap();
        let mut harness = EvaluationHarness::open(dir.path()).unwrap();
        harness
            .save_ground_truth(vec![entry(
                "q1",
                "Find programming assessments",
                &["Coding Skills Assessment"],
            )])
            .unwrap();

        let summary = harness.evaluate_all(&pipeline, 5).await.unwrap();
        assert_eq!(summary.total_queries, 1);
        // Single relevant item: recall is binary, AP is the reciprocal of
        // the hit rank (or zero when missed).
        let result = &summary.evaluation_results[0];
        assert!(result.recall_at_k == 0.0 || result.recall_at_k == 1.0);
        if result.recall_at_k == 1.0 {
            let rank = result
                .recommended_assessments
                .iter()
                .position(|n| n == "Coding Skills Assessment")
                .unwrap()
                + 1;
            #[allow(clippy::cast_precision_loss)]
            let expected = 1.0 / rank as f64;
            assert!((result.average_precision - expected).abs() < 1e-9);
        } else {
            assert_eq!(result.average_precision, 0.0);
        }

        let history = harness.history().unwrap();
        assert_eq!(history.len(), 1);
        let filename = history[0]["filename"].as_str().unwrap();
        assert!(filename.starts_with("evaluation_") && filename.ends_with(".json"));
    }

    #[tokio::test]
    async fn test_evaluate_query_unknown_id_is_not_found() {
        let pipeline = testutil::seeded_pipeline().await;
        let dir = tempfile::tempdir().unwrap();
        let harness = EvaluationHarness::open(dir.path()).unwrap();
        let err = harness
            .evaluate_query(&pipeline, "missing", 5)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::GroundTruthNotFound { .. }));
    }

    #[tokio::test]
    async fn test_ground_truth_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let mut harness = EvaluationHarness::open(dir.path()).unwrap();
        harness
            .save_ground_truth(vec![entry("q1", "some query", &["A"])])
            .unwrap();
        drop(harness);

        let reloaded = EvaluationHarness::open(dir.path()).unwrap();
        assert_eq!(reloaded.ground_truth().len(), 1);
        assert_eq!(reloaded.ground_truth()[0].id, "q1");
    }
}
