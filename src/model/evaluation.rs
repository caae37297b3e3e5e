//! Ground truth and offline evaluation metrics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A labeled query with its relevant assessment names.
///
/// Names match exactly (case-sensitive) against returned recommendations;
/// order of `relevant_assessments` is irrelevant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroundTruth {
    pub id: String,
    pub query: String,
    pub relevant_assessments: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Metrics for a single evaluated query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub query_id: String,
    pub query_text: String,
    /// `|returned ∩ relevant| / |relevant|` (0 when relevant is empty).
    pub recall_at_k: f64,
    /// Precision at each position 1..=|returned|.
    pub precision_at_k: Vec<f64>,
    /// Average precision over the relevant hit positions.
    pub average_precision: f64,
    pub recommended_assessments: Vec<String>,
    pub relevant_recommended: Vec<String>,
    pub total_relevant: usize,
}

/// Aggregated metrics across one evaluation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationSummary {
    pub mean_recall_at_k: f64,
    pub mean_average_precision: f64,
    pub k_value: usize,
    pub total_queries: usize,
    pub timestamp: DateTime<Utc>,
    pub evaluation_results: Vec<EvaluationResult>,
}
