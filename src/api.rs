//! Transport-abstracted API surface.
//!
//! Request/response shapes for the serving endpoints, independent of any
//! HTTP framework. A transport layer maps these handlers onto routes and
//! converts [`crate::error::ErrorCode::http_status`] into real statuses;
//! the CLI and the tests call them directly.
//!
//! The simple recommend contract is special: it never fails. Any internal
//! error is logged and surfaces as an empty recommendation list.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::error::Result;
use crate::model::assessment::{Assessment, RecommendedAssessment};
use crate::model::recommendation::{RecommendationOutcome, RecommendationRequest};
use crate::pipeline::Pipeline;

/// Maximum recommendations in the simple contract.
const SIMPLE_TOP_K: usize = 10;

/// Response for the health endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Health check.
#[must_use]
pub fn health() -> HealthResponse {
    HealthResponse { status: "healthy" }
}

// ── Simple recommend contract ─────────────────────────────────

/// Body of the simple recommend endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimpleRecommendRequest {
    pub query: String,
}

/// One recommendation in the simple contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimpleRecommendedAssessment {
    pub url: String,
    pub adaptive_support: String,
    pub description: String,
    /// Duration in whole minutes; 0 when nothing numeric is known.
    pub duration: u32,
    pub remote_support: String,
    pub test_type: Vec<String>,
}

/// Response of the simple recommend endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimpleRecommendResponse {
    pub recommended_assessments: Vec<SimpleRecommendedAssessment>,
}

/// Single integer of minutes for the simple contract.
///
/// Prefers the upper bound, then the lower, then a pure-integer duration
/// text, else 0.
fn simple_duration(assessment: &Assessment) -> u32 {
    if let Some(minutes) = assessment.duration.duration_max_minutes {
        return minutes;
    }
    if let Some(minutes) = assessment.duration.duration_min_minutes {
        return minutes;
    }
    assessment
        .duration
        .duration_text
        .as_deref()
        .and_then(|text| text.trim().parse::<u32>().ok())
        .unwrap_or(0)
}

fn yes_no(value: bool) -> String {
    if value { "Yes" } else { "No" }.to_string()
}

impl From<&RecommendedAssessment> for SimpleRecommendedAssessment {
    fn from(item: &RecommendedAssessment) -> Self {
        let a = &item.assessment;
        Self {
            url: a.absolute_url(),
            adaptive_support: yes_no(a.adaptive_irt),
            description: if a.description.is_empty() {
                "No description available".to_string()
            } else {
                a.description.clone()
            },
            duration: simple_duration(a),
            remote_support: yes_no(a.remote_testing),
            test_type: a.test_types.clone(),
        }
    }
}

/// The simple recommend endpoint: query in, at most ten items out.
///
/// Contract-bound to never fail - a bad query or any internal error is
/// logged and answered with an empty list.
pub async fn recommend_simple(
    pipeline: &Pipeline,
    request: SimpleRecommendRequest,
) -> SimpleRecommendResponse {
    let outcome = pipeline
        .recommend(RecommendationRequest {
            query: request.query,
            top_k: SIMPLE_TOP_K,
            filters: None,
        })
        .await;

    match outcome {
        Ok(outcome) => SimpleRecommendResponse {
            recommended_assessments: outcome
                .items
                .iter()
                .map(SimpleRecommendedAssessment::from)
                .collect(),
        },
        Err(e) => {
            error!(error = %e, "simple recommend failed, returning empty list");
            SimpleRecommendResponse {
                recommended_assessments: Vec::new(),
            }
        }
    }
}

// ── Rich recommendations ──────────────────────────────────────

/// Response of the rich recommendations endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationResponse {
    pub recommendations: Vec<RecommendedAssessment>,
    pub query_embedding: Vec<f32>,
    pub processing_time: f64,
    pub total_assessments: usize,
    pub timestamp: DateTime<Utc>,
}

impl From<RecommendationOutcome> for RecommendationResponse {
    fn from(outcome: RecommendationOutcome) -> Self {
        Self {
            recommendations: outcome.items,
            query_embedding: outcome.query_embedding,
            processing_time: outcome.processing_time,
            total_assessments: outcome.total_candidates,
            timestamp: Utc::now(),
        }
    }
}

/// The rich recommendations endpoint.
///
/// # Errors
///
/// Propagates pipeline errors; transports map them through
/// [`crate::error::ErrorCode::http_status`].
pub async fn recommend(
    pipeline: &Pipeline,
    request: RecommendationRequest,
) -> Result<RecommendationResponse> {
    Ok(pipeline.recommend(request).await?.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::recommendation::Filters;
    use crate::testutil;

    #[test]
    fn test_health_shape() {
        let body = serde_json::to_value(health()).unwrap();
        assert_eq!(body, serde_json::json!({"status": "healthy"}));
    }

    #[tokio::test]
    async fn test_simple_recommend_coding_query() {
        let pipeline = testutil::seeded_pipeline().await;
        let response = recommend_simple(
            &pipeline,
            SimpleRecommendRequest {
                query: "software developer with coding skills".into(),
            },
        )
        .await;

        let items = &response.recommended_assessments;
        assert!(!items.is_empty() && items.len() <= 10);

        let top = &items[0];
        assert!(top.url.contains("coding-skills-assessment"));
        assert!(top.url.starts_with("https://www.shl.com/"));
        assert_eq!(top.duration, 60);
        assert_eq!(top.remote_support, "Yes");
        assert_eq!(top.adaptive_support, "No");
        assert!(!top.test_type.is_empty());
    }

    #[tokio::test]
    async fn test_simple_recommend_swallows_bad_queries() {
        let pipeline = testutil::seeded_pipeline().await;
        let response = recommend_simple(
            &pipeline,
            SimpleRecommendRequest { query: "ab".into() },
        )
        .await;
        assert!(response.recommended_assessments.is_empty());
    }

    #[tokio::test]
    async fn test_rich_response_carries_totals_and_timing() {
        let pipeline = testutil::seeded_pipeline().await;
        let response = recommend(
            &pipeline,
            RecommendationRequest {
                query: "leadership for senior executives".into(),
                top_k: 3,
                filters: None,
            },
        )
        .await
        .unwrap();

        assert_eq!(response.recommendations.len(), 3);
        assert!(response.processing_time > 0.0);
        assert!(response.total_assessments >= 3);
        assert!(!response.query_embedding.is_empty());
    }

    #[tokio::test]
    async fn test_rich_response_propagates_bad_request() {
        let pipeline = testutil::seeded_pipeline().await;
        let err = recommend(
            &pipeline,
            RecommendationRequest {
                query: "x".into(),
                top_k: 5,
                filters: None,
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.error_code().http_status(), 400);
    }

    #[test]
    fn test_simple_duration_derivation() {
        use crate::duration::DurationInfo;
        let mut assessment = Assessment {
            id: 1,
            name: "X".into(),
            description: String::new(),
            url: None,
            remote_testing: false,
            adaptive_irt: false,
            test_types: vec![],
            job_levels: vec![],
            languages: vec![],
            key_features: vec![],
            duration: DurationInfo::parse("15 to 35"),
            embedding: None,
        };
        assert_eq!(simple_duration(&assessment), 35);

        assessment.duration = DurationInfo::parse("max 20");
        assert_eq!(simple_duration(&assessment), 20);

        assessment.duration = DurationInfo {
            duration_text: Some("45".into()),
            ..DurationInfo::default()
        };
        assert_eq!(simple_duration(&assessment), 45);

        assessment.duration = DurationInfo::parse("Untimed");
        assert_eq!(simple_duration(&assessment), 0);
    }

    #[tokio::test]
    async fn test_min_similarity_zero_means_no_floor() {
        let pipeline = testutil::seeded_pipeline().await;
        let response = recommend(
            &pipeline,
            RecommendationRequest {
                query: "zzz qqq xyzzy".into(),
                top_k: 5,
                filters: Some(Filters {
                    min_similarity: Some(0.0),
                    ..Filters::default()
                }),
            },
        )
        .await
        .unwrap();
        // With the floor disabled even weak matches come back.
        assert!(!response.recommendations.is_empty());
    }
}
