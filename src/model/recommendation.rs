//! Requests, filters, and pipeline outcomes.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::assessment::RecommendedAssessment;

/// Minimum accepted query length after trimming.
pub const MIN_QUERY_LEN: usize = 3;

/// Allowed range for `top_k`.
pub const TOP_K_RANGE: std::ops::RangeInclusive<usize> = 1..=20;

/// Duration-type filter values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DurationType {
    /// Exact duration: min and max set and equal.
    Fixed,
    /// Variable flag set, or a strict min < max range.
    Variable,
    /// Untimed flag set.
    Untimed,
}

/// Structured filters on catalog attributes.
///
/// Empty lists and `None` fields mean "no constraint" on that axis. The
/// same shape is used for caller-supplied and LLM-inferred filters; the
/// filter engine merges the two per axis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Filters {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub job_levels: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub test_types: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub languages: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_duration_minutes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_type: Option<DurationType>,
    /// Similarity floor; an explicit `0` disables the floor, only an
    /// absent field falls back to the configured default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_similarity: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_testing: Option<bool>,
}

impl Filters {
    /// Whether no axis carries a constraint.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.job_levels.is_empty()
            && self.test_types.is_empty()
            && self.languages.is_empty()
            && self.max_duration_minutes.is_none()
            && self.duration_type.is_none()
            && self.min_similarity.is_none()
            && self.remote_testing.is_none()
    }
}

/// A recommendation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationRequest {
    /// Natural-language query describing the job requirements.
    pub query: String,
    /// Number of recommendations to return.
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<Filters>,
}

fn default_top_k() -> usize {
    crate::config::DEFAULT_TOP_K
}

impl RecommendationRequest {
    /// Create a request with the default `top_k` and no filters.
    #[must_use]
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            top_k: default_top_k(),
            filters: None,
        }
    }

    /// Validate and normalize the request, trimming the query.
    ///
    /// # Errors
    ///
    /// Returns `BadRequest` when the trimmed query is shorter than
    /// [`MIN_QUERY_LEN`] or `top_k` falls outside [`TOP_K_RANGE`].
    pub fn validated(mut self) -> Result<Self> {
        self.query = self.query.trim().to_string();
        if self.query.len() < MIN_QUERY_LEN {
            return Err(Error::BadRequest(format!(
                "query must be at least {MIN_QUERY_LEN} characters"
            )));
        }
        if !TOP_K_RANGE.contains(&self.top_k) {
            return Err(Error::BadRequest(format!(
                "top_k must be between {} and {}",
                TOP_K_RANGE.start(),
                TOP_K_RANGE.end()
            )));
        }
        if let Some(filters) = &self.filters {
            if let Some(min_similarity) = filters.min_similarity {
                if !(0.0..=1.0).contains(&min_similarity) {
                    return Err(Error::BadRequest(
                        "min_similarity must be in [0, 1]".to_string(),
                    ));
                }
            }
            if filters.max_duration_minutes == Some(0) {
                return Err(Error::BadRequest(
                    "max_duration_minutes must be positive".to_string(),
                ));
            }
        }
        Ok(self)
    }
}

/// The result of a recommendation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationOutcome {
    /// Ranked recommendations, at most `top_k` of them.
    pub items: Vec<RecommendedAssessment>,
    /// Unit-norm embedding of the query.
    pub query_embedding: Vec<f32>,
    /// Wall-clock processing time in seconds.
    pub processing_time: f64,
    /// Size of the raw candidate pool before post-retrieval filtering.
    pub total_candidates: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_is_trimmed_and_validated() {
        let req = RecommendationRequest::new("  leadership hiring  ")
            .validated()
            .unwrap();
        assert_eq!(req.query, "leadership hiring");
    }

    #[test]
    fn test_short_query_rejected() {
        let err = RecommendationRequest::new(" ab ").validated().unwrap_err();
        assert!(matches!(err, Error::BadRequest(_)));
    }

    #[test]
    fn test_top_k_bounds() {
        let mut req = RecommendationRequest::new("valid query");
        req.top_k = 0;
        assert!(req.clone().validated().is_err());
        req.top_k = 21;
        assert!(req.clone().validated().is_err());
        req.top_k = 20;
        assert!(req.validated().is_ok());
    }

    #[test]
    fn test_filter_bounds_validated() {
        let mut req = RecommendationRequest::new("valid query");
        req.filters = Some(Filters {
            min_similarity: Some(1.5),
            ..Filters::default()
        });
        assert!(req.clone().validated().is_err());

        req.filters = Some(Filters {
            max_duration_minutes: Some(0),
            ..Filters::default()
        });
        assert!(req.validated().is_err());
    }

    #[test]
    fn test_filters_empty_detection() {
        assert!(Filters::default().is_empty());
        let filters = Filters {
            min_similarity: Some(0.0),
            ..Filters::default()
        };
        // An explicit zero is still a constraint ("no floor"), not absence.
        assert!(!filters.is_empty());
    }

    #[test]
    fn test_request_deserializes_with_defaults() {
        let req: RecommendationRequest =
            serde_json::from_str(r#"{"query": "software engineer"}"#).unwrap();
        assert_eq!(req.top_k, crate::config::DEFAULT_TOP_K);
        assert!(req.filters.is_none());
    }
}
