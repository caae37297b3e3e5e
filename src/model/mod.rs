//! Data types for the recommendation engine.
//!
//! - [`assessment`] - Catalog records and the controlled vocabularies
//! - [`recommendation`] - Requests, filters, and pipeline outcomes
//! - [`evaluation`] - Ground truth and offline metrics

pub mod assessment;
pub mod evaluation;
pub mod recommendation;

pub use assessment::{Assessment, AssessmentPatch, NewAssessment, RecommendedAssessment};
pub use evaluation::{EvaluationResult, EvaluationSummary, GroundTruth};
pub use recommendation::{
    DurationType, Filters, RecommendationOutcome, RecommendationRequest,
};
