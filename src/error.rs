//! Error types for the recommendation engine.
//!
//! Provides structured error handling with:
//! - Machine-readable error codes (`ErrorCode`)
//! - Category-based exit codes (2=catalog, 3=not_found, 4=validation, etc.)
//! - HTTP-equivalent statuses for transport adapters
//! - Structured JSON output for piped / non-TTY consumers

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for recommendation-engine operations.
pub type Result<T> = std::result::Result<T, Error>;

// ── Error Code ────────────────────────────────────────────────

/// Machine-readable error codes grouped by category.
///
/// Each code maps to a SCREAMING_SNAKE string, a category-based exit
/// code, and an HTTP-equivalent status for transport layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Catalog store (exit 2)
    NotInitialized,
    AlreadyInitialized,
    RetrievalError,

    // Not Found (exit 3)
    AssessmentNotFound,
    GroundTruthNotFound,

    // Validation (exit 4)
    BadRequest,

    // Config (exit 7)
    ConfigError,

    // I/O (exit 8)
    IoError,
    JsonError,
    DataError,

    // Providers (exit 9)
    UpstreamUnavailable,

    // Internal (exit 1)
    InternalError,
}

impl ErrorCode {
    /// Machine-readable SCREAMING_SNAKE code string.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        match self {
            Self::NotInitialized => "NOT_INITIALIZED",
            Self::AlreadyInitialized => "ALREADY_INITIALIZED",
            Self::RetrievalError => "RETRIEVAL_ERROR",
            Self::AssessmentNotFound => "ASSESSMENT_NOT_FOUND",
            Self::GroundTruthNotFound => "GROUND_TRUTH_NOT_FOUND",
            Self::BadRequest => "BAD_REQUEST",
            Self::ConfigError => "CONFIG_ERROR",
            Self::IoError => "IO_ERROR",
            Self::JsonError => "JSON_ERROR",
            Self::DataError => "DATA_ERROR",
            Self::UpstreamUnavailable => "UPSTREAM_UNAVAILABLE",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Category-based exit code (1-9).
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::InternalError => 1,
            Self::NotInitialized | Self::AlreadyInitialized | Self::RetrievalError => 2,
            Self::AssessmentNotFound | Self::GroundTruthNotFound => 3,
            Self::BadRequest => 4,
            Self::ConfigError => 7,
            Self::IoError | Self::JsonError | Self::DataError => 8,
            Self::UpstreamUnavailable => 9,
        }
    }

    /// HTTP-equivalent status for transport adapters.
    ///
    /// The recommendation core is transport-agnostic; an HTTP layer maps
    /// errors through this instead of matching variants itself.
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        match self {
            Self::BadRequest => 400,
            Self::AssessmentNotFound | Self::GroundTruthNotFound => 404,
            Self::DataError => 422,
            Self::UpstreamUnavailable => 502,
            Self::NotInitialized
            | Self::AlreadyInitialized
            | Self::RetrievalError
            | Self::ConfigError
            | Self::IoError
            | Self::JsonError
            | Self::InternalError => 500,
        }
    }
}

// ── Error Enum ────────────────────────────────────────────────

/// Errors that can occur in recommendation-engine operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Not initialized: run `assessrec init` first")]
    NotInitialized,

    #[error("Already initialized at {path}")]
    AlreadyInitialized { path: PathBuf },

    #[error("Catalog error: {0}")]
    Retrieval(#[from] rusqlite::Error),

    #[error("Assessment not found: {id}")]
    AssessmentNotFound { id: i64 },

    #[error("Query ID not found in ground truth: {query_id}")]
    GroundTruthNotFound { query_id: String },

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("{provider} unavailable: {message}")]
    Upstream { provider: String, message: String },

    #[error("Data error: {0}")]
    Data(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Convenience constructor for provider failures.
    pub fn upstream(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Upstream {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Map this error to its structured `ErrorCode`.
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::NotInitialized => ErrorCode::NotInitialized,
            Self::AlreadyInitialized { .. } => ErrorCode::AlreadyInitialized,
            Self::Retrieval(_) => ErrorCode::RetrievalError,
            Self::AssessmentNotFound { .. } => ErrorCode::AssessmentNotFound,
            Self::GroundTruthNotFound { .. } => ErrorCode::GroundTruthNotFound,
            Self::BadRequest(_) => ErrorCode::BadRequest,
            Self::Upstream { .. } => ErrorCode::UpstreamUnavailable,
            Self::Data(_) => ErrorCode::DataError,
            Self::Config(_) => ErrorCode::ConfigError,
            Self::Io(_) => ErrorCode::IoError,
            Self::Json(_) => ErrorCode::JsonError,
            Self::Other(_) => ErrorCode::InternalError,
        }
    }

    /// Category-based exit code, delegating to the `ErrorCode`.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        self.error_code().exit_code()
    }

    /// Context-aware recovery hint for humans and scripts.
    ///
    /// Returns `None` if no actionable suggestion exists.
    #[must_use]
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::NotInitialized => {
                Some("Run `assessrec init` to create the catalog database".to_string())
            }
            Self::AlreadyInitialized { path } => Some(format!(
                "Catalog already exists at {}. Use `--force` to reinitialize.",
                path.display()
            )),
            Self::GroundTruthNotFound { query_id } => Some(format!(
                "No ground-truth entry with ID '{query_id}'. Use `assessrec evaluate show` to list entries."
            )),
            Self::AssessmentNotFound { id } => Some(format!(
                "No assessment with ID '{id}'. Use `assessrec catalog list` to see the catalog."
            )),
            Self::Upstream { provider, .. } => Some(format!(
                "The {provider} provider failed after retries. Set USE_MOCK_DATA=true for deterministic offline results."
            )),
            _ => None,
        }
    }

    /// Structured JSON representation for machine consumption.
    #[must_use]
    pub fn to_structured_json(&self) -> serde_json::Value {
        let code = self.error_code();
        let mut obj = serde_json::json!({
            "error": {
                "code": code.as_str(),
                "message": self.to_string(),
                "exit_code": code.exit_code(),
                "http_status": code.http_status(),
            }
        });

        if let Some(hint) = self.hint() {
            obj["error"]["hint"] = serde_json::Value::String(hint);
        }

        obj
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_mapping() {
        let err = Error::BadRequest("query too short".into());
        assert_eq!(err.error_code(), ErrorCode::BadRequest);
        assert_eq!(err.exit_code(), 4);
        assert_eq!(err.error_code().http_status(), 400);
    }

    #[test]
    fn test_upstream_maps_to_bad_gateway() {
        let err = Error::upstream("embedding", "connect timed out");
        assert_eq!(err.error_code(), ErrorCode::UpstreamUnavailable);
        assert_eq!(err.error_code().http_status(), 502);
        assert_eq!(err.exit_code(), 9);
    }

    #[test]
    fn test_structured_json_contains_code_and_hint() {
        let err = Error::GroundTruthNotFound {
            query_id: "q42".into(),
        };
        let json = err.to_structured_json();
        assert_eq!(json["error"]["code"], "GROUND_TRUTH_NOT_FOUND");
        assert_eq!(json["error"]["http_status"], 404);
        assert!(json["error"]["hint"].as_str().unwrap().contains("q42"));
    }
}
