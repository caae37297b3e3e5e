//! Configuration management.
//!
//! Runtime settings come from environment variables using the canonical
//! key names (`MIN_SIMILARITY_THRESHOLD`, `USE_MOCK_DATA`, ...), with the
//! defaults the recommendation core was tuned for. Paths resolve to a
//! per-user data directory unless overridden.
//!
//! # Layout
//!
//! - Catalog database: `~/.assessrec/data/catalog.db`
//! - Ground truth:     `<data dir>/evaluation/ground_truth.json`
//! - Evaluation runs:  `<data dir>/evaluation/results/`

use crate::error::{Error, Result};

use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default similarity floor applied at retrieval.
pub const DEFAULT_MIN_SIMILARITY: f32 = 0.6;

/// Default number of recommendations per request.
pub const DEFAULT_TOP_K: usize = 5;

/// Default candidate-pool multiplier (`pool = top_k * multiplier`).
pub const DEFAULT_RETRIEVAL_MULTIPLIER: usize = 3;

/// Deadline for a single embedding call.
pub const EMBED_TIMEOUT: Duration = Duration::from_secs(10);

/// Deadline for a single rerank call.
pub const RERANK_TIMEOUT: Duration = Duration::from_secs(15);

/// Deadline for a single filter-extraction call.
pub const EXTRACT_TIMEOUT: Duration = Duration::from_secs(10);

/// Maximum attempts for transient provider errors.
pub const RETRY_ATTEMPTS: u32 = 3;

/// Fixed delay between retry attempts.
pub const RETRY_BACKOFF: Duration = Duration::from_secs(2);

/// Batch size for the embedding regeneration job.
pub const EMBED_BATCH_SIZE: usize = 25;

/// Pacing delay between provider calls in the regeneration job.
pub const EMBED_PACING: Duration = Duration::from_millis(200);

/// Runtime settings for the recommendation engine.
///
/// Loaded once at startup via [`Settings::from_env`] and injected into the
/// pipeline; nothing reads the environment after construction.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Similarity floor at retrieval when the request carries none.
    pub min_similarity_threshold: f32,
    /// Recommendations per request when the caller does not specify.
    pub default_top_k: usize,
    /// Candidate pool size = `top_k * retrieval_multiplier`.
    pub retrieval_multiplier: usize,
    /// Rerank even when the candidate pool already fits in `top_k`.
    pub always_use_llm_reranking: bool,
    /// Force the deterministic mock providers for every capability.
    pub use_mock_data: bool,
    /// Untimed assessments pass a `max_duration_minutes` filter.
    ///
    /// The canonical policy is `false` (untimed fails the filter).
    pub untimed_passes_max_duration: bool,
    /// Embedding model identifier, opaque to the core.
    pub embedding_model_id: String,
    /// Generative model identifier, opaque to the core.
    pub llm_model_id: String,
    /// API key for the Gemini providers; empty means "not configured".
    pub gemini_api_key: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            min_similarity_threshold: DEFAULT_MIN_SIMILARITY,
            default_top_k: DEFAULT_TOP_K,
            retrieval_multiplier: DEFAULT_RETRIEVAL_MULTIPLIER,
            always_use_llm_reranking: false,
            use_mock_data: false,
            untimed_passes_max_duration: false,
            embedding_model_id: "models/embedding-001".to_string(),
            llm_model_id: "models/gemini-1.5-pro".to_string(),
            gemini_api_key: String::new(),
        }
    }
}

impl Settings {
    /// Load settings from the environment, falling back to defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a key is present but unparseable, or if
    /// `MIN_SIMILARITY_THRESHOLD` falls outside `[0, 1]`.
    pub fn from_env() -> Result<Self> {
        let mut settings = Self::default();

        if let Some(v) = env_var("MIN_SIMILARITY_THRESHOLD") {
            settings.min_similarity_threshold = v
                .parse::<f32>()
                .map_err(|e| Error::Config(format!("MIN_SIMILARITY_THRESHOLD: {e}")))?;
            if !(0.0..=1.0).contains(&settings.min_similarity_threshold) {
                return Err(Error::Config(
                    "MIN_SIMILARITY_THRESHOLD must be in [0, 1]".to_string(),
                ));
            }
        }

        if let Some(v) = env_var("DEFAULT_TOP_K") {
            settings.default_top_k = v
                .parse::<usize>()
                .map_err(|e| Error::Config(format!("DEFAULT_TOP_K: {e}")))?;
        }

        if let Some(v) = env_var("RETRIEVAL_MULTIPLIER") {
            let multiplier = v
                .parse::<usize>()
                .map_err(|e| Error::Config(format!("RETRIEVAL_MULTIPLIER: {e}")))?;
            if multiplier < 1 {
                return Err(Error::Config("RETRIEVAL_MULTIPLIER must be >= 1".to_string()));
            }
            settings.retrieval_multiplier = multiplier;
        }

        if let Some(v) = env_var("ALWAYS_USE_LLM_RERANKING") {
            settings.always_use_llm_reranking = parse_bool(&v);
        }

        if let Some(v) = env_var("USE_MOCK_DATA") {
            settings.use_mock_data = parse_bool(&v);
        }

        if let Some(v) = env_var("UNTIMED_PASSES_MAX_DURATION") {
            settings.untimed_passes_max_duration = parse_bool(&v);
        }

        if let Some(v) = env_var("EMBEDDING_MODEL_ID") {
            settings.embedding_model_id = v;
        }

        if let Some(v) = env_var("LLM_MODEL_ID") {
            settings.llm_model_id = v;
        }

        if let Some(v) = env_var("GEMINI_API_KEY") {
            settings.gemini_api_key = v;
        }

        Ok(settings)
    }
}

/// Read an environment variable, treating empty values as unset.
fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Parse the boolean spellings accepted across the configuration surface.
fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "true" | "yes" | "y" | "1" | "t"
    )
}

/// Get the per-user data directory location (`~/.assessrec`).
#[must_use]
pub fn global_data_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".assessrec"))
}

/// Resolve the catalog database path.
///
/// Priority:
/// 1. Explicit path from a CLI flag
/// 2. `ASSESSREC_DB` environment variable
/// 3. Global location: `~/.assessrec/data/catalog.db`
#[must_use]
pub fn resolve_db_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return Some(path.to_path_buf());
    }

    if let Some(db_path) = env_var("ASSESSREC_DB") {
        return Some(PathBuf::from(db_path));
    }

    global_data_dir().map(|dir| dir.join("data").join("catalog.db"))
}

/// Resolve the evaluation data directory (ground truth + run artifacts).
///
/// Priority:
/// 1. Explicit path from a CLI flag
/// 2. `ASSESSREC_DATA_DIR` environment variable
/// 3. Global location: `~/.assessrec/data`
#[must_use]
pub fn resolve_data_dir(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return Some(path.to_path_buf());
    }

    if let Some(dir) = env_var("ASSESSREC_DATA_DIR") {
        return Some(PathBuf::from(dir));
    }

    global_data_dir().map(|dir| dir.join("data"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_tuning() {
        let settings = Settings::default();
        assert!((settings.min_similarity_threshold - 0.6).abs() < f32::EPSILON);
        assert_eq!(settings.default_top_k, 5);
        assert_eq!(settings.retrieval_multiplier, 3);
        assert!(!settings.always_use_llm_reranking);
        assert!(!settings.use_mock_data);
        assert!(!settings.untimed_passes_max_duration);
    }

    #[test]
    fn test_parse_bool_spellings() {
        for truthy in ["true", "TRUE", "yes", "1", "t", "Y"] {
            assert!(parse_bool(truthy), "{truthy} should be true");
        }
        for falsy in ["false", "0", "no", "off", ""] {
            assert!(!parse_bool(falsy), "{falsy} should be false");
        }
    }

    #[test]
    fn test_resolve_db_path_with_explicit() {
        let explicit = PathBuf::from("/custom/path/catalog.db");
        let result = resolve_db_path(Some(&explicit));
        assert_eq!(result, Some(explicit));
    }

    #[test]
    fn test_resolve_db_path_defaults_to_global() {
        // Without an explicit path the global location is used (the env
        // override is not set in the test environment by default).
        if std::env::var("ASSESSREC_DB").is_err() {
            let path = resolve_db_path(None).unwrap();
            assert!(path.ends_with("catalog.db"));
        }
    }
}
