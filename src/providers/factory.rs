//! Provider selection.
//!
//! Builds the (embedder, language model) pair the pipeline is constructed
//! with. Mocks are selected when `USE_MOCK_DATA` is set or when no API key
//! is configured; either way the pipeline sees the same boxed interfaces.

use tracing::{info, warn};

use super::embedder::BoxedEmbedder;
use super::gemini::{GeminiEmbedder, GeminiLanguageModel};
use super::llm::BoxedLanguageModel;
use super::mock::{MockEmbedder, MockLanguageModel};
use super::types::gemini_models;
use crate::config::Settings;

/// The provider pair injected into the pipeline.
pub struct Providers {
    pub embedder: BoxedEmbedder,
    pub llm: BoxedLanguageModel,
}

/// Create providers according to configuration.
#[must_use]
pub fn create_providers(settings: &Settings) -> Providers {
    if settings.use_mock_data {
        info!("mock mode enabled, using deterministic providers");
        return create_mock_providers(settings);
    }

    if settings.gemini_api_key.is_empty() {
        warn!("GEMINI_API_KEY not configured, falling back to deterministic providers");
        return create_mock_providers(settings);
    }

    Providers {
        embedder: BoxedEmbedder::new(GeminiEmbedder::new(
            settings.gemini_api_key.clone(),
            settings.embedding_model_id.clone(),
        )),
        llm: BoxedLanguageModel::new(GeminiLanguageModel::new(
            settings.gemini_api_key.clone(),
            settings.llm_model_id.clone(),
        )),
    }
}

/// Create the deterministic providers directly.
///
/// The mock embedder mirrors the configured embedding model's dimension
/// so catalogs embedded either way stay compatible.
#[must_use]
pub fn create_mock_providers(settings: &Settings) -> Providers {
    let dimensions = gemini_models::get_config(&settings.embedding_model_id).dimensions;
    Providers {
        embedder: BoxedEmbedder::new(MockEmbedder::new(dimensions)),
        llm: BoxedLanguageModel::new(MockLanguageModel),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_mode_selects_mock_embedder() {
        let settings = Settings {
            use_mock_data: true,
            gemini_api_key: "real-key".to_string(),
            ..Settings::default()
        };
        let providers = create_providers(&settings);
        assert_eq!(providers.embedder.info().name, "mock");
        assert_eq!(providers.llm.info().name, "mock");
        assert_eq!(providers.embedder.dimensions(), 768);
    }

    #[test]
    fn test_missing_key_falls_back_to_mock() {
        let settings = Settings::default();
        let providers = create_providers(&settings);
        assert_eq!(providers.embedder.info().name, "mock");
    }

    #[test]
    fn test_real_providers_when_configured() {
        let settings = Settings {
            gemini_api_key: "key".to_string(),
            ..Settings::default()
        };
        let providers = create_providers(&settings);
        assert_eq!(providers.embedder.info().name, "gemini");
        assert_eq!(providers.llm.info().model, "models/gemini-1.5-pro");
    }
}
