//! Provider metadata and model configuration tables.

/// Provider metadata for status output and logs.
#[derive(Debug, Clone)]
pub struct ProviderInfo {
    pub name: String,
    pub model: String,
}

/// Embedding model configuration.
#[derive(Debug, Clone)]
pub struct EmbeddingModelConfig {
    pub name: String,
    pub dimensions: usize,
}

/// Gemini embedding model configurations.
///
/// The dimension is a deployment constant: the catalog and every query
/// must share it, and switching models means reindexing the catalog.
pub mod gemini_models {
    use super::EmbeddingModelConfig;

    pub fn embedding_001() -> EmbeddingModelConfig {
        EmbeddingModelConfig {
            name: "models/embedding-001".to_string(),
            dimensions: 768,
        }
    }

    pub fn text_embedding_004() -> EmbeddingModelConfig {
        EmbeddingModelConfig {
            name: "models/text-embedding-004".to_string(),
            dimensions: 768,
        }
    }

    pub fn get_config(model: &str) -> EmbeddingModelConfig {
        match model {
            "models/text-embedding-004" | "text-embedding-004" => text_embedding_004(),
            "models/embedding-001" | "embedding-001" => embedding_001(),
            _ => EmbeddingModelConfig {
                name: model.to_string(),
                dimensions: 768, // Default assumption
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_models_resolve() {
        assert_eq!(gemini_models::get_config("models/embedding-001").dimensions, 768);
        assert_eq!(gemini_models::get_config("text-embedding-004").dimensions, 768);
    }

    #[test]
    fn test_unknown_model_keeps_name() {
        let config = gemini_models::get_config("models/custom-embed");
        assert_eq!(config.name, "models/custom-embed");
        assert_eq!(config.dimensions, 768);
    }
}
