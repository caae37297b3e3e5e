//! Gemini REST providers.
//!
//! Talks to the Generative Language API: `embedContent` for embeddings,
//! `generateContent` for reranking and filter extraction. Responses are
//! plain text, so both generative operations parse defensively - models
//! wrap JSON in fenced code blocks, backticks, or prose.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use std::time::Duration;
use tracing::debug;

use super::embedder::Embedder;
use super::llm::LanguageModel;
use super::send_with_retries;
use super::types::{gemini_models, ProviderInfo};
use crate::config::{EMBED_TIMEOUT, EXTRACT_TIMEOUT, RERANK_TIMEOUT};
use crate::error::{Error, Result};
use crate::model::recommendation::Filters;

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

// ── Embedding ─────────────────────────────────────────────────

/// Gemini embedding provider.
pub struct GeminiEmbedder {
    client: reqwest::Client,
    api_key: String,
    model: String,
    dimensions: usize,
}

impl GeminiEmbedder {
    #[must_use]
    pub fn new(api_key: String, model: String) -> Self {
        let config = gemini_models::get_config(&model);
        Self {
            client: reqwest::Client::new(),
            api_key,
            model: config.name,
            dimensions: config.dimensions,
        }
    }
}

#[derive(Debug, Serialize)]
struct EmbedContentRequest<'a> {
    model: &'a str,
    content: Content<'a>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbedContentResponse {
    embedding: EmbeddingValues,
}

#[derive(Debug, Deserialize)]
struct EmbeddingValues {
    values: Vec<f32>,
}

impl Embedder for GeminiEmbedder {
    fn info(&self) -> ProviderInfo {
        ProviderInfo {
            name: "gemini".to_string(),
            model: self.model.clone(),
        }
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let url = format!("{API_BASE}/{}:embedContent", self.model);

        // Shared references are Copy, so the retry closure can hand a
        // fresh request future to every attempt.
        let url = url.as_str();
        let response: EmbedContentResponse = send_with_retries("embedding", move || async move {
            self.client
                .post(url)
                .query(&[("key", self.api_key.as_str())])
                .timeout(EMBED_TIMEOUT)
                .json(&EmbedContentRequest {
                    model: &self.model,
                    content: Content {
                        parts: vec![Part { text }],
                    },
                })
                .send()
                .await?
                .error_for_status()?
                .json()
                .await
        })
        .await?;

        let values = response.embedding.values;
        if values.is_empty() {
            return Err(Error::upstream("embedding", "empty embedding in response"));
        }
        Ok(crate::catalog::sqlite::l2_normalize(&values))
    }
}

// ── Generation ────────────────────────────────────────────────

/// Gemini generative provider for reranking and filter extraction.
pub struct GeminiLanguageModel {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl GeminiLanguageModel {
    #[must_use]
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model,
        }
    }

    async fn generate(
        &self,
        prompt: String,
        config: GenerationConfig,
        deadline: Duration,
    ) -> Result<String> {
        let url = format!("{API_BASE}/{}:generateContent", self.model);

        let url = url.as_str();
        let prompt = prompt.as_str();
        let response: GenerateContentResponse = send_with_retries("llm", move || async move {
            self.client
                .post(url)
                .query(&[("key", self.api_key.as_str())])
                .timeout(deadline)
                .json(&GenerateContentRequest {
                    contents: vec![Content {
                        parts: vec![Part { text: prompt }],
                    }],
                    generation_config: config,
                })
                .send()
                .await?
                .error_for_status()?
                .json()
                .await
        })
        .await?;

        let text: String = response
            .candidates
            .into_iter()
            .next()
            .map(|c| {
                c.content
                    .parts
                    .into_iter()
                    .map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(Error::upstream("llm", "empty response text"));
        }
        Ok(text)
    }
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_p: f32,
    top_k: u32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: ContentOut,
}

#[derive(Debug, Deserialize)]
struct ContentOut {
    #[serde(default)]
    parts: Vec<PartOut>,
}

#[derive(Debug, Deserialize)]
struct PartOut {
    #[serde(default)]
    text: String,
}

impl LanguageModel for GeminiLanguageModel {
    fn info(&self) -> ProviderInfo {
        ProviderInfo {
            name: "gemini".to_string(),
            model: self.model.clone(),
        }
    }

    async fn rerank(&self, query: &str, docs: &[String], top_k: usize) -> Result<Vec<usize>> {
        let context = docs
            .iter()
            .enumerate()
            .map(|(i, doc)| format!("DOCUMENT {}:\n{doc}", i + 1))
            .collect::<Vec<_>>()
            .join("\n\n");

        let prompt = format!(
            "Your task is to rank the most relevant documents for a given query.\n\n\
             QUERY: {query}\n\n\
             Below are the available documents with their scores from a vector search:\n\n\
             {context}\n\n\
             INSTRUCTIONS:\n\
             1. Analyze the query to understand the user's intent and requirements\n\
             2. Evaluate each document for its relevance to the query\n\
             3. Consider both the semantic similarity and the assessment characteristics\n\
             4. Return a JSON array containing the indices of the top {top_k} most relevant \
             documents (0-indexed, based on the DOCUMENT numbers above minus 1)\n\n\
             Example valid outputs:\n\
             [0, 2, 1]\n\
             [5, 3]\n\n\
             YOUR RESPONSE (just a JSON array of indices):"
        );

        let text = self
            .generate(
                prompt,
                GenerationConfig {
                    temperature: 0.2,
                    top_p: 0.8,
                    top_k: 40,
                    max_output_tokens: 100,
                },
                RERANK_TIMEOUT,
            )
            .await?;

        debug!(response = %text, "rerank response");
        parse_index_array(&text)
            .ok_or_else(|| Error::upstream("llm", format!("unparseable rerank response: {text}")))
    }

    async fn extract_filters(&self, query: &str) -> Result<Filters> {
        let prompt = format!(
            "I need to extract structured filters from the following job requirement or \
             assessment query:\n\n\
             \"{query}\"\n\n\
             Extract only filters that are EXPLICITLY mentioned and return them as a valid \
             JSON object. Only include non-empty values. If a filter is not mentioned, leave \
             it out of the JSON or set it to null.\n\n\
             These are the available filters:\n\
             - job_levels: array of strings (Entry-Level, Graduate, Mid-Professional, \
             Professional Individual Contributor, Front Line Manager, Supervisor, Manager, \
             Director, Executive, General Population)\n\
             - test_types: array of strings (Knowledge & Skills, Simulations, Personality & \
             Behavior, Competencies, Assessment Exercises, Biodata & Situational Judgement, \
             Development & 360, Ability & Aptitude)\n\
             - languages: array of strings (English (USA), English International, Spanish, \
             French, etc.)\n\
             - max_duration_minutes: integer representing maximum duration in minutes\n\
             - remote_testing: boolean (true if remote testing is mentioned, false if \
             in-person is required)\n\n\
             Examples of extracting duration information:\n\
             - \"within 30 minutes\" -> {{\"max_duration_minutes\": 30}}\n\
             - \"less than 1 hour\" -> {{\"max_duration_minutes\": 60}}\n\n\
             Return ONLY a valid JSON object with no additional text or explanation."
        );

        let text = self
            .generate(
                prompt,
                GenerationConfig {
                    temperature: 0.0,
                    top_p: 0.95,
                    top_k: 40,
                    max_output_tokens: 2048,
                },
                EXTRACT_TIMEOUT,
            )
            .await?;

        debug!(response = %text, "filter extraction response");
        parse_filters_json(&text)
            .ok_or_else(|| Error::upstream("llm", format!("unparseable filter response: {text}")))
    }
}

// ── Response parsing ──────────────────────────────────────────

fn index_array_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[\s*\d+(?:\s*,\s*\d+)*\s*\]").unwrap())
}

/// Parse a JSON array of integer indices, tolerating surrounding prose.
fn parse_index_array(text: &str) -> Option<Vec<usize>> {
    let trimmed = text.trim();

    if let Ok(values) = serde_json::from_str::<Vec<serde_json::Value>>(trimmed) {
        return Some(
            values
                .into_iter()
                .filter_map(|v| v.as_u64())
                .filter_map(|v| usize::try_from(v).ok())
                .collect(),
        );
    }

    let found = index_array_re().find(trimmed)?;
    serde_json::from_str::<Vec<usize>>(found.as_str()).ok()
}

/// Filter fields as the model emits them; null and missing are the same.
#[derive(Debug, Default, Deserialize)]
struct ExtractedFilters {
    #[serde(default)]
    job_levels: Option<Vec<String>>,
    #[serde(default)]
    test_types: Option<Vec<String>>,
    #[serde(default)]
    languages: Option<Vec<String>>,
    #[serde(default)]
    max_duration_minutes: Option<u32>,
    #[serde(default)]
    remote_testing: Option<bool>,
    #[serde(default)]
    min_similarity: Option<f32>,
}

impl From<ExtractedFilters> for Filters {
    fn from(raw: ExtractedFilters) -> Self {
        Filters {
            job_levels: raw.job_levels.unwrap_or_default(),
            test_types: raw.test_types.unwrap_or_default(),
            languages: raw.languages.unwrap_or_default(),
            max_duration_minutes: raw.max_duration_minutes,
            duration_type: None,
            min_similarity: raw.min_similarity,
            remote_testing: raw.remote_testing,
        }
    }
}

fn code_block_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"```(?:json)?\s*([\s\S]*?)\s*```").unwrap())
}

fn backticks_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"`([\s\S]*?)`").unwrap())
}

fn json_object_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{[\s\S]*\}").unwrap())
}

/// Parse a filters JSON object, unwrapping fenced code blocks, inline
/// backticks, or surrounding prose.
fn parse_filters_json(text: &str) -> Option<Filters> {
    let trimmed = text.trim();

    let candidates = [
        Some(trimmed.to_string()),
        code_block_re()
            .captures(trimmed)
            .map(|c| c[1].trim().to_string()),
        backticks_re()
            .captures(trimmed)
            .map(|c| c[1].trim().to_string()),
        json_object_re()
            .find(trimmed)
            .map(|m| m.as_str().to_string()),
    ];

    candidates
        .into_iter()
        .flatten()
        .find_map(|candidate| serde_json::from_str::<ExtractedFilters>(&candidate).ok())
        .map(Filters::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_index_array_plain() {
        assert_eq!(parse_index_array("[0, 2, 1]"), Some(vec![0, 2, 1]));
    }

    #[test]
    fn test_parse_index_array_in_prose() {
        let text = "The most relevant documents are:\n[3, 0]\nHope that helps!";
        assert_eq!(parse_index_array(text), Some(vec![3, 0]));
    }

    #[test]
    fn test_parse_index_array_drops_non_integers() {
        assert_eq!(parse_index_array(r#"[0, "two", 1]"#), Some(vec![0, 1]));
        assert_eq!(parse_index_array("no array here"), None);
    }

    #[test]
    fn test_parse_filters_plain_object() {
        let filters = parse_filters_json(
            r#"{"job_levels": ["Graduate"], "max_duration_minutes": 30}"#,
        )
        .unwrap();
        assert_eq!(filters.job_levels, vec!["Graduate".to_string()]);
        assert_eq!(filters.max_duration_minutes, Some(30));
    }

    #[test]
    fn test_parse_filters_fenced_code_block() {
        let text = "Here you go:\n```json\n{\"test_types\": [\"Simulations\"]}\n```";
        let filters = parse_filters_json(text).unwrap();
        assert_eq!(filters.test_types, vec!["Simulations".to_string()]);
    }

    #[test]
    fn test_parse_filters_null_fields_mean_unset() {
        let filters = parse_filters_json(
            r#"{"job_levels": null, "remote_testing": true, "languages": []}"#,
        )
        .unwrap();
        assert!(filters.job_levels.is_empty());
        assert_eq!(filters.remote_testing, Some(true));
    }

    #[test]
    fn test_parse_filters_unparseable_is_none() {
        assert!(parse_filters_json("I could not determine any filters.").is_none());
    }
}
