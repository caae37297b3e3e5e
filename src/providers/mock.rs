//! Deterministic fallback providers.
//!
//! Ground-truth tests and offline evaluation must run without external
//! services, so every capability has a mock that is a pure function of
//! its input:
//!
//! - Embeddings hash each token to a fixed pseudorandom direction and sum
//!   them with a shared anchor direction, so texts that share vocabulary
//!   land close together and unrelated short texts still clear the
//!   default similarity floor.
//! - Reranking is a permutation seeded by the query string.
//! - Filter extraction is a conservative keyword-rule pass over a fixed
//!   lexicon.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use regex::Regex;
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::sync::OnceLock;

use super::embedder::Embedder;
use super::llm::LanguageModel;
use super::types::ProviderInfo;
use crate::error::Result;
use crate::model::recommendation::Filters;

/// Weight of the shared anchor direction relative to one token.
///
/// Keeps the cosine of two short unrelated texts around 0.7, above the
/// default 0.6 retrieval floor, while token overlap still dominates the
/// ranking.
const ANCHOR_WEIGHT: f32 = 4.0;

const STOPWORDS: [&str; 18] = [
    "a", "an", "the", "and", "or", "for", "with", "to", "of", "in", "on", "at", "under",
    "within", "by", "is", "are", "that",
];

/// First eight bytes of the SHA-256 digest as a RNG seed.
fn seed_from(text: &str) -> u64 {
    let digest = Sha256::digest(text.as_bytes());
    u64::from_be_bytes(digest[..8].try_into().expect("digest is 32 bytes"))
}

/// Lowercase alphanumeric tokens, stopwords removed, deduped.
fn tokenize(text: &str) -> BTreeSet<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty() && !STOPWORDS.contains(t))
        .map(ToString::to_string)
        .collect()
}

/// Unit direction for a seed word, stable across calls.
fn unit_direction(word: &str, dimensions: usize) -> Vec<f32> {
    let mut rng = StdRng::seed_from_u64(seed_from(word));
    let raw: Vec<f32> = (0..dimensions).map(|_| rng.gen_range(-1.0..1.0)).collect();
    crate::catalog::sqlite::l2_normalize(&raw)
}

/// Deterministic embedding provider.
pub struct MockEmbedder {
    dimensions: usize,
}

impl MockEmbedder {
    #[must_use]
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }
}

impl Embedder for MockEmbedder {
    fn info(&self) -> ProviderInfo {
        ProviderInfo {
            name: "mock".to_string(),
            model: "hashed-tokens".to_string(),
        }
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut acc = unit_direction("\u{0}anchor", self.dimensions);
        for value in &mut acc {
            *value *= ANCHOR_WEIGHT;
        }
        for token in tokenize(text) {
            for (slot, value) in acc.iter_mut().zip(unit_direction(&token, self.dimensions)) {
                *slot += value;
            }
        }
        Ok(crate::catalog::sqlite::l2_normalize(&acc))
    }
}

/// Deterministic generative-model provider.
pub struct MockLanguageModel;

fn duration_filter_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d+)\s*(min|minute|minutes|hour|hours)").unwrap())
}

impl LanguageModel for MockLanguageModel {
    fn info(&self) -> ProviderInfo {
        ProviderInfo {
            name: "mock".to_string(),
            model: "keyword-rules".to_string(),
        }
    }

    async fn rerank(&self, query: &str, docs: &[String], top_k: usize) -> Result<Vec<usize>> {
        let mut indices: Vec<usize> = (0..docs.len()).collect();
        let mut rng = StdRng::seed_from_u64(seed_from(query));
        indices.shuffle(&mut rng);
        indices.truncate(top_k.min(docs.len()));
        Ok(indices)
    }

    async fn extract_filters(&self, query: &str) -> Result<Filters> {
        let query = query.to_lowercase();
        let mut filters = Filters::default();

        let job_level_keywords = [
            ("entry", "Entry-Level"),
            ("graduate", "Graduate"),
            ("mid", "Mid-Professional"),
            ("senior", "Professional Individual Contributor"),
            ("manager", "Manager"),
            ("executive", "Executive"),
            ("director", "Director"),
            ("supervisor", "Supervisor"),
        ];
        for (keyword, level) in job_level_keywords {
            if query.contains(keyword) {
                filters.job_levels.push(level.to_string());
            }
        }

        if query.contains("knowledge") || query.contains("skill") {
            filters.test_types.push("Knowledge & Skills".to_string());
        }
        if query.contains("personality") {
            filters.test_types.push("Personality & Behavior".to_string());
        }
        if query.contains("cognitive") || query.contains("ability") || query.contains("aptitude") {
            filters.test_types.push("Ability & Aptitude".to_string());
        }
        if query.contains("simulation") {
            filters.test_types.push("Simulations".to_string());
        }
        if query.contains("situational") {
            filters
                .test_types
                .push("Biodata & Situational Judgement".to_string());
        }

        if let Some(caps) = duration_filter_re().captures(&query) {
            if let Ok(mut minutes) = caps[1].parse::<u32>() {
                if caps[2].starts_with("hour") {
                    minutes = minutes.saturating_mul(60);
                }
                filters.max_duration_minutes = Some(minutes);
            }
        }

        if query.contains("remote") || query.contains("online") {
            filters.remote_testing = Some(true);
        }
        if query.contains("in-person") || query.contains("in person") || query.contains("on-site")
        {
            filters.remote_testing = Some(false);
        }

        Ok(filters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn norm(v: &[f32]) -> f32 {
        v.iter().map(|x| x * x).sum::<f32>().sqrt()
    }

    fn cosine(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b).map(|(x, y)| x * y).sum()
    }

    #[tokio::test]
    async fn test_embedding_is_deterministic_and_unit_norm() {
        let embedder = MockEmbedder::new(768);
        let first = embedder.embed("software engineer").await.unwrap();
        let second = embedder.embed("software engineer").await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 768);
        assert!((norm(&first) - 1.0).abs() < 1e-3);
    }

    #[tokio::test]
    async fn test_token_overlap_beats_unrelated_text() {
        let embedder = MockEmbedder::new(768);
        let query = embedder
            .embed("software developer with coding skills")
            .await
            .unwrap();
        let related = embedder
            .embed("coding skills assessment for software developer roles")
            .await
            .unwrap();
        let unrelated = embedder
            .embed("verbal reasoning and comprehension test")
            .await
            .unwrap();

        assert!(cosine(&query, &related) > cosine(&query, &unrelated));
        // The shared anchor keeps short unrelated texts above the 0.6
        // retrieval floor.
        assert!(cosine(&query, &unrelated) > 0.6);
    }

    #[tokio::test]
    async fn test_rerank_is_a_seeded_permutation() {
        let llm = MockLanguageModel;
        let docs: Vec<String> = (0..6).map(|i| format!("doc {i}")).collect();

        let first = llm.rerank("some query", &docs, 6).await.unwrap();
        let second = llm.rerank("some query", &docs, 6).await.unwrap();
        assert_eq!(first, second);

        let mut sorted = first.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, vec![0, 1, 2, 3, 4, 5]);

        let truncated = llm.rerank("some query", &docs, 3).await.unwrap();
        assert_eq!(truncated.len(), 3);
        assert_eq!(truncated, first[..3].to_vec());
    }

    #[tokio::test]
    async fn test_extract_filters_keywords() {
        let llm = MockLanguageModel;
        let filters = llm
            .extract_filters("cognitive test under 30 minutes for graduates")
            .await
            .unwrap();
        assert_eq!(filters.test_types, vec!["Ability & Aptitude".to_string()]);
        assert_eq!(filters.max_duration_minutes, Some(30));
        assert_eq!(filters.job_levels, vec!["Graduate".to_string()]);

        let filters = llm
            .extract_filters("remote personality screen for senior executives")
            .await
            .unwrap();
        assert_eq!(filters.remote_testing, Some(true));
        assert_eq!(
            filters.job_levels,
            vec![
                "Professional Individual Contributor".to_string(),
                "Executive".to_string()
            ]
        );
        assert_eq!(filters.test_types, vec!["Personality & Behavior".to_string()]);
    }

    #[tokio::test]
    async fn test_extract_filters_hours_and_conservatism() {
        let llm = MockLanguageModel;
        let filters = llm.extract_filters("anything within 1 hour").await.unwrap();
        assert_eq!(filters.max_duration_minutes, Some(60));

        let filters = llm.extract_filters("find me good tests").await.unwrap();
        assert!(filters.is_empty());
    }
}
