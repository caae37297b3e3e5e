//! The recommendation pipeline.
//!
//! Composes the embedder, the catalog store, the filter engine and the
//! language model into one request flow:
//!
//! 1. validate the query
//! 2. embed the query and extract filters concurrently
//! 3. merge caller filters over inferred ones
//! 4. retrieve `top_k * multiplier` nearest neighbors above the floor
//! 5. apply post-retrieval filters, relaxing inferred ones on empty
//! 6. rerank via the language model when the pool exceeds `top_k`
//! 7. attach scores, 1-based ranks and explanations
//!
//! Rerank and filter-extraction failures are recoverable (similarity
//! order / empty filters); embedding and retrieval failures fail the
//! request. Partial results are never returned - dropping the future
//! cancels the in-flight provider calls.

use std::time::Instant;
use tracing::{debug, info, warn};

use crate::catalog::{CatalogStore, MatchCandidate};
use crate::config::Settings;
use crate::error::Result;
use crate::filters::{self, FilterEngine};
use crate::model::assessment::RecommendedAssessment;
use crate::model::recommendation::{Filters, RecommendationOutcome, RecommendationRequest};
use crate::providers::Providers;

/// The recommendation pipeline.
///
/// Holds the catalog read-side and the provider capabilities; serving is
/// read-only, so one pipeline can answer any number of requests.
pub struct Pipeline {
    store: CatalogStore,
    providers: Providers,
    engine: FilterEngine,
    settings: Settings,
}

impl Pipeline {
    #[must_use]
    pub fn new(store: CatalogStore, providers: Providers, settings: Settings) -> Self {
        let engine = FilterEngine::new(settings.untimed_passes_max_duration);
        Self {
            store,
            providers,
            engine,
            settings,
        }
    }

    /// Access the underlying catalog store.
    #[must_use]
    pub fn store(&self) -> &CatalogStore {
        &self.store
    }

    /// The settings this pipeline was built with.
    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Produce up to `top_k` recommendations for a query.
    ///
    /// # Errors
    ///
    /// - `BadRequest` for an invalid query or `top_k`
    /// - `UpstreamUnavailable` when embedding fails after retries
    /// - `Retrieval` when the catalog store fails
    ///
    /// An empty result is NOT an error; it comes back as an outcome with
    /// no items.
    pub async fn recommend(
        &self,
        request: RecommendationRequest,
    ) -> Result<RecommendationOutcome> {
        let request = request.validated()?;
        let start = Instant::now();
        info!(query = %request.query, top_k = request.top_k, "processing recommendation request");

        // Embedding and filter extraction are independent; run both at
        // once. Extraction failure degrades to empty inferred filters,
        // embedding failure fails the request.
        let (embedded, extracted) = tokio::join!(
            self.providers.embedder.embed(&request.query),
            self.providers.llm.extract_filters(&request.query),
        );
        let query_embedding = embedded?;
        let inferred = extracted.unwrap_or_else(|e| {
            warn!(error = %e, "filter extraction failed, continuing without inferred filters");
            Filters::default()
        });

        let merged = filters::merge(request.filters.as_ref(), &inferred);
        debug!(?merged, "effective filters");

        let min_sim = merged
            .min_similarity
            .unwrap_or(self.settings.min_similarity_threshold);
        let pool_size = request.top_k * self.settings.retrieval_multiplier;
        let raw = self
            .store
            .match_assessments(&query_embedding, pool_size, min_sim)?;
        let total_candidates = raw.len();
        debug!(total_candidates, min_sim, "retrieved candidate pool");

        let mut candidates = self.engine.apply_post(raw.clone(), &merged);

        // Fail-open: inferred filters may be dropped when they eliminate
        // everything; caller-supplied filters never are.
        let caller_only = request.filters.clone().unwrap_or_default();
        if candidates.is_empty() && merged != caller_only {
            warn!(query = %request.query, "inferred filters eliminated every candidate, relaxing them");
            candidates = self.engine.apply_post(raw, &caller_only);
        }

        if candidates.is_empty() {
            info!(query = %request.query, "no candidates after filtering");
            return Ok(RecommendationOutcome {
                items: Vec::new(),
                query_embedding,
                processing_time: start.elapsed().as_secs_f64(),
                total_candidates,
            });
        }

        let should_rerank =
            candidates.len() > request.top_k || self.settings.always_use_llm_reranking;
        let ordered = if should_rerank {
            self.rerank(&request.query, candidates, request.top_k).await
        } else {
            candidates.truncate(request.top_k);
            candidates
        };

        let items = ordered
            .into_iter()
            .enumerate()
            .map(|(i, c)| RecommendedAssessment {
                explanation: format!(
                    "This assessment has semantic relevance {:.2} to your query about '{}'",
                    c.similarity, request.query
                ),
                similarity_score: c.similarity,
                rank: i + 1,
                assessment: c.assessment,
            })
            .collect::<Vec<_>>();

        let processing_time = start.elapsed().as_secs_f64();
        info!(
            returned = items.len(),
            processing_time, "recommendation request complete"
        );

        Ok(RecommendationOutcome {
            items,
            query_embedding,
            processing_time,
            total_candidates,
        })
    }

    /// Reorder candidates through the language model.
    ///
    /// The returned index list may be short, contain duplicates or
    /// out-of-range values; it is sanitized here and padded from the
    /// similarity order so the result always holds `top_k` items when
    /// enough candidates exist. A hard provider failure falls back to
    /// similarity order.
    async fn rerank(
        &self,
        query: &str,
        mut candidates: Vec<MatchCandidate>,
        top_k: usize,
    ) -> Vec<MatchCandidate> {
        let docs: Vec<String> = candidates.iter().map(context_doc).collect();

        let indices = match self.providers.llm.rerank(query, &docs, top_k).await {
            Ok(indices) => indices,
            Err(e) => {
                warn!(error = %e, "reranking failed, falling back to similarity order");
                candidates.truncate(top_k);
                return candidates;
            }
        };

        let mut picked: Vec<usize> = Vec::with_capacity(top_k);
        for idx in indices {
            if idx < candidates.len() && !picked.contains(&idx) {
                picked.push(idx);
                if picked.len() == top_k {
                    break;
                }
            }
        }
        // Pad from similarity order with whatever the model left out.
        for idx in 0..candidates.len() {
            if picked.len() == top_k {
                break;
            }
            if !picked.contains(&idx) {
                picked.push(idx);
            }
        }

        let mut by_index: Vec<Option<MatchCandidate>> =
            candidates.drain(..).map(Some).collect();
        picked
            .into_iter()
            .filter_map(|idx| by_index[idx].take())
            .collect()
    }
}

/// Render one candidate as the context document the reranker sees.
///
/// Field order is stable; empty fields are omitted.
fn context_doc(candidate: &MatchCandidate) -> String {
    let a = &candidate.assessment;
    let mut lines = vec![format!("Assessment: {}", a.name)];

    if !a.description.is_empty() {
        lines.push(format!("Description: {}", a.description));
    }
    if !a.test_types.is_empty() {
        lines.push(format!("Test Types: {}", a.test_types.join(", ")));
    }
    if !a.job_levels.is_empty() {
        lines.push(format!("Job Levels: {}", a.job_levels.join(", ")));
    }

    let rendered = a.duration.render();
    if rendered.starts_with("Duration:") {
        lines.push(rendered);
    } else {
        lines.push(format!("Duration: {rendered}"));
    }

    lines.push(format!(
        "Remote Testing: {}",
        if a.remote_testing { "Yes" } else { "No" }
    ));
    if !a.languages.is_empty() {
        lines.push(format!("Languages: {}", a.languages.join(", ")));
    }
    if !a.key_features.is_empty() {
        lines.push(format!("Features: {}", a.key_features.join(", ")));
    }
    lines.push(format!("Vector Similarity Score: {}", candidate.similarity));

    lines.join("\n")
}
