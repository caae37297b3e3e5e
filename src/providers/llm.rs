//! Generative-model capability trait.
//!
//! Two operations feed the pipeline: reranking a candidate list into an
//! index permutation, and extracting structured filters from the query.
//! Both are recoverable at the pipeline level - a rerank failure falls
//! back to similarity order, an extraction failure to empty filters.

use super::types::ProviderInfo;
use crate::error::Result;
use crate::model::recommendation::Filters;

/// Trait for generative-model providers.
///
/// Implemented by the Gemini adapter and the deterministic mock. The
/// trait is object-safe via [`BoxedLanguageModel`].
pub trait LanguageModel: Send + Sync {
    /// Get provider metadata.
    fn info(&self) -> ProviderInfo;

    /// Rerank candidate context documents for a query.
    ///
    /// Returns 0-based indices into `docs`, best first, at most `top_k`
    /// of them. The pipeline sanitizes the list (range check, dedupe)
    /// before use; a hard failure makes the pipeline fall back to
    /// similarity order.
    fn rerank(
        &self,
        query: &str,
        docs: &[String],
        top_k: usize,
    ) -> impl std::future::Future<Output = Result<Vec<usize>>> + Send;

    /// Extract structured filters from a natural-language query.
    fn extract_filters(
        &self,
        query: &str,
    ) -> impl std::future::Future<Output = Result<Filters>> + Send;
}

/// Boxed provider for dynamic dispatch.
pub struct BoxedLanguageModel {
    inner: Box<dyn LanguageModelBoxed + Send + Sync>,
}

/// Object-safe version of [`LanguageModel`] for boxing.
trait LanguageModelBoxed: Send + Sync {
    fn info(&self) -> ProviderInfo;
    fn rerank_boxed(
        &self,
        query: &str,
        docs: &[String],
        top_k: usize,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Vec<usize>>> + Send + '_>>;
    fn extract_filters_boxed(
        &self,
        query: &str,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Filters>> + Send + '_>>;
}

impl BoxedLanguageModel {
    /// Create a new boxed provider.
    pub fn new<P: LanguageModel + 'static>(provider: P) -> Self {
        Self {
            inner: Box::new(BoxedLanguageModelWrapper(provider)),
        }
    }

    /// Get provider metadata.
    #[must_use]
    pub fn info(&self) -> ProviderInfo {
        self.inner.info()
    }

    /// Rerank candidate context documents for a query.
    ///
    /// # Errors
    ///
    /// Returns the provider error; callers treat it as recoverable.
    pub async fn rerank(&self, query: &str, docs: &[String], top_k: usize) -> Result<Vec<usize>> {
        self.inner.rerank_boxed(query, docs, top_k).await
    }

    /// Extract structured filters from a natural-language query.
    ///
    /// # Errors
    ///
    /// Returns the provider error; callers treat it as recoverable.
    pub async fn extract_filters(&self, query: &str) -> Result<Filters> {
        self.inner.extract_filters_boxed(query).await
    }
}

/// Wrapper implementing `LanguageModelBoxed` for any [`LanguageModel`].
struct BoxedLanguageModelWrapper<P: LanguageModel + 'static>(P);

impl<P: LanguageModel + 'static> LanguageModelBoxed for BoxedLanguageModelWrapper<P> {
    fn info(&self) -> ProviderInfo {
        self.0.info()
    }

    fn rerank_boxed(
        &self,
        query: &str,
        docs: &[String],
        top_k: usize,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Vec<usize>>> + Send + '_>> {
        let query_owned = query.to_string();
        let docs_owned = docs.to_vec();
        Box::pin(async move { self.0.rerank(&query_owned, &docs_owned, top_k).await })
    }

    fn extract_filters_boxed(
        &self,
        query: &str,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Filters>> + Send + '_>> {
        let query_owned = query.to_string();
        Box::pin(async move { self.0.extract_filters(&query_owned).await })
    }
}
