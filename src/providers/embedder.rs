//! Embedding capability trait.
//!
//! Maps a text document (query or assessment description) to a unit-norm
//! dense vector of the provider's fixed dimension. Uses async methods for
//! HTTP-based providers.

use super::types::ProviderInfo;
use crate::error::Result;

/// Trait for embedding providers.
///
/// Implemented by the Gemini adapter and the deterministic mock. The
/// trait is object-safe via [`BoxedEmbedder`] to allow runtime provider
/// selection.
pub trait Embedder: Send + Sync {
    /// Get provider metadata.
    fn info(&self) -> ProviderInfo;

    /// Output vector dimension; the catalog must use the same value.
    fn dimensions(&self) -> usize;

    /// Embed a single text into a unit-norm vector.
    fn embed(&self, text: &str) -> impl std::future::Future<Output = Result<Vec<f32>>> + Send;
}

/// Boxed provider for dynamic dispatch.
///
/// Since the trait has async methods with `impl Future`, we need this
/// wrapper for runtime polymorphism.
pub struct BoxedEmbedder {
    inner: Box<dyn EmbedderBoxed + Send + Sync>,
}

/// Object-safe version of [`Embedder`] for boxing.
trait EmbedderBoxed: Send + Sync {
    fn info(&self) -> ProviderInfo;
    fn dimensions(&self) -> usize;
    fn embed_boxed(
        &self,
        text: &str,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Vec<f32>>> + Send + '_>>;
}

impl BoxedEmbedder {
    /// Create a new boxed provider.
    pub fn new<P: Embedder + 'static>(provider: P) -> Self {
        Self {
            inner: Box::new(BoxedEmbedderWrapper(provider)),
        }
    }

    /// Get provider metadata.
    #[must_use]
    pub fn info(&self) -> ProviderInfo {
        self.inner.info()
    }

    /// Output vector dimension.
    #[must_use]
    pub fn dimensions(&self) -> usize {
        self.inner.dimensions()
    }

    /// Embed a single text into a unit-norm vector.
    ///
    /// # Errors
    ///
    /// Propagates the provider error after the retry policy is exhausted.
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.inner.embed_boxed(text).await
    }
}

/// Wrapper implementing `EmbedderBoxed` for any [`Embedder`].
struct BoxedEmbedderWrapper<P: Embedder + 'static>(P);

impl<P: Embedder + 'static> EmbedderBoxed for BoxedEmbedderWrapper<P> {
    fn info(&self) -> ProviderInfo {
        self.0.info()
    }

    fn dimensions(&self) -> usize {
        self.0.dimensions()
    }

    fn embed_boxed(
        &self,
        text: &str,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Vec<f32>>> + Send + '_>> {
        // Owned string so the future does not borrow the caller's text.
        let text_owned = text.to_string();
        Box::pin(async move { self.0.embed(&text_owned).await })
    }
}
