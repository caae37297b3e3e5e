//! External AI capabilities and their deterministic fallbacks.
//!
//! Two capabilities feed the pipeline:
//! - [`embedder::Embedder`] - text to unit-norm dense vector
//! - [`llm::LanguageModel`] - candidate reranking and filter extraction
//!
//! Each has a real variant (Gemini REST) and a mock variant selected at
//! startup by [`factory::create_providers`]; the pipeline only ever sees
//! the boxed trait objects, which is what makes offline evaluation and
//! ground-truth tests deterministic.

pub mod embedder;
pub mod factory;
pub mod gemini;
pub mod llm;
pub mod mock;
pub mod types;

pub use embedder::{BoxedEmbedder, Embedder};
pub use factory::{create_mock_providers, create_providers, Providers};
pub use llm::{BoxedLanguageModel, LanguageModel};
pub use types::ProviderInfo;

use crate::config::{RETRY_ATTEMPTS, RETRY_BACKOFF};
use crate::error::{Error, Result};
use std::future::Future;
use tracing::warn;

/// Run a provider call with the transient-error retry policy.
///
/// Connection and timeout failures are retried up to [`RETRY_ATTEMPTS`]
/// times with a fixed [`RETRY_BACKOFF`] between attempts; anything else
/// fails immediately as `UpstreamUnavailable`.
pub(crate) async fn send_with_retries<T, F, Fut>(provider: &str, mut send: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<T, reqwest::Error>>,
{
    let mut attempt = 1;
    loop {
        match send().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < RETRY_ATTEMPTS && (e.is_timeout() || e.is_connect()) => {
                warn!(provider, attempt, error = %e, "transient provider error, retrying");
                tokio::time::sleep(RETRY_BACKOFF).await;
                attempt += 1;
            }
            Err(e) => return Err(Error::upstream(provider, e.to_string())),
        }
    }
}
