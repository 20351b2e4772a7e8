//! Trait definition for pluggable search provider adapters.
//!
//! Each backend (DuckDuckGo, Bing, SerpApi) implements
//! [`ProviderAdapter`]: a thin translator from one site's HTML or JSON
//! into [`SearchHit`] records. Adapters own their endpoint construction,
//! request headers, response parsing, and timeout; the coordinator only
//! sees success or failure.

use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::types::{Provider, SearchHit};

/// A pluggable search backend adapter.
///
/// Implementations must be callable concurrently with other adapters and
/// must not block indefinitely — the HTTP timeout in [`SearchConfig`] is
/// each adapter's own deadline. Retries, if a backend wants them, belong
/// inside the adapter; the coordinator never retries.
pub trait ProviderAdapter: Send + Sync {
    /// Fetch up to `limit` hits for `query`.
    ///
    /// Hits come back in the backend's own ranking order with
    /// `provider_rank` set from position. An empty list is a valid
    /// success.
    ///
    /// # Errors
    ///
    /// Any [`SearchError`] excludes this provider's contribution for the
    /// request; it is never surfaced to the caller as a hard failure.
    fn fetch(
        &self,
        query: &str,
        limit: usize,
        config: &SearchConfig,
    ) -> impl std::future::Future<Output = Result<Vec<SearchHit>, SearchError>> + Send;

    /// Which [`Provider`] this adapter represents.
    fn provider(&self) -> Provider;
}
