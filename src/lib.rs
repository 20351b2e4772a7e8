//! # meld-search
//!
//! Multi-source search aggregation: concurrent provider fan-out, policy
//! filtering, rank fusion, deduplication, optional snippet enhancement,
//! and AI summarization with a ranked-listing fallback.
//!
//! ## Design
//!
//! - Queries all configured providers concurrently; a failing provider
//!   only removes its own contribution
//! - Canonical-URL identity keys reconcile the same page across
//!   providers with different link conventions
//! - Pluggable fusion: reciprocal rank fusion (default), BM25-style
//!   relevance over a per-request corpus, or plain interleaving
//! - A dedup cascade removes exact, near-exact, and content-similar
//!   duplicates in priority order
//! - Policy (domain/title blacklists) flags or drops low-quality hits,
//!   with an exemption for terms the user searched for explicitly
//!
//! The fusion core is a pure function ([`fuse`]); [`Searcher`] wires it
//! to the provider adapters, the page-fetch collaborator, and the
//! summarizer.
//!
//! ## Security
//!
//! - API keys never appear in logs or error messages
//! - No network listeners — this is a library, not a server
//! - Queries are logged at trace level only

pub mod config;
pub mod content;
pub mod error;
pub mod http;
pub mod keys;
pub mod pipeline;
pub mod provider;
pub mod providers;
pub mod summarize;
pub mod types;

pub use config::{BlacklistMode, FusionStrategy, PolicyConfig, SearchConfig};
pub use error::{Result, SearchError};
pub use pipeline::assemble::{render_listing, SearchOutcome};
pub use pipeline::fuse;
pub use summarize::{Summary, SummarySource};
pub use types::{HitBody, PageContent, Provider, ProviderBatch, SearchHit};

use keys::KeyPool;
use provider::ProviderAdapter;
use providers::{BingAdapter, DuckDuckGoAdapter, SerpApiImagesAdapter};
use std::time::Duration;

/// Orchestrates the full pipeline against live providers.
///
/// Holds the process-wide configuration and the rotating SerpApi key
/// pool. Construct once at startup and share; every method takes `&self`
/// and requests run independently.
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> meld_search::Result<()> {
/// let searcher = meld_search::Searcher::new(
///     meld_search::SearchConfig::default(),
///     meld_search::PolicyConfig::default(),
/// )?;
/// let hits = searcher.search("rust async runtimes").await?;
/// for hit in &hits {
///     println!("{}: {}", hit.title, hit.raw_key());
/// }
/// # Ok(())
/// # }
/// ```
pub struct Searcher {
    config: SearchConfig,
    policy: PolicyConfig,
    keys: KeyPool,
}

impl Searcher {
    /// Build a searcher, clamping numeric settings and rejecting
    /// structurally unusable configuration.
    ///
    /// # Errors
    ///
    /// [`SearchError::Config`] when no provider is enabled.
    pub fn new(mut config: SearchConfig, mut policy: PolicyConfig) -> Result<Self> {
        config.sanitize();
        policy.sanitize();
        config.validate()?;
        let keys = KeyPool::new(config.serpapi_keys.clone());
        Ok(Self {
            config,
            policy,
            keys,
        })
    }

    /// Build a searcher from `MELD_*` environment variables.
    ///
    /// # Errors
    ///
    /// Same as [`Searcher::new`].
    pub fn from_env() -> Result<Self> {
        Self::new(SearchConfig::from_env(), PolicyConfig::from_env())
    }

    /// The active orchestration settings.
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// The active result policy.
    pub fn policy(&self) -> &PolicyConfig {
        &self.policy
    }

    /// Search text providers and return the ranked, deduplicated hits,
    /// truncated to the configured limit.
    ///
    /// # Errors
    ///
    /// [`SearchError::Config`] for an empty query,
    /// [`SearchError::NoResults`] when no provider produced a usable hit.
    pub async fn search(&self, query: &str) -> Result<Vec<SearchHit>> {
        let mut hits = self.fused_hits(query).await?;
        hits.truncate(self.config.max_results);
        Ok(hits)
    }

    /// Search text providers and attempt an AI synthesis over the top
    /// hits, falling back to the ranked listing when the summarizer is
    /// unavailable or fails.
    ///
    /// # Errors
    ///
    /// Same as [`Searcher::search`]; a summarizer failure is not an
    /// error, it selects the fallback outcome.
    pub async fn search_with_summary(&self, query: &str) -> Result<SearchOutcome> {
        let hits = self.fused_hits(query).await?;
        Ok(pipeline::assemble::assemble(query, hits, &self.config).await)
    }

    /// Search the image provider, deduplicate by original image URL, and
    /// truncate to the configured limit.
    ///
    /// # Errors
    ///
    /// [`SearchError::Config`] for an empty query,
    /// [`SearchError::NoResults`] when nothing usable came back.
    pub async fn search_images(&self, query: &str) -> Result<Vec<SearchHit>> {
        check_query(query)?;

        // Over-fetch so dedup still leaves a full page of results.
        let fetch_limit = self
            .policy
            .image_fetch_limit
            .max(self.config.max_results * 2);
        let adapter = SerpApiImagesAdapter { keys: &self.keys };
        let hits = match adapter.fetch(query, fetch_limit, &self.config).await {
            Ok(hits) => hits,
            Err(err) => {
                tracing::warn!(error = %err, "image provider failed");
                Vec::new()
            }
        };

        let mut fused = fuse(
            vec![ProviderBatch::new(Provider::SerpApiImages, hits)],
            &self.policy,
            query,
        );
        if fused.is_empty() {
            return Err(SearchError::NoResults);
        }
        fused.truncate(self.config.max_results);
        Ok(fused)
    }

    /// Fan out, fuse, and optionally enhance. The shared front half of
    /// the text search paths.
    async fn fused_hits(&self, query: &str) -> Result<Vec<SearchHit>> {
        check_query(query)?;

        let calls: Vec<_> = self
            .config
            .providers
            .iter()
            .map(|provider| (*provider, self.fetch_provider(*provider, query)))
            .collect();
        let deadline = self.config.deadline_ms.map(Duration::from_millis);
        let batches = pipeline::fanout::fan_out(calls, deadline).await;

        let mut fused = fuse(batches, &self.policy, query);
        if fused.is_empty() {
            return Err(SearchError::NoResults);
        }

        if self.config.enhance {
            pipeline::enhance::enhance_top_hit(&mut fused, &self.policy, &self.config).await;
        }
        Ok(fused)
    }

    /// Dispatch one provider call to its concrete adapter.
    async fn fetch_provider(&self, provider: Provider, query: &str) -> Result<Vec<SearchHit>> {
        match provider {
            Provider::DuckDuckGo => {
                DuckDuckGoAdapter
                    .fetch(query, self.policy.text_fetch_limit, &self.config)
                    .await
            }
            Provider::Bing => {
                BingAdapter
                    .fetch(query, self.policy.text_fetch_limit, &self.config)
                    .await
            }
            Provider::SerpApiImages => {
                SerpApiImagesAdapter { keys: &self.keys }
                    .fetch(query, self.policy.image_fetch_limit, &self.config)
                    .await
            }
        }
    }
}

/// Reject empty queries before any network work.
fn check_query(query: &str) -> Result<()> {
    if query.trim().is_empty() {
        return Err(SearchError::Config("query must not be empty".into()));
    }
    Ok(())
}
