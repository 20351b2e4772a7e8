//! Configuration for orchestration and result policy.
//!
//! Two layers: [`SearchConfig`] controls which providers run and how the
//! request is executed (timeouts, deadline, endpoint overrides), while
//! [`PolicyConfig`] holds the quality policy applied to every request
//! (blacklists, fusion parameters, dedup threshold). Both are loaded once
//! at process start and read-only afterwards.
//!
//! Numeric settings are never a reason to fail: [`PolicyConfig::sanitize`]
//! clamps anything out of range back to its default and logs a warning.
//! Only structurally unusable configurations (no providers, zero limit)
//! are rejected, and only at the API boundary.

use crate::error::SearchError;
use crate::types::Provider;

/// How a blacklist match is applied to a hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlacklistMode {
    /// Flag the hit and damp its fusion score. The hit stays visible to
    /// later stages.
    Penalize,
    /// Remove the hit from the pipeline entirely.
    Drop,
}

/// Fusion strategy selected by configuration, not per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FusionStrategy {
    /// Reciprocal rank fusion over provider positions. Cross-provider
    /// agreement accumulates.
    RankFusion,
    /// BM25-style relevance scoring over title + snippet content.
    Relevance,
    /// Plain round-robin across providers, no scoring signal.
    Interleave,
}

/// Upper bound accepted for a caller's result limit.
pub const MAX_RESULT_LIMIT: usize = 30;

/// Quality policy applied to every request.
#[derive(Debug, Clone)]
pub struct PolicyConfig {
    /// Substrings matched against a hit's canonical host. Matches are
    /// penalized or dropped per [`PolicyConfig::blacklist_mode`], unless
    /// the substring also appears in the query.
    pub domain_blacklist: Vec<String>,
    /// Lower-cased keywords matched against a hit's title. Same
    /// query-exemption rule as the domain blacklist.
    pub title_blacklist: Vec<String>,
    /// Whether blacklist matches flag or remove hits.
    pub blacklist_mode: BlacklistMode,
    /// Multiplier applied to a penalized hit's rank-fusion contribution.
    /// Valid range (0, 1).
    pub penalty_damping: f64,
    /// Rank-fusion constant K. Higher values flatten the position signal.
    pub rrf_k: f64,
    /// BM25 term-frequency saturation.
    pub bm25_k1: f64,
    /// BM25 length-normalization strength, in [0, 1].
    pub bm25_b: f64,
    /// Relevance bonus per distinct query token found verbatim in a
    /// hit's URL.
    pub url_token_bonus: f64,
    /// Relevance penalty subtracted when the title contains a blacklist
    /// keyword.
    pub title_penalty: f64,
    /// Token-set Jaccard similarity at or above which two hits are
    /// considered content duplicates. Valid range (0, 1].
    pub jaccard_threshold: f64,
    /// Which fusion strategy orders the merged list.
    pub strategy: FusionStrategy,
    /// Hosts whose hits are preferred by the enhancement selector
    /// (encyclopedia-style pages with rich lead sections).
    pub rich_content_hosts: Vec<String>,
    /// How many hits to request from each text provider.
    pub text_fetch_limit: usize,
    /// How many hits to request from the image provider.
    pub image_fetch_limit: usize,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            domain_blacklist: Vec::new(),
            title_blacklist: Vec::new(),
            blacklist_mode: BlacklistMode::Penalize,
            penalty_damping: 0.1,
            rrf_k: 60.0,
            bm25_k1: 1.2,
            bm25_b: 0.75,
            url_token_bonus: 0.5,
            title_penalty: 2.0,
            jaccard_threshold: 0.75,
            strategy: FusionStrategy::RankFusion,
            rich_content_hosts: Vec::new(),
            text_fetch_limit: 15,
            image_fetch_limit: 50,
        }
    }
}

impl PolicyConfig {
    /// Load policy from `MELD_*` environment variables, falling back to
    /// defaults for anything unset or unparseable. The result is always
    /// usable: out-of-range values are clamped by [`Self::sanitize`].
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let mut policy = Self {
            domain_blacklist: csv_env("MELD_DOMAIN_BLACKLIST"),
            title_blacklist: csv_env("MELD_TITLE_BLACKLIST")
                .into_iter()
                .map(|s| s.to_lowercase())
                .collect(),
            blacklist_mode: match env_str("MELD_BLACKLIST_MODE").map(|v| v.to_lowercase()).as_deref()
            {
                Some("drop") => BlacklistMode::Drop,
                _ => BlacklistMode::Penalize,
            },
            penalty_damping: num_env("MELD_PENALTY_DAMPING", defaults.penalty_damping),
            rrf_k: num_env("MELD_RRF_K", defaults.rrf_k),
            bm25_k1: num_env("MELD_BM25_K1", defaults.bm25_k1),
            bm25_b: num_env("MELD_BM25_B", defaults.bm25_b),
            url_token_bonus: num_env("MELD_URL_TOKEN_BONUS", defaults.url_token_bonus),
            title_penalty: num_env("MELD_TITLE_PENALTY", defaults.title_penalty),
            jaccard_threshold: num_env("MELD_JACCARD_THRESHOLD", defaults.jaccard_threshold),
            strategy: match env_str("MELD_FUSION_STRATEGY").map(|v| v.to_lowercase()).as_deref() {
                Some("relevance") => FusionStrategy::Relevance,
                Some("interleave") => FusionStrategy::Interleave,
                _ => FusionStrategy::RankFusion,
            },
            rich_content_hosts: csv_env("MELD_RICH_CONTENT_HOSTS"),
            text_fetch_limit: num_env("MELD_TEXT_FETCH_LIMIT", defaults.text_fetch_limit as f64)
                as usize,
            image_fetch_limit: num_env("MELD_IMAGE_FETCH_LIMIT", defaults.image_fetch_limit as f64)
                as usize,
        };
        policy.sanitize();
        policy
    }

    /// Clamp every numeric setting into its valid range. Invalid values
    /// revert to the default and log a warning; this never fails.
    pub fn sanitize(&mut self) {
        let defaults = Self::default();

        clamp_open_unit(
            &mut self.penalty_damping,
            defaults.penalty_damping,
            "penalty_damping",
        );
        if !(self.rrf_k > 0.0) || !self.rrf_k.is_finite() {
            tracing::warn!(value = self.rrf_k, "rrf_k out of range, using default");
            self.rrf_k = defaults.rrf_k;
        }
        if !(self.bm25_k1 >= 0.0) || !self.bm25_k1.is_finite() {
            tracing::warn!(value = self.bm25_k1, "bm25_k1 out of range, using default");
            self.bm25_k1 = defaults.bm25_k1;
        }
        if !(0.0..=1.0).contains(&self.bm25_b) {
            tracing::warn!(value = self.bm25_b, "bm25_b out of range, using default");
            self.bm25_b = defaults.bm25_b;
        }
        if !(self.jaccard_threshold > 0.0 && self.jaccard_threshold <= 1.0) {
            tracing::warn!(
                value = self.jaccard_threshold,
                "jaccard_threshold out of range, using default"
            );
            self.jaccard_threshold = defaults.jaccard_threshold;
        }
        if !self.url_token_bonus.is_finite() {
            self.url_token_bonus = defaults.url_token_bonus;
        }
        if !self.title_penalty.is_finite() {
            self.title_penalty = defaults.title_penalty;
        }
        if self.text_fetch_limit == 0 || self.text_fetch_limit > 100 {
            tracing::warn!(
                value = self.text_fetch_limit,
                "text_fetch_limit out of range, using default"
            );
            self.text_fetch_limit = defaults.text_fetch_limit;
        }
        if self.image_fetch_limit == 0 || self.image_fetch_limit > 200 {
            tracing::warn!(
                value = self.image_fetch_limit,
                "image_fetch_limit out of range, using default"
            );
            self.image_fetch_limit = defaults.image_fetch_limit;
        }
    }
}

/// Clamp a damping-style parameter to the open interval (0, 1).
fn clamp_open_unit(value: &mut f64, default: f64, name: &str) {
    if !(*value > 0.0 && *value < 1.0) {
        tracing::warn!(value = *value, name, "value outside (0,1), using default");
        *value = default;
    }
}

/// Settings for the summarizer collaborator.
#[derive(Debug, Clone)]
pub struct SummarizerConfig {
    /// API key. `None` disables summarization; callers then always get
    /// the ranked listing.
    pub api_key: Option<String>,
    /// Endpoint base override (reverse-proxy support). Defaults to the
    /// public generative-language endpoint.
    pub base_url: Option<String>,
    /// Model name used in the request path.
    pub model: String,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: None,
            model: "gemini-2.0-flash".into(),
            timeout_seconds: 60,
        }
    }
}

/// How a request is executed: providers, limits, timeouts, endpoints.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Text providers to fan out to, in registration order.
    pub providers: Vec<Provider>,
    /// Maximum hits in the final response, clamped to `1..=30`.
    pub max_results: usize,
    /// Per-provider HTTP timeout in seconds. Each adapter owns its own
    /// deadline; the coordinator does not impose one on top.
    pub timeout_seconds: u64,
    /// Optional overall fan-out deadline in milliseconds. When it expires,
    /// still-pending providers are cancelled and the response is assembled
    /// from whatever already completed.
    pub deadline_ms: Option<u64>,
    /// DuckDuckGo endpoint override (reverse-proxy support).
    pub ddg_base_url: Option<String>,
    /// Bing endpoint override.
    pub bing_base_url: Option<String>,
    /// SerpApi endpoint override.
    pub serpapi_base_url: Option<String>,
    /// SerpApi keys, rotated round-robin across requests.
    pub serpapi_keys: Vec<String>,
    /// Custom User-Agent. `None` rotates through a built-in browser list.
    pub user_agent: Option<String>,
    /// Whether to deep-fetch content for the top hit after dedup.
    pub enhance: bool,
    /// Summarizer collaborator settings.
    pub summarizer: SummarizerConfig,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            providers: Provider::text_providers().to_vec(),
            max_results: 10,
            timeout_seconds: 8,
            deadline_ms: None,
            ddg_base_url: None,
            bing_base_url: None,
            serpapi_base_url: None,
            serpapi_keys: Vec::new(),
            user_agent: None,
            enhance: false,
            summarizer: SummarizerConfig::default(),
        }
    }
}

impl SearchConfig {
    /// Load orchestration settings from `MELD_*` environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let mut config = Self {
            providers: defaults.providers.clone(),
            max_results: num_env("MELD_MAX_RESULTS", defaults.max_results as f64) as usize,
            timeout_seconds: num_env("MELD_TIMEOUT_SECONDS", defaults.timeout_seconds as f64)
                as u64,
            deadline_ms: env_str("MELD_DEADLINE_MS").and_then(|v| v.parse().ok()),
            ddg_base_url: env_str("MELD_DDG_BASE_URL"),
            bing_base_url: env_str("MELD_BING_BASE_URL"),
            serpapi_base_url: env_str("MELD_SERPAPI_BASE_URL"),
            serpapi_keys: csv_env("MELD_SERPAPI_KEYS"),
            user_agent: env_str("MELD_USER_AGENT"),
            enhance: env_str("MELD_ENHANCE").as_deref() == Some("1"),
            summarizer: SummarizerConfig {
                api_key: env_str("MELD_SUMMARIZER_API_KEY"),
                base_url: env_str("MELD_SUMMARIZER_BASE_URL"),
                ..SummarizerConfig::default()
            },
        };
        config.sanitize();
        config
    }

    /// Clamp numeric settings into range. Never fails.
    pub fn sanitize(&mut self) {
        if self.max_results == 0 {
            tracing::warn!("max_results of 0 clamped to 1");
            self.max_results = 1;
        }
        if self.max_results > MAX_RESULT_LIMIT {
            tracing::warn!(
                value = self.max_results,
                "max_results clamped to {MAX_RESULT_LIMIT}"
            );
            self.max_results = MAX_RESULT_LIMIT;
        }
        if self.timeout_seconds == 0 {
            tracing::warn!("timeout_seconds of 0 clamped to default");
            self.timeout_seconds = Self::default().timeout_seconds;
        }
    }

    /// Reject structurally unusable configurations. Numeric range issues
    /// never reach this point; they are clamped in [`Self::sanitize`].
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.providers.is_empty() {
            return Err(SearchError::Config(
                "at least one provider must be enabled".into(),
            ));
        }
        Ok(())
    }
}

/// Read an environment variable as a trimmed non-empty string.
fn env_str(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Read a comma-separated environment variable into trimmed entries.
fn csv_env(key: &str) -> Vec<String> {
    env_str(key)
        .map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

/// Read a numeric environment variable, falling back on parse failure.
fn num_env(key: &str, default: f64) -> f64 {
    match env_str(key) {
        Some(raw) => match raw.parse::<f64>() {
            Ok(v) => v,
            Err(_) => {
                tracing::warn!(key, raw = %raw, "unparseable numeric setting, using default");
                default
            }
        },
        None => default,
    }
}
