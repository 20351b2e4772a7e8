//! Error taxonomy for the meld-search crate.
//!
//! Every failure mode degrades to a smaller but still-valid response
//! wherever possible; the variants here are the ones that remain visible
//! to callers. Messages are stable strings with no secrets in them.

/// Errors that can surface from search, fusion, and assembly operations.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// Every provider failed or returned nothing usable. Distinct from an
    /// exception so the transport layer can map it to an empty/404-style
    /// response.
    #[error("no usable results from any provider")]
    NoResults,

    /// An HTTP request failed (provider, page fetch, or summarizer).
    #[error("HTTP error: {0}")]
    Http(String),

    /// A provider or page response could not be parsed.
    #[error("parse error: {0}")]
    Parse(String),

    /// Structurally unusable configuration (no providers, zero limit).
    /// Out-of-range numeric settings never produce this — they are
    /// clamped at load time instead.
    #[error("config error: {0}")]
    Config(String),

    /// The summarizer returned a failure shape, an HTTP error, or an
    /// unexpected body. Callers fall back to the ranked listing.
    #[error("summarizer error: {0}")]
    Summarizer(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SearchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_no_results() {
        assert_eq!(
            SearchError::NoResults.to_string(),
            "no usable results from any provider"
        );
    }

    #[test]
    fn display_http() {
        let err = SearchError::Http("connection refused".into());
        assert_eq!(err.to_string(), "HTTP error: connection refused");
    }

    #[test]
    fn display_parse() {
        let err = SearchError::Parse("unexpected markup".into());
        assert_eq!(err.to_string(), "parse error: unexpected markup");
    }

    #[test]
    fn display_config() {
        let err = SearchError::Config("at least one provider must be enabled".into());
        assert!(err.to_string().starts_with("config error"));
    }

    #[test]
    fn display_summarizer() {
        let err = SearchError::Summarizer("HTTP 503 after retry".into());
        assert_eq!(err.to_string(), "summarizer error: HTTP 503 after retry");
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SearchError>();
    }
}
