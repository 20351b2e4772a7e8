//! AI summarization over the ranked result set.
//!
//! Calls a generative-language `generateContent` endpoint and returns a
//! structured [`Summary`]. Success and failure are distinct shapes —
//! callers never inspect message text to decide whether summarization
//! worked. Retriable failures (timeout, 5xx) are retried exactly once
//! before the caller falls back to the ranked listing.

use serde::{Deserialize, Serialize};

use crate::config::SummarizerConfig;
use crate::error::{Result, SearchError};
use crate::types::SearchHit;

/// Default endpoint when no reverse-proxy override is configured.
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// How many top hits feed the summarizer prompt.
const CONTEXT_HITS: usize = 8;

/// A successful synthesis of the search results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Summary {
    /// The synthesized answer text.
    pub text: String,
    /// The hits the summary was built from, numbered from 1.
    pub sources: Vec<SummarySource>,
}

/// One source reference attached to a summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummarySource {
    /// 1-based position in the context handed to the model.
    pub id: usize,
    /// Source title.
    pub title: String,
    /// Source URL.
    pub url: String,
}

/// Summarize the given hits, retrying once on a retriable failure.
///
/// # Errors
///
/// [`SearchError::Summarizer`] for every failure class: missing key,
/// empty context, HTTP errors (after the single retry for timeout/5xx),
/// or an unexpected response shape.
pub async fn summarize(
    query: &str,
    hits: &[SearchHit],
    config: &SummarizerConfig,
) -> Result<Summary> {
    let Some(api_key) = config.api_key.as_deref() else {
        return Err(SearchError::Summarizer("no API key configured".into()));
    };

    let (context, sources) = build_context(hits);
    if context.is_empty() {
        return Err(SearchError::Summarizer(
            "no hits with usable title and snippet".into(),
        ));
    }

    match call_model(query, &context, api_key, config).await {
        Ok(text) => Ok(Summary { text, sources }),
        Err(failure) if failure.retriable => {
            tracing::warn!(error = %failure.message, "summarizer failed, retrying once");
            match call_model(query, &context, api_key, config).await {
                Ok(text) => Ok(Summary { text, sources }),
                Err(failure) => Err(SearchError::Summarizer(format!(
                    "{} (after retry)",
                    failure.message
                ))),
            }
        }
        Err(failure) => Err(SearchError::Summarizer(failure.message)),
    }
}

/// Internal failure with a retriability classification.
struct CallFailure {
    message: String,
    retriable: bool,
}

/// Build the numbered source context and the matching source list.
fn build_context(hits: &[SearchHit]) -> (String, Vec<SummarySource>) {
    let mut context = String::new();
    let mut sources = Vec::new();
    for hit in hits.iter().take(CONTEXT_HITS) {
        let title = collapse_whitespace(&hit.title);
        let snippet = collapse_whitespace(hit.snippet());
        if title.is_empty() || snippet.is_empty() {
            continue;
        }
        let id = sources.len() + 1;
        context.push_str(&format!(
            "Source [{id}]:\nTitle: {title}\nSnippet: {snippet}\n\n"
        ));
        sources.push(SummarySource {
            id,
            title,
            url: hit.raw_key().to_string(),
        });
    }
    (context, sources)
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// One model call. Classifies timeouts and 5xx responses as retriable.
async fn call_model(
    query: &str,
    context: &str,
    api_key: &str,
    config: &SummarizerConfig,
) -> std::result::Result<String, CallFailure> {
    let base = config.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
    let url = format!(
        "{}/v1beta/models/{}:generateContent",
        base.trim_end_matches('/'),
        config.model
    );

    let prompt = format!(
        "Fuse the provided sources into one direct, detailed answer. \
         Do not add a preamble.\n\n\
         USER'S QUERY: \"{query}\"\n\n\
         --- SOURCES ---\n{context}--- END OF SOURCES ---\n\n\
         SYNTHESIZED SUMMARY:"
    );

    let payload = serde_json::json!({
        "contents": [{ "parts": [{ "text": prompt }] }],
        "generationConfig": { "temperature": 0.5, "maxOutputTokens": 8192 },
    });

    let client = crate::http::build_client(config.timeout_seconds, None).map_err(|e| {
        CallFailure {
            message: e.to_string(),
            retriable: false,
        }
    })?;

    let response = client
        .post(&url)
        .query(&[("key", api_key)])
        .json(&payload)
        .send()
        .await
        .map_err(|e| CallFailure {
            message: format!("request failed: {e}"),
            retriable: e.is_timeout(),
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(CallFailure {
            message: format!("HTTP {status}"),
            retriable: status.is_server_error(),
        });
    }

    let body: GenerateContentResponse = response.json().await.map_err(|e| CallFailure {
        message: format!("response decode failed: {e}"),
        retriable: false,
    })?;

    extract_text(body).ok_or_else(|| CallFailure {
        message: "unexpected response shape".into(),
        retriable: false,
    })
}

/// Pull the first candidate's text out of the response, if present.
fn extract_text(body: GenerateContentResponse) -> Option<String> {
    let text = body
        .candidates?
        .into_iter()
        .next()?
        .content?
        .parts?
        .into_iter()
        .next()?
        .text?;
    let trimmed = text.trim().to_string();
    (!trimmed.is_empty()).then_some(trimmed)
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    parts: Option<Vec<CandidatePart>>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}
