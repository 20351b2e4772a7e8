//! Concurrent provider fan-out and best-effort fan-in.
//!
//! All adapter calls for a request are issued together. A failing call is
//! logged and excluded without cancelling its siblings; an empty list is
//! a success. Without a deadline the coordinator waits for every call
//! (overall latency is bounded by the slowest provider — per-call
//! timeouts belong to the adapters). With a deadline, calls still pending
//! at expiry are cancelled by drop and the batches that already completed
//! are returned.

use std::future::Future;
use std::time::Duration;

use futures::stream::{FuturesUnordered, StreamExt};

use crate::error::SearchError;
use crate::types::{Provider, ProviderBatch, SearchHit};

/// Drive all provider calls concurrently and collect the successful
/// batches in the callers' registration order.
pub async fn fan_out<F>(
    calls: Vec<(Provider, F)>,
    deadline: Option<Duration>,
) -> Vec<ProviderBatch>
where
    F: Future<Output = Result<Vec<SearchHit>, SearchError>>,
{
    let total = calls.len();
    let mut slots: Vec<Option<ProviderBatch>> = (0..total).map(|_| None).collect();

    let mut pending: FuturesUnordered<_> = calls
        .into_iter()
        .enumerate()
        .map(|(index, (provider, call))| async move { (index, provider, call.await) })
        .collect();

    match deadline {
        None => {
            while let Some((index, provider, outcome)) = pending.next().await {
                store(&mut slots, index, provider, outcome);
            }
        }
        Some(limit) => {
            let expiry = tokio::time::sleep(limit);
            tokio::pin!(expiry);
            loop {
                tokio::select! {
                    next = pending.next() => match next {
                        Some((index, provider, outcome)) => {
                            store(&mut slots, index, provider, outcome);
                        }
                        None => break,
                    },
                    () = &mut expiry => {
                        tracing::warn!(
                            outstanding = pending.len(),
                            "fan-out deadline expired, assembling from completed providers"
                        );
                        break;
                    }
                }
            }
        }
    }

    // Registration order, not completion order: the fusion tie-break and
    // interleaving depend on it.
    slots.into_iter().flatten().collect()
}

fn store(
    slots: &mut [Option<ProviderBatch>],
    index: usize,
    provider: Provider,
    outcome: Result<Vec<SearchHit>, SearchError>,
) {
    match outcome {
        Ok(hits) => {
            tracing::debug!(provider = %provider, count = hits.len(), "provider returned");
            slots[index] = Some(ProviderBatch::new(provider, hits));
        }
        Err(err) => {
            tracing::warn!(provider = %provider, error = %err, "provider failed, excluded");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SearchHit;
    use futures::future::{BoxFuture, FutureExt};

    type Call = (Provider, BoxFuture<'static, Result<Vec<SearchHit>, SearchError>>);

    fn hit(provider: Provider, rank: usize, link: &str) -> SearchHit {
        SearchHit::text(provider, rank, format!("hit {rank}"), link, "snippet")
    }

    #[tokio::test]
    async fn collects_all_successful_batches_in_registration_order() {
        let calls: Vec<Call> = vec![
            (
                Provider::DuckDuckGo,
                async {
                    // Finishes second but must still come first.
                    tokio::time::sleep(Duration::from_millis(30)).await;
                    Ok(vec![hit(Provider::DuckDuckGo, 0, "https://d.com")])
                }
                .boxed(),
            ),
            (
                Provider::Bing,
                async { Ok(vec![hit(Provider::Bing, 0, "https://b.com")]) }.boxed(),
            ),
        ];
        let batches = fan_out(calls, None).await;
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].provider, Provider::DuckDuckGo);
        assert_eq!(batches[1].provider, Provider::Bing);
    }

    #[tokio::test]
    async fn failed_provider_excluded_without_cancelling_siblings() {
        let calls: Vec<Call> = vec![
            (
                Provider::DuckDuckGo,
                async { Err(SearchError::Http("connection refused".into())) }.boxed(),
            ),
            (
                Provider::Bing,
                async { Ok(vec![hit(Provider::Bing, 0, "https://b.com")]) }.boxed(),
            ),
        ];
        let batches = fan_out(calls, None).await;
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].provider, Provider::Bing);
    }

    #[tokio::test]
    async fn empty_list_is_success_not_failure() {
        let calls: Vec<Call> = vec![(Provider::DuckDuckGo, async { Ok(vec![]) }.boxed())];
        let batches = fan_out(calls, None).await;
        assert_eq!(batches.len(), 1);
        assert!(batches[0].hits.is_empty());
    }

    #[tokio::test]
    async fn all_failed_yields_no_batches() {
        let calls: Vec<Call> = vec![
            (
                Provider::DuckDuckGo,
                async { Err(SearchError::Http("down".into())) }.boxed(),
            ),
            (
                Provider::Bing,
                async { Err(SearchError::Parse("blocked".into())) }.boxed(),
            ),
        ];
        let batches = fan_out(calls, None).await;
        assert!(batches.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_returns_best_effort_from_completed() {
        let calls: Vec<Call> = vec![
            (
                Provider::DuckDuckGo,
                async { Ok(vec![hit(Provider::DuckDuckGo, 0, "https://fast.com")]) }.boxed(),
            ),
            (
                Provider::Bing,
                async {
                    // Hangs far past the deadline.
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Ok(vec![hit(Provider::Bing, 0, "https://slow.com")])
                }
                .boxed(),
            ),
        ];
        let batches = fan_out(calls, Some(Duration::from_millis(200))).await;
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].provider, Provider::DuckDuckGo);
    }

    #[tokio::test]
    async fn no_calls_returns_no_batches() {
        let calls: Vec<Call> = vec![];
        let batches = fan_out(calls, None).await;
        assert!(batches.is_empty());
    }
}
