//! Fusion strategies: merge per-provider lists into one global order.
//!
//! Three interchangeable strategies, selected by configuration:
//!
//! - [`rank_fusion`] — reciprocal rank fusion over provider positions
//!   (k=60 per Cormack et al., 2009). Cross-provider agreement
//!   accumulates, which is the mechanism that lifts results several
//!   backends agree on.
//! - [`relevance`] — BM25 over a per-request corpus built from titles
//!   and snippets. Statistics are recomputed from scratch each query;
//!   the candidate set is small and a persistent index is out of scope.
//! - [`interleave`] — round-robin blending with no scoring signal.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::config::{FusionStrategy, PolicyConfig};
use crate::types::{ProviderBatch, SearchHit};

use super::normalize::canonical_url;
use super::tokenize::{doc_tokens, tokenize};

/// Merge filtered batches into one fully ordered list using the
/// configured strategy. Batches must be in provider-registration order;
/// that order is the tie-break and interleaving order.
pub fn fuse_batches(
    batches: Vec<ProviderBatch>,
    policy: &PolicyConfig,
    query: &str,
) -> Vec<SearchHit> {
    match policy.strategy {
        FusionStrategy::RankFusion => rank_fusion(batches, policy),
        FusionStrategy::Relevance => relevance(batches, policy, query),
        FusionStrategy::Interleave => interleave(batches),
    }
}

/// Reciprocal rank fusion.
///
/// Each appearance of an identity key at zero-based rank `r` contributes
/// `1 / (K + r + 1)`, damped by the penalty factor when the hit is
/// penalized. Appearances across providers accumulate on the first-seen
/// hit. Output is ordered by descending total; the stable sort leaves
/// ties in first-seen order.
pub fn rank_fusion(batches: Vec<ProviderBatch>, policy: &PolicyConfig) -> Vec<SearchHit> {
    let mut fused: Vec<SearchHit> = Vec::new();
    let mut index_by_key: HashMap<String, usize> = HashMap::new();

    for batch in batches {
        for hit in batch.hits {
            let key = canonical_url(hit.raw_key());
            let damping = if hit.penalized {
                policy.penalty_damping
            } else {
                1.0
            };
            let contribution = damping / (policy.rrf_k + hit.provider_rank as f64 + 1.0);

            match index_by_key.get(&key) {
                Some(&i) => {
                    fused[i].score += contribution;
                    // A penalized sighting taints the kept representative.
                    fused[i].penalized |= hit.penalized;
                }
                None => {
                    let mut kept = hit;
                    kept.score = contribution;
                    index_by_key.insert(key, fused.len());
                    fused.push(kept);
                }
            }
        }
    }

    sort_descending_stable(&mut fused);
    fused
}

/// BM25-style relevance scoring over the candidate set.
///
/// The document stream is the title (counted twice) plus the snippet.
/// Document frequency and average length are computed over exactly the
/// candidates of this request. Each distinct query token also found
/// verbatim in the hit's URL adds a small bonus; a title containing a
/// configured penalty keyword costs a fixed subtraction.
pub fn relevance(batches: Vec<ProviderBatch>, policy: &PolicyConfig, query: &str) -> Vec<SearchHit> {
    let mut hits: Vec<SearchHit> = batches.into_iter().flat_map(|b| b.hits).collect();
    if hits.is_empty() {
        return hits;
    }

    // Per-request corpus statistics.
    let docs: Vec<Vec<String>> = hits
        .iter()
        .map(|hit| doc_tokens(&hit.title, hit.snippet()))
        .collect();
    let n = docs.len() as f64;
    let avgdl = docs.iter().map(Vec::len).sum::<usize>() as f64 / n;

    let mut df: HashMap<&str, usize> = HashMap::new();
    for doc in &docs {
        let mut seen: Vec<&str> = Vec::new();
        for token in doc {
            if !seen.contains(&token.as_str()) {
                seen.push(token);
                *df.entry(token).or_insert(0) += 1;
            }
        }
    }

    let mut query_tokens = tokenize(query);
    query_tokens.sort();
    query_tokens.dedup();

    let scores: Vec<f64> = hits
        .iter()
        .zip(&docs)
        .map(|(hit, doc)| {
            let mut score = 0.0;
            let len = doc.len() as f64;
            for q in &query_tokens {
                let Some(&df_q) = df.get(q.as_str()) else {
                    continue;
                };
                let tf = doc.iter().filter(|t| *t == q).count() as f64;
                if tf == 0.0 {
                    continue;
                }
                let idf = (1.0 + (n - df_q as f64 + 0.5) / (df_q as f64 + 0.5)).ln();
                let denom = tf + policy.bm25_k1 * (1.0 - policy.bm25_b + policy.bm25_b * len / avgdl);
                score += idf * tf * (policy.bm25_k1 + 1.0) / denom;
            }

            let url_lc = hit.raw_key().to_lowercase();
            for q in &query_tokens {
                if url_lc.contains(q.as_str()) {
                    score += policy.url_token_bonus;
                }
            }

            let title_lc = hit.title.to_lowercase();
            if policy
                .title_blacklist
                .iter()
                .any(|kw| title_lc.contains(kw.as_str()))
            {
                score -= policy.title_penalty;
            }

            score
        })
        .collect();

    for (hit, score) in hits.iter_mut().zip(scores) {
        hit.score = score;
    }

    sort_descending_stable(&mut hits);
    hits
}

/// Round-robin interleave in provider-registration order: position 0 of
/// each provider, then position 1, skipping exhausted providers.
pub fn interleave(batches: Vec<ProviderBatch>) -> Vec<SearchHit> {
    let mut lists: Vec<std::vec::IntoIter<SearchHit>> =
        batches.into_iter().map(|b| b.hits.into_iter()).collect();
    let mut fused = Vec::new();
    loop {
        let mut yielded = false;
        for list in &mut lists {
            if let Some(hit) = list.next() {
                fused.push(hit);
                yielded = true;
            }
        }
        if !yielded {
            break;
        }
    }
    fused
}

/// Stable descending sort by score. Stability is what guarantees the
/// documented tie-break: equal scores keep their first-seen order.
fn sort_descending_stable(hits: &mut [SearchHit]) {
    hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
}
