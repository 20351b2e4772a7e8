//! The fusion pipeline: fan-out, filter, fuse, dedup, enhance, assemble.
//!
//! Data flows strictly left to right; no stage re-enters an earlier one,
//! and each stage owns its output outright:
//!
//! ```text
//! adapters → fan_out → validate/policy → fuse → dedup → enhance → assemble
//! ```

pub mod assemble;
pub mod dedup;
pub mod enhance;
pub mod fanout;
pub mod fusion;
pub mod normalize;
pub mod policy;
pub mod tokenize;

use crate::config::PolicyConfig;
use crate::types::{ProviderBatch, SearchHit};

/// Fuse raw provider batches into one ordered, deduplicated,
/// policy-filtered list.
///
/// This is the pure core of the crate: no I/O, deterministic for a given
/// input. Batches must be in provider-registration order — the fusion
/// tie-break and interleaving order follow it.
pub fn fuse(batches: Vec<ProviderBatch>, policy: &PolicyConfig, query: &str) -> Vec<SearchHit> {
    let batches = normalize::validate_batches(batches);
    let batches = policy::filter_batches(batches, policy, query);
    let ranked = fusion::fuse_batches(batches, policy, query);
    dedup::dedup_cascade(ranked, policy)
}
