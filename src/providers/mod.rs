//! Provider adapter implementations.
//!
//! Each module provides a struct implementing
//! [`crate::provider::ProviderAdapter`] that translates one backend's
//! HTML or JSON response into [`crate::types::SearchHit`] records.

pub mod bing;
pub mod duckduckgo;
pub mod serpapi;

pub use bing::BingAdapter;
pub use duckduckgo::DuckDuckGoAdapter;
pub use serpapi::SerpApiImagesAdapter;
