//! TikTok scrape feed for LeadFetch.
//!
//! Wraps the Apify actor API behind a typed client, normalizes the raw
//! `authorMeta` profile shape into [`leadfetch_core::NormalizedLead`] at the
//! ingestion boundary, and upserts batches into the lead store with per-item
//! isolation.

mod client;
mod error;
mod ingest;
mod normalize;
mod types;

pub use client::ApifyClient;
pub use error::ScraperError;
pub use ingest::{ingest, IngestReport};
pub use normalize::{normalize_profile, top_by_fans};
pub use types::{AuthorMeta, PostMetrics, RawProfile};
