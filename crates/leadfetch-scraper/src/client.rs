//! HTTP client for the Apify actor API.
//!
//! Runs the `clockworks/free-tiktok-scraper` actor synchronously via the
//! `run-sync-get-dataset-items` endpoint, which blocks until the run finishes
//! and returns the dataset items directly.

use std::time::Duration;

use reqwest::{Client, Url};
use serde_json::json;

use crate::error::ScraperError;
use crate::types::{PostMetrics, RawProfile};

const DEFAULT_BASE_URL: &str = "https://api.apify.com/";
const TIKTOK_ACTOR_ID: &str = "clockworks~free-tiktok-scraper";

/// Client for the Apify actor API.
///
/// Use [`ApifyClient::new`] for production or [`ApifyClient::with_base_url`]
/// to point at a mock server in tests.
#[derive(Clone)]
pub struct ApifyClient {
    client: Client,
    api_token: String,
    base_url: Url,
    results_per_page: u32,
}

impl ApifyClient {
    /// Creates a new client pointed at the production Apify API.
    ///
    /// `timeout_secs` bounds the whole synchronous actor run, so it should be
    /// generous; scrape runs routinely take tens of seconds.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        api_token: &str,
        timeout_secs: u64,
        user_agent: &str,
        results_per_page: u32,
    ) -> Result<Self, ScraperError> {
        Self::with_base_url(api_token, timeout_secs, user_agent, results_per_page, DEFAULT_BASE_URL)
    }

    /// Creates a new client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`ScraperError::InvalidBaseUrl`] if `base_url`
    /// does not parse.
    pub fn with_base_url(
        api_token: &str,
        timeout_secs: u64,
        user_agent: &str,
        results_per_page: u32,
        base_url: &str,
    ) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent.to_owned())
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url =
            Url::parse(&normalised).map_err(|e| ScraperError::InvalidBaseUrl {
                base_url: normalised.clone(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            api_token: api_token.to_owned(),
            base_url,
            results_per_page,
        })
    }

    /// Searches TikTok for profiles posting about `query`.
    ///
    /// Runs the scraper actor with the `/video` search section and media
    /// downloads disabled, and returns the raw dataset items.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::ApiError`] on a non-2xx response from Apify.
    /// - [`ScraperError::Http`] on network failure.
    /// - [`ScraperError::Deserialize`] if the dataset items do not parse.
    pub async fn search_profiles(&self, query: &str) -> Result<Vec<RawProfile>, ScraperError> {
        let input = json!({
            "excludePinnedPosts": false,
            "resultsPerPage": self.results_per_page,
            "searchQueries": [query],
            "searchSection": "/video",
            "shouldDownloadCovers": false,
            "shouldDownloadSlideshowImages": false,
            "shouldDownloadSubtitles": false,
            "shouldDownloadVideos": false,
        });

        tracing::info!(query, "running TikTok search actor");
        let body = self.run_actor_sync(&input).await?;

        serde_json::from_value(body).map_err(|e| ScraperError::Deserialize {
            context: format!("search_profiles(query={query})"),
            source: e,
        })
    }

    /// Scrapes performance counters for a single posted video URL.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::EmptyDataset`] if the actor returns no items for the URL.
    /// - [`ScraperError::ApiError`], [`ScraperError::Http`], or
    ///   [`ScraperError::Deserialize`] as for [`Self::search_profiles`].
    pub async fn scrape_post_metrics(&self, post_url: &str) -> Result<PostMetrics, ScraperError> {
        let input = json!({
            "excludePinnedPosts": false,
            "postURLs": [post_url],
            "resultsPerPage": self.results_per_page,
            "searchSection": "/video",
            "shouldDownloadCovers": false,
            "shouldDownloadSlideshowImages": false,
            "shouldDownloadSubtitles": false,
            "shouldDownloadVideos": false,
        });

        tracing::info!(post_url, "scraping contract post metrics");
        let body = self.run_actor_sync(&input).await?;

        let mut items: Vec<PostMetrics> =
            serde_json::from_value(body).map_err(|e| ScraperError::Deserialize {
                context: format!("scrape_post_metrics(url={post_url})"),
                source: e,
            })?;

        if items.is_empty() {
            return Err(ScraperError::EmptyDataset {
                url: post_url.to_owned(),
            });
        }
        Ok(items.swap_remove(0))
    }

    /// Runs the actor synchronously and returns the dataset items as JSON.
    async fn run_actor_sync(
        &self,
        input: &serde_json::Value,
    ) -> Result<serde_json::Value, ScraperError> {
        let url = self.run_sync_url();
        let response = self.client.post(url.clone()).json(input).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ScraperError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| ScraperError::Deserialize {
            context: url.to_string(),
            source: e,
        })
    }

    /// Builds the `run-sync-get-dataset-items` URL with the token appended as
    /// a percent-encoded query parameter.
    fn run_sync_url(&self) -> Url {
        let mut url = self.base_url.clone();
        url.set_path(&format!(
            "v2/acts/{TIKTOK_ACTOR_ID}/run-sync-get-dataset-items"
        ));
        url.query_pairs_mut().append_pair("token", &self.api_token);
        url
    }
}
