//! HTTP client for the Gemini `generateContent` endpoint.

use std::time::Duration;

use reqwest::{Client, Url};
use serde::Deserialize;
use serde_json::json;

use crate::error::LlmError;
use crate::sanitize::sanitize_query;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/";
const MODEL: &str = "gemini-2.0-flash";

/// Client for the Gemini REST API.
///
/// Use [`GeminiClient::new`] for production or [`GeminiClient::with_base_url`]
/// to point at a mock server in tests.
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: Url,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GeminiClient {
    /// Creates a new client pointed at the production Gemini API.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::Http`] if the underlying `reqwest::Client` cannot
    /// be constructed.
    pub fn new(api_key: &str, timeout_secs: u64) -> Result<Self, LlmError> {
        Self::with_base_url(api_key, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a new client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::Http`] if the underlying `reqwest::Client` cannot
    /// be constructed, or [`LlmError::InvalidBaseUrl`] if `base_url` does not
    /// parse.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| LlmError::InvalidBaseUrl {
            base_url: normalised.clone(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url,
        })
    }

    /// Sends a single-turn prompt and returns the first candidate's text.
    ///
    /// # Errors
    ///
    /// - [`LlmError::ApiError`] on a non-2xx response.
    /// - [`LlmError::Http`] on network failure.
    /// - [`LlmError::Deserialize`] if the envelope does not parse.
    /// - [`LlmError::EmptyResponse`] if no candidate carries text.
    pub async fn generate(&self, prompt: &str, temperature: f32) -> Result<String, LlmError> {
        let url = self.generate_url();
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": { "temperature": temperature },
        });

        let response = self.client.post(url.clone()).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(LlmError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let raw = response.text().await?;
        let parsed: GenerateResponse =
            serde_json::from_str(&raw).map_err(|e| LlmError::Deserialize {
                context: format!("generateContent({MODEL})"),
                source: e,
            })?;

        parsed
            .candidates
            .into_iter()
            .filter_map(|c| c.content)
            .flat_map(|c| c.parts)
            .find_map(|p| p.text)
            .filter(|t| !t.trim().is_empty())
            .ok_or(LlmError::EmptyResponse)
    }

    /// Turns a product description into an influencer search query.
    ///
    /// Uses the marketer prompt at temperature 0 and sanitizes the completion
    /// into plain keywords — hashtags, quoting, and code fences stripped, the
    /// first non-empty line kept.
    ///
    /// # Errors
    ///
    /// Propagates [`Self::generate`] errors, plus [`LlmError::EmptyQuery`] if
    /// sanitization leaves nothing usable.
    pub async fn search_query_from_product(&self, description: &str) -> Result<String, LlmError> {
        let prompt = format!(
            "You are a world-class marketer. Given the following product description, \
             generate a single search query that we can look for influencers on social media. \
             We want to look for influencers that are using products from the same market but \
             not using our products yet, so output a query that leads to a potential market we \
             can expand in. Don't include hashtags, logical operators or special characters. \
             Just output a short search query in text, it should be simple keywords. \
             Product description: {description}"
        );

        let completion = self.generate(&prompt, 0.0).await?;
        let query = sanitize_query(&completion);
        if query.is_empty() {
            tracing::warn!(completion, "LLM completion sanitized to empty query");
            return Err(LlmError::EmptyQuery);
        }
        Ok(query)
    }

    fn generate_url(&self) -> Url {
        let mut url = self.base_url.clone();
        url.set_path(&format!("v1beta/models/{MODEL}:generateContent"));
        url.query_pairs_mut().append_pair("key", &self.api_key);
        url
    }
}
