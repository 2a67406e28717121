//! Mailgun HTTP client.

use std::time::Duration;

use reqwest::{Client, Url};

use crate::error::OutreachError;

const DEFAULT_BASE_URL: &str = "https://api.mailgun.net/";

/// Client for the Mailgun messages API.
///
/// Use [`Mailer::new`] for production or [`Mailer::with_base_url`] to point at
/// a mock server in tests.
#[derive(Clone, Debug)]
pub struct Mailer {
    client: Client,
    api_key: String,
    domain: String,
    base_url: Url,
}

impl Mailer {
    /// Creates a new client pointed at the production Mailgun API.
    ///
    /// # Errors
    ///
    /// Returns [`OutreachError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: &str, domain: &str, timeout_secs: u64) -> Result<Self, OutreachError> {
        Self::with_base_url(api_key, domain, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a new client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`OutreachError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`OutreachError::InvalidBaseUrl`] if
    /// `base_url` does not parse.
    pub fn with_base_url(
        api_key: &str,
        domain: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, OutreachError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| OutreachError::InvalidBaseUrl {
            base_url: normalised.clone(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            domain: domain.to_owned(),
            base_url,
        })
    }

    /// Sends a plain-text email through Mailgun.
    ///
    /// # Errors
    ///
    /// Returns [`OutreachError::Http`] on transport failure or
    /// [`OutreachError::Rejected`] when Mailgun answers with a non-success
    /// status.
    pub async fn send(
        &self,
        from: &str,
        to: &str,
        subject: &str,
        text: &str,
    ) -> Result<(), OutreachError> {
        let mut url = self.base_url.clone();
        url.set_path(&format!("v3/{}/messages", self.domain));

        let form = [
            ("from", from),
            ("to", to),
            ("subject", subject),
            ("text", text),
        ];

        let response = self
            .client
            .post(url)
            .basic_auth("api", Some(&self.api_key))
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OutreachError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        tracing::debug!(to, subject, "email accepted by Mailgun");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_mailer(base_url: &str) -> Mailer {
        Mailer::with_base_url("test-key", "mg.example.com", 30, base_url)
            .expect("client construction should not fail")
    }

    #[tokio::test]
    async fn send_posts_form_to_domain_messages_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v3/mg.example.com/messages"))
            .and(header_exists("authorization"))
            .and(body_string_contains("to=jdoe%40gmail.com"))
            .and(body_string_contains("subject=Partnership"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "<msg@mg.example.com>",
                "message": "Queued. Thank you."
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mailer = test_mailer(&server.uri());
        mailer
            .send("sales@example.com", "jdoe@gmail.com", "Partnership", "Hi")
            .await
            .expect("send should succeed");
    }

    #[tokio::test]
    async fn non_success_status_maps_to_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v3/mg.example.com/messages"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Forbidden"))
            .mount(&server)
            .await;

        let mailer = test_mailer(&server.uri());
        let err = mailer
            .send("sales@example.com", "jdoe@gmail.com", "Hello", "Hi")
            .await
            .expect_err("send should fail");

        match err {
            OutreachError::Rejected { status, body } => {
                assert_eq!(status, 401);
                assert_eq!(body, "Forbidden");
            }
            other => panic!("expected Rejected, got {other:?}"),
        }
    }

    #[test]
    fn invalid_base_url_is_rejected_at_construction() {
        let err = Mailer::with_base_url("k", "d", 30, "not a url")
            .expect_err("construction should fail");
        assert!(matches!(err, OutreachError::InvalidBaseUrl { .. }));
    }
}
