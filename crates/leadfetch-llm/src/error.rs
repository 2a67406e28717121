use thiserror::Error;

/// Errors returned by the Gemini API client.
#[derive(Debug, Error)]
pub enum LlmError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API returned a non-2xx status with a message body.
    #[error("Gemini API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    /// The response body could not be deserialized into the expected shape.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The response parsed but carried no usable candidate text.
    #[error("Gemini returned no candidate text")]
    EmptyResponse,

    /// The sanitized completion collapsed to nothing.
    #[error("generated query was empty after sanitization")]
    EmptyQuery,

    #[error("invalid base URL \"{base_url}\": {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },
}
