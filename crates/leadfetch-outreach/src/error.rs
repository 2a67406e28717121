//! Error types for the outreach crate.

use thiserror::Error;

/// Errors from email delivery or campaign bookkeeping.
#[derive(Debug, Error)]
pub enum OutreachError {
    /// Transport-level failure talking to Mailgun.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Mailgun answered with a non-success status.
    #[error("Mailgun rejected the message (status {status}): {body}")]
    Rejected { status: u16, body: String },

    /// A required credential is not configured.
    #[error("missing credential: {name}")]
    MissingCredential { name: &'static str },

    /// The configured base URL is not a valid URL.
    #[error("invalid base URL '{base_url}': {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },

    /// A database read or stage update failed.
    #[error("database error: {0}")]
    Db(#[from] leadfetch_db::DbError),
}
