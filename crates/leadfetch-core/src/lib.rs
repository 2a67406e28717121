use serde::{Deserialize, Serialize};
use thiserror::Error;

mod app_config;
mod config;
pub mod stage;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use stage::LeadStage;

/// A scraped profile after normalization: fixed shape, validated once at the
/// ingestion boundary. This is the only type the lead store accepts for
/// writes from the scrape feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedLead {
    pub platform: String,
    pub profile_name: String,
    pub fans: Option<i64>,
    pub hearts: Option<i64>,
    pub videos: Option<i64>,
    /// May be synthesized as `{profile_name}@gmail.com` when the feed carries
    /// no address; see the normalizer.
    pub email: Option<String>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
