//! Raw Apify item shapes.
//!
//! The feed is heterogeneous: items are videos with a nested `authorMeta`
//! block describing the posting account. Only the fields the normalizer reads
//! are modeled; everything else is ignored.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// One raw item from the TikTok search actor's dataset.
#[derive(Debug, Clone, Deserialize)]
pub struct RawProfile {
    #[serde(rename = "authorMeta")]
    pub author_meta: Option<AuthorMeta>,
}

/// The `authorMeta` substructure of a raw item.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthorMeta {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub fans: Option<i64>,
    #[serde(default)]
    pub hearts: Option<i64>,
    // The feed has used both spellings across actor versions.
    #[serde(default, alias = "videos")]
    pub video: Option<i64>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Performance counters scraped back for a single contract post.
#[derive(Debug, Clone, Deserialize)]
pub struct PostMetrics {
    #[serde(rename = "createTimeISO")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "shareCount")]
    pub shares: Option<i64>,
    #[serde(rename = "playCount")]
    pub plays: Option<i64>,
    #[serde(rename = "commentCount")]
    pub comments: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_profile_parses_author_meta() {
        let json = r#"{"authorMeta": {"name": "jdoe", "fans": 150000, "hearts": 9000, "video": 42}, "text": "ignored"}"#;
        let profile: RawProfile = serde_json::from_str(json).expect("parse");
        let meta = profile.author_meta.expect("authorMeta present");
        assert_eq!(meta.name.as_deref(), Some("jdoe"));
        assert_eq!(meta.fans, Some(150_000));
        assert_eq!(meta.video, Some(42));
    }

    #[test]
    fn raw_profile_accepts_videos_alias() {
        let json = r#"{"authorMeta": {"name": "jdoe", "videos": 7}}"#;
        let profile: RawProfile = serde_json::from_str(json).expect("parse");
        assert_eq!(profile.author_meta.unwrap().video, Some(7));
    }

    #[test]
    fn raw_profile_tolerates_missing_author_meta() {
        let profile: RawProfile = serde_json::from_str(r#"{"text": "an ad"}"#).expect("parse");
        assert!(profile.author_meta.is_none());
    }

    #[test]
    fn post_metrics_parses_apify_field_names() {
        let json = r#"{"createTimeISO": "2025-03-20T09:15:00Z", "shareCount": 12, "playCount": 3400, "commentCount": 56}"#;
        let metrics: PostMetrics = serde_json::from_str(json).expect("parse");
        assert_eq!(metrics.shares, Some(12));
        assert_eq!(metrics.plays, Some(3400));
        assert_eq!(metrics.comments, Some(56));
        assert!(metrics.created_at.is_some());
    }
}
