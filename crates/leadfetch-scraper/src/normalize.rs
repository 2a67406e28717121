//! Normalization from raw Apify items to [`NormalizedLead`].
//!
//! Validation happens exactly once, here at the ingestion boundary; the rest
//! of the system only ever sees the fixed-shape struct.

use leadfetch_core::NormalizedLead;

use crate::error::ScraperError;
use crate::types::RawProfile;

const PLATFORM: &str = "tiktok";

/// Normalizes one raw feed item into a [`NormalizedLead`].
///
/// When the feed carries no address, `email` is synthesized as
/// `{profile_name}@gmail.com` — a documented placeholder, not a verified
/// contact.
///
/// # Errors
///
/// Returns [`ScraperError::MalformedProfile`] if the item has no `authorMeta`
/// block or the author name is absent/empty.
pub fn normalize_profile(profile: &RawProfile) -> Result<NormalizedLead, ScraperError> {
    let meta = profile
        .author_meta
        .as_ref()
        .ok_or_else(|| ScraperError::MalformedProfile {
            reason: "missing authorMeta".to_string(),
        })?;

    let profile_name = meta
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or_else(|| ScraperError::MalformedProfile {
            reason: "authorMeta.name is missing or empty".to_string(),
        })?
        .to_owned();

    let email = meta
        .email
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .map_or_else(|| format!("{profile_name}@gmail.com"), ToOwned::to_owned);

    Ok(NormalizedLead {
        platform: PLATFORM.to_string(),
        profile_name,
        fans: meta.fans,
        hearts: meta.hearts,
        videos: meta.video,
        email: Some(email),
    })
}

/// Selects the top `k` profiles by descending follower count.
///
/// The sort is stable: ties, and profiles with no fan count (which sort
/// last), keep their original feed order.
#[must_use]
pub fn top_by_fans(mut profiles: Vec<RawProfile>, k: usize) -> Vec<RawProfile> {
    profiles.sort_by_key(|p| {
        std::cmp::Reverse(
            p.author_meta
                .as_ref()
                .and_then(|m| m.fans)
                .unwrap_or(i64::MIN),
        )
    });
    profiles.truncate(k);
    profiles
}
