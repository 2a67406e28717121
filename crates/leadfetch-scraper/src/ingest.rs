//! Best-effort batch ingestion into the lead store.

use sqlx::PgPool;

use leadfetch_db::LeadRow;

use crate::normalize::normalize_profile;
use crate::types::RawProfile;

/// Outcome of one ingestion batch.
#[derive(Debug, Default)]
pub struct IngestReport {
    /// Rows persisted (inserted or metric-refreshed), in feed order.
    pub stored: Vec<LeadRow>,
    /// Items dropped: malformed records plus per-item store failures.
    pub skipped: usize,
}

/// Normalizes and upserts a batch of raw profiles.
///
/// Per-item isolation: a malformed record or a failed upsert is logged,
/// counted in `skipped`, and never aborts the remaining items.
///
/// # Errors
///
/// Never fails as a whole; errors are absorbed per item. The signature stays
/// infallible so callers cannot accidentally treat one bad record as fatal.
pub async fn ingest(pool: &PgPool, profiles: &[RawProfile]) -> IngestReport {
    let mut report = IngestReport::default();

    for profile in profiles {
        let lead = match normalize_profile(profile) {
            Ok(lead) => lead,
            Err(e) => {
                tracing::warn!(error = %e, "skipping profile — normalization failed");
                report.skipped += 1;
                continue;
            }
        };

        match leadfetch_db::upsert_lead(pool, &lead).await {
            Ok(row) => {
                tracing::debug!(lead_id = row.id, profile = %row.profile_name, "lead stored");
                report.stored.push(row);
            }
            Err(e) => {
                tracing::warn!(
                    profile = %lead.profile_name,
                    error = %e,
                    "skipping profile — lead store rejected upsert"
                );
                report.skipped += 1;
            }
        }
    }

    report
}
