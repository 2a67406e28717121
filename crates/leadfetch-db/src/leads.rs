//! Database operations for the `leads` table.
//!
//! Every predicate is a dedicated function with bound parameters; no helper
//! accepts caller-supplied SQL text.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::DbError;
use leadfetch_core::{LeadStage, NormalizedLead};

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

const LEAD_COLUMNS: &str = "id, profile_name, fans, hearts, videos, platform, email, lead_stage, \
     contract_video_url, created_at, contract_shares, contract_plays, contract_comments, updated_at";

/// A row from the `leads` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LeadRow {
    pub id: i64,
    pub profile_name: String,
    pub fans: Option<i64>,
    pub hearts: Option<i64>,
    pub videos: Option<i64>,
    pub platform: String,
    pub email: Option<String>,
    /// Stored as text; constrained by the schema to the known stage names.
    pub lead_stage: String,
    pub contract_video_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub contract_shares: Option<i64>,
    pub contract_plays: Option<i64>,
    pub contract_comments: Option<i64>,
    pub updated_at: DateTime<Utc>,
}

impl LeadRow {
    /// Parses the stored stage name. Falls back to `Prospect` if the column
    /// somehow holds an unknown value; the schema CHECK makes that unreachable
    /// through normal writes.
    #[must_use]
    pub fn stage(&self) -> LeadStage {
        self.lead_stage.parse().unwrap_or(LeadStage::Prospect)
    }
}

// ---------------------------------------------------------------------------
// Writes
// ---------------------------------------------------------------------------

/// Upserts a lead keyed on `(platform, profile_name)`.
///
/// A conflict refreshes the mutable engagement metrics (`fans`, `hearts`,
/// `videos`) and fills `email` only if it was previously NULL. `id`,
/// `created_at`, and `lead_stage` are never touched on conflict, so
/// re-ingesting a contacted lead cannot regress its lifecycle.
///
/// Returns the persisted row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_lead(pool: &PgPool, lead: &NormalizedLead) -> Result<LeadRow, DbError> {
    let row = sqlx::query_as::<_, LeadRow>(
        "INSERT INTO leads (profile_name, fans, hearts, videos, platform, email) \
         VALUES ($1, $2, $3, $4, $5, $6) \
         ON CONFLICT (platform, profile_name) DO UPDATE SET \
             fans       = EXCLUDED.fans, \
             hearts     = EXCLUDED.hearts, \
             videos     = EXCLUDED.videos, \
             email      = COALESCE(leads.email, EXCLUDED.email), \
             updated_at = NOW() \
         RETURNING id, profile_name, fans, hearts, videos, platform, email, lead_stage, \
                   contract_video_url, created_at, contract_shares, contract_plays, \
                   contract_comments, updated_at",
    )
    .bind(&lead.profile_name)
    .bind(lead.fans)
    .bind(lead.hearts)
    .bind(lead.videos)
    .bind(&lead.platform)
    .bind(&lead.email)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Advances a lead's stage, forward-only.
///
/// The row is matched only when its current stage is strictly earlier in the
/// lifecycle than `to`, so repeated or out-of-order calls are harmless no-ops.
///
/// Returns `true` if the row transitioned, `false` if the lead does not exist
/// or is already at (or past) `to`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn advance_lead_stage(
    pool: &PgPool,
    lead_id: i64,
    to: LeadStage,
) -> Result<bool, DbError> {
    let lower: Vec<String> = to.stages_below().iter().map(ToString::to_string).collect();

    let rows_affected = sqlx::query(
        "UPDATE leads \
         SET lead_stage = $2, updated_at = NOW() \
         WHERE id = $1 AND lead_stage = ANY($3)",
    )
    .bind(lead_id)
    .bind(to.as_str())
    .bind(&lower)
    .execute(pool)
    .await?
    .rows_affected();

    Ok(rows_affected > 0)
}

/// Records scraped contract-video performance for a converted lead.
///
/// Refuses rows still at `prospect`: contract metrics only exist once a lead
/// has an active relationship. Returns the affected-row count (0 = unknown id
/// or still a prospect — a no-op signal, not an error).
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn update_contract_metrics(
    pool: &PgPool,
    lead_id: i64,
    video_url: &str,
    shares: Option<i64>,
    plays: Option<i64>,
    comments: Option<i64>,
) -> Result<u64, DbError> {
    let rows_affected = sqlx::query(
        "UPDATE leads \
         SET contract_video_url = $2, \
             contract_shares    = $3, \
             contract_plays     = $4, \
             contract_comments  = $5, \
             updated_at         = NOW() \
         WHERE id = $1 AND lead_stage <> 'prospect'",
    )
    .bind(lead_id)
    .bind(video_url)
    .bind(shares)
    .bind(plays)
    .bind(comments)
    .execute(pool)
    .await?
    .rows_affected();

    Ok(rows_affected)
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// Returns every lead, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_leads(pool: &PgPool) -> Result<Vec<LeadRow>, DbError> {
    let query = format!("SELECT {LEAD_COLUMNS} FROM leads ORDER BY created_at DESC, id DESC");
    let rows = sqlx::query_as::<_, LeadRow>(&query).fetch_all(pool).await?;
    Ok(rows)
}

/// Returns leads at a given lifecycle stage, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_leads_by_stage(pool: &PgPool, stage: LeadStage) -> Result<Vec<LeadRow>, DbError> {
    let query = format!(
        "SELECT {LEAD_COLUMNS} FROM leads WHERE lead_stage = $1 ORDER BY created_at DESC, id DESC"
    );
    let rows = sqlx::query_as::<_, LeadRow>(&query)
        .bind(stage.as_str())
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Returns leads from a given source platform, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_leads_by_platform(
    pool: &PgPool,
    platform: &str,
) -> Result<Vec<LeadRow>, DbError> {
    let query = format!(
        "SELECT {LEAD_COLUMNS} FROM leads WHERE platform = $1 ORDER BY created_at DESC, id DESC"
    );
    let rows = sqlx::query_as::<_, LeadRow>(&query)
        .bind(platform)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Returns a single lead by surrogate id, or `None` if not found.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_lead(pool: &PgPool, lead_id: i64) -> Result<Option<LeadRow>, DbError> {
    let query = format!("SELECT {LEAD_COLUMNS} FROM leads WHERE id = $1");
    let row = sqlx::query_as::<_, LeadRow>(&query)
        .bind(lead_id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Returns a single lead by its natural `(platform, profile_name)` key.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_lead_by_key(
    pool: &PgPool,
    platform: &str,
    profile_name: &str,
) -> Result<Option<LeadRow>, DbError> {
    let query = format!("SELECT {LEAD_COLUMNS} FROM leads WHERE platform = $1 AND profile_name = $2");
    let row = sqlx::query_as::<_, LeadRow>(&query)
        .bind(platform)
        .bind(profile_name)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}
