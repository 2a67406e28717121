use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;
use leadfetch_core::LeadStage;
use leadfetch_db::{ColumnInfo, LeadRow};
use leadfetch_outreach::{outreach_body, outreach_subject, OutreachOutcome, OutreachTracker};
use leadfetch_scraper::{ingest, top_by_fans};

use super::{map_db_error, normalize_limit, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct LeadsQuery {
    pub stage: Option<String>,
    pub platform: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub(super) struct LeadItem {
    pub(super) id: i64,
    pub(super) profile_name: String,
    pub(super) fans: Option<i64>,
    pub(super) hearts: Option<i64>,
    pub(super) videos: Option<i64>,
    pub(super) platform: String,
    pub(super) email: Option<String>,
    pub(super) lead_stage: String,
    pub(super) contract_video_url: Option<String>,
    pub(super) contract_shares: Option<i64>,
    pub(super) contract_plays: Option<i64>,
    pub(super) contract_comments: Option<i64>,
    pub(super) created_at: DateTime<Utc>,
    pub(super) updated_at: DateTime<Utc>,
}

impl From<LeadRow> for LeadItem {
    fn from(row: LeadRow) -> Self {
        Self {
            id: row.id,
            profile_name: row.profile_name,
            fans: row.fans,
            hearts: row.hearts,
            videos: row.videos,
            platform: row.platform,
            email: row.email,
            lead_stage: row.lead_stage,
            contract_video_url: row.contract_video_url,
            contract_shares: row.contract_shares,
            contract_plays: row.contract_plays,
            contract_comments: row.contract_comments,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct SearchRequest {
    pub query: String,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub(super) struct SearchResult {
    pub(super) stored: Vec<LeadItem>,
    pub(super) skipped: usize,
}

#[derive(Debug, Deserialize)]
pub(super) struct ContactRequest {
    pub lead_id: i64,
    pub subject: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct ContactResult {
    pub(super) lead_id: i64,
    pub(super) status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) reason: Option<&'static str>,
}

pub(super) async fn list_leads(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<LeadsQuery>,
) -> Result<Json<ApiResponse<Vec<LeadItem>>>, ApiError> {
    let stage = match query.stage.as_deref() {
        Some(raw) => Some(raw.parse::<LeadStage>().map_err(|_| {
            ApiError::new(
                req_id.0.clone(),
                "validation_error",
                format!("unknown stage '{raw}'"),
            )
        })?),
        None => None,
    };

    let mut rows = match (stage, query.platform.as_deref()) {
        (Some(stage), _) => leadfetch_db::list_leads_by_stage(&state.pool, stage).await,
        (None, Some(platform)) => leadfetch_db::list_leads_by_platform(&state.pool, platform).await,
        (None, None) => leadfetch_db::list_leads(&state.pool).await,
    }
    .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    // Stage and platform filters combine; the stage query already ran in SQL.
    if let (Some(_), Some(platform)) = (stage, query.platform.as_deref()) {
        rows.retain(|row| row.platform == platform);
    }

    let limit = usize::try_from(normalize_limit(query.limit)).unwrap_or(50);
    rows.truncate(limit);

    Ok(Json(ApiResponse {
        data: rows.into_iter().map(LeadItem::from).collect(),
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn get_lead_detail(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(lead_id): Path<i64>,
) -> Result<Json<ApiResponse<LeadItem>>, ApiError> {
    let row = leadfetch_db::get_lead(&state.pool, lead_id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?
        .ok_or_else(|| ApiError::new(req_id.0.clone(), "not_found", "lead not found"))?;

    Ok(Json(ApiResponse {
        data: LeadItem::from(row),
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn lead_schema(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<ColumnInfo>>>, ApiError> {
    let columns = leadfetch_db::table_schema(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: columns,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn search_leads(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<ApiResponse<SearchResult>>, ApiError> {
    let query = request.query.trim();
    if query.is_empty() {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            "query must not be empty",
        ));
    }

    let Some(scraper) = &state.scraper else {
        return Err(ApiError::new(
            req_id.0,
            "service_unavailable",
            "lead search is disabled; no scraper credentials configured",
        ));
    };

    let profiles = scraper.search_profiles(query).await.map_err(|e| {
        tracing::error!(error = %e, query, "profile search failed");
        ApiError::new(req_id.0.clone(), "upstream_error", "profile search failed")
    })?;

    let limit = usize::try_from(normalize_limit(request.limit)).unwrap_or(50);
    let top = top_by_fans(profiles, limit);
    let report = ingest(&state.pool, &top).await;

    Ok(Json(ApiResponse {
        data: SearchResult {
            stored: report.stored.into_iter().map(LeadItem::from).collect(),
            skipped: report.skipped,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn contact_lead(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(request): Json<ContactRequest>,
) -> Result<Json<ApiResponse<ContactResult>>, ApiError> {
    let row = leadfetch_db::get_lead(&state.pool, request.lead_id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?
        .ok_or_else(|| ApiError::new(req_id.0.clone(), "not_found", "lead not found"))?;

    let subject = request
        .subject
        .unwrap_or_else(|| outreach_subject(&state.outreach.company));
    let body = request
        .message
        .unwrap_or_else(|| outreach_body(&state.outreach.company, &state.outreach.industry, &row));

    let mut tracker = OutreachTracker::new(state.mailer.clone(), state.outreach.from.clone());
    let outcome = tracker
        .contact(&state.pool, &row, &subject, &body)
        .await
        .map_err(|e| match e {
            leadfetch_outreach::OutreachError::Db(db) => map_db_error(req_id.0.clone(), &db),
            other => {
                tracing::error!(error = %other, lead_id = row.id, "email delivery failed");
                ApiError::new(req_id.0.clone(), "upstream_error", "email delivery failed")
            }
        })?;

    let data = match outcome {
        OutreachOutcome::Sent => ContactResult {
            lead_id: row.id,
            status: "sent",
            reason: None,
        },
        OutreachOutcome::Skipped { reason } => ContactResult {
            lead_id: row.id,
            status: "skipped",
            reason: Some(reason),
        },
        OutreachOutcome::Failed { reason } => {
            tracing::error!(lead_id = row.id, reason, "email delivery failed");
            return Err(ApiError::new(
                req_id.0,
                "upstream_error",
                "email delivery failed",
            ));
        }
    };

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}
