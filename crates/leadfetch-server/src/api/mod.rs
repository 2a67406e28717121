mod leads;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use crate::middleware::{enforce_rate_limit, request_id, RateLimitState, RequestId};
use leadfetch_outreach::Mailer;
use leadfetch_scraper::ApifyClient;

/// Sender identity and pitch context for the contact endpoint.
#[derive(Clone)]
pub struct OutreachSettings {
    pub from: String,
    pub company: String,
    pub industry: String,
}

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub scraper: Option<ApifyClient>,
    pub mailer: Option<Mailer>,
    pub outreach: OutreachSettings,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    database: &'static str,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
            "service_unavailable" => StatusCode::SERVICE_UNAVAILABLE,
            "upstream_error" => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

pub(super) fn normalize_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(50).clamp(1, 200)
}

pub(super) fn map_db_error(request_id: String, error: &leadfetch_db::DbError) -> ApiError {
    tracing::error!(error = %error, "database query failed");
    ApiError::new(request_id, "internal_error", "database query failed")
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static("x-request-id"),
        ])
}

fn leads_router(rate_limit: RateLimitState) -> Router<AppState> {
    Router::new()
        .route("/api/v1/leads", get(leads::list_leads))
        .route("/api/v1/leads/schema", get(leads::lead_schema))
        .route("/api/v1/leads/{lead_id}", get(leads::get_lead_detail))
        .route("/api/v1/leads/search", post(leads::search_leads))
        .route("/api/v1/leads/contact", post(leads::contact_lead))
        .layer(axum::middleware::from_fn_with_state(
            rate_limit,
            enforce_rate_limit,
        ))
}

pub fn build_app(state: AppState, rate_limit: RateLimitState) -> Router {
    let public_routes = Router::new().route("/api/v1/health", get(health));

    Router::new()
        .merge(public_routes)
        .merge(leads_router(rate_limit))
        .layer(
            ServiceBuilder::new()
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let meta = ResponseMeta::new(req_id.0);

    match leadfetch_db::health_check(&state.pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse {
                data: HealthData {
                    status: "ok",
                    database: "ok",
                },
                meta,
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "health check: database unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiResponse {
                    data: HealthData {
                        status: "degraded",
                        database: "unavailable",
                    },
                    meta,
                }),
            )
        }
    }
}

pub fn default_rate_limit_state() -> RateLimitState {
    RateLimitState::new(120, Duration::from_secs(60))
}

#[cfg(test)]
mod tests {
    use super::leads::LeadItem;
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use leadfetch_core::NormalizedLead;
    use leadfetch_db::upsert_lead;
    use tower::ServiceExt;

    fn test_state(pool: PgPool) -> AppState {
        AppState {
            pool,
            scraper: None,
            mailer: None,
            outreach: OutreachSettings {
                from: "sales@acme.com".to_string(),
                company: "Acme".to_string(),
                industry: "fitness tech".to_string(),
            },
        }
    }

    fn test_app(pool: PgPool) -> Router {
        build_app(test_state(pool), default_rate_limit_state())
    }

    async fn seed_lead(pool: &PgPool, name: &str, fans: i64) -> i64 {
        let lead = NormalizedLead {
            platform: "tiktok".to_string(),
            profile_name: name.to_string(),
            fans: Some(fans),
            hearts: Some(10),
            videos: Some(3),
            email: Some(format!("{name}@gmail.com")),
        };
        upsert_lead(pool, &lead).await.expect("seed lead").id
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        serde_json::from_slice(&bytes).expect("json parse")
    }

    #[test]
    fn normalize_limit_applies_defaults_and_bounds() {
        assert_eq!(normalize_limit(None), 50);
        assert_eq!(normalize_limit(Some(0)), 1);
        assert_eq!(normalize_limit(Some(1_000)), 200);
        assert_eq!(normalize_limit(Some(25)), 25);
    }

    #[test]
    fn api_error_validation_error_maps_to_bad_request() {
        let response = ApiError::new("req-1", "validation_error", "invalid input").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn api_error_service_unavailable_maps_to_503() {
        let response =
            ApiError::new("req-1", "service_unavailable", "scraper disabled").into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn lead_item_is_serializable() {
        let item = LeadItem {
            id: 1,
            profile_name: "jdoe".to_string(),
            fans: Some(100),
            hearts: Some(10),
            videos: Some(3),
            platform: "tiktok".to_string(),
            email: Some("jdoe@gmail.com".to_string()),
            lead_stage: "prospect".to_string(),
            contract_video_url: None,
            contract_shares: None,
            contract_plays: None,
            contract_comments: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_string(&item).expect("serialize");
        assert!(json.contains("\"profile_name\":\"jdoe\""));
        assert!(json.contains("\"lead_stage\":\"prospect\""));
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn health_reports_ok_with_live_database(pool: PgPool) {
        let response = test_app(pool)
            .oneshot(
                Request::builder()
                    .uri("/api/v1/health")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["data"]["status"].as_str(), Some("ok"));
        assert!(json["meta"]["request_id"].is_string());
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn list_leads_returns_envelope(pool: PgPool) {
        seed_lead(&pool, "jdoe", 100).await;

        let response = test_app(pool)
            .oneshot(
                Request::builder()
                    .uri("/api/v1/leads")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        let data = json["data"].as_array().expect("data array");
        assert_eq!(data.len(), 1);
        assert_eq!(data[0]["profile_name"].as_str(), Some("jdoe"));
        assert_eq!(data[0]["lead_stage"].as_str(), Some("prospect"));
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn list_leads_filters_by_stage(pool: PgPool) {
        let contacted = seed_lead(&pool, "contacted-one", 100).await;
        seed_lead(&pool, "still-prospect", 200).await;
        leadfetch_db::advance_lead_stage(&pool, contacted, leadfetch_core::LeadStage::Contacted)
            .await
            .expect("advance");

        let response = test_app(pool)
            .oneshot(
                Request::builder()
                    .uri("/api/v1/leads?stage=contacted")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        let data = json["data"].as_array().expect("data array");
        assert_eq!(data.len(), 1);
        assert_eq!(data[0]["profile_name"].as_str(), Some("contacted-one"));
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn list_leads_rejects_unknown_stage(pool: PgPool) {
        let response = test_app(pool)
            .oneshot(
                Request::builder()
                    .uri("/api/v1/leads?stage=bogus")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn get_lead_returns_404_for_unknown_id(pool: PgPool) {
        let response = test_app(pool)
            .oneshot(
                Request::builder()
                    .uri("/api/v1/leads/424242")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn schema_endpoint_lists_lead_columns(pool: PgPool) {
        let response = test_app(pool)
            .oneshot(
                Request::builder()
                    .uri("/api/v1/leads/schema")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        let data = json["data"].as_array().expect("data array");
        assert_eq!(data.len(), 14);
        assert_eq!(data[0]["column_name"].as_str(), Some("id"));
        assert_eq!(data[7]["column_name"].as_str(), Some("lead_stage"));
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn search_without_scraper_is_service_unavailable(pool: PgPool) {
        let response = test_app(pool)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/leads/search")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"query": "ai voice tools"}"#))
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn search_ingests_scraped_profiles(pool: PgPool) {
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(
                "/v2/acts/clockworks~free-tiktok-scraper/run-sync-get-dataset-items",
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"authorMeta": {"name": "jdoe", "fans": 100, "hearts": 5, "video": 3}},
                {"authorMeta": {"name": "asmith", "fans": 900, "hearts": 50, "video": 12}}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let mut state = test_state(pool.clone());
        state.scraper = Some(
            leadfetch_scraper::ApifyClient::with_base_url(
                "test-token",
                30,
                "leadfetch-test",
                100,
                &server.uri(),
            )
            .expect("client"),
        );
        let app = build_app(state, default_rate_limit_state());

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/leads/search")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"query": "ai voice tools", "limit": 10}"#))
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        let stored = json["data"]["stored"].as_array().expect("stored array");
        assert_eq!(stored.len(), 2);
        // Ordered by follower count, largest first.
        assert_eq!(stored[0]["profile_name"].as_str(), Some("asmith"));
        assert_eq!(stored[0]["email"].as_str(), Some("asmith@gmail.com"));

        let rows = leadfetch_db::list_leads(&pool).await.expect("list");
        assert_eq!(rows.len(), 2);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn contact_returns_404_for_unknown_lead(pool: PgPool) {
        let response = test_app(pool)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/leads/contact")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"lead_id": 424242}"#))
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn contact_advances_stage_without_configured_mailer(pool: PgPool) {
        let lead_id = seed_lead(&pool, "jdoe", 100).await;

        let response = test_app(pool.clone())
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/leads/contact")
                    .header("content-type", "application/json")
                    .body(Body::from(format!(r#"{{"lead_id": {lead_id}}}"#)))
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["data"]["status"].as_str(), Some("sent"));

        let row = leadfetch_db::get_lead(&pool, lead_id)
            .await
            .expect("get")
            .expect("row");
        assert_eq!(row.lead_stage, "contacted");
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn contact_skips_already_contacted_lead(pool: PgPool) {
        let lead_id = seed_lead(&pool, "jdoe", 100).await;
        leadfetch_db::advance_lead_stage(&pool, lead_id, leadfetch_core::LeadStage::Contacted)
            .await
            .expect("advance");

        let response = test_app(pool)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/leads/contact")
                    .header("content-type", "application/json")
                    .body(Body::from(format!(r#"{{"lead_id": {lead_id}}}"#)))
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["data"]["status"].as_str(), Some("skipped"));
        assert_eq!(json["data"]["reason"].as_str(), Some("already_contacted"));
    }
}
