//! REST API endpoints.
//!
//! Axum-based HTTP API serving league snapshots, standings, manager
//! histories, lineups and live scores. Every `/api` response uses the
//! `{ success, ... }` envelope.

pub mod routes;
pub mod state;

use std::str::FromStr;

use axum::{
    handler::Handler,
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, MethodRouter},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use state::AppState;

/// API error types.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("{message}")]
    Upstream {
        error: &'static str,
        message: String,
        /// Milliseconds spent before giving up, when measured
        processing_time: Option<u64>,
    },

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// A failed upstream-backed request.
    pub fn upstream(error: &'static str, err: impl std::fmt::Display) -> Self {
        ApiError::Upstream {
            error,
            message: err.to_string(),
            processing_time: None,
        }
    }
}

/// Error response body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing_time: Option<u64>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, processing_time) = match &self {
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "Bad request", None),
            ApiError::MethodNotAllowed => {
                (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed", None)
            }
            ApiError::Upstream {
                error,
                processing_time,
                ..
            } => (StatusCode::INTERNAL_SERVER_ERROR, *error, *processing_time),
            ApiError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error",
                None,
            ),
        };

        if status.is_server_error() {
            error!("{}: {}", error, self);
        }

        let body = ErrorResponse {
            success: false,
            error: error.to_string(),
            message: self.to_string(),
            timestamp: Utc::now(),
            processing_time,
        };

        (status, Json(body)).into_response()
    }
}

/// Success envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }

    /// Wrap in a 200 response carrying a `Cache-Control` directive.
    pub fn cached(data: T, cache_control: &'static str) -> Response {
        (
            [(header::CACHE_CONTROL, HeaderValue::from_static(cache_control))],
            Json(Self::ok(data)),
        )
            .into_response()
    }
}

// ── Cache-Control directives ─────────────────────────────────────

pub const CACHE_BOOTSTRAP: &str = "public, max-age=300, stale-while-revalidate=600";
pub const CACHE_LEAGUE: &str = "public, max-age=120, stale-while-revalidate=300";
pub const CACHE_LEAGUE_COMPLETE: &str = "public, s-maxage=60, stale-while-revalidate=300";
pub const CACHE_MANAGER_HISTORY: &str = "public, max-age=300, stale-while-revalidate=600";
pub const CACHE_TEAM_PICKS: &str = "public, max-age=120, stale-while-revalidate=300";

// ── Query parameters ─────────────────────────────────────────────

/// Parse a required query parameter.
pub fn required<T: FromStr>(value: Option<&str>, name: &str) -> Result<T, ApiError> {
    let raw = value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::BadRequest(format!("{} is required", name)))?;
    raw.parse()
        .map_err(|_| ApiError::BadRequest(format!("{} must be a positive integer", name)))
}

/// Parse an optional query parameter, rejecting malformed values.
pub fn optional<T: FromStr>(value: Option<&str>, name: &str) -> Result<Option<T>, ApiError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| ApiError::BadRequest(format!("{} is not valid", name))),
    }
}

/// Interpret a boolean flag such as `force=true`.
pub fn flag(value: Option<&str>) -> bool {
    matches!(
        value.map(|v| v.trim().to_ascii_lowercase()).as_deref(),
        Some("true" | "1" | "yes")
    )
}

// ── Router ───────────────────────────────────────────────────────

async fn preflight() -> impl IntoResponse {
    (
        StatusCode::OK,
        [
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
            (header::ACCESS_CONTROL_ALLOW_METHODS, "GET, OPTIONS"),
            (header::ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type"),
        ],
    )
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

/// A GET endpoint that answers OPTIONS and rejects other methods.
fn endpoint<H, T>(handler: H) -> MethodRouter<AppState>
where
    H: Handler<T, AppState>,
    T: 'static,
{
    get(handler)
        .options(preflight)
        .fallback(method_not_allowed)
}

fn cors_layer(origin: &str) -> CorsLayer {
    let allow_origin = if origin == "*" {
        AllowOrigin::any()
    } else {
        match origin.parse::<HeaderValue>() {
            Ok(value) => AllowOrigin::exact(value),
            Err(_) => {
                warn!("Invalid CORS origin {:?}, allowing any", origin);
                AllowOrigin::any()
            }
        }
    };
    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers(Any)
}

pub fn build_router(state: AppState) -> Router {
    use routes::{bootstrap, league, league_complete, live, manager, picks};

    let api = Router::new()
        .route("/bootstrap", endpoint(bootstrap::get_bootstrap))
        .route("/league", endpoint(league::get_league))
        .route(
            "/league-complete",
            endpoint(league_complete::get_league_complete),
        )
        .route("/manager-history", endpoint(manager::get_manager_history))
        .route("/team-picks", endpoint(picks::get_team_picks))
        .route("/live-stats", endpoint(live::get_live_stats));

    let cors = cors_layer(&state.config.server.cors_origin);

    Router::new()
        .route("/health", get(routes::health))
        .nest("/api", api)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::cache::MemoryCacheStore;
    use crate::config::AppConfig;
    use crate::upstream::fake::FakeFplApi;
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::Value;
    use std::sync::Arc;
    use tower::util::ServiceExt;

    pub fn test_state(api: FakeFplApi) -> (Arc<FakeFplApi>, AppState) {
        let api = Arc::new(api);
        let state = AppState::new(
            Arc::new(AppConfig::default()),
            api.clone(),
            Arc::new(MemoryCacheStore::new()),
        )
        .unwrap();
        (api, state)
    }

    pub async fn send(app: Router, method: &str, uri: &str) -> Response {
        app.oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
    }

    pub async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let resp = send(app, "GET", uri).await;
        let status = resp.status();
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, json)
    }

    pub fn cache_control(resp: &Response) -> Option<&str> {
        resp.headers()
            .get(header::CACHE_CONTROL)
            .and_then(|v| v.to_str().ok())
    }

    #[test]
    fn test_required_param() {
        assert_eq!(required::<u64>(Some("42"), "leagueId").unwrap(), 42);
        assert_eq!(required::<u64>(Some(" 42 "), "leagueId").unwrap(), 42);
        assert!(matches!(
            required::<u64>(None, "leagueId"),
            Err(ApiError::BadRequest(msg)) if msg == "leagueId is required"
        ));
        assert!(required::<u64>(Some(""), "leagueId").is_err());
        assert!(required::<u64>(Some("abc"), "leagueId").is_err());
        assert!(required::<u64>(Some("-3"), "leagueId").is_err());
    }

    #[test]
    fn test_optional_param() {
        assert_eq!(optional::<u32>(None, "page").unwrap(), None);
        assert_eq!(optional::<u32>(Some("2"), "page").unwrap(), Some(2));
        assert!(optional::<u32>(Some("two"), "page").is_err());
    }

    #[test]
    fn test_flag() {
        assert!(flag(Some("true")));
        assert!(flag(Some("TRUE")));
        assert!(flag(Some("1")));
        assert!(!flag(Some("false")));
        assert!(!flag(None));
    }

    #[tokio::test]
    async fn test_health() {
        let (_, state) = test_state(FakeFplApi::new());
        let (status, json) = get_json(build_router(state), "/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
        assert_eq!(json["cacheBackend"], "memory");
    }

    #[tokio::test]
    async fn test_options_returns_cors_headers() {
        let (_, state) = test_state(FakeFplApi::new());
        let resp = send(build_router(state), "OPTIONS", "/api/league-complete").await;

        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp
            .headers()
            .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
    }

    #[tokio::test]
    async fn test_non_get_rejected() {
        let (api, state) = test_state(FakeFplApi::new());
        let app = build_router(state);

        for uri in ["/api/league-complete?leagueId=1", "/api/bootstrap"] {
            let resp = send(app.clone(), "POST", uri).await;
            assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
        }
        let resp = send(app, "DELETE", "/api/league?leagueId=1").await;
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);

        assert_eq!(
            api.standings_calls
                .load(std::sync::atomic::Ordering::SeqCst),
            0
        );
    }

    #[tokio::test]
    async fn test_error_body_shape() {
        let resp = ApiError::BadRequest("leagueId is required".to_string()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "Bad request");
        assert_eq!(json["message"], "leagueId is required");
        assert!(json["timestamp"].is_string());
        assert!(json.get("processingTime").is_none());
    }
}
