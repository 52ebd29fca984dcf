//! Route handlers, one module per endpoint.

pub mod bootstrap;
pub mod league;
pub mod league_complete;
pub mod live;
pub mod manager;
pub mod picks;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub cache_backend: &'static str,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        cache_backend: state.league_cache.backend(),
    })
}
