use std::time::Instant;

use axum::extract::{Query, State};
use axum::response::Response;
use serde::Deserialize;
use tracing::info;

use crate::api::state::AppState;
use crate::api::{flag, required, ApiError, ApiResponse, CACHE_LEAGUE_COMPLETE};
use crate::models::LeagueId;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeagueCompleteParams {
    pub league_id: Option<String>,
    pub force: Option<String>,
}

/// The full aggregated league snapshot, through the cache.
pub async fn get_league_complete(
    State(state): State<AppState>,
    Query(params): Query<LeagueCompleteParams>,
) -> Result<Response, ApiError> {
    let league_id: LeagueId = required(params.league_id.as_deref(), "leagueId")?;
    let force_refresh = flag(params.force.as_deref());
    let started = Instant::now();

    let snapshot = state
        .league_cache
        .get(league_id, force_refresh)
        .await
        .map_err(|e| ApiError::Upstream {
            error: "Failed to fetch league data",
            message: e.to_string(),
            processing_time: Some(started.elapsed().as_millis() as u64),
        })?;

    info!(
        "league-complete {} served in {}ms (fromCache={}, stale={})",
        league_id,
        started.elapsed().as_millis(),
        snapshot.from_cache,
        snapshot.stale
    );

    Ok(ApiResponse::cached(snapshot, CACHE_LEAGUE_COMPLETE))
}
