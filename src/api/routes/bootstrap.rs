use axum::extract::State;
use axum::response::Response;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::aggregate::normalize;
use crate::api::state::AppState;
use crate::api::{ApiError, ApiResponse, CACHE_BOOTSTRAP};
use crate::models::{BootstrapSummary, GameweekInfo, TeamInfo};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BootstrapResponse {
    pub current_gameweek: u32,
    pub total_gameweeks: u32,
    pub gameweeks: Vec<GameweekInfo>,
    pub teams: Vec<TeamInfo>,
    pub total_players: u64,
    pub last_updated: DateTime<Utc>,
}

pub async fn get_bootstrap(State(state): State<AppState>) -> Result<Response, ApiError> {
    let raw = state
        .api
        .bootstrap()
        .await
        .map_err(|e| ApiError::upstream("Failed to fetch bootstrap data", e))?;

    let BootstrapSummary {
        current_gameweek,
        total_gameweeks,
        gameweeks,
    } = normalize::bootstrap_summary(&raw);

    Ok(ApiResponse::cached(
        BootstrapResponse {
            current_gameweek,
            total_gameweeks,
            gameweeks,
            teams: raw.teams.iter().map(normalize::team_info).collect(),
            total_players: raw.total_players,
            last_updated: Utc::now(),
        },
        CACHE_BOOTSTRAP,
    ))
}
