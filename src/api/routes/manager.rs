use axum::extract::{Query, State};
use axum::response::Response;
use serde::{Deserialize, Serialize};

use crate::aggregate::normalize;
use crate::api::state::AppState;
use crate::api::{required, ApiError, ApiResponse, CACHE_MANAGER_HISTORY};
use crate::models::{GameweekHistory, ManagerId};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagerHistoryParams {
    pub manager_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChipUsage {
    pub name: String,
    pub gameweek: u32,
    pub played_at: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PastSeason {
    pub season: String,
    pub total_points: i32,
    pub rank: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagerHistoryResponse {
    pub manager_id: ManagerId,
    pub gameweeks: Vec<GameweekHistory>,
    pub chips: Vec<ChipUsage>,
    pub season_history: Vec<PastSeason>,
}

pub async fn get_manager_history(
    State(state): State<AppState>,
    Query(params): Query<ManagerHistoryParams>,
) -> Result<Response, ApiError> {
    let manager_id: ManagerId = required(params.manager_id.as_deref(), "managerId")?;

    let raw = state
        .api
        .manager_history(manager_id)
        .await
        .map_err(|e| ApiError::upstream("Failed to fetch manager history", e))?;

    let mut gameweeks: Vec<GameweekHistory> =
        raw.current.iter().map(normalize::gameweek_history).collect();
    gameweeks.sort_by_key(|gw| gw.gameweek);

    let chips = raw
        .chips
        .iter()
        .map(|chip| ChipUsage {
            name: chip.name.clone(),
            gameweek: chip.event,
            played_at: chip.time.clone(),
        })
        .collect();

    let season_history = raw
        .past
        .iter()
        .map(|season| PastSeason {
            season: season.season_name.clone(),
            total_points: season.total_points,
            rank: season.rank,
        })
        .collect();

    Ok(ApiResponse::cached(
        ManagerHistoryResponse {
            manager_id,
            gameweeks,
            chips,
            season_history,
        },
        CACHE_MANAGER_HISTORY,
    ))
}
