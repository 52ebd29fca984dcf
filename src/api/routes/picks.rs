use axum::extract::{Query, State};
use axum::response::Response;
use serde::Deserialize;
use tracing::warn;

use crate::aggregate::live::team_picks;
use crate::api::state::AppState;
use crate::api::{required, ApiError, ApiResponse, CACHE_TEAM_PICKS};
use crate::models::ManagerId;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamPicksParams {
    pub manager_id: Option<String>,
    pub event_id: Option<String>,
}

/// A manager's lineup for one gameweek with live points where available.
pub async fn get_team_picks(
    State(state): State<AppState>,
    Query(params): Query<TeamPicksParams>,
) -> Result<Response, ApiError> {
    let manager_id: ManagerId = required(params.manager_id.as_deref(), "managerId")?;
    let event_id: u32 = required(params.event_id.as_deref(), "eventId")?;

    let (bootstrap, picks, live) = tokio::join!(
        state.api.bootstrap(),
        state.api.event_picks(manager_id, event_id),
        state.api.live_event(event_id),
    );
    let bootstrap =
        bootstrap.map_err(|e| ApiError::upstream("Failed to fetch bootstrap data", e))?;
    let picks = picks.map_err(|e| ApiError::upstream("Failed to fetch team picks", e))?;
    let live = match live {
        Ok(live) => Some(live),
        Err(e) => {
            warn!("Live data for gameweek {} unavailable: {}", event_id, e);
            None
        }
    };

    Ok(ApiResponse::cached(
        team_picks(manager_id, event_id, &bootstrap, &picks, live.as_ref()),
        CACHE_TEAM_PICKS,
    ))
}
