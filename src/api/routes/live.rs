use axum::extract::{Query, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::api::{required, ApiError, ApiResponse};
use crate::models::{LeagueId, LiveScore};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveStatsParams {
    pub league_id: Option<String>,
    pub gameweek: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveStatsResponse {
    pub league_id: LeagueId,
    pub gameweek: u32,
    pub managers: Vec<LiveScore>,
    pub last_updated: DateTime<Utc>,
}

/// Live gameweek points across a league. Never cached.
pub async fn get_live_stats(
    State(state): State<AppState>,
    Query(params): Query<LiveStatsParams>,
) -> Result<Json<ApiResponse<LiveStatsResponse>>, ApiError> {
    let league_id: LeagueId = required(params.league_id.as_deref(), "leagueId")?;
    let gameweek: u32 = required(params.gameweek.as_deref(), "gameweek")?;

    let managers = state
        .aggregator
        .live_scores(league_id, gameweek)
        .await
        .map_err(|e| ApiError::upstream("Failed to fetch live stats", e))?;

    Ok(Json(ApiResponse::ok(LiveStatsResponse {
        league_id,
        gameweek,
        managers,
        last_updated: Utc::now(),
    })))
}

#[cfg(test)]
mod tests {
    use crate::api::build_router;
    use crate::api::tests::{get_json, send, test_state};
    use crate::upstream::fake::{self, FakeFplApi};
    use axum::http::{header, StatusCode};

    fn api() -> FakeFplApi {
        FakeFplApi::new()
            .with_league(fake::league(
                77,
                vec![fake::standing(1, 300, 60, 1, 1), fake::standing(2, 280, 50, 2, 2)],
            ))
            .with_live(4, fake::live(&[(1, 8), (14, 12)]))
            .with_picks(1, 4, fake::picks(1, 0))
            .with_picks(2, 4, fake::picks(14, 8))
    }

    #[tokio::test]
    async fn test_live_stats() {
        let (_, state) = test_state(api());
        let (status, json) =
            get_json(build_router(state), "/api/live-stats?leagueId=77&gameweek=4").await;

        assert_eq!(status, StatusCode::OK);
        let data = &json["data"];
        assert_eq!(data["leagueId"], 77);
        assert_eq!(data["gameweek"], 4);
        let managers = data["managers"].as_array().unwrap();
        assert_eq!(managers.len(), 2);
        // 8 doubled + 12 = 28 beats 24 + 8 - 8 hit = 24
        assert_eq!(managers[0]["managerId"], 1);
        assert_eq!(managers[0]["livePoints"], 28);
        assert_eq!(managers[1]["livePoints"], 24);
        assert_eq!(managers[1]["transferCost"], 8);
    }

    #[tokio::test]
    async fn test_live_stats_not_cacheable() {
        let (_, state) = test_state(api());
        let resp = send(
            build_router(state),
            "GET",
            "/api/live-stats?leagueId=77&gameweek=4",
        )
        .await;

        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp.headers().get(header::CACHE_CONTROL).is_none());
    }

    #[tokio::test]
    async fn test_live_stats_requires_gameweek() {
        let (_, state) = test_state(api());
        let (status, json) = get_json(build_router(state), "/api/live-stats?leagueId=77").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["message"], "gameweek is required");
    }
}
