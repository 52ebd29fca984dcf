use std::collections::HashSet;

use axum::extract::{Query, State};
use axum::response::Response;
use serde::{Deserialize, Serialize};

use crate::aggregate::normalize;
use crate::api::state::AppState;
use crate::api::{optional, required, ApiError, ApiResponse, CACHE_LEAGUE};
use crate::calculate::compute_league_stats;
use crate::models::{LeagueId, LeagueInfo, LeagueStats, ManagerStanding};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeagueParams {
    pub league_id: Option<String>,
    pub page: Option<String>,
}

/// One standings page without per-manager enrichment.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeagueResponse {
    pub league: LeagueInfo,
    pub standings: Vec<ManagerStanding>,
    pub league_stats: LeagueStats,
    pub page: u32,
    pub has_next: bool,
}

pub async fn get_league(
    State(state): State<AppState>,
    Query(params): Query<LeagueParams>,
) -> Result<Response, ApiError> {
    let league_id: LeagueId = required(params.league_id.as_deref(), "leagueId")?;
    let page = optional::<u32>(params.page.as_deref(), "page")?
        .unwrap_or(1)
        .max(1);

    let raw = state
        .api
        .league_standings(league_id, page)
        .await
        .map_err(|e| ApiError::upstream("Failed to fetch league standings", e))?;

    let standings: Vec<ManagerStanding> = raw
        .standings
        .results
        .iter()
        .map(|entry| normalize::manager_standing(entry, None, &HashSet::new()))
        .collect();

    Ok(ApiResponse::cached(
        LeagueResponse {
            league: normalize::league_info(&raw.league),
            league_stats: compute_league_stats(&standings),
            standings,
            page: raw.standings.page,
            has_next: raw.standings.has_next,
        },
        CACHE_LEAGUE,
    ))
}

#[cfg(test)]
mod tests {
    use crate::api::build_router;
    use crate::api::tests::{cache_control, get_json, send, test_state};
    use crate::api::CACHE_LEAGUE;
    use crate::upstream::fake::{self, FakeFplApi};
    use axum::http::StatusCode;
    use std::sync::atomic::Ordering;

    fn api() -> FakeFplApi {
        FakeFplApi::new().with_league(fake::league(
            42,
            vec![
                fake::standing(1, 500, 70, 1, 2),
                fake::standing(2, 480, 40, 2, 1),
            ],
        ))
    }

    #[tokio::test]
    async fn test_league_standings_page() {
        let (api, state) = test_state(api());
        let (status, json) = get_json(build_router(state), "/api/league?leagueId=42").await;

        assert_eq!(status, StatusCode::OK);
        let data = &json["data"];
        assert_eq!(data["league"]["name"], "Office League");
        assert_eq!(data["standings"].as_array().unwrap().len(), 2);
        assert_eq!(data["standings"][0]["teamName"], "Team 1");
        assert_eq!(data["standings"][0]["rankChange"], 1);
        assert_eq!(data["standings"][0]["hasData"], false);
        assert_eq!(data["standings"][0]["form"], "N/A");
        assert_eq!(data["leagueStats"]["averageTotalScore"], 490);
        assert_eq!(data["hasNext"], false);

        // No enrichment calls
        assert_eq!(api.manager_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_league_cache_header() {
        let (_, state) = test_state(api());
        let resp = send(build_router(state), "GET", "/api/league?leagueId=42").await;
        assert_eq!(cache_control(&resp), Some(CACHE_LEAGUE));
    }

    #[tokio::test]
    async fn test_league_requires_id() {
        let (api, state) = test_state(api());
        let app = build_router(state);

        let (status, json) = get_json(app.clone(), "/api/league").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["message"], "leagueId is required");

        let (status, _) = get_json(app.clone(), "/api/league?leagueId=abc").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = get_json(app, "/api/league?leagueId=42&page=x").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        assert_eq!(api.standings_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unknown_league() {
        let (_, state) = test_state(api());
        let (status, json) = get_json(build_router(state), "/api/league?leagueId=7").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["success"], false);
    }
}
