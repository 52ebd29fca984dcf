//! Cross-manager gameweek leaderboard models.

use serde::{Deserialize, Serialize};

use super::ManagerId;

/// One manager's result within a single gameweek.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameweekResult {
    pub manager_id: ManagerId,
    pub manager_name: String,
    pub team_name: String,
    pub points: i32,
    /// Season total after this gameweek
    pub total_points: i32,
    pub rank: Option<u32>,
    pub transfers: u32,
    pub transfer_cost: i32,
    pub bench_points: i32,
    /// Points after the transfer hit
    pub net_points: i32,
}

/// One gameweek's leaderboard, managers sorted by raw points descending.
///
/// Rows only exist for gameweeks where at least one manager has history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameweekRow {
    pub gameweek: u32,
    pub managers: Vec<GameweekResult>,
    /// Team name of the top scorer
    pub winner: String,
    pub highest_score: i32,
    pub average_score: i32,
}
