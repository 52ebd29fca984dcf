//! Season-wide reference data.

use serde::{Deserialize, Serialize};

/// Schedule metadata for one gameweek.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameweekInfo {
    pub id: u32,
    pub name: String,
    /// Transfer deadline as reported upstream (RFC 3339)
    pub deadline: Option<String>,
    pub average_score: i32,
    pub highest_score: Option<i32>,
    pub finished: bool,
    pub is_current: bool,
    pub is_next: bool,
    pub data_checked: bool,
}

/// A Premier League club.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamInfo {
    pub id: u32,
    pub name: String,
    pub short_name: String,
}

/// The slice of bootstrap data carried in a league snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BootstrapSummary {
    pub current_gameweek: u32,
    pub total_gameweeks: u32,
    pub gameweeks: Vec<GameweekInfo>,
}

impl BootstrapSummary {
    /// Pick the current gameweek from schedule metadata.
    ///
    /// Prefers the gameweek flagged current, then the last finished one,
    /// then gameweek 1 (pre-season).
    pub fn resolve_current(gameweeks: &[GameweekInfo]) -> u32 {
        gameweeks
            .iter()
            .find(|gw| gw.is_current)
            .or_else(|| gameweeks.iter().rev().find(|gw| gw.finished))
            .map(|gw| gw.id)
            .unwrap_or(1)
    }
}
