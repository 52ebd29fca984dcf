//! League standing models.

use serde::{Deserialize, Serialize};

use super::ManagerId;

/// Label used when a manager has no gameweek history to average.
pub const FORM_UNAVAILABLE: &str = "N/A";

/// One gameweek of a manager's season history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameweekHistory {
    /// Gameweek number (1-based)
    pub gameweek: u32,

    /// Raw points scored this gameweek, before transfer hits
    pub points: i32,

    /// Season total after this gameweek
    pub total_points: i32,

    /// Gameweek rank across all managers
    pub rank: Option<u32>,

    /// Overall rank after this gameweek
    pub overall_rank: Option<u32>,

    /// Money in the bank, in millions
    pub bank: f64,

    /// Squad value, in millions
    pub value: f64,

    pub transfers: u32,

    /// Points deducted for extra transfers
    pub transfer_cost: i32,

    pub bench_points: i32,
}

/// A league participant's current-state view.
///
/// Built fresh on every aggregation run and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagerStanding {
    pub id: ManagerId,

    pub manager_name: String,

    pub team_name: String,

    /// Season cumulative points
    pub total_points: i32,

    /// Points in the current gameweek
    pub gameweek_points: i32,

    /// Current league rank
    pub rank: u32,

    /// League rank before the current gameweek (0 when unknown)
    pub previous_rank: u32,

    /// `previous_rank - rank`; positive means the manager climbed
    pub rank_change: i64,

    /// Overall game rank from the manager's profile
    pub overall_rank: Option<u32>,

    /// Mean points of the last five gameweeks, or "N/A"
    pub form: String,

    pub chips_used: Vec<String>,

    pub bank: f64,

    pub team_value: f64,

    /// False when the per-manager enrichment fetch failed or timed out.
    /// Such entries carry only what the standings page reported.
    pub has_data: bool,

    pub history: Vec<GameweekHistory>,
}

impl ManagerStanding {
    /// Number of chips the manager has played this season.
    pub fn chip_count(&self) -> usize {
        self.chips_used.len()
    }
}
