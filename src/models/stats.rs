//! Derived statistics models.

use serde::{Deserialize, Serialize};

/// Aggregate numeric summary over a league's standings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeagueStats {
    /// Number of standings the summary was computed over
    pub manager_count: usize,

    /// Mean season total, rounded to the nearest point
    pub average_total_score: i32,

    pub highest_total_score: i32,

    pub lowest_total_score: i32,

    /// Mean current-gameweek score, rounded to the nearest point
    pub average_gameweek_score: i32,

    pub highest_gameweek_score: i32,

    pub total_chips_used: usize,

    /// Mean squad value in millions, one decimal place
    pub average_team_value: f64,
}

/// Diagnostic metadata carried alongside a snapshot. Not business data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Performance {
    /// Wall-clock aggregation time in milliseconds
    pub total_time: u64,

    pub managers_processed: usize,

    pub managers_with_data: usize,

    /// Percentage of processed managers with `has_data == true`
    pub data_completeness: u32,

    /// True when the enrichment deadline cut some fetches short
    pub deadline_exceeded: bool,
}
