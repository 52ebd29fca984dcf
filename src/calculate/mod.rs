//! Statistics calculation engine.
//!
//! Pure functions computing derived league data:
//! - Manager form, rank movement and squad value
//! - The per-gameweek leaderboard pivot
//! - League-wide summary statistics

use std::collections::BTreeMap;

use crate::models::{
    GameweekHistory, GameweekResult, GameweekRow, LeagueStats, ManagerStanding, Position,
    FORM_UNAVAILABLE,
};

/// Gameweeks averaged for the form label.
pub const FORM_WINDOW: usize = 5;

/// Bank balance when no history is available, in millions.
pub const DEFAULT_BANK: f64 = 0.0;

/// Starting squad value, in millions.
pub const DEFAULT_TEAM_VALUE: f64 = 100.0;

/// Round to `places` decimal places.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Mean of integer values rounded to the nearest integer; 0 when empty.
pub fn rounded_mean(values: &[i32]) -> i32 {
    if values.is_empty() {
        return 0;
    }
    let sum: i64 = values.iter().map(|&v| v as i64).sum();
    (sum as f64 / values.len() as f64).round() as i32
}

/// Rank movement: positive when the manager climbed.
///
/// A previous rank of 0 means the upstream has no prior rank (new entry or
/// first gameweek), which counts as no movement.
pub fn rank_change(previous: u32, current: u32) -> i64 {
    if previous == 0 {
        0
    } else {
        previous as i64 - current as i64
    }
}

/// Average points over the last [`FORM_WINDOW`] gameweeks, one decimal place.
///
/// Callers pass completed gameweeks only.
pub fn form_label(history: &[GameweekHistory]) -> String {
    if history.is_empty() {
        return FORM_UNAVAILABLE.to_string();
    }
    let window = &history[history.len().saturating_sub(FORM_WINDOW)..];
    let sum: i32 = window.iter().map(|gw| gw.points).sum();
    format!("{:.1}", sum as f64 / window.len() as f64)
}

/// Bank and squad value from the most recent gameweek.
pub fn latest_finances(history: &[GameweekHistory]) -> (f64, f64) {
    history
        .last()
        .map(|gw| (gw.bank, gw.value))
        .unwrap_or((DEFAULT_BANK, DEFAULT_TEAM_VALUE))
}

/// Percentage of managers with enrichment data, rounded; 0 when none.
pub fn data_completeness(with_data: usize, processed: usize) -> u32 {
    if processed == 0 {
        return 0;
    }
    (with_data as f64 * 100.0 / processed as f64).round() as u32
}

/// Pivot per-manager histories into per-gameweek leaderboards.
///
/// Rows exist only for gameweeks with at least one manager, ascending by
/// gameweek. Within a row managers are sorted by raw points descending; the
/// sort is stable, so ties keep standings order.
pub fn build_gameweek_table(standings: &[ManagerStanding]) -> Vec<GameweekRow> {
    let mut by_gameweek: BTreeMap<u32, Vec<GameweekResult>> = BTreeMap::new();

    for standing in standings {
        for gw in &standing.history {
            by_gameweek
                .entry(gw.gameweek)
                .or_default()
                .push(GameweekResult {
                    manager_id: standing.id,
                    manager_name: standing.manager_name.clone(),
                    team_name: standing.team_name.clone(),
                    points: gw.points,
                    total_points: gw.total_points,
                    rank: gw.rank,
                    transfers: gw.transfers,
                    transfer_cost: gw.transfer_cost,
                    bench_points: gw.bench_points,
                    net_points: gw.points - gw.transfer_cost,
                });
        }
    }

    by_gameweek
        .into_iter()
        .map(|(gameweek, mut managers)| {
            managers.sort_by(|a, b| b.points.cmp(&a.points));
            let scores: Vec<i32> = managers.iter().map(|m| m.points).collect();
            let (winner, highest_score) = managers
                .first()
                .map(|top| (top.team_name.clone(), top.points))
                .unwrap_or_default();
            GameweekRow {
                gameweek,
                winner,
                highest_score,
                average_score: rounded_mean(&scores),
                managers,
            }
        })
        .collect()
}

/// League-wide summary over the standings.
pub fn compute_league_stats(standings: &[ManagerStanding]) -> LeagueStats {
    if standings.is_empty() {
        return LeagueStats::default();
    }

    let totals: Vec<i32> = standings.iter().map(|s| s.total_points).collect();
    let gameweek: Vec<i32> = standings.iter().map(|s| s.gameweek_points).collect();
    let value_sum: f64 = standings.iter().map(|s| s.team_value).sum();

    LeagueStats {
        manager_count: standings.len(),
        average_total_score: rounded_mean(&totals),
        highest_total_score: totals.iter().copied().max().unwrap_or(0),
        lowest_total_score: totals.iter().copied().min().unwrap_or(0),
        average_gameweek_score: rounded_mean(&gameweek),
        highest_gameweek_score: gameweek.iter().copied().max().unwrap_or(0),
        total_chips_used: standings.iter().map(|s| s.chip_count()).sum(),
        average_team_value: round_to(value_sum / standings.len() as f64, 1),
    }
}

/// Outfield shape of a starting XI, e.g. "4-4-2".
pub fn formation(starters: &[Option<Position>]) -> String {
    let count = |pos: Position| starters.iter().filter(|p| **p == Some(pos)).count();
    format!(
        "{}-{}-{}",
        count(Position::Def),
        count(Position::Mid),
        count(Position::Fwd)
    )
}
