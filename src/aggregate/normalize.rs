//! Mapping of upstream payloads into the domain model.
//!
//! All name fallback chains live here. Precedence:
//! - team name: profile `name` -> standings `entry_name` -> "Manager {id}"
//! - manager name: profile first + last name -> standings `player_name`
//!   -> "Manager {id}"

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::calculate::{form_label, latest_finances, rank_change};
use crate::models::{
    BootstrapSummary, GameweekHistory, GameweekInfo, LeagueId, LeagueInfo, ManagerId,
    ManagerStanding, TeamInfo,
};
use crate::upstream::{
    RawBootstrap, RawEntry, RawEvent, RawGameweekHistory, RawHistory, RawLeague,
    RawStandingEntry, RawTeam,
};

/// Per-manager detail fetched during enrichment.
#[derive(Debug, Clone)]
pub struct ManagerDetail {
    pub entry: RawEntry,
    pub history: RawHistory,
}

/// Upstream money fields are tenths of a million.
fn millions(tenths: i64) -> f64 {
    tenths as f64 / 10.0
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn placeholder_name(id: ManagerId) -> String {
    format!("Manager {}", id)
}

pub fn team_name(id: ManagerId, raw: &RawStandingEntry, profile: Option<&RawEntry>) -> String {
    profile
        .and_then(|p| non_blank(&p.name))
        .or_else(|| non_blank(&raw.entry_name))
        .unwrap_or_else(|| placeholder_name(id))
}

pub fn manager_name(id: ManagerId, raw: &RawStandingEntry, profile: Option<&RawEntry>) -> String {
    profile
        .and_then(|p| non_blank(&format!("{} {}", p.player_first_name, p.player_last_name)))
        .or_else(|| non_blank(&raw.player_name))
        .unwrap_or_else(|| placeholder_name(id))
}

pub fn gameweek_history(raw: &RawGameweekHistory) -> GameweekHistory {
    GameweekHistory {
        gameweek: raw.event,
        points: raw.points,
        total_points: raw.total_points,
        rank: raw.rank,
        overall_rank: raw.overall_rank,
        bank: millions(raw.bank),
        value: millions(raw.value),
        transfers: raw.event_transfers,
        transfer_cost: raw.event_transfers_cost,
        bench_points: raw.points_on_bench,
    }
}

/// Gameweeks the bootstrap reports as finished.
pub fn completed_gameweeks(raw: &RawBootstrap) -> HashSet<u32> {
    raw.events
        .iter()
        .filter(|event| event.finished)
        .map(|event| event.id)
        .collect()
}

/// Build one standing from a standings row and optional enrichment.
///
/// Form only counts gameweeks in `completed`; an in-progress gameweek still
/// appears in `history`.
pub fn manager_standing(
    raw: &RawStandingEntry,
    detail: Option<&ManagerDetail>,
    completed: &HashSet<u32>,
) -> ManagerStanding {
    let id = ManagerId::new(raw.entry);
    let profile = detail.map(|d| &d.entry);

    let mut history: Vec<GameweekHistory> = detail
        .map(|d| d.history.current.iter().map(gameweek_history).collect())
        .unwrap_or_default();
    history.sort_by_key(|gw| gw.gameweek);

    let chips_used = detail
        .map(|d| d.history.chips.iter().map(|c| c.name.clone()).collect())
        .unwrap_or_default();
    let (bank, team_value) = latest_finances(&history);
    let finished: Vec<GameweekHistory> = history
        .iter()
        .filter(|gw| completed.contains(&gw.gameweek))
        .cloned()
        .collect();

    ManagerStanding {
        id,
        manager_name: manager_name(id, raw, profile),
        team_name: team_name(id, raw, profile),
        total_points: raw.total,
        gameweek_points: raw.event_total,
        rank: raw.rank,
        previous_rank: raw.last_rank,
        rank_change: rank_change(raw.last_rank, raw.rank),
        overall_rank: profile.and_then(|p| p.summary_overall_rank),
        form: form_label(&finished),
        chips_used,
        bank,
        team_value,
        has_data: detail.is_some(),
        history,
    }
}

pub fn league_info(raw: &RawLeague) -> LeagueInfo {
    LeagueInfo {
        id: LeagueId::new(raw.id),
        name: raw.name.clone(),
        created: raw
            .created
            .as_deref()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc)),
        admin_entry: raw.admin_entry.map(ManagerId::new),
        scoring: raw.scoring.clone(),
    }
}

pub fn gameweek_info(raw: &RawEvent) -> GameweekInfo {
    GameweekInfo {
        id: raw.id,
        name: raw.name.clone(),
        deadline: raw.deadline_time.clone(),
        average_score: raw.average_entry_score,
        highest_score: raw.highest_score,
        finished: raw.finished,
        is_current: raw.is_current,
        is_next: raw.is_next,
        data_checked: raw.data_checked,
    }
}

pub fn team_info(raw: &RawTeam) -> TeamInfo {
    TeamInfo {
        id: raw.id,
        name: raw.name.clone(),
        short_name: raw.short_name.clone(),
    }
}

pub fn bootstrap_summary(raw: &RawBootstrap) -> BootstrapSummary {
    let gameweeks: Vec<GameweekInfo> = raw.events.iter().map(gameweek_info).collect();
    BootstrapSummary {
        current_gameweek: BootstrapSummary::resolve_current(&gameweeks),
        total_gameweeks: gameweeks.len() as u32,
        gameweeks,
    }
}
