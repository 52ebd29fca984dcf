//! Wire formats of the FPL API.
//!
//! Only the fields this service reads are declared. Fields the upstream is
//! known to send as `null` are `Option`s; fields it may leave out get a
//! serde default. Normalisation into the domain model happens in one place
//! later.

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct RawBootstrap {
    #[serde(default)]
    pub events: Vec<RawEvent>,
    #[serde(default)]
    pub teams: Vec<RawTeam>,
    #[serde(default)]
    pub elements: Vec<RawElement>,
    #[serde(default)]
    pub total_players: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawEvent {
    pub id: u32,
    #[serde(default)]
    pub name: String,
    pub deadline_time: Option<String>,
    #[serde(default)]
    pub average_entry_score: i32,
    pub highest_score: Option<i32>,
    #[serde(default)]
    pub finished: bool,
    #[serde(default)]
    pub data_checked: bool,
    #[serde(default)]
    pub is_current: bool,
    #[serde(default)]
    pub is_next: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawTeam {
    pub id: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub short_name: String,
}

/// A player in the game.
#[derive(Debug, Clone, Deserialize)]
pub struct RawElement {
    pub id: u32,
    #[serde(default)]
    pub web_name: String,
    #[serde(default)]
    pub team: u32,
    #[serde(default)]
    pub element_type: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawLeagueStandings {
    pub league: RawLeague,
    pub standings: RawStandingsPage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawLeague {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    pub created: Option<String>,
    pub admin_entry: Option<u64>,
    #[serde(default)]
    pub scoring: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawStandingsPage {
    #[serde(default)]
    pub has_next: bool,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default)]
    pub results: Vec<RawStandingEntry>,
}

fn default_page() -> u32 {
    1
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawStandingEntry {
    /// Entry id (the manager)
    pub entry: u64,
    #[serde(default)]
    pub entry_name: String,
    #[serde(default)]
    pub player_name: String,
    #[serde(default)]
    pub event_total: i32,
    #[serde(default)]
    pub total: i32,
    #[serde(default)]
    pub rank: u32,
    #[serde(default)]
    pub last_rank: u32,
}

/// A manager's profile.
#[derive(Debug, Clone, Deserialize)]
pub struct RawEntry {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub player_first_name: String,
    #[serde(default)]
    pub player_last_name: String,
    pub summary_overall_points: Option<i32>,
    pub summary_overall_rank: Option<u32>,
    pub summary_event_points: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawHistory {
    #[serde(default)]
    pub current: Vec<RawGameweekHistory>,
    #[serde(default)]
    pub past: Vec<RawPastSeason>,
    #[serde(default)]
    pub chips: Vec<RawChip>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawGameweekHistory {
    pub event: u32,
    #[serde(default)]
    pub points: i32,
    #[serde(default)]
    pub total_points: i32,
    pub rank: Option<u32>,
    pub overall_rank: Option<u32>,
    /// Tenths of a million
    #[serde(default)]
    pub bank: i64,
    /// Tenths of a million
    #[serde(default)]
    pub value: i64,
    #[serde(default)]
    pub event_transfers: u32,
    #[serde(default)]
    pub event_transfers_cost: i32,
    #[serde(default)]
    pub points_on_bench: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawPastSeason {
    pub season_name: String,
    #[serde(default)]
    pub total_points: i32,
    pub rank: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawChip {
    pub name: String,
    pub time: Option<String>,
    pub event: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawPicks {
    pub active_chip: Option<String>,
    pub entry_history: Option<RawGameweekHistory>,
    #[serde(default)]
    pub picks: Vec<RawPick>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawPick {
    pub element: u32,
    pub position: u32,
    #[serde(default)]
    pub multiplier: u32,
    #[serde(default)]
    pub is_captain: bool,
    #[serde(default)]
    pub is_vice_captain: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawLiveEvent {
    #[serde(default)]
    pub elements: Vec<RawLiveElement>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawLiveElement {
    pub id: u32,
    pub stats: RawLiveStats,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawLiveStats {
    #[serde(default)]
    pub total_points: i32,
    #[serde(default)]
    pub minutes: u32,
}
