//! In-memory [`FplApi`] and fixture builders for tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use super::*;

fn not_found() -> FetchError {
    FetchError::HttpStatus {
        status: 404,
        message: "Not Found".to_string(),
    }
}

fn unavailable() -> FetchError {
    FetchError::HttpStatus {
        status: 503,
        message: "Service Unavailable".to_string(),
    }
}

/// Serves canned upstream payloads and counts calls.
#[derive(Default)]
pub struct FakeFplApi {
    bootstrap: Option<RawBootstrap>,
    leagues: HashMap<u64, RawLeagueStandings>,
    entries: HashMap<u64, RawEntry>,
    histories: HashMap<u64, RawHistory>,
    picks: HashMap<(u64, u32), RawPicks>,
    live: HashMap<u32, RawLiveEvent>,
    failing_managers: HashSet<u64>,
    slow_managers: HashMap<u64, Duration>,
    upstream_down: AtomicBool,
    pub bootstrap_calls: AtomicUsize,
    pub standings_calls: AtomicUsize,
    pub manager_calls: AtomicUsize,
    pub picks_calls: AtomicUsize,
}

impl FakeFplApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bootstrap(mut self, bootstrap: RawBootstrap) -> Self {
        self.bootstrap = Some(bootstrap);
        self
    }

    pub fn with_league(mut self, standings: RawLeagueStandings) -> Self {
        self.leagues.insert(standings.league.id, standings);
        self
    }

    pub fn with_manager(mut self, entry: RawEntry, history: RawHistory) -> Self {
        self.histories.insert(entry.id, history);
        self.entries.insert(entry.id, entry);
        self
    }

    pub fn with_picks(mut self, manager_id: u64, gameweek: u32, picks: RawPicks) -> Self {
        self.picks.insert((manager_id, gameweek), picks);
        self
    }

    pub fn with_live(mut self, gameweek: u32, live: RawLiveEvent) -> Self {
        self.live.insert(gameweek, live);
        self
    }

    /// Make every per-manager call for `manager_id` fail.
    pub fn failing_manager(mut self, manager_id: u64) -> Self {
        self.failing_managers.insert(manager_id);
        self
    }

    /// Delay per-manager calls for `manager_id`.
    pub fn slow_manager(mut self, manager_id: u64, delay: Duration) -> Self {
        self.slow_managers.insert(manager_id, delay);
        self
    }

    /// Toggle a total bootstrap and standings outage.
    pub fn set_upstream_down(&self, down: bool) {
        self.upstream_down.store(down, Ordering::SeqCst);
    }

    fn is_down(&self) -> bool {
        self.upstream_down.load(Ordering::SeqCst)
    }

    async fn manager_call(&self, manager_id: ManagerId) -> Result<(), FetchError> {
        self.manager_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.slow_managers.get(&manager_id.get()) {
            tokio::time::sleep(*delay).await;
        }
        if self.failing_managers.contains(&manager_id.get()) {
            return Err(unavailable());
        }
        Ok(())
    }
}

#[async_trait]
impl FplApi for FakeFplApi {
    async fn bootstrap(&self) -> Result<RawBootstrap, FetchError> {
        self.bootstrap_calls.fetch_add(1, Ordering::SeqCst);
        if self.is_down() {
            return Err(unavailable());
        }
        self.bootstrap.clone().ok_or_else(not_found)
    }

    async fn league_standings(
        &self,
        league_id: LeagueId,
        _page: u32,
    ) -> Result<RawLeagueStandings, FetchError> {
        self.standings_calls.fetch_add(1, Ordering::SeqCst);
        if self.is_down() {
            return Err(unavailable());
        }
        self.leagues
            .get(&league_id.get())
            .cloned()
            .ok_or_else(not_found)
    }

    async fn manager_entry(&self, manager_id: ManagerId) -> Result<RawEntry, FetchError> {
        self.manager_call(manager_id).await?;
        self.entries
            .get(&manager_id.get())
            .cloned()
            .ok_or_else(not_found)
    }

    async fn manager_history(&self, manager_id: ManagerId) -> Result<RawHistory, FetchError> {
        self.manager_call(manager_id).await?;
        self.histories
            .get(&manager_id.get())
            .cloned()
            .ok_or_else(not_found)
    }

    async fn event_picks(
        &self,
        manager_id: ManagerId,
        gameweek: u32,
    ) -> Result<RawPicks, FetchError> {
        self.picks_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_managers.contains(&manager_id.get()) {
            return Err(unavailable());
        }
        self.picks
            .get(&(manager_id.get(), gameweek))
            .cloned()
            .ok_or_else(not_found)
    }

    async fn live_event(&self, gameweek: u32) -> Result<RawLiveEvent, FetchError> {
        self.live.get(&gameweek).cloned().ok_or_else(not_found)
    }
}

// ── Fixtures ─────────────────────────────────────────────────────

pub fn event(id: u32, finished: bool, is_current: bool) -> RawEvent {
    RawEvent {
        id,
        name: format!("Gameweek {}", id),
        deadline_time: Some(format!("2024-08-{:02}T17:30:00Z", (id % 28) + 1)),
        average_entry_score: 50,
        highest_score: Some(120),
        finished,
        data_checked: finished,
        is_current,
        is_next: false,
    }
}

/// A season of `total` gameweeks with `current` in progress.
pub fn bootstrap(total: u32, current: u32) -> RawBootstrap {
    RawBootstrap {
        events: (1..=total)
            .map(|id| event(id, id < current, id == current))
            .collect(),
        teams: vec![
            RawTeam {
                id: 1,
                name: "Arsenal".to_string(),
                short_name: "ARS".to_string(),
            },
            RawTeam {
                id: 2,
                name: "Liverpool".to_string(),
                short_name: "LIV".to_string(),
            },
        ],
        elements: (1..=15)
            .map(|id| RawElement {
                id,
                web_name: format!("Player{}", id),
                team: 1 + id % 2,
                // 2 GKP, 5 DEF, 5 MID, 3 FWD
                element_type: match id {
                    1..=2 => 1,
                    3..=7 => 2,
                    8..=12 => 3,
                    _ => 4,
                },
            })
            .collect(),
        total_players: 11_000_000,
    }
}

pub fn standing(entry: u64, total: i32, event_total: i32, rank: u32, last_rank: u32) -> RawStandingEntry {
    RawStandingEntry {
        entry,
        entry_name: format!("Team {}", entry),
        player_name: format!("Player {}", entry),
        event_total,
        total,
        rank,
        last_rank,
    }
}

pub fn league(id: u64, results: Vec<RawStandingEntry>) -> RawLeagueStandings {
    RawLeagueStandings {
        league: RawLeague {
            id,
            name: "Office League".to_string(),
            created: Some("2024-07-20T10:12:33.123456Z".to_string()),
            admin_entry: results.first().map(|r| r.entry),
            scoring: "c".to_string(),
        },
        standings: RawStandingsPage {
            has_next: false,
            page: 1,
            results,
        },
    }
}

pub fn entry(id: u64) -> RawEntry {
    RawEntry {
        id,
        name: format!("Profile Team {}", id),
        player_first_name: "First".to_string(),
        player_last_name: format!("Last{}", id),
        summary_overall_points: None,
        summary_overall_rank: Some(1000 + id as u32),
        summary_event_points: None,
    }
}

/// History with the given `(gameweek, points)` pairs and running totals.
pub fn history(points: &[(u32, i32)]) -> RawHistory {
    let mut total = 0;
    let current = points
        .iter()
        .map(|&(event, pts)| {
            total += pts;
            RawGameweekHistory {
                event,
                points: pts,
                total_points: total,
                rank: Some(100_000),
                overall_rank: Some(50_000),
                bank: 5,
                value: 1000 + event as i64,
                event_transfers: 1,
                event_transfers_cost: 0,
                points_on_bench: 3,
            }
        })
        .collect();
    RawHistory {
        current,
        past: vec![],
        chips: vec![],
    }
}

/// Squad order for [`picks`]: GKP, 4 DEF, 4 MID, 2 FWD, then the bench.
pub const SQUAD: [u32; 15] = [1, 3, 4, 5, 6, 8, 9, 10, 11, 13, 14, 2, 7, 12, 15];

/// A 4-4-2 lineup over the [`bootstrap`] players with `captain` doubled.
pub fn picks(captain: u32, transfer_cost: i32) -> RawPicks {
    RawPicks {
        active_chip: None,
        entry_history: Some(RawGameweekHistory {
            event: 3,
            points: 0,
            total_points: 0,
            rank: None,
            overall_rank: None,
            bank: 0,
            value: 1000,
            event_transfers: (transfer_cost / 4) as u32,
            event_transfers_cost: transfer_cost,
            points_on_bench: 0,
        }),
        picks: SQUAD
            .iter()
            .enumerate()
            .map(|(i, &element)| {
                let slot = i as u32 + 1;
                RawPick {
                    element,
                    position: slot,
                    multiplier: if slot > 11 {
                        0
                    } else if element == captain {
                        2
                    } else {
                        1
                    },
                    is_captain: element == captain,
                    is_vice_captain: false,
                }
            })
            .collect(),
    }
}

/// Live data with the given `(element, points)` pairs.
pub fn live(points: &[(u32, i32)]) -> RawLiveEvent {
    RawLiveEvent {
        elements: points
            .iter()
            .map(|&(id, total_points)| RawLiveElement {
                id,
                stats: RawLiveStats {
                    total_points,
                    minutes: 90,
                },
            })
            .collect(),
    }
}
