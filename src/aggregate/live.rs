//! Gameweek lineups and live league scoring.

use std::collections::HashMap;

use tracing::{info, warn};

use super::{normalize, AggregateError, LeagueAggregator};
use crate::calculate::formation;
use crate::models::{LeagueId, LiveScore, ManagerId, PickedPlayer, Position, TeamPicks};
use crate::upstream::{RawBootstrap, RawLiveEvent, RawPicks, RawStandingEntry};

/// Squad slots 1 to 11 start; the rest are on the bench.
pub const STARTING_SLOTS: u32 = 11;

/// Live points keyed by player id.
pub fn live_points_index(live: &RawLiveEvent) -> HashMap<u32, i32> {
    live.elements
        .iter()
        .map(|el| (el.id, el.stats.total_points))
        .collect()
}

/// Points a lineup scores with multipliers applied, before transfer cost.
fn lineup_points(picks: &RawPicks, points: &HashMap<u32, i32>) -> i32 {
    picks
        .picks
        .iter()
        .map(|p| points.get(&p.element).copied().unwrap_or(0) * p.multiplier as i32)
        .sum()
}

fn transfer_cost(picks: &RawPicks) -> i32 {
    picks
        .entry_history
        .as_ref()
        .map(|h| h.event_transfers_cost)
        .unwrap_or(0)
}

/// Resolve a manager's picks against season reference data.
///
/// Player points are 0 when no live data is available.
pub fn team_picks(
    manager_id: ManagerId,
    event_id: u32,
    bootstrap: &RawBootstrap,
    picks: &RawPicks,
    live: Option<&RawLiveEvent>,
) -> TeamPicks {
    let elements: HashMap<_, _> = bootstrap.elements.iter().map(|e| (e.id, e)).collect();
    let clubs: HashMap<_, _> = bootstrap.teams.iter().map(|t| (t.id, t)).collect();
    let points = live.map(live_points_index).unwrap_or_default();

    let mut players: Vec<PickedPlayer> = picks
        .picks
        .iter()
        .map(|pick| {
            let element = elements.get(&pick.element);
            PickedPlayer {
                element_id: pick.element,
                name: element
                    .map(|e| e.web_name.clone())
                    .unwrap_or_else(|| format!("Player {}", pick.element)),
                team: element
                    .and_then(|e| clubs.get(&e.team))
                    .map(|t| t.short_name.clone())
                    .unwrap_or_default(),
                position: element.and_then(|e| Position::from_element_type(e.element_type)),
                slot: pick.position,
                multiplier: pick.multiplier,
                is_captain: pick.is_captain,
                is_vice_captain: pick.is_vice_captain,
                points: points.get(&pick.element).copied().unwrap_or(0),
            }
        })
        .collect();
    players.sort_by_key(|p| p.slot);

    let captain = players.iter().find(|p| p.is_captain).map(|p| p.name.clone());
    let vice_captain = players
        .iter()
        .find(|p| p.is_vice_captain)
        .map(|p| p.name.clone());
    let (starting_xi, bench): (Vec<_>, Vec<_>) = players
        .into_iter()
        .partition(|p| p.slot <= STARTING_SLOTS);
    let positions: Vec<_> = starting_xi.iter().map(|p| p.position).collect();

    TeamPicks {
        manager_id,
        event_id,
        active_chip: picks.active_chip.clone(),
        formation: formation(&positions),
        starting_xi,
        bench,
        captain,
        vice_captain,
        total_points: lineup_points(picks, &points),
        transfer_cost: transfer_cost(picks),
    }
}

/// Live score for one standings row.
pub fn live_score(
    raw: &RawStandingEntry,
    picks: Option<&RawPicks>,
    points: &HashMap<u32, i32>,
) -> LiveScore {
    let id = ManagerId::new(raw.entry);
    let (live_points, cost) = picks
        .map(|p| {
            let cost = transfer_cost(p);
            (lineup_points(p, points) - cost, cost)
        })
        .unwrap_or((0, 0));

    LiveScore {
        manager_id: id,
        manager_name: normalize::manager_name(id, raw, None),
        team_name: normalize::team_name(id, raw, None),
        live_points,
        transfer_cost: cost,
        active_chip: picks.and_then(|p| p.active_chip.clone()),
        projected_total: raw.total - raw.event_total + live_points,
        has_data: picks.is_some(),
    }
}

impl LeagueAggregator {
    /// Live points for the top of a league's standings in one gameweek.
    ///
    /// Sorted by live points, highest first. Managers whose picks could not
    /// be fetched are kept with `has_data = false`.
    pub async fn live_scores(
        &self,
        league_id: LeagueId,
        gameweek: u32,
    ) -> Result<Vec<LiveScore>, AggregateError> {
        let standings = async {
            self.api
                .league_standings(league_id, 1)
                .await
                .map_err(|source| AggregateError::UpstreamUnavailable {
                    resource: "standings",
                    source,
                })
        };
        let live = async {
            self.api
                .live_event(gameweek)
                .await
                .map_err(|source| AggregateError::UpstreamUnavailable {
                    resource: "live data",
                    source,
                })
        };
        let (standings, live) = tokio::try_join!(standings, live)?;
        let points = live_points_index(&live);

        let selected: Vec<_> = standings
            .standings
            .results
            .iter()
            .take(self.settings.max_managers)
            .collect();
        let picks = self
            .limiter
            .run_all(
                selected
                    .iter()
                    .map(|raw| self.api.event_picks(ManagerId::new(raw.entry), gameweek)),
            )
            .await?;

        let mut scores: Vec<LiveScore> = selected
            .iter()
            .zip(picks)
            .map(|(raw, picks)| match picks {
                Ok(picks) => live_score(raw, Some(&picks), &points),
                Err(e) => {
                    warn!("Picks unavailable for manager {}: {}", raw.entry, e);
                    live_score(raw, None, &points)
                }
            })
            .collect();
        scores.sort_by(|a, b| b.live_points.cmp(&a.live_points));

        info!(
            "Live scores for league {} gameweek {}: {} managers",
            league_id,
            gameweek,
            scores.len()
        );
        Ok(scores)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::AggregationSettings;
    use crate::limiter::ConcurrencyLimiter;
    use crate::upstream::fake::{self, FakeFplApi};
    use std::sync::Arc;

    /// Every squad player scores 2, except `star` who scores 10.
    fn flat_live(star: u32) -> RawLiveEvent {
        let points: Vec<_> = (1..=15)
            .map(|id| (id, if id == star { 10 } else { 2 }))
            .collect();
        fake::live(&points)
    }

    #[test]
    fn test_team_picks_lineup() {
        let bootstrap = fake::bootstrap(38, 3);
        let picks = fake::picks(13, 4);

        let team = team_picks(
            ManagerId::new(5),
            3,
            &bootstrap,
            &picks,
            Some(&flat_live(13)),
        );

        assert_eq!(team.starting_xi.len(), 11);
        assert_eq!(team.bench.len(), 4);
        assert_eq!(team.formation, "4-4-2");
        assert_eq!(team.captain.as_deref(), Some("Player13"));
        assert_eq!(team.starting_xi[0].position, Some(Position::Gkp));
        assert_eq!(team.starting_xi[0].team, "LIV");
        // Ten starters at 2, captain 10 doubled, bench ignored
        assert_eq!(team.total_points, 40);
        assert_eq!(team.transfer_cost, 4);
        assert!(team.bench.iter().all(|p| p.multiplier == 0));
    }

    #[test]
    fn test_team_picks_without_live_data() {
        let team = team_picks(
            ManagerId::new(5),
            3,
            &fake::bootstrap(38, 3),
            &fake::picks(13, 0),
            None,
        );

        assert_eq!(team.total_points, 0);
        assert!(team.starting_xi.iter().all(|p| p.points == 0));
    }

    #[test]
    fn test_team_picks_unknown_element() {
        let mut picks = fake::picks(13, 0);
        picks.picks[0].element = 999;

        let team = team_picks(ManagerId::new(5), 3, &fake::bootstrap(38, 3), &picks, None);

        assert_eq!(team.starting_xi[0].name, "Player 999");
        assert_eq!(team.starting_xi[0].position, None);
        assert_eq!(team.starting_xi[0].team, "");
    }

    #[test]
    fn test_live_score_nets_transfer_cost() {
        let raw = fake::standing(1, 200, 50, 1, 1);
        let points = live_points_index(&flat_live(13));

        let score = live_score(&raw, Some(&fake::picks(13, 4)), &points);

        assert_eq!(score.live_points, 36);
        assert_eq!(score.transfer_cost, 4);
        assert_eq!(score.projected_total, 186);
        assert!(score.has_data);
    }

    #[tokio::test]
    async fn test_live_scores_sorted_and_partial() {
        let results = vec![
            fake::standing(1, 300, 60, 1, 1),
            fake::standing(2, 290, 55, 2, 2),
            fake::standing(3, 280, 50, 3, 3),
        ];
        let api = FakeFplApi::new()
            .with_league(fake::league(77, results))
            .with_live(3, flat_live(14))
            // Manager 1 captains a 2-pointer, manager 2 the star
            .with_picks(1, 3, fake::picks(1, 0))
            .with_picks(2, 3, fake::picks(14, 0))
            .failing_manager(3);
        let engine = LeagueAggregator::new(
            Arc::new(api),
            Arc::new(ConcurrencyLimiter::new(3).unwrap()),
            AggregationSettings::default(),
        );

        let scores = engine.live_scores(LeagueId::new(77), 3).await.unwrap();

        let order: Vec<u64> = scores.iter().map(|s| s.manager_id.get()).collect();
        assert_eq!(order, vec![2, 1, 3]);
        assert_eq!(scores[0].live_points, 40);
        assert_eq!(scores[1].live_points, 32);
        assert!(!scores[2].has_data);
        assert_eq!(scores[2].live_points, 0);
    }

    #[tokio::test]
    async fn test_live_scores_require_live_data() {
        let api = FakeFplApi::new().with_league(fake::league(77, vec![]));
        let engine = LeagueAggregator::new(
            Arc::new(api),
            Arc::new(ConcurrencyLimiter::new(3).unwrap()),
            AggregationSettings::default(),
        );

        let err = engine.live_scores(LeagueId::new(77), 3).await.unwrap_err();
        assert!(matches!(
            err,
            AggregateError::UpstreamUnavailable {
                resource: "live data",
                ..
            }
        ));
    }
}
