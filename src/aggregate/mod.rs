//! League aggregation engine.
//!
//! Builds a [`LeagueSnapshot`] from the upstream API:
//! 1. bootstrap and standings, fetched concurrently (both required)
//! 2. per-manager profile and history, fanned out through the limiter
//!    (failures are tolerated and recorded as `has_data = false`)
//! 3. normalisation, gameweek pivot and league statistics
//!
//! [`live`] builds gameweek lineups and live league scores on the same
//! upstream plumbing.

pub mod live;
pub mod normalize;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::calculate::{build_gameweek_table, compute_league_stats, data_completeness};
use crate::config::AggregationConfig;
use crate::fetch::FetchError;
use crate::limiter::{ConcurrencyLimiter, LimiterError};
use crate::models::{LeagueId, LeagueSnapshot, ManagerId, Performance};
use crate::upstream::FplApi;

pub use normalize::ManagerDetail;

/// Errors that abort an aggregation run.
#[derive(Debug, Error)]
pub enum AggregateError {
    #[error("Upstream {resource} unavailable: {source}")]
    UpstreamUnavailable {
        resource: &'static str,
        #[source]
        source: FetchError,
    },

    #[error("Concurrency limiter error: {0}")]
    Limiter(#[from] LimiterError),
}

/// Anything that can produce a fresh league snapshot.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    async fn snapshot(&self, league_id: LeagueId) -> Result<LeagueSnapshot, AggregateError>;
}

/// Tunables for one aggregation run.
#[derive(Debug, Clone)]
pub struct AggregationSettings {
    /// Standings entries enriched per run, from the top of the table
    pub max_managers: usize,

    /// Ceiling on the whole enrichment phase
    pub enrichment_deadline: Duration,
}

impl Default for AggregationSettings {
    fn default() -> Self {
        Self {
            max_managers: 15,
            enrichment_deadline: Duration::from_secs(20),
        }
    }
}

impl From<&AggregationConfig> for AggregationSettings {
    fn from(config: &AggregationConfig) -> Self {
        Self {
            max_managers: config.max_managers,
            enrichment_deadline: Duration::from_secs(config.enrichment_deadline_seconds),
        }
    }
}

/// Outcome of one manager's enrichment.
#[derive(Debug)]
enum Enrichment {
    Loaded(ManagerDetail),
    Failed(FetchError),
    TimedOut,
}

/// Orchestrates upstream fetches into a league snapshot.
pub struct LeagueAggregator {
    api: Arc<dyn FplApi>,
    limiter: Arc<ConcurrencyLimiter>,
    settings: AggregationSettings,
}

impl LeagueAggregator {
    pub fn new(
        api: Arc<dyn FplApi>,
        limiter: Arc<ConcurrencyLimiter>,
        settings: AggregationSettings,
    ) -> Self {
        Self {
            api,
            limiter,
            settings,
        }
    }

    /// Run a full aggregation for one league.
    pub async fn aggregate(&self, league_id: LeagueId) -> Result<LeagueSnapshot, AggregateError> {
        let started = Instant::now();
        info!("Aggregating league {}", league_id);

        let bootstrap = async {
            self.api
                .bootstrap()
                .await
                .map_err(|source| AggregateError::UpstreamUnavailable {
                    resource: "bootstrap",
                    source,
                })
        };
        let standings = async {
            self.api
                .league_standings(league_id, 1)
                .await
                .map_err(|source| AggregateError::UpstreamUnavailable {
                    resource: "standings",
                    source,
                })
        };
        let (bootstrap, standings) = tokio::try_join!(bootstrap, standings)?;

        let selected: Vec<_> = standings
            .standings
            .results
            .iter()
            .take(self.settings.max_managers)
            .collect();
        debug!(
            "League {} has {} entries on page 1, enriching {}",
            league_id,
            standings.standings.results.len(),
            selected.len()
        );

        let deadline = Instant::now() + self.settings.enrichment_deadline;
        let enrichments = futures::future::try_join_all(
            selected
                .iter()
                .map(|raw| self.enrich(ManagerId::new(raw.entry), deadline)),
        )
        .await?;
        let completed = normalize::completed_gameweeks(&bootstrap);

        let mut deadline_exceeded = false;
        let standings_out: Vec<_> = selected
            .iter()
            .zip(enrichments)
            .map(|(raw, enrichment)| {
                let detail = match enrichment {
                    Enrichment::Loaded(detail) => Some(detail),
                    Enrichment::Failed(err) => {
                        warn!("Enrichment failed for manager {}: {}", raw.entry, err);
                        None
                    }
                    Enrichment::TimedOut => {
                        deadline_exceeded = true;
                        warn!("Enrichment deadline passed for manager {}", raw.entry);
                        None
                    }
                };
                normalize::manager_standing(raw, detail.as_ref(), &completed)
            })
            .collect();

        let gameweek_table = build_gameweek_table(&standings_out);
        let league_stats = compute_league_stats(&standings_out);
        let with_data = standings_out.iter().filter(|s| s.has_data).count();

        let performance = Performance {
            total_time: started.elapsed().as_millis() as u64,
            managers_processed: standings_out.len(),
            managers_with_data: with_data,
            data_completeness: data_completeness(with_data, standings_out.len()),
            deadline_exceeded,
        };
        info!(
            "League {} aggregated in {}ms ({}/{} managers with data)",
            league_id, performance.total_time, with_data, performance.managers_processed
        );

        Ok(LeagueSnapshot {
            league: normalize::league_info(&standings.league),
            bootstrap: normalize::bootstrap_summary(&bootstrap),
            standings: standings_out,
            gameweek_table,
            league_stats,
            performance,
            timestamp: Utc::now(),
        })
    }

    /// Fetch one manager's profile and history through the limiter.
    ///
    /// The deadline covers the wait for a limiter slot as well as the fetch.
    async fn enrich(
        &self,
        manager_id: ManagerId,
        deadline: Instant,
    ) -> Result<Enrichment, LimiterError> {
        let fetch = self.limiter.run(async {
            tokio::try_join!(
                self.api.manager_entry(manager_id),
                self.api.manager_history(manager_id)
            )
        });
        match tokio::time::timeout_at(deadline, fetch).await {
            Ok(Ok(Ok((entry, history)))) => {
                Ok(Enrichment::Loaded(ManagerDetail { entry, history }))
            }
            Ok(Ok(Err(err))) => Ok(Enrichment::Failed(err)),
            Ok(Err(err)) => Err(err),
            Err(_) => Ok(Enrichment::TimedOut),
        }
    }
}

#[async_trait]
impl SnapshotSource for LeagueAggregator {
    async fn snapshot(&self, league_id: LeagueId) -> Result<LeagueSnapshot, AggregateError> {
        self.aggregate(league_id).await
    }
}
