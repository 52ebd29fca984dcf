//! Typed access to the public FPL REST API.
//!
//! [`FplApi`] is the seam the rest of the crate depends on; the HTTP
//! implementation routes every call through the resilient [`Fetcher`].

mod types;

#[cfg(test)]
pub mod fake;

pub use types::*;

use async_trait::async_trait;
use tracing::debug;
use url::Url;

use crate::config::UpstreamConfig;
use crate::fetch::{FetchError, FetchOptions, Fetcher, FetcherConfig, RetryPolicy};
use crate::models::{LeagueId, ManagerId};

/// Read-only accessors for the upstream resources this service needs.
#[async_trait]
pub trait FplApi: Send + Sync {
    /// Season-wide reference data (gameweeks, clubs, players).
    async fn bootstrap(&self) -> Result<RawBootstrap, FetchError>;

    /// One page of a classic league's standings (1-based).
    async fn league_standings(
        &self,
        league_id: LeagueId,
        page: u32,
    ) -> Result<RawLeagueStandings, FetchError>;

    /// A manager's profile.
    async fn manager_entry(&self, manager_id: ManagerId) -> Result<RawEntry, FetchError>;

    /// A manager's gameweek-by-gameweek season history.
    async fn manager_history(&self, manager_id: ManagerId) -> Result<RawHistory, FetchError>;

    /// A manager's squad for one gameweek.
    async fn event_picks(
        &self,
        manager_id: ManagerId,
        gameweek: u32,
    ) -> Result<RawPicks, FetchError>;

    /// Live per-player points for one gameweek.
    async fn live_event(&self, gameweek: u32) -> Result<RawLiveEvent, FetchError>;
}

/// Per-resource call settings.
#[derive(Debug, Clone)]
pub struct CallProfile {
    /// League standings, picks, live data
    pub standard: FetchOptions,
    /// Large payloads (bootstrap)
    pub long: FetchOptions,
    /// Per-manager enrichment calls; smaller retry budget
    pub manager: FetchOptions,
}

impl Default for CallProfile {
    fn default() -> Self {
        let standard = FetchOptions::default();
        Self {
            long: standard
                .clone()
                .with_timeout(std::time::Duration::from_secs(15)),
            manager: standard.clone().with_retries(1),
            standard,
        }
    }
}

impl CallProfile {
    pub fn from_config(config: &UpstreamConfig) -> Self {
        let backoff = std::time::Duration::from_millis(config.backoff_step_ms);
        let standard = FetchOptions {
            timeout: std::time::Duration::from_secs(config.timeout_seconds),
            retry: RetryPolicy::new(config.max_retries, backoff),
        };
        Self {
            long: standard
                .clone()
                .with_timeout(std::time::Duration::from_secs(config.long_timeout_seconds)),
            manager: standard.clone().with_retries(config.manager_retries),
            standard,
        }
    }
}

/// [`FplApi`] over HTTP.
pub struct HttpFplApi {
    fetcher: Fetcher,
    base_url: Url,
    calls: CallProfile,
}

impl HttpFplApi {
    pub fn new(fetcher: Fetcher, base_url: Url, calls: CallProfile) -> Self {
        Self {
            fetcher,
            base_url,
            calls,
        }
    }

    /// Build a client from upstream configuration.
    pub fn from_config(config: &UpstreamConfig) -> Result<Self, FetchError> {
        let fetcher = Fetcher::new(FetcherConfig {
            user_agent: config.user_agent.clone(),
            ..Default::default()
        })?;
        let base_url = parse_base_url(&config.base_url)?;
        Ok(Self::new(
            fetcher,
            base_url,
            CallProfile::from_config(config),
        ))
    }

    /// Resolve a relative resource path against the base URL.
    fn endpoint(&self, path: &str) -> Result<Url, FetchError> {
        self.base_url
            .join(path)
            .map_err(|e| FetchError::InvalidUrl(format!("{}: {}", path, e)))
    }
}

/// Parse a base URL, making sure relative joins keep its last segment.
pub fn parse_base_url(raw: &str) -> Result<Url, FetchError> {
    let normalized = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{}/", raw)
    };
    Url::parse(&normalized).map_err(|e| FetchError::InvalidUrl(format!("{}: {}", raw, e)))
}

#[async_trait]
impl FplApi for HttpFplApi {
    async fn bootstrap(&self) -> Result<RawBootstrap, FetchError> {
        let url = self.endpoint("bootstrap-static/")?;
        self.fetcher.get_json(&url, &self.calls.long).await
    }

    async fn league_standings(
        &self,
        league_id: LeagueId,
        page: u32,
    ) -> Result<RawLeagueStandings, FetchError> {
        let mut url = self.endpoint(&format!("leagues-classic/{}/standings/", league_id))?;
        url.query_pairs_mut()
            .append_pair("page_standings", &page.max(1).to_string());
        debug!("Requesting standings page {} for league {}", page, league_id);
        self.fetcher.get_json(&url, &self.calls.standard).await
    }

    async fn manager_entry(&self, manager_id: ManagerId) -> Result<RawEntry, FetchError> {
        let url = self.endpoint(&format!("entry/{}/", manager_id))?;
        self.fetcher.get_json(&url, &self.calls.manager).await
    }

    async fn manager_history(&self, manager_id: ManagerId) -> Result<RawHistory, FetchError> {
        let url = self.endpoint(&format!("entry/{}/history/", manager_id))?;
        self.fetcher.get_json(&url, &self.calls.manager).await
    }

    async fn event_picks(
        &self,
        manager_id: ManagerId,
        gameweek: u32,
    ) -> Result<RawPicks, FetchError> {
        let url = self.endpoint(&format!("entry/{}/event/{}/picks/", manager_id, gameweek))?;
        self.fetcher.get_json(&url, &self.calls.standard).await
    }

    async fn live_event(&self, gameweek: u32) -> Result<RawLiveEvent, FetchError> {
        let url = self.endpoint(&format!("event/{}/live/", gameweek))?;
        self.fetcher.get_json(&url, &self.calls.standard).await
    }
}
