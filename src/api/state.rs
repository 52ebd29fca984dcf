use std::sync::Arc;

use crate::aggregate::{AggregationSettings, LeagueAggregator};
use crate::cache::{CacheSettings, CacheStore, LeagueCache};
use crate::config::AppConfig;
use crate::limiter::{ConcurrencyLimiter, LimiterError};
use crate::upstream::FplApi;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub api: Arc<dyn FplApi>,
    pub aggregator: Arc<LeagueAggregator>,
    pub league_cache: Arc<LeagueCache>,
}

impl AppState {
    /// Wire the aggregation engine and cache over an upstream client.
    ///
    /// One limiter is shared by every request, so the concurrency bound
    /// holds process-wide.
    pub fn new(
        config: Arc<AppConfig>,
        api: Arc<dyn FplApi>,
        store: Arc<dyn CacheStore>,
    ) -> Result<Self, LimiterError> {
        let limiter = Arc::new(ConcurrencyLimiter::new(config.aggregation.concurrency)?);
        let aggregator = Arc::new(LeagueAggregator::new(
            Arc::clone(&api),
            limiter,
            AggregationSettings::from(&config.aggregation),
        ));
        let league_cache = Arc::new(LeagueCache::new(
            aggregator.clone(),
            store,
            CacheSettings::from(&config.cache),
        ));

        Ok(Self {
            config,
            api,
            aggregator,
            league_cache,
        })
    }
}
