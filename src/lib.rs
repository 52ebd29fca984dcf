//! # FPL League
//!
//! Backend for a Fantasy Premier League mini-league dashboard.
//!
//! ## Architecture
//!
//! - **models**: Domain data structures (standings, gameweeks, snapshots)
//! - **upstream**: Typed client for the public FPL API
//! - **fetch**: Per-attempt timeouts and linear-backoff retries
//! - **limiter**: Bounded concurrency for outbound requests
//! - **aggregate**: League aggregation engine and live scoring
//! - **calculate**: Statistics and derived metrics computation
//! - **cache**: Cache-aside layer with stale fallback
//! - **api**: REST API endpoints
//! - **config**: Configuration loading and validation

pub mod aggregate;
pub mod api;
pub mod cache;
pub mod calculate;
pub mod config;
pub mod fetch;
pub mod limiter;
pub mod models;
pub mod upstream;

pub use models::*;

use std::time::Duration;

/// Parse a CLI duration such as "90s", "2m" or "24h"; bare numbers are seconds.
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    let (num_str, multiplier) = if let Some(n) = s.strip_suffix('h') {
        (n, 3600)
    } else if let Some(n) = s.strip_suffix('m') {
        (n, 60)
    } else if let Some(n) = s.strip_suffix('s') {
        (n, 1)
    } else {
        (s, 1)
    };

    let num: u64 = num_str.parse().ok()?;
    num.checked_mul(multiplier).map(Duration::from_secs)
}
