//! The composite league snapshot and its cache-annotated form.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{
    BootstrapSummary, GameweekRow, LeagueId, LeagueStats, ManagerId, ManagerStanding, Performance,
};

/// League identity and metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeagueInfo {
    pub id: LeagueId,
    pub name: String,
    pub created: Option<DateTime<Utc>>,
    pub admin_entry: Option<ManagerId>,
    /// Upstream scoring type code ("c" for classic)
    pub scoring: String,
}

/// Result of one aggregation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeagueSnapshot {
    pub league: LeagueInfo,
    pub bootstrap: BootstrapSummary,
    /// Display rank order
    pub standings: Vec<ManagerStanding>,
    /// Ascending by gameweek
    pub gameweek_table: Vec<GameweekRow>,
    pub league_stats: LeagueStats,
    pub performance: Performance,
    pub timestamp: DateTime<Utc>,
}

/// A snapshot as returned to callers, annotated at read time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedSnapshot {
    #[serde(flatten)]
    pub snapshot: LeagueSnapshot,

    pub from_cache: bool,

    /// Milliseconds since the entry was written
    pub cache_age: Option<u64>,

    /// True when served past its freshness because aggregation failed
    pub stale: bool,

    /// The aggregation failure that forced a stale read
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CachedSnapshot {
    /// A snapshot straight from the aggregation engine.
    pub fn fresh(snapshot: LeagueSnapshot) -> Self {
        Self {
            snapshot,
            from_cache: false,
            cache_age: None,
            stale: false,
            error: None,
        }
    }

    /// A live cache hit.
    pub fn hit(snapshot: LeagueSnapshot, age_ms: u64) -> Self {
        Self {
            snapshot,
            from_cache: true,
            cache_age: Some(age_ms),
            stale: false,
            error: None,
        }
    }

    /// An expired entry served because a refresh failed.
    pub fn stale(snapshot: LeagueSnapshot, age_ms: u64, error: impl Into<String>) -> Self {
        Self {
            snapshot,
            from_cache: true,
            cache_age: Some(age_ms),
            stale: true,
            error: Some(error.into()),
        }
    }
}
