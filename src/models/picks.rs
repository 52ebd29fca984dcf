//! Team lineup and live scoring models.

use serde::{Deserialize, Serialize};

use super::ManagerId;

/// Squad position code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Position {
    Gkp,
    Def,
    Mid,
    Fwd,
}

impl Position {
    /// Map an upstream `element_type` code.
    pub fn from_element_type(code: u32) -> Option<Self> {
        match code {
            1 => Some(Position::Gkp),
            2 => Some(Position::Def),
            3 => Some(Position::Mid),
            4 => Some(Position::Fwd),
            _ => None,
        }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Position::Gkp => write!(f, "GKP"),
            Position::Def => write!(f, "DEF"),
            Position::Mid => write!(f, "MID"),
            Position::Fwd => write!(f, "FWD"),
        }
    }
}

/// One player in a manager's gameweek squad.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PickedPlayer {
    pub element_id: u32,
    pub name: String,
    pub team: String,
    pub position: Option<Position>,
    /// Squad slot (1-11 starting, 12-15 bench)
    pub slot: u32,
    pub multiplier: u32,
    pub is_captain: bool,
    pub is_vice_captain: bool,
    /// Live points before the multiplier
    pub points: i32,
}

/// A manager's enriched lineup for one gameweek.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamPicks {
    pub manager_id: ManagerId,
    pub event_id: u32,
    pub active_chip: Option<String>,
    /// Starting outfield shape, e.g. "4-4-2"
    pub formation: String,
    #[serde(rename = "startingXI")]
    pub starting_xi: Vec<PickedPlayer>,
    pub bench: Vec<PickedPlayer>,
    pub captain: Option<String>,
    pub vice_captain: Option<String>,
    /// Starters' points with multipliers applied
    pub total_points: i32,
    pub transfer_cost: i32,
}

/// Live in-progress score for one league manager.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveScore {
    pub manager_id: ManagerId,
    pub manager_name: String,
    pub team_name: String,
    pub live_points: i32,
    pub transfer_cost: i32,
    pub active_chip: Option<String>,
    /// Season total before this gameweek plus live points
    pub projected_total: i32,
    pub has_data: bool,
}
