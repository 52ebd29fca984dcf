//! Domain model for league dashboards.

mod gameweek;
mod ids;
mod picks;
mod season;
mod snapshot;
mod standing;
mod stats;

pub use gameweek::*;
pub use ids::*;
pub use picks::*;
pub use season::*;
pub use snapshot::*;
pub use standing::*;
pub use stats::*;
