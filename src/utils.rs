//! Utility functions for the tournament engine

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Generate a new unique team ID
pub fn generate_team_id() -> Uuid {
    Uuid::new_v4()
}

/// Generate a new unique match ID
pub fn generate_match_id() -> Uuid {
    Uuid::new_v4()
}

/// Generate a new unique tournament ID
pub fn generate_tournament_id() -> Uuid {
    Uuid::new_v4()
}

/// Get the current UTC timestamp
pub fn current_timestamp() -> DateTime<Utc> {
    Utc::now()
}

/// Arithmetic mean of the per-player ratings on one side of a match.
///
/// Returns `None` for an empty side; a side with no participants must be
/// handled by the caller, not averaged.
pub fn side_rating(ratings: &[i32]) -> Option<f64> {
    if ratings.is_empty() {
        return None;
    }
    Some(ratings.iter().map(|r| *r as f64).sum::<f64>() / ratings.len() as f64)
}
