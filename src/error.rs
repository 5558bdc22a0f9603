//! Error types for the tournament engine
//!
//! This module defines all error types using anyhow for consistent error handling
//! throughout the application.

use crate::types::{MatchId, TeamId};

/// Result type alias for convenience
pub type Result<T> = anyhow::Result<T>;

/// Custom error types for specific tournament-engine scenarios
#[derive(Debug, thiserror::Error)]
pub enum TournamentError {
    #[error("AMQP connection failed: {message}")]
    AmqpConnectionFailed { message: String },

    #[error("Invalid message: {reason}")]
    InvalidMessage { reason: String },

    #[error("Match not found: {match_id}")]
    MatchNotFound { match_id: MatchId },

    #[error("Team not found: {team_id}")]
    TeamNotFound { team_id: TeamId },

    #[error("Cannot schedule round-robin for {team_count} team(s): at least 2 required")]
    NotEnoughTeams { team_count: usize },

    #[error("Invalid scoring rules: {reason}")]
    InvalidScoringRules { reason: String },

    #[error("Match {match_id} is in an inconsistent state: {reason}")]
    CorruptMatchState { match_id: MatchId, reason: String },

    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    #[error("Internal service error: {message}")]
    InternalError { message: String },
}
