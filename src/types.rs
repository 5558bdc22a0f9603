//! Common types used throughout the tournament engine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for players
pub type PlayerId = String;

/// Unique identifier for teams
pub type TeamId = Uuid;

/// Unique identifier for matches/fixtures
pub type MatchId = Uuid;

/// Unique identifier for tournaments
pub type TournamentId = Uuid;

/// Unique identifier for physical tables
pub type TableId = Uuid;

/// A tournament-scoped team: one or two players depending on the
/// tournament format. Membership is fixed after registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub players: Vec<PlayerId>,
}

impl Team {
    /// Create a new team with the given members
    pub fn new(name: impl Into<String>, players: Vec<PlayerId>) -> Self {
        Self {
            id: crate::utils::generate_team_id(),
            name: name.into(),
            players,
        }
    }
}

/// Home or away grouping within a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Home,
    Away,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Home => write!(f, "home"),
            Side::Away => write!(f, "away"),
        }
    }
}

/// Number of cycles in a round-robin schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Legs {
    /// Every pairing is played once
    Single,
    /// Every pairing is played twice with home/away reversed
    Double,
}

/// A scheduled pairing produced by fixture generation.
///
/// `table` is the physical-table assignment; generation always leaves it
/// unset, assignment happens later through match administration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fixture {
    pub id: MatchId,
    pub tournament_id: TournamentId,
    /// 1-based round number, strictly increasing across the schedule
    pub round: u32,
    pub home_team: TeamId,
    pub away_team: TeamId,
    pub table: Option<TableId>,
}

/// Lifecycle states of a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchStatus {
    /// Fixture exists, no result recorded
    Scheduled,
    /// A final score has been recorded
    Played,
    /// Match was called off; never triggers rating updates
    Cancelled,
}

impl std::fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchStatus::Scheduled => write!(f, "scheduled"),
            MatchStatus::Played => write!(f, "played"),
            MatchStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Final score of a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchOutcome {
    pub home_score: u32,
    pub away_score: u32,
}

impl MatchOutcome {
    pub fn new(home_score: u32, away_score: u32) -> Self {
        Self {
            home_score,
            away_score,
        }
    }
}

/// A fixture together with its result state, as held by the match store.
///
/// `result_version` increments every time a result is recorded for this
/// match (including administrative re-scoring) and serves as the
/// idempotency key for rating application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub fixture: Fixture,
    pub status: MatchStatus,
    pub outcome: Option<MatchOutcome>,
    pub result_version: u64,
}

impl MatchRecord {
    /// Wrap a freshly generated fixture in its initial state
    pub fn scheduled(fixture: Fixture) -> Self {
        Self {
            fixture,
            status: MatchStatus::Scheduled,
            outcome: None,
            result_version: 0,
        }
    }
}

/// Rating movement for a single player after a finalized match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingChange {
    pub player_id: PlayerId,
    pub old_rating: i32,
    pub new_rating: i32,
    pub delta: i32,
}

/// AMQP Message Types
/// Notice that a tournament has started and needs its schedule generated
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TournamentStarted {
    pub tournament_id: TournamentId,
    pub teams: Vec<Team>,
    /// Request return legs; falls back to the engine's configured
    /// default when absent
    #[serde(default)]
    pub double_round_robin: Option<bool>,
    pub timestamp: DateTime<Utc>,
}

/// Notice that a match result has been finalized
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchFinalized {
    pub match_id: MatchId,
    pub tournament_id: TournamentId,
    pub home_score: u32,
    pub away_score: u32,
    pub timestamp: DateTime<Utc>,
}

/// Event emitted after fixture generation for a tournament
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixturesScheduled {
    pub tournament_id: TournamentId,
    pub fixtures: Vec<Fixture>,
    pub rounds: u32,
    pub timestamp: DateTime<Utc>,
}

/// Event emitted after ratings have been applied for a finalized match
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatingsUpdated {
    pub match_id: MatchId,
    pub tournament_id: TournamentId,
    /// Version of the recorded result these changes belong to
    pub result_version: u64,
    /// Side-aggregate ratings the deltas were computed from
    pub home_side_rating: f64,
    pub away_side_rating: f64,
    pub changes: Vec<RatingChange>,
    /// Points awarded for this match under the configured scoring rules
    pub home_points: u32,
    pub away_points: u32,
    pub timestamp: DateTime<Utc>,
}

/// Union type for all AMQP messages handled or published by the engine
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EngineMessage {
    TournamentStarted(TournamentStarted),
    MatchFinalized(MatchFinalized),
    FixturesScheduled(FixturesScheduled),
    RatingsUpdated(RatingsUpdated),
}
