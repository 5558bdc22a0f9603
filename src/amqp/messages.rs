//! AMQP message definitions and serialization

use crate::error::{Result, TournamentError};
use crate::types::*;
use serde_json;

/// AMQP queue names
pub const ENGINE_EVENTS_QUEUE: &str = "tournament.engine.events";
pub const ENGINE_RESULTS_EXCHANGE: &str = "tournament.engine.results";

/// Routing keys for events
pub const TOURNAMENT_STARTED_ROUTING_KEY: &str = "tournament.started";
pub const MATCH_FINALIZED_ROUTING_KEY: &str = "match.finalized";
pub const FIXTURES_SCHEDULED_ROUTING_KEY: &str = "fixtures.scheduled";
pub const RATINGS_UPDATED_ROUTING_KEY: &str = "ratings.updated";

/// Message envelope with metadata
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct MessageEnvelope<T> {
    pub payload: T,
    pub correlation_id: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub routing_key: String,
}

impl<T> MessageEnvelope<T>
where
    T: serde::Serialize + serde::de::DeserializeOwned,
{
    /// Create a new message envelope
    pub fn new(payload: T, routing_key: String) -> Self {
        Self {
            payload,
            correlation_id: uuid::Uuid::new_v4().to_string(),
            timestamp: chrono::Utc::now(),
            routing_key,
        }
    }

    /// Serialize the envelope to JSON bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| {
            TournamentError::InternalError {
                message: format!("Failed to serialize message: {}", e),
            }
            .into()
        })
    }

    /// Deserialize envelope from JSON bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(|e| {
            TournamentError::InvalidMessage {
                reason: format!("Failed to deserialize message: {}", e),
            }
            .into()
        })
    }
}

/// Message serialization and validation utilities
pub struct MessageUtils;

impl MessageUtils {
    /// Serialize an inbound engine message to bytes
    pub fn serialize_engine_message(message: &EngineMessage) -> Result<Vec<u8>> {
        Self::validate_engine_message(message)?;
        serde_json::to_vec(message).map_err(|e| {
            TournamentError::InternalError {
                message: format!("Failed to serialize engine message: {}", e),
            }
            .into()
        })
    }

    /// Deserialize an inbound engine message from bytes
    pub fn deserialize_engine_message(bytes: &[u8]) -> Result<EngineMessage> {
        let message: EngineMessage =
            serde_json::from_slice(bytes).map_err(|e| TournamentError::InvalidMessage {
                reason: format!("Failed to deserialize engine message: {}", e),
            })?;

        Self::validate_engine_message(&message)?;
        Ok(message)
    }

    /// Validate an engine message before it reaches the core
    pub fn validate_engine_message(message: &EngineMessage) -> Result<()> {
        match message {
            EngineMessage::TournamentStarted(notice) => {
                Self::validate_tournament_started(notice)
            }
            EngineMessage::MatchFinalized(_) => Ok(()),
            EngineMessage::FixturesScheduled(_) | EngineMessage::RatingsUpdated(_) => Ok(()),
        }
    }

    /// Validate a tournament start notice
    pub fn validate_tournament_started(notice: &TournamentStarted) -> Result<()> {
        if notice.teams.len() < 2 {
            return Err(TournamentError::InvalidMessage {
                reason: format!(
                    "Tournament start requires at least 2 teams, got {}",
                    notice.teams.len()
                ),
            }
            .into());
        }

        let mut seen = std::collections::HashSet::new();
        for team in &notice.teams {
            if !seen.insert(team.id) {
                return Err(TournamentError::InvalidMessage {
                    reason: format!("Duplicate team id: {}", team.id),
                }
                .into());
            }
            if team.name.is_empty() {
                return Err(TournamentError::InvalidMessage {
                    reason: "Team name cannot be empty".to_string(),
                }
                .into());
            }
            if team.players.is_empty() || team.players.len() > 2 {
                return Err(TournamentError::InvalidMessage {
                    reason: format!(
                        "Team '{}' must have 1 or 2 players, got {}",
                        team.name,
                        team.players.len()
                    ),
                }
                .into());
            }
            if team.players.iter().any(|p| p.is_empty()) {
                return Err(TournamentError::InvalidMessage {
                    reason: format!("Team '{}' has an empty player id", team.name),
                }
                .into());
            }
        }

        Ok(())
    }

    /// Serialize any AMQP message to bytes
    pub fn serialize_message<T: serde::Serialize>(message: &T) -> Result<Vec<u8>> {
        serde_json::to_vec(message).map_err(|e| {
            TournamentError::InternalError {
                message: format!("Failed to serialize message: {}", e),
            }
            .into()
        })
    }

    /// Get routing key for a message type
    pub fn get_routing_key(message: &EngineMessage) -> &'static str {
        match message {
            EngineMessage::TournamentStarted(_) => TOURNAMENT_STARTED_ROUTING_KEY,
            EngineMessage::MatchFinalized(_) => MATCH_FINALIZED_ROUTING_KEY,
            EngineMessage::FixturesScheduled(_) => FIXTURES_SCHEDULED_ROUTING_KEY,
            EngineMessage::RatingsUpdated(_) => RATINGS_UPDATED_ROUTING_KEY,
        }
    }
}
