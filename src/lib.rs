//! Kicker Engine - tournament scheduling and rating service for foosball leagues
//!
//! This crate provides round-robin fixture generation, match scoring
//! rules, Elo rating updates on match completion, and the AMQP-driven
//! service that ties them together.

pub mod amqp;
pub mod config;
pub mod error;
pub mod rating;
pub mod schedule;
pub mod scoring;
pub mod service;
pub mod tournament;
pub mod types;
pub mod utils;

// Re-export commonly used types and traits
pub use error::{Result, TournamentError};
pub use types::*;

// Re-export key components
pub use amqp::publisher::EventPublisher;
pub use rating::{EloEngine, InMemoryRatingStorage, RatingStorage};
pub use schedule::RoundRobinScheduler;
pub use scoring::ScoringRules;
pub use tournament::{InMemoryMatchStore, MatchCompletionWorkflow, MatchStore};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
