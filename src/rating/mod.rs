//! Elo rating system: delta calculation and rating persistence seams
//!
//! The engine itself is a pure computation; storage is a trait so the
//! completion workflow can run against any transactional backend.

pub mod elo;
pub mod storage;

// Re-export commonly used types
pub use elo::{EloEngine, MatchResult};
pub use storage::{InMemoryRatingStorage, RatingApplication, RatingEntry, RatingStorage};
