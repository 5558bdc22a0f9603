//! Rating storage interface and implementations
//!
//! This module defines the interface for persisting and retrieving player
//! ratings, with an in-memory reference implementation and a mock for
//! testing. Rating updates for a finalized match are committed as one
//! atomic application keyed by `(match_id, result_version)`, so the same
//! finalization can never be applied twice.

use crate::error::TournamentError;
use crate::types::{MatchId, PlayerId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;

/// Storage entry for a player's rating with metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingEntry {
    pub player_id: PlayerId,
    pub rating: i32,
    pub matches_played: u64,
    pub last_updated: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl RatingEntry {
    /// Create a new rating entry for a new player
    pub fn new(player_id: PlayerId, initial_rating: i32) -> Self {
        let now = Utc::now();
        Self {
            player_id,
            rating: initial_rating,
            matches_played: 0,
            last_updated: now,
            created_at: now,
        }
    }

    /// Entry after a match: delta applied, match counted
    pub fn with_delta(&self, delta: i32) -> Self {
        Self {
            player_id: self.player_id.clone(),
            rating: self.rating + delta,
            matches_played: self.matches_played + 1,
            last_updated: Utc::now(),
            created_at: self.created_at,
        }
    }
}

/// One atomic batch of rating updates for a single match finalization.
///
/// `result_version` is the idempotency key: storage refuses to apply the
/// same `(match_id, result_version)` pair twice.
#[derive(Debug, Clone)]
pub struct RatingApplication {
    pub match_id: MatchId,
    pub result_version: u64,
    pub entries: Vec<RatingEntry>,
}

/// Trait for rating storage operations
pub trait RatingStorage: Send + Sync {
    /// Get a player's rating entry
    fn get_rating(&self, player_id: &PlayerId) -> crate::error::Result<Option<RatingEntry>>;

    /// Get ratings for multiple players
    fn get_ratings(
        &self,
        player_ids: &[PlayerId],
    ) -> crate::error::Result<HashMap<PlayerId, RatingEntry>>;

    /// Store an initial rating for a player (player-creation default)
    fn seed_rating(&self, entry: RatingEntry) -> crate::error::Result<()>;

    /// Commit one match's rating updates atomically.
    ///
    /// All entries and the applied-version marker are written together or
    /// not at all. Returns `false` without changing anything when this
    /// `(match_id, result_version)` was already applied.
    fn apply(&self, application: RatingApplication) -> crate::error::Result<bool>;

    /// Get all players with ratings (for admin/debugging)
    fn get_all_ratings(&self) -> crate::error::Result<HashMap<PlayerId, RatingEntry>>;

    /// Get rated players ordered by rating, best first
    fn leaderboard(&self, limit: Option<usize>) -> crate::error::Result<Vec<RatingEntry>>;

    /// Get total number of rated players
    fn player_count(&self) -> crate::error::Result<usize>;
}

/// Inner state shared under one lock so applications stay atomic
#[derive(Debug, Default)]
struct RatingState {
    ratings: HashMap<PlayerId, RatingEntry>,
    applied_versions: HashMap<MatchId, u64>,
}

/// In-memory rating storage implementation
#[derive(Debug, Default)]
pub struct InMemoryRatingStorage {
    state: RwLock<RatingState>,
}

impl InMemoryRatingStorage {
    /// Create a new in-memory rating storage
    pub fn new() -> Self {
        Self::default()
    }

    fn read_state(&self) -> crate::error::Result<std::sync::RwLockReadGuard<'_, RatingState>> {
        self.state
            .read()
            .map_err(|_| {
                TournamentError::InternalError {
                    message: "Failed to acquire ratings read lock".to_string(),
                }
                .into()
            })
    }

    fn write_state(&self) -> crate::error::Result<std::sync::RwLockWriteGuard<'_, RatingState>> {
        self.state
            .write()
            .map_err(|_| {
                TournamentError::InternalError {
                    message: "Failed to acquire ratings write lock".to_string(),
                }
                .into()
            })
    }
}

impl RatingStorage for InMemoryRatingStorage {
    fn get_rating(&self, player_id: &PlayerId) -> crate::error::Result<Option<RatingEntry>> {
        let state = self.read_state()?;
        Ok(state.ratings.get(player_id).cloned())
    }

    fn get_ratings(
        &self,
        player_ids: &[PlayerId],
    ) -> crate::error::Result<HashMap<PlayerId, RatingEntry>> {
        let state = self.read_state()?;

        let mut result = HashMap::new();
        for player_id in player_ids {
            if let Some(entry) = state.ratings.get(player_id) {
                result.insert(player_id.clone(), entry.clone());
            }
        }

        Ok(result)
    }

    fn seed_rating(&self, entry: RatingEntry) -> crate::error::Result<()> {
        let mut state = self.write_state()?;
        state.ratings.insert(entry.player_id.clone(), entry);
        Ok(())
    }

    fn apply(&self, application: RatingApplication) -> crate::error::Result<bool> {
        let mut state = self.write_state()?;

        if state.applied_versions.get(&application.match_id)
            == Some(&application.result_version)
        {
            return Ok(false);
        }

        for entry in application.entries {
            state.ratings.insert(entry.player_id.clone(), entry);
        }
        state
            .applied_versions
            .insert(application.match_id, application.result_version);

        Ok(true)
    }

    fn get_all_ratings(&self) -> crate::error::Result<HashMap<PlayerId, RatingEntry>> {
        let state = self.read_state()?;
        Ok(state.ratings.clone())
    }

    fn leaderboard(&self, limit: Option<usize>) -> crate::error::Result<Vec<RatingEntry>> {
        let state = self.read_state()?;

        let mut entries: Vec<RatingEntry> = state.ratings.values().cloned().collect();
        // Ties broken by player id to keep the ordering reproducible
        entries.sort_by(|a, b| {
            b.rating
                .cmp(&a.rating)
                .then_with(|| a.player_id.cmp(&b.player_id))
        });

        if let Some(limit) = limit {
            entries.truncate(limit);
        }

        Ok(entries)
    }

    fn player_count(&self) -> crate::error::Result<usize> {
        let state = self.read_state()?;
        Ok(state.ratings.len())
    }
}

/// Mock rating storage for testing
#[derive(Debug, Default)]
pub struct MockRatingStorage {
    inner: InMemoryRatingStorage,
    apply_calls: RwLock<Vec<RatingApplication>>,
    fail_next_apply: RwLock<bool>,
}

impl MockRatingStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all apply calls made (for testing)
    pub fn get_apply_calls(&self) -> Vec<RatingApplication> {
        self.apply_calls
            .read()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    /// Clear recorded apply calls
    pub fn clear_apply_calls(&self) {
        if let Ok(mut calls) = self.apply_calls.write() {
            calls.clear();
        }
    }

    /// Make the next apply call fail without changing any rating
    pub fn fail_next_apply(&self) {
        if let Ok(mut flag) = self.fail_next_apply.write() {
            *flag = true;
        }
    }

    /// Preset ratings for testing
    pub fn preset_ratings(&self, entries: Vec<RatingEntry>) -> crate::error::Result<()> {
        for entry in entries {
            self.inner.seed_rating(entry)?;
        }
        Ok(())
    }
}

impl RatingStorage for MockRatingStorage {
    fn get_rating(&self, player_id: &PlayerId) -> crate::error::Result<Option<RatingEntry>> {
        self.inner.get_rating(player_id)
    }

    fn get_ratings(
        &self,
        player_ids: &[PlayerId],
    ) -> crate::error::Result<HashMap<PlayerId, RatingEntry>> {
        self.inner.get_ratings(player_ids)
    }

    fn seed_rating(&self, entry: RatingEntry) -> crate::error::Result<()> {
        self.inner.seed_rating(entry)
    }

    fn apply(&self, application: RatingApplication) -> crate::error::Result<bool> {
        if let Ok(mut flag) = self.fail_next_apply.write() {
            if *flag {
                *flag = false;
                return Err(TournamentError::InternalError {
                    message: "Injected storage failure".to_string(),
                }
                .into());
            }
        }

        if let Ok(mut calls) = self.apply_calls.write() {
            calls.push(application.clone());
        }

        self.inner.apply(application)
    }

    fn get_all_ratings(&self) -> crate::error::Result<HashMap<PlayerId, RatingEntry>> {
        self.inner.get_all_ratings()
    }

    fn leaderboard(&self, limit: Option<usize>) -> crate::error::Result<Vec<RatingEntry>> {
        self.inner.leaderboard(limit)
    }

    fn player_count(&self) -> crate::error::Result<usize> {
        self.inner.player_count()
    }
}
