//! Match and team persistence seam
//!
//! The engine treats match persistence as an external collaborator and
//! only depends on this trait. The in-memory implementation keeps all
//! state under one lock, which makes each operation atomic and gives the
//! serialized write path the completion workflow relies on.

use crate::error::TournamentError;
use crate::types::{
    Fixture, MatchId, MatchOutcome, MatchRecord, MatchStatus, TableId, Team, TeamId, TournamentId,
};
use std::collections::HashMap;
use std::sync::RwLock;

#[cfg(test)]
use mockall::automock;

/// Trait for match and team storage operations
#[cfg_attr(test, automock)]
pub trait MatchStore: Send + Sync {
    /// Register a tournament-scoped team
    fn register_team(&self, team: Team) -> crate::error::Result<()>;

    /// Get a registered team
    fn get_team(&self, team_id: &TeamId) -> crate::error::Result<Option<Team>>;

    /// Insert a freshly generated fixture list in schedule order
    fn insert_fixtures(&self, fixtures: Vec<Fixture>) -> crate::error::Result<()>;

    /// Fetch a match with its result state
    fn fetch_match(&self, match_id: &MatchId) -> crate::error::Result<Option<MatchRecord>>;

    /// All matches of a tournament, ordered by round then generation order
    fn fixtures_for_tournament(
        &self,
        tournament_id: &TournamentId,
    ) -> crate::error::Result<Vec<MatchRecord>>;

    /// Record a final score: the match transitions to `Played` and its
    /// result version increments. Re-recording with a different score
    /// (administrative re-scoring) bumps the version again; re-recording
    /// the same score is a no-op so redelivered finalization events keep
    /// one version per distinct result.
    fn record_result(
        &self,
        match_id: &MatchId,
        outcome: MatchOutcome,
    ) -> crate::error::Result<MatchRecord>;

    /// Cancel a scheduled match
    fn cancel_match(&self, match_id: &MatchId) -> crate::error::Result<MatchRecord>;

    /// Assign a physical table to a match
    fn assign_table(&self, match_id: &MatchId, table: TableId) -> crate::error::Result<()>;
}

/// Inner state shared under one lock
#[derive(Debug, Default)]
struct MatchState {
    teams: HashMap<TeamId, Team>,
    matches: HashMap<MatchId, MatchRecord>,
    /// Insertion order, which is schedule order for generated fixtures
    order: Vec<MatchId>,
}

/// In-memory match store implementation
#[derive(Debug, Default)]
pub struct InMemoryMatchStore {
    state: RwLock<MatchState>,
}

impl InMemoryMatchStore {
    /// Create a new in-memory match store
    pub fn new() -> Self {
        Self::default()
    }

    fn read_state(&self) -> crate::error::Result<std::sync::RwLockReadGuard<'_, MatchState>> {
        self.state.read().map_err(|_| {
            TournamentError::InternalError {
                message: "Failed to acquire match store read lock".to_string(),
            }
            .into()
        })
    }

    fn write_state(&self) -> crate::error::Result<std::sync::RwLockWriteGuard<'_, MatchState>> {
        self.state.write().map_err(|_| {
            TournamentError::InternalError {
                message: "Failed to acquire match store write lock".to_string(),
            }
            .into()
        })
    }
}

impl MatchStore for InMemoryMatchStore {
    fn register_team(&self, team: Team) -> crate::error::Result<()> {
        let mut state = self.write_state()?;
        state.teams.insert(team.id, team);
        Ok(())
    }

    fn get_team(&self, team_id: &TeamId) -> crate::error::Result<Option<Team>> {
        let state = self.read_state()?;
        Ok(state.teams.get(team_id).cloned())
    }

    fn insert_fixtures(&self, fixtures: Vec<Fixture>) -> crate::error::Result<()> {
        let mut state = self.write_state()?;

        for fixture in &fixtures {
            if !state.teams.contains_key(&fixture.home_team) {
                return Err(TournamentError::TeamNotFound {
                    team_id: fixture.home_team,
                }
                .into());
            }
            if !state.teams.contains_key(&fixture.away_team) {
                return Err(TournamentError::TeamNotFound {
                    team_id: fixture.away_team,
                }
                .into());
            }
        }

        for fixture in fixtures {
            let match_id = fixture.id;
            state.matches.insert(match_id, MatchRecord::scheduled(fixture));
            state.order.push(match_id);
        }

        Ok(())
    }

    fn fetch_match(&self, match_id: &MatchId) -> crate::error::Result<Option<MatchRecord>> {
        let state = self.read_state()?;
        Ok(state.matches.get(match_id).cloned())
    }

    fn fixtures_for_tournament(
        &self,
        tournament_id: &TournamentId,
    ) -> crate::error::Result<Vec<MatchRecord>> {
        let state = self.read_state()?;

        let mut records: Vec<MatchRecord> = state
            .order
            .iter()
            .filter_map(|id| state.matches.get(id))
            .filter(|record| record.fixture.tournament_id == *tournament_id)
            .cloned()
            .collect();
        // Insertion order already follows generation order; a stable sort
        // by round keeps it that way within each round.
        records.sort_by_key(|record| record.fixture.round);

        Ok(records)
    }

    fn record_result(
        &self,
        match_id: &MatchId,
        outcome: MatchOutcome,
    ) -> crate::error::Result<MatchRecord> {
        let mut state = self.write_state()?;

        let record = state
            .matches
            .get_mut(match_id)
            .ok_or(TournamentError::MatchNotFound { match_id: *match_id })?;

        if record.status == MatchStatus::Cancelled {
            return Err(TournamentError::CorruptMatchState {
                match_id: *match_id,
                reason: "cannot record a result for a cancelled match".to_string(),
            }
            .into());
        }

        if record.status == MatchStatus::Played && record.outcome == Some(outcome) {
            return Ok(record.clone());
        }

        record.status = MatchStatus::Played;
        record.outcome = Some(outcome);
        record.result_version += 1;

        Ok(record.clone())
    }

    fn cancel_match(&self, match_id: &MatchId) -> crate::error::Result<MatchRecord> {
        let mut state = self.write_state()?;

        let record = state
            .matches
            .get_mut(match_id)
            .ok_or(TournamentError::MatchNotFound { match_id: *match_id })?;

        if record.status == MatchStatus::Played {
            return Err(TournamentError::CorruptMatchState {
                match_id: *match_id,
                reason: "cannot cancel a played match".to_string(),
            }
            .into());
        }

        record.status = MatchStatus::Cancelled;
        Ok(record.clone())
    }

    fn assign_table(&self, match_id: &MatchId, table: TableId) -> crate::error::Result<()> {
        let mut state = self.write_state()?;

        let record = state
            .matches
            .get_mut(match_id)
            .ok_or(TournamentError::MatchNotFound { match_id: *match_id })?;

        record.fixture.table = Some(table);
        Ok(())
    }
}
