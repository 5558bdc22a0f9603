//! Match completion workflow
//!
//! Reacts to a finalized match result: loads the participants, computes
//! side-aggregate ratings, asks the Elo engine for the zero-sum delta
//! pair, and commits every player's new rating in one atomic storage
//! application keyed by the match's result version.
//!
//! Matches that are not in `Played` state and sides without participants
//! are skipped silently rather than rejected; the skip is reported in the
//! returned outcome so callers and tests can observe it.

use crate::error::{Result, TournamentError};
use crate::rating::elo::{EloEngine, MatchResult};
use crate::rating::storage::{RatingApplication, RatingEntry, RatingStorage};
use crate::tournament::store::MatchStore;
use crate::types::{MatchId, MatchStatus, RatingChange, Side, Team, TournamentId};
use crate::utils::side_rating;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Why a finalization event produced no rating movement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The match is not in `Played` state
    NotPlayed { status: MatchStatus },
    /// One side has no participants
    MissingParticipants { side: Side },
}

/// Ratings committed for one finalization event
#[derive(Debug, Clone)]
pub struct AppliedRatings {
    pub match_id: MatchId,
    pub tournament_id: TournamentId,
    pub result_version: u64,
    pub home_side_rating: f64,
    pub away_side_rating: f64,
    pub home_delta: i32,
    pub away_delta: i32,
    pub changes: Vec<RatingChange>,
}

/// Observable result of one workflow invocation
#[derive(Debug, Clone)]
pub enum CompletionOutcome {
    /// Ratings were computed and committed
    Applied(AppliedRatings),
    /// This result version was committed by an earlier invocation
    AlreadyApplied {
        match_id: MatchId,
        result_version: u64,
    },
    /// Guarded no-op
    Skipped {
        match_id: MatchId,
        reason: SkipReason,
    },
}

/// Orchestrates rating updates on match finalization
pub struct MatchCompletionWorkflow {
    engine: EloEngine,
    matches: Arc<dyn MatchStore>,
    ratings: Arc<dyn RatingStorage>,
}

impl MatchCompletionWorkflow {
    pub fn new(
        engine: EloEngine,
        matches: Arc<dyn MatchStore>,
        ratings: Arc<dyn RatingStorage>,
    ) -> Self {
        Self {
            engine,
            matches,
            ratings,
        }
    }

    /// Apply rating updates for a finalized match.
    ///
    /// Idempotent per result version: invoking this twice for the same
    /// finalization commits the deltas exactly once. A later re-score
    /// bumps the version and is applied again on top of current ratings.
    pub fn on_match_finalized(&self, match_id: &MatchId) -> Result<CompletionOutcome> {
        let record = self
            .matches
            .fetch_match(match_id)?
            .ok_or(TournamentError::MatchNotFound { match_id: *match_id })?;

        if record.status != MatchStatus::Played {
            debug!(%match_id, status = %record.status, "Skipping rating update: match not played");
            return Ok(CompletionOutcome::Skipped {
                match_id: *match_id,
                reason: SkipReason::NotPlayed {
                    status: record.status,
                },
            });
        }

        let outcome = record.outcome.ok_or_else(|| TournamentError::CorruptMatchState {
            match_id: *match_id,
            reason: "played match has no recorded outcome".to_string(),
        })?;

        let home_team = self.team(&record.fixture.home_team)?;
        let away_team = self.team(&record.fixture.away_team)?;

        for (team, side) in [(&home_team, Side::Home), (&away_team, Side::Away)] {
            if team.players.is_empty() {
                warn!(%match_id, %side, team = %team.name, "Skipping rating update: side has no participants");
                return Ok(CompletionOutcome::Skipped {
                    match_id: *match_id,
                    reason: SkipReason::MissingParticipants { side },
                });
            }
        }

        let home_entries = self.current_entries(&home_team)?;
        let away_entries = self.current_entries(&away_team)?;

        let home_ratings: Vec<i32> = home_entries.iter().map(|e| e.rating).collect();
        let away_ratings: Vec<i32> = away_entries.iter().map(|e| e.rating).collect();
        // Sides are non-empty past the guard above
        let home_side_rating = side_rating(&home_ratings).ok_or_else(|| {
            TournamentError::InternalError {
                message: "home side lost its participants mid-computation".to_string(),
            }
        })?;
        let away_side_rating = side_rating(&away_ratings).ok_or_else(|| {
            TournamentError::InternalError {
                message: "away side lost its participants mid-computation".to_string(),
            }
        })?;

        let result_home = MatchResult::from_scores(outcome.home_score, outcome.away_score);
        let (home_delta, away_delta) =
            self.engine
                .deltas(home_side_rating, away_side_rating, result_home);

        // Every player on a side moves by the full side delta.
        let mut changes = Vec::new();
        let mut entries = Vec::new();
        for (side_entries, delta) in [(&home_entries, home_delta), (&away_entries, away_delta)] {
            for entry in side_entries.iter() {
                let updated = entry.with_delta(delta);
                changes.push(RatingChange {
                    player_id: entry.player_id.clone(),
                    old_rating: entry.rating,
                    new_rating: updated.rating,
                    delta,
                });
                entries.push(updated);
            }
        }

        let applied = self.ratings.apply(RatingApplication {
            match_id: *match_id,
            result_version: record.result_version,
            entries,
        })?;

        if !applied {
            debug!(
                %match_id,
                result_version = record.result_version,
                "Rating update already applied for this result version"
            );
            return Ok(CompletionOutcome::AlreadyApplied {
                match_id: *match_id,
                result_version: record.result_version,
            });
        }

        info!(
            %match_id,
            result_version = record.result_version,
            home_delta,
            away_delta,
            home_side_rating,
            away_side_rating,
            "Applied rating updates"
        );

        Ok(CompletionOutcome::Applied(AppliedRatings {
            match_id: *match_id,
            tournament_id: record.fixture.tournament_id,
            result_version: record.result_version,
            home_side_rating,
            away_side_rating,
            home_delta,
            away_delta,
            changes,
        }))
    }

    fn team(&self, team_id: &crate::types::TeamId) -> Result<Team> {
        self.matches
            .get_team(team_id)?
            .ok_or_else(|| TournamentError::TeamNotFound { team_id: *team_id }.into())
    }

    /// Current rating entries for a team, seeding unseen players at the
    /// configured initial rating. Seeds are not persisted here; they are
    /// committed with the application itself.
    fn current_entries(&self, team: &Team) -> Result<Vec<RatingEntry>> {
        let known = self.ratings.get_ratings(&team.players)?;

        Ok(team
            .players
            .iter()
            .map(|player_id| {
                known.get(player_id).cloned().unwrap_or_else(|| {
                    RatingEntry::new(player_id.clone(), self.engine.initial_rating())
                })
            })
            .collect())
    }
}
