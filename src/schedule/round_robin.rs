//! Round-robin fixture generation
//!
//! Generates the full fixture list for a tournament using the classic
//! circle method: the first arena slot stays fixed while the remaining
//! slots rotate one position between rounds, pairing the arena from both
//! ends toward the middle. The rotation runs over slot indices, never
//! over the caller's team list.
//!
//! Odd team counts get one phantom bye slot; the bye pairing is omitted
//! from the output, so each team simply has one round without a fixture.

use crate::error::{Result, TournamentError};
use crate::types::{Fixture, Legs, Team, TournamentId};
use crate::utils::generate_match_id;

/// Stateless generator for round-robin schedules.
///
/// Given the same tournament, team order and leg setting, the produced
/// sequence of (round, home, away) pairings is identical on every call;
/// only the fixture ids are freshly minted.
#[derive(Debug, Clone, Copy, Default)]
pub struct RoundRobinScheduler;

impl RoundRobinScheduler {
    pub fn new() -> Self {
        Self
    }

    /// Number of rounds in one leg for the given team count.
    ///
    /// Even counts play N-1 rounds; odd counts need N rounds because every
    /// team sits out once.
    pub fn rounds_per_leg(team_count: usize) -> u32 {
        if team_count % 2 == 0 {
            team_count.saturating_sub(1) as u32
        } else {
            team_count as u32
        }
    }

    /// Number of fixtures in one leg: every unordered pair once
    pub fn fixtures_per_leg(team_count: usize) -> usize {
        team_count * team_count.saturating_sub(1) / 2
    }

    /// Generate the complete fixture list for a tournament.
    ///
    /// Fixtures come out ordered by round, then by generation order within
    /// the round. `Legs::Double` appends a mirrored second cycle with
    /// home/away swapped and round numbers continuing after the first.
    pub fn generate_fixtures(
        &self,
        tournament_id: TournamentId,
        teams: &[Team],
        legs: Legs,
    ) -> Result<Vec<Fixture>> {
        let team_count = teams.len();
        if team_count < 2 {
            return Err(TournamentError::NotEnoughTeams { team_count }.into());
        }

        // Arena of team indices; odd counts get a phantom bye slot.
        let mut slots: Vec<Option<usize>> = (0..team_count).map(Some).collect();
        if team_count % 2 == 1 {
            slots.push(None);
        }
        let slot_count = slots.len();
        let rounds = (slot_count - 1) as u32;

        let mut fixtures = Vec::with_capacity(match legs {
            Legs::Single => Self::fixtures_per_leg(team_count),
            Legs::Double => Self::fixtures_per_leg(team_count) * 2,
        });

        for round in 0..rounds {
            for pair in 0..slot_count / 2 {
                let near = slots[pair];
                let far = slots[slot_count - 1 - pair];
                if let (Some(a), Some(b)) = (near, far) {
                    // Sides swap on odd rounds so home/away alternates
                    // with the rotation instead of favoring low indices.
                    let (home, away) = if round % 2 == 1 { (b, a) } else { (a, b) };
                    fixtures.push(Fixture {
                        id: generate_match_id(),
                        tournament_id,
                        round: round + 1,
                        home_team: teams[home].id,
                        away_team: teams[away].id,
                        table: None,
                    });
                }
            }
            slots[1..].rotate_right(1);
        }

        if legs == Legs::Double {
            let first_leg_fixtures = fixtures.len();
            for i in 0..first_leg_fixtures {
                let first = &fixtures[i];
                let mirrored = Fixture {
                    id: generate_match_id(),
                    tournament_id,
                    round: first.round + rounds,
                    home_team: first.away_team,
                    away_team: first.home_team,
                    table: None,
                };
                fixtures.push(mirrored);
            }
        }

        Ok(fixtures)
    }
}
