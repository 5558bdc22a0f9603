//! Tournament scoring rules
//!
//! A [`ScoringRules`] value encodes how a single match outcome is turned
//! into standings points for the two sides: base win/draw/loss points plus
//! two optional bonuses (goal threshold and ten-zero shutout). Standings
//! aggregation over the full match history happens outside the engine;
//! this module only scores one outcome at a time.

use crate::error::{Result, TournamentError};
use crate::types::MatchOutcome;
use serde::{Deserialize, Serialize};

/// Bonus for reaching a goal count in a single match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalBonus {
    /// Minimum goals required, at least 1
    pub threshold: u32,
    pub points: u32,
}

/// Points awarded to both sides for one match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchPoints {
    pub home: u32,
    pub away: u32,
}

/// Point-award policy for a tournament, immutable once constructed.
///
/// Point fields are unsigned, so the non-negativity invariant holds by
/// construction; [`ScoringRules::validate`] covers the rest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringRules {
    pub points_for_win: u32,
    pub points_for_draw: u32,
    pub points_for_loss: u32,
    /// Extra points for any side reaching the goal threshold; both sides
    /// can qualify in the same match
    pub goal_bonus: Option<GoalBonus>,
    /// Extra points for winning exactly 10-0, winner only
    pub ten_zero_bonus: Option<u32>,
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self {
            points_for_win: 3,
            points_for_draw: 1,
            points_for_loss: 0,
            goal_bonus: None,
            ten_zero_bonus: None,
        }
    }
}

impl ScoringRules {
    /// Validate the policy
    pub fn validate(&self) -> Result<()> {
        if let Some(bonus) = &self.goal_bonus {
            if bonus.threshold == 0 {
                return Err(TournamentError::InvalidScoringRules {
                    reason: "Goal bonus threshold must be at least 1".to_string(),
                }
                .into());
            }
        }

        Ok(())
    }

    /// Score a single match outcome into per-side points.
    ///
    /// Bonuses stack: a 10-0 win past the goal threshold collects the base
    /// win points, the threshold bonus and the ten-zero bonus.
    pub fn points_for(&self, outcome: &MatchOutcome) -> MatchPoints {
        let (mut home, mut away) = match outcome.home_score.cmp(&outcome.away_score) {
            std::cmp::Ordering::Greater => (self.points_for_win, self.points_for_loss),
            std::cmp::Ordering::Equal => (self.points_for_draw, self.points_for_draw),
            std::cmp::Ordering::Less => (self.points_for_loss, self.points_for_win),
        };

        if let Some(bonus) = &self.goal_bonus {
            if outcome.home_score >= bonus.threshold {
                home += bonus.points;
            }
            if outcome.away_score >= bonus.threshold {
                away += bonus.points;
            }
        }

        if let Some(bonus) = self.ten_zero_bonus {
            if outcome.home_score == 10 && outcome.away_score == 0 {
                home += bonus;
            } else if outcome.away_score == 10 && outcome.home_score == 0 {
                away += bonus;
            }
        }

        MatchPoints { home, away }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// The club's house rules: 3/1/0 with both bonuses at one point
    fn house_rules() -> ScoringRules {
        ScoringRules {
            points_for_win: 3,
            points_for_draw: 1,
            points_for_loss: 0,
            goal_bonus: Some(GoalBonus {
                threshold: 4,
                points: 1,
            }),
            ten_zero_bonus: Some(1),
        }
    }

    #[test]
    fn test_plain_win() {
        let rules = ScoringRules::default();
        let points = rules.points_for(&MatchOutcome::new(3, 1));
        assert_eq!(points, MatchPoints { home: 3, away: 0 });
    }

    #[test]
    fn test_plain_away_win() {
        let rules = ScoringRules::default();
        let points = rules.points_for(&MatchOutcome::new(1, 2));
        assert_eq!(points, MatchPoints { home: 0, away: 3 });
    }

    #[test]
    fn test_plain_draw() {
        let rules = ScoringRules::default();
        let points = rules.points_for(&MatchOutcome::new(0, 0));
        assert_eq!(points, MatchPoints { home: 1, away: 1 });
    }

    #[test]
    fn test_win_past_threshold() {
        let points = house_rules().points_for(&MatchOutcome::new(5, 2));
        assert_eq!(points, MatchPoints { home: 4, away: 0 });
    }

    #[test]
    fn test_ten_zero_stacks_with_threshold() {
        let points = house_rules().points_for(&MatchOutcome::new(10, 0));
        // 3 for the win, 1 for the threshold, 1 for the shutout
        assert_eq!(points, MatchPoints { home: 5, away: 0 });

        let points = house_rules().points_for(&MatchOutcome::new(0, 10));
        assert_eq!(points, MatchPoints { home: 0, away: 5 });
    }

    #[test]
    fn test_draw_below_threshold_gets_no_bonus() {
        let points = house_rules().points_for(&MatchOutcome::new(2, 2));
        assert_eq!(points, MatchPoints { home: 1, away: 1 });
    }

    #[test]
    fn test_both_sides_can_reach_threshold() {
        // 5-4: winner and loser both past the threshold
        let points = house_rules().points_for(&MatchOutcome::new(5, 4));
        assert_eq!(points, MatchPoints { home: 4, away: 1 });

        // High-scoring draw: both sides get draw points plus the bonus
        let points = house_rules().points_for(&MatchOutcome::new(4, 4));
        assert_eq!(points, MatchPoints { home: 2, away: 2 });
    }

    #[test]
    fn test_ten_zero_never_rewards_the_loser() {
        let mut rules = house_rules();
        rules.goal_bonus = None;

        let points = rules.points_for(&MatchOutcome::new(10, 0));
        assert_eq!(points, MatchPoints { home: 4, away: 0 });

        // 10-1 is not a shutout
        let points = rules.points_for(&MatchOutcome::new(10, 1));
        assert_eq!(points, MatchPoints { home: 3, away: 0 });
    }

    #[test]
    fn test_zero_threshold_rejected() {
        let mut rules = house_rules();
        rules.goal_bonus = Some(GoalBonus {
            threshold: 0,
            points: 1,
        });
        assert!(rules.validate().is_err());
    }

    #[test]
    fn test_default_rules_are_valid() {
        assert!(ScoringRules::default().validate().is_ok());
        assert!(house_rules().validate().is_ok());
    }
}
