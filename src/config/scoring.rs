//! Scoring rules configuration

use crate::error::Result;
use crate::scoring::{GoalBonus, ScoringRules};
use serde::{Deserialize, Serialize};

/// Configurable scoring table, turned into [`ScoringRules`] at startup.
///
/// Defaults follow the house rule set: 3/1/0 with a one-point bonus for
/// four or more goals and a one-point bonus for a 10-0 shutout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringSettings {
    pub points_for_win: u32,
    pub points_for_draw: u32,
    pub points_for_loss: u32,
    /// Goal count that earns the bonus; absent disables the bonus
    pub goal_bonus_threshold: Option<u32>,
    pub goal_bonus_points: u32,
    /// Bonus for a 10-0 win; absent disables the bonus
    pub ten_zero_bonus: Option<u32>,
}

impl Default for ScoringSettings {
    fn default() -> Self {
        Self {
            points_for_win: 3,
            points_for_draw: 1,
            points_for_loss: 0,
            goal_bonus_threshold: Some(4),
            goal_bonus_points: 1,
            ten_zero_bonus: Some(1),
        }
    }
}

impl ScoringSettings {
    /// Build the validated rules value used by the engine
    pub fn to_rules(&self) -> Result<ScoringRules> {
        let rules = ScoringRules {
            points_for_win: self.points_for_win,
            points_for_draw: self.points_for_draw,
            points_for_loss: self.points_for_loss,
            goal_bonus: self.goal_bonus_threshold.map(|threshold| GoalBonus {
                threshold,
                points: self.goal_bonus_points,
            }),
            ten_zero_bonus: self.ten_zero_bonus,
        };
        rules.validate()?;
        Ok(rules)
    }
}
