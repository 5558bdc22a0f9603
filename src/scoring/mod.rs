//! Point-award policy for tournament standings

pub mod rules;

// Re-export commonly used types
pub use rules::{GoalBonus, MatchPoints, ScoringRules};
