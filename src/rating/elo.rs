//! Elo rating engine
//!
//! This module provides the rating calculation for finalized matches,
//! built on the Elo implementation from the skillratings crate. Ratings
//! are kept as integers; a single match moves a side by
//! `round(K * (actual - expected))` points, rounded half away from zero.

use crate::config::rating::EloSettings;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use skillratings::elo::{elo, expected_score, EloConfig, EloRating};
use skillratings::Outcomes;

/// Match result seen from one side's perspective
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchResult {
    Win,
    Draw,
    Loss,
}

impl MatchResult {
    /// Actual score used by the Elo formula: 1.0 win, 0.5 draw, 0.0 loss
    pub fn actual_score(&self) -> f64 {
        match self {
            MatchResult::Win => 1.0,
            MatchResult::Draw => 0.5,
            MatchResult::Loss => 0.0,
        }
    }

    /// The same result seen from the opponent's perspective
    pub fn opposite(&self) -> MatchResult {
        match self {
            MatchResult::Win => MatchResult::Loss,
            MatchResult::Draw => MatchResult::Draw,
            MatchResult::Loss => MatchResult::Win,
        }
    }

    /// Derive a side's result from the two final scores
    pub fn from_scores(own_score: u32, other_score: u32) -> MatchResult {
        match own_score.cmp(&other_score) {
            std::cmp::Ordering::Greater => MatchResult::Win,
            std::cmp::Ordering::Equal => MatchResult::Draw,
            std::cmp::Ordering::Less => MatchResult::Loss,
        }
    }

    fn outcome(&self) -> Outcomes {
        match self {
            MatchResult::Win => Outcomes::WIN,
            MatchResult::Draw => Outcomes::DRAW,
            MatchResult::Loss => Outcomes::LOSS,
        }
    }
}

/// Elo rating calculator
///
/// Pure computation, no storage access. The K-factor and the initial
/// rating for unseen players come from [`EloSettings`] so they can be
/// tuned per deployment without code changes.
#[derive(Debug, Clone)]
pub struct EloEngine {
    settings: EloSettings,
}

impl EloEngine {
    /// Create a new engine with validated settings
    pub fn new(settings: EloSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self { settings })
    }

    /// The configured K-factor
    pub fn k_factor(&self) -> f64 {
        self.settings.k_factor
    }

    /// The configured rating for players without a stored rating
    pub fn initial_rating(&self) -> i32 {
        self.settings.initial_rating
    }

    /// Expected score of side A against side B
    pub fn expected_score(&self, rating_a: f64, rating_b: f64) -> f64 {
        let (expected_a, _expected_b) = expected_score(
            &EloRating { rating: rating_a },
            &EloRating { rating: rating_b },
        );
        expected_a
    }

    /// Integer rating delta for side A.
    ///
    /// Side ratings are the aggregate (mean) ratings of the players on
    /// each side, which is why they arrive as floats even though stored
    /// ratings are integers.
    pub fn calculate_delta(&self, rating_a: f64, rating_b: f64, result_a: MatchResult) -> i32 {
        let config = EloConfig {
            k: self.settings.k_factor,
        };
        let before = EloRating { rating: rating_a };
        let opponent = EloRating { rating: rating_b };
        let (after, _) = elo(&before, &opponent, &result_a.outcome(), &config);

        // f64::round rounds half away from zero, which keeps
        // round(delta) == -round(-delta) and the pair zero-sum.
        (after.rating - before.rating).round() as i32
    }

    /// Zero-sum delta pair for a match, home side first.
    ///
    /// The away delta is the exact negation of the home delta.
    pub fn deltas(
        &self,
        rating_home: f64,
        rating_away: f64,
        result_home: MatchResult,
    ) -> (i32, i32) {
        let delta_home = self.calculate_delta(rating_home, rating_away, result_home);
        (delta_home, -delta_home)
    }
}

impl Default for EloEngine {
    fn default() -> Self {
        Self {
            settings: EloSettings::default(),
        }
    }
}
