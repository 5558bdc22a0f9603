//! Rating system configuration

use crate::error::{Result, TournamentError};
use serde::{Deserialize, Serialize};

/// Elo engine tuning parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EloSettings {
    /// Sensitivity constant: how far a single match moves a rating
    pub k_factor: f64,
    /// Rating assigned to players who have never been rated
    pub initial_rating: i32,
}

impl Default for EloSettings {
    fn default() -> Self {
        Self {
            k_factor: 32.0,
            initial_rating: 1000,
        }
    }
}

impl EloSettings {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if !self.k_factor.is_finite() || self.k_factor <= 0.0 {
            return Err(TournamentError::ConfigurationError {
                message: format!("K-factor must be positive, got {}", self.k_factor),
            }
            .into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_are_valid() {
        let settings = EloSettings::default();
        assert_eq!(settings.k_factor, 32.0);
        assert_eq!(settings.initial_rating, 1000);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_invalid_k_factor() {
        let mut settings = EloSettings::default();
        settings.k_factor = -1.0;
        assert!(settings.validate().is_err());

        settings.k_factor = f64::NAN;
        assert!(settings.validate().is_err());
    }
}
