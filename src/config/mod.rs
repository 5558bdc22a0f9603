//! Configuration management for the kicker-engine service
//!
//! This module handles all configuration loading from environment
//! variables and TOML files, validation, and default values for the
//! tournament engine.

pub mod app;
pub mod rating;
pub mod scoring;

// Re-export commonly used types
pub use app::{validate_config, AmqpSettings, AppConfig, EngineSettings, ServiceSettings};
pub use rating::EloSettings;
pub use scoring::ScoringSettings;
