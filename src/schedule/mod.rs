//! Fixture generation for tournament schedules

pub mod round_robin;

// Re-export commonly used types
pub use round_robin::RoundRobinScheduler;
