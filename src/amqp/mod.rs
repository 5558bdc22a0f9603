//! AMQP integration for the tournament engine
//!
//! This module handles the AMQP connection, inbound event consumption and
//! outbound event publishing for the engine service.

pub mod connection;
pub mod handlers;
pub mod messages;
pub mod publisher;

// Re-export commonly used types
pub use connection::{AmqpConfig, AmqpConnection};
pub use handlers::MessageHandler;
pub use messages::*;
pub use publisher::EventPublisher;
