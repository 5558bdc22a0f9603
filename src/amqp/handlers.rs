//! AMQP message handlers for processing tournament lifecycle events
//!
//! This module provides the message handling infrastructure for the
//! tournament engine: deserialize and validate inbound notices, then
//! dispatch them to the handler that drives scheduling and rating
//! updates.

use crate::amqp::messages::MessageUtils;
use crate::error::{Result, TournamentError};
use crate::types::{EngineMessage, MatchFinalized, TournamentStarted};
use amqprs::{
    channel::{BasicCancelArguments, BasicConsumeArguments, Channel},
    consumer::AsyncConsumer,
    BasicProperties, Deliver,
};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Trait defining the interface for handling inbound engine messages
#[async_trait]
pub trait MessageHandler: Send + Sync {
    /// Handle a tournament start notice: generate and persist the schedule
    async fn handle_tournament_started(&self, notice: TournamentStarted) -> Result<()>;

    /// Handle a finalized match result: record it and apply ratings
    async fn handle_match_finalized(&self, notice: MatchFinalized) -> Result<()>;

    /// Handle processing errors
    async fn handle_error(&self, error: TournamentError, message_data: &[u8]);
}

/// Consumer for the engine's inbound event queue
pub struct EngineEventConsumer {
    handler: Arc<dyn MessageHandler>,
    channel: Channel,
    consumer_tag: String,
}

impl EngineEventConsumer {
    /// Create a new engine event consumer
    pub fn new(handler: Arc<dyn MessageHandler>, channel: Channel) -> Self {
        let consumer_tag = format!("engine-consumer-{}", uuid::Uuid::new_v4());

        Self {
            handler,
            channel,
            consumer_tag,
        }
    }

    /// Start consuming messages from the queue
    pub async fn start_consuming(&self, queue_name: &str) -> Result<()> {
        let args = BasicConsumeArguments::new(queue_name, &self.consumer_tag);

        self.channel
            .basic_consume(EventConsumer::new(self.handler.clone()), args)
            .await
            .map_err(|e| TournamentError::AmqpConnectionFailed {
                message: format!("Failed to start consuming: {}", e),
            })?;

        info!("Started consuming messages from queue: {}", queue_name);
        Ok(())
    }

    /// Stop consuming messages
    pub async fn stop_consuming(&self) -> Result<()> {
        let args = BasicCancelArguments::new(&self.consumer_tag);

        self.channel.basic_cancel(args).await.map_err(|e| {
            TournamentError::AmqpConnectionFailed {
                message: format!("Failed to stop consuming: {}", e),
            }
        })?;

        info!("Stopped consuming messages");
        Ok(())
    }
}

/// Internal consumer implementation
struct EventConsumer {
    handler: Arc<dyn MessageHandler>,
}

impl EventConsumer {
    fn new(handler: Arc<dyn MessageHandler>) -> Self {
        Self { handler }
    }

    /// Process an incoming message
    async fn process_message(&self, content: &[u8]) -> Result<()> {
        let message = MessageUtils::deserialize_engine_message(content)?;

        match message {
            EngineMessage::TournamentStarted(notice) => {
                debug!(
                    tournament_id = %notice.tournament_id,
                    teams = notice.teams.len(),
                    double_round_robin = ?notice.double_round_robin,
                    "Tournament start notice parsed"
                );
                self.handler.handle_tournament_started(notice).await
            }
            EngineMessage::MatchFinalized(notice) => {
                debug!(
                    match_id = %notice.match_id,
                    home_score = notice.home_score,
                    away_score = notice.away_score,
                    "Match finalized notice parsed"
                );
                self.handler.handle_match_finalized(notice).await
            }
            other => Err(TournamentError::InvalidMessage {
                reason: format!(
                    "Unexpected outbound message type on the inbound queue: {}",
                    MessageUtils::get_routing_key(&other)
                ),
            }
            .into()),
        }
    }
}

#[async_trait]
impl AsyncConsumer for EventConsumer {
    async fn consume(
        &mut self,
        _channel: &Channel,
        deliver: Deliver,
        _basic_properties: BasicProperties,
        content: Vec<u8>,
    ) {
        let delivery_tag = deliver.delivery_tag();
        let routing_key = deliver.routing_key();

        debug!(
            "AMQP message received - delivery_tag: {}, routing_key: '{}', size: {} bytes",
            delivery_tag,
            routing_key,
            content.len()
        );

        let start_time = std::time::Instant::now();

        match self.process_message(&content).await {
            Ok(_) => {
                let processing_time = start_time.elapsed();
                info!(
                    "Message processed successfully - delivery_tag: {}, processing_time: {:.2}ms",
                    delivery_tag,
                    processing_time.as_secs_f64() * 1000.0
                );
            }
            Err(e) => {
                let processing_time = start_time.elapsed();
                error!(
                    "Message processing failed - delivery_tag: {}, processing_time: {:.2}ms, error: {}",
                    delivery_tag,
                    processing_time.as_secs_f64() * 1000.0,
                    e
                );
                self.handler
                    .handle_error(
                        TournamentError::InternalError {
                            message: e.to_string(),
                        },
                        &content,
                    )
                    .await;
            }
        }
    }
}
