//! Main application state and service coordination
//!
//! This module contains the production AppState that wires the tournament
//! core to its AMQP surroundings: the event handler that drives schedule
//! generation and rating application, the connection, the consumer, and
//! the service counters reported by health checks.

use crate::amqp::connection::{AmqpConfig, AmqpConnection};
use crate::amqp::handlers::{EngineEventConsumer, MessageHandler};
use crate::amqp::messages::MessageUtils;
use crate::amqp::publisher::{AmqpEventPublisher, EventPublisher, PublisherConfig};
use crate::config::AppConfig;
use crate::error::{Result as EngineResult, TournamentError};
use crate::rating::elo::EloEngine;
use crate::rating::storage::{InMemoryRatingStorage, RatingStorage};
use crate::schedule::RoundRobinScheduler;
use crate::scoring::ScoringRules;
use crate::tournament::store::{InMemoryMatchStore, MatchStore};
use crate::tournament::workflow::{CompletionOutcome, MatchCompletionWorkflow};
use crate::types::{
    FixturesScheduled, Legs, MatchFinalized, MatchOutcome, RatingsUpdated, TournamentStarted,
};
use crate::utils::current_timestamp;
use amqprs::channel::QueueDeclareArguments;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

/// Service-level errors
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("AMQP connection error: {message}")]
    AmqpConnection { message: String },

    #[error("Service initialization error: {message}")]
    Initialization { message: String },
}

/// Monotonic counters reported by health checks
#[derive(Debug, Default)]
pub struct EngineStats {
    pub tournaments_scheduled: AtomicU64,
    pub fixtures_created: AtomicU64,
    pub results_processed: AtomicU64,
    pub ratings_applied: AtomicU64,
    pub updates_skipped: AtomicU64,
}

/// Production message handler that drives the tournament core
pub struct EngineMessageHandler {
    scheduler: RoundRobinScheduler,
    workflow: MatchCompletionWorkflow,
    matches: Arc<dyn MatchStore>,
    publisher: Arc<dyn EventPublisher>,
    scoring_rules: ScoringRules,
    /// Legs used when a start notice does not request either way
    double_round_robin_default: bool,
    stats: Arc<EngineStats>,
}

impl EngineMessageHandler {
    pub fn new(
        engine: EloEngine,
        matches: Arc<dyn MatchStore>,
        ratings: Arc<dyn RatingStorage>,
        publisher: Arc<dyn EventPublisher>,
        scoring_rules: ScoringRules,
        double_round_robin_default: bool,
        stats: Arc<EngineStats>,
    ) -> Self {
        let workflow = MatchCompletionWorkflow::new(engine, matches.clone(), ratings);

        Self {
            scheduler: RoundRobinScheduler::new(),
            workflow,
            matches,
            publisher,
            scoring_rules,
            double_round_robin_default,
            stats,
        }
    }
}

#[async_trait]
impl MessageHandler for EngineMessageHandler {
    async fn handle_tournament_started(&self, notice: TournamentStarted) -> EngineResult<()> {
        MessageUtils::validate_tournament_started(&notice)?;

        let legs = if notice
            .double_round_robin
            .unwrap_or(self.double_round_robin_default)
        {
            Legs::Double
        } else {
            Legs::Single
        };

        for team in &notice.teams {
            self.matches.register_team(team.clone())?;
        }

        let fixtures =
            self.scheduler
                .generate_fixtures(notice.tournament_id, &notice.teams, legs)?;
        let rounds = fixtures.iter().map(|f| f.round).max().unwrap_or(0);
        self.matches.insert_fixtures(fixtures.clone())?;

        self.stats.tournaments_scheduled.fetch_add(1, Ordering::Relaxed);
        self.stats
            .fixtures_created
            .fetch_add(fixtures.len() as u64, Ordering::Relaxed);

        info!(
            tournament_id = %notice.tournament_id,
            teams = notice.teams.len(),
            fixtures = fixtures.len(),
            rounds,
            "Generated round-robin schedule"
        );

        self.publisher
            .publish_fixtures_scheduled(FixturesScheduled {
                tournament_id: notice.tournament_id,
                fixtures,
                rounds,
                timestamp: current_timestamp(),
            })
            .await
    }

    async fn handle_match_finalized(&self, notice: MatchFinalized) -> EngineResult<()> {
        let outcome = MatchOutcome::new(notice.home_score, notice.away_score);
        self.matches.record_result(&notice.match_id, outcome)?;

        self.stats.results_processed.fetch_add(1, Ordering::Relaxed);

        match self.workflow.on_match_finalized(&notice.match_id)? {
            CompletionOutcome::Applied(applied) => {
                self.stats.ratings_applied.fetch_add(1, Ordering::Relaxed);

                let points = self.scoring_rules.points_for(&outcome);
                self.publisher
                    .publish_ratings_updated(RatingsUpdated {
                        match_id: applied.match_id,
                        tournament_id: applied.tournament_id,
                        result_version: applied.result_version,
                        home_side_rating: applied.home_side_rating,
                        away_side_rating: applied.away_side_rating,
                        changes: applied.changes,
                        home_points: points.home,
                        away_points: points.away,
                        timestamp: current_timestamp(),
                    })
                    .await
            }
            CompletionOutcome::AlreadyApplied {
                match_id,
                result_version,
            } => {
                self.stats.updates_skipped.fetch_add(1, Ordering::Relaxed);
                info!(
                    %match_id,
                    result_version,
                    "Result already applied, no rating movement"
                );
                Ok(())
            }
            CompletionOutcome::Skipped { match_id, reason } => {
                self.stats.updates_skipped.fetch_add(1, Ordering::Relaxed);
                warn!(%match_id, ?reason, "Rating update skipped");
                Ok(())
            }
        }
    }

    async fn handle_error(&self, error: TournamentError, message_data: &[u8]) {
        error!(
            "Message handler error - type: '{}', message_size: {} bytes",
            error,
            message_data.len()
        );

        if !message_data.is_empty() {
            let preview_len = std::cmp::min(100, message_data.len());
            let preview = String::from_utf8_lossy(&message_data[..preview_len]);
            error!("Message preview: {:?}", preview);
        }
    }
}

/// Main application state containing all service components
pub struct AppState {
    /// Application configuration
    config: AppConfig,

    /// Storage seams shared with the handler
    rating_storage: Arc<dyn RatingStorage>,
    match_store: Arc<dyn MatchStore>,

    /// AMQP connection for message handling
    amqp_connection: Arc<AmqpConnection>,

    /// Production event handler
    handler: Arc<EngineMessageHandler>,

    /// AMQP consumer for inbound engine events
    consumer: Option<EngineEventConsumer>,

    /// Service counters
    stats: Arc<EngineStats>,

    /// Service status
    is_running: Arc<RwLock<bool>>,
}

impl AppState {
    /// Initialize the application with all dependencies
    pub async fn new(config: AppConfig) -> Result<Self, ServiceError> {
        info!("Initializing kicker-engine tournament service");
        info!(
            "Configuration: service={}, amqp_url={}",
            config.service.name, config.amqp.url
        );

        let engine = EloEngine::new(config.engine.rating.clone()).map_err(|e| {
            ServiceError::Configuration {
                message: e.to_string(),
            }
        })?;
        let scoring_rules =
            config
                .engine
                .scoring
                .to_rules()
                .map_err(|e| ServiceError::Configuration {
                    message: e.to_string(),
                })?;

        let amqp_connection = Self::initialize_amqp(&config).await?;
        let publisher = Self::initialize_publisher(&amqp_connection).await?;

        let rating_storage: Arc<dyn RatingStorage> = Arc::new(InMemoryRatingStorage::new());
        let match_store: Arc<dyn MatchStore> = Arc::new(InMemoryMatchStore::new());
        let stats = Arc::new(EngineStats::default());

        let handler = Arc::new(EngineMessageHandler::new(
            engine,
            match_store.clone(),
            rating_storage.clone(),
            publisher,
            scoring_rules,
            config.engine.double_round_robin,
            stats.clone(),
        ));

        Ok(Self {
            config,
            rating_storage,
            match_store,
            amqp_connection,
            handler,
            consumer: None,
            stats,
            is_running: Arc::new(RwLock::new(false)),
        })
    }

    /// Connect to the AMQP broker
    async fn initialize_amqp(config: &AppConfig) -> Result<Arc<AmqpConnection>, ServiceError> {
        let mut amqp_config =
            AmqpConfig::from_url(&config.amqp.url).map_err(|e| ServiceError::Configuration {
                message: e.to_string(),
            })?;
        amqp_config.max_retries = config.amqp.max_retry_attempts;
        amqp_config.retry_delay_ms = config.amqp.retry_delay_ms;
        amqp_config.connection_timeout_ms = config.amqp.connection_timeout_seconds * 1000;

        let connection =
            AmqpConnection::new(amqp_config)
                .await
                .map_err(|e| ServiceError::AmqpConnection {
                    message: e.to_string(),
                })?;

        Ok(Arc::new(connection))
    }

    /// Open the publisher channel and declare the results exchange
    async fn initialize_publisher(
        connection: &Arc<AmqpConnection>,
    ) -> Result<Arc<dyn EventPublisher>, ServiceError> {
        let channel = connection
            .connection()
            .open_channel(None)
            .await
            .map_err(|e| ServiceError::AmqpConnection {
                message: format!("Failed to open publisher channel: {}", e),
            })?;

        let publisher = AmqpEventPublisher::new(channel, PublisherConfig::default())
            .await
            .map_err(|e| ServiceError::Initialization {
                message: e.to_string(),
            })?;

        Ok(Arc::new(publisher))
    }

    /// Start message consumption
    pub async fn start(&mut self) -> Result<(), ServiceError> {
        info!("Starting kicker-engine tournament service");

        *self.is_running.write().await = true;

        let channel = self
            .amqp_connection
            .connection()
            .open_channel(None)
            .await
            .map_err(|e| ServiceError::AmqpConnection {
                message: format!("Failed to open consumer channel: {}", e),
            })?;

        let queue_name = self.config.amqp.queue_name.clone();
        channel
            .queue_declare(QueueDeclareArguments::durable_client_named(&queue_name))
            .await
            .map_err(|e| ServiceError::AmqpConnection {
                message: format!("Failed to declare queue {}: {}", queue_name, e),
            })?;

        let consumer = EngineEventConsumer::new(self.handler.clone(), channel);
        consumer
            .start_consuming(&queue_name)
            .await
            .map_err(|e| ServiceError::Initialization {
                message: e.to_string(),
            })?;
        self.consumer = Some(consumer);

        info!("Kicker-engine tournament service started successfully");
        Ok(())
    }

    /// Perform graceful shutdown
    pub async fn shutdown(&mut self) -> Result<(), ServiceError> {
        info!("Starting graceful shutdown of kicker-engine service");

        *self.is_running.write().await = false;

        if let Some(consumer) = self.consumer.take() {
            if let Err(e) = consumer.stop_consuming().await {
                warn!("Failed to stop AMQP consumer: {}", e);
            }
        }

        info!("Kicker-engine service stopped");
        Ok(())
    }

    /// Whether the service is currently running
    pub async fn is_running(&self) -> bool {
        *self.is_running.read().await
    }

    /// Application configuration
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Service counters
    pub fn stats(&self) -> &EngineStats {
        &self.stats
    }

    /// Rating storage seam (health checks, admin inspection)
    pub fn rating_storage(&self) -> &Arc<dyn RatingStorage> {
        &self.rating_storage
    }

    /// Match storage seam (health checks, admin inspection)
    pub fn match_store(&self) -> &Arc<dyn MatchStore> {
        &self.match_store
    }

    /// Event handler, for direct in-process driving in tests and tools
    pub fn handler(&self) -> &Arc<EngineMessageHandler> {
        &self.handler
    }
}
