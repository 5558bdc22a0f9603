//! Main entry point for the Kicker Engine tournament service
//!
//! This is the production entry point that initializes and runs the
//! tournament engine with proper error handling, logging, and graceful
//! shutdown.

use anyhow::Result;
use clap::Parser;
use kicker_engine::config::AppConfig;
use kicker_engine::service::{AppState, HealthCheck, HealthStatus};
use std::path::PathBuf;
use tokio::signal;
use tracing::{error, info, warn};

/// Kicker Engine - Tournament Scheduling and Elo Rating Service
#[derive(Parser)]
#[command(
    name = "kicker-engine",
    version,
    about = "Tournament scheduling and Elo rating engine for foosball leagues",
    long_about = "Kicker Engine is a Rust-based tournament service that consumes tournament \
                 lifecycle events via AMQP, generates round-robin schedules, evaluates \
                 scoring rules, and applies Elo rating updates when match results are \
                 finalized."
)]
struct Args {
    /// Configuration file path
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Path to configuration file (TOML format)"
    )]
    config: Option<PathBuf>,

    /// Perform health check and exit
    #[arg(long, help = "Perform a health check and exit with status code")]
    health_check: bool,

    /// Log level override
    #[arg(
        short,
        long,
        value_name = "LEVEL",
        help = "Override log level (trace, debug, info, warn, error)"
    )]
    log_level: Option<String>,

    /// AMQP URL override
    #[arg(long, value_name = "URL", help = "Override AMQP connection URL")]
    amqp_url: Option<String>,

    /// Enable debug mode
    #[arg(short, long, help = "Enable debug mode with verbose logging")]
    debug: bool,

    /// Dry run mode (validate config and exit)
    #[arg(
        long,
        help = "Validate configuration and exit without starting service"
    )]
    dry_run: bool,
}

/// Initialize structured logging with the configured level
fn init_logging(log_level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with_target(false)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

/// Perform health check and return appropriate exit code
async fn perform_health_check(config: AppConfig) -> Result<()> {
    info!("Performing health check...");

    let app_state = AppState::new(config).await?;

    match HealthCheck::check(&app_state).await {
        Ok(health) => {
            println!("Health Check: {}", health.status);
            println!("  Rated players: {}", health.stats.rated_players);
            println!(
                "  Tournaments scheduled: {}",
                health.stats.tournaments_scheduled
            );
            println!("  Fixtures created: {}", health.stats.fixtures_created);
            println!("  Results processed: {}", health.stats.results_processed);
            println!("  Ratings applied: {}", health.stats.ratings_applied);

            if health.status == HealthStatus::Unhealthy {
                std::process::exit(1);
            }
            std::process::exit(0);
        }
        Err(e) => {
            error!("Health check failed: {}", e);
            std::process::exit(1);
        }
    }
}

/// Wait for shutdown signals (SIGINT, SIGTERM)
async fn wait_for_shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT (Ctrl+C) signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }
}

/// Display startup banner with service information
fn display_startup_banner(config: &AppConfig) {
    info!("Kicker Engine Tournament Service");
    info!("   Service: {}", config.service.name);
    info!("   Log level: {}", config.service.log_level);
    info!("   AMQP: {}", config.amqp.url);
    info!("   Inbound queue: {}", config.amqp.queue_name);
    info!("   Results exchange: {}", config.amqp.exchange_name);
    info!("   K-factor: {}", config.engine.rating.k_factor);
    info!("   Initial rating: {}", config.engine.rating.initial_rating);
    info!(
        "   Double round-robin default: {}",
        config.engine.double_round_robin
    );
}

/// Load and merge configuration from environment and CLI arguments
fn load_config(args: &Args) -> Result<AppConfig> {
    let mut config = if let Some(config_path) = &args.config {
        info!("Loading configuration from: {}", config_path.display());
        AppConfig::from_file(config_path)?
    } else {
        AppConfig::from_env()?
    };

    // Apply CLI overrides
    if let Some(log_level) = &args.log_level {
        config.service.log_level = log_level.clone();
    }

    if args.debug {
        config.service.log_level = "debug".to_string();
    }

    if let Some(amqp_url) = &args.amqp_url {
        config.amqp.url = amqp_url.clone();
    }

    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = load_config(&args).unwrap_or_else(|e| {
        eprintln!("Configuration error: {}", e);
        std::process::exit(1);
    });

    if let Err(e) = init_logging(&config.service.log_level) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    if args.health_check {
        return perform_health_check(config).await;
    }

    if args.dry_run {
        info!("Configuration validation successful");
        display_startup_banner(&config);
        info!("Dry run completed - exiting without starting service");
        return Ok(());
    }

    display_startup_banner(&config);

    info!("Initializing service components...");
    let mut app_state = match AppState::new(config.clone()).await {
        Ok(state) => state,
        Err(e) => {
            error!("Failed to initialize application: {}", e);
            std::process::exit(1);
        }
    };

    info!("Starting service...");
    if let Err(e) = app_state.start().await {
        error!("Failed to start service: {}", e);
        std::process::exit(1);
    }

    info!("Kicker Engine is running");
    info!("Press Ctrl+C to shutdown gracefully...");

    // Periodic health reporting until a shutdown signal arrives
    let mut report_interval = tokio::time::interval(tokio::time::Duration::from_secs(30));
    report_interval.tick().await; // First tick fires immediately
    loop {
        tokio::select! {
            _ = report_interval.tick() => {
                match HealthCheck::check(&app_state).await {
                    Ok(health) => {
                        info!(
                            "Health check: {} - {} fixtures created, {} results processed, {} ratings applied",
                            health.status,
                            health.stats.fixtures_created,
                            health.stats.results_processed,
                            health.stats.ratings_applied
                        );
                    }
                    Err(e) => {
                        warn!("Health check failed: {}", e);
                    }
                }
            }
            _ = wait_for_shutdown_signal() => {
                break;
            }
        }
    }

    info!("Shutdown signal received, beginning graceful shutdown...");

    let shutdown_timeout = app_state.config().shutdown_timeout();
    match tokio::time::timeout(shutdown_timeout, app_state.shutdown()).await {
        Ok(Ok(())) => {
            info!("Graceful shutdown completed successfully");
        }
        Ok(Err(e)) => {
            warn!("Shutdown finished with errors: {}", e);
        }
        Err(_) => {
            warn!("Shutdown timeout exceeded, forcing exit");
        }
    }

    info!("Kicker Engine stopped");
    Ok(())
}
