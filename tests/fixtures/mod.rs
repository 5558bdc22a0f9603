//! Test fixtures and helpers for integration testing

use kicker_engine::amqp::handlers::MessageHandler;
use kicker_engine::amqp::publisher::MockEventPublisher;
use kicker_engine::config::{EloSettings, ScoringSettings};
use kicker_engine::rating::elo::EloEngine;
use kicker_engine::rating::storage::InMemoryRatingStorage;
use kicker_engine::service::{EngineMessageHandler, EngineStats};
use kicker_engine::tournament::store::InMemoryMatchStore;
use kicker_engine::types::{
    EngineMessage, MatchFinalized, MatchId, Team, TournamentId, TournamentStarted,
};
use kicker_engine::utils::{current_timestamp, generate_tournament_id};
use std::sync::Arc;

/// A complete in-process engine wired to in-memory storage and a mock
/// publisher, mirroring the production AppState assembly.
pub struct TestSystem {
    pub handler: EngineMessageHandler,
    pub matches: Arc<InMemoryMatchStore>,
    pub ratings: Arc<InMemoryRatingStorage>,
    pub publisher: Arc<MockEventPublisher>,
    pub stats: Arc<EngineStats>,
}

/// Integration test setup that creates a complete system
pub fn create_test_system() -> TestSystem {
    create_test_system_with(false)
}

/// Same system with an explicit double-round-robin default
pub fn create_test_system_with(double_round_robin_default: bool) -> TestSystem {
    let matches = Arc::new(InMemoryMatchStore::new());
    let ratings = Arc::new(InMemoryRatingStorage::new());
    let publisher = Arc::new(MockEventPublisher::new());
    let stats = Arc::new(EngineStats::default());

    let engine = EloEngine::new(EloSettings::default()).expect("default settings are valid");
    let scoring_rules = ScoringSettings::default()
        .to_rules()
        .expect("default scoring settings are valid");

    let handler = EngineMessageHandler::new(
        engine,
        matches.clone(),
        ratings.clone(),
        publisher.clone(),
        scoring_rules,
        double_round_robin_default,
        stats.clone(),
    );

    TestSystem {
        handler,
        matches,
        ratings,
        publisher,
        stats,
    }
}

/// Teams with one player each, named deterministically
pub fn create_test_teams(count: usize) -> Vec<Team> {
    (0..count)
        .map(|i| Team::new(format!("Team {i}"), vec![format!("player_{i}")]))
        .collect()
}

/// A valid tournament start notice for the given teams
pub fn start_notice(
    tournament_id: TournamentId,
    teams: Vec<Team>,
    double_round_robin: Option<bool>,
) -> TournamentStarted {
    TournamentStarted {
        tournament_id,
        teams,
        double_round_robin,
        timestamp: current_timestamp(),
    }
}

/// A finalized result notice for the given match
pub fn finalize_notice(
    match_id: MatchId,
    tournament_id: TournamentId,
    home_score: u32,
    away_score: u32,
) -> MatchFinalized {
    MatchFinalized {
        match_id,
        tournament_id,
        home_score,
        away_score,
        timestamp: current_timestamp(),
    }
}

/// Convenience: start a fresh tournament and return its id plus the
/// scheduled fixtures as published by the engine.
pub async fn start_tournament(
    system: &TestSystem,
    team_count: usize,
    double_round_robin: bool,
) -> (TournamentId, Vec<kicker_engine::types::Fixture>) {
    let tournament_id = generate_tournament_id();
    let teams = create_test_teams(team_count);

    system
        .handler
        .handle_tournament_started(start_notice(tournament_id, teams, Some(double_round_robin)))
        .await
        .expect("tournament start must succeed");

    let fixtures = system
        .publisher
        .get_published_events()
        .into_iter()
        .find_map(|event| match event {
            EngineMessage::FixturesScheduled(scheduled)
                if scheduled.tournament_id == tournament_id =>
            {
                Some(scheduled.fixtures)
            }
            _ => None,
        })
        .expect("FixturesScheduled event must be published");

    (tournament_id, fixtures)
}

/// Count published events of a specific type
pub fn count_events_of_type(publisher: &MockEventPublisher, event_type: &str) -> usize {
    publisher
        .get_published_events()
        .iter()
        .filter(|event| match event {
            EngineMessage::FixturesScheduled(_) => event_type == "FixturesScheduled",
            EngineMessage::RatingsUpdated(_) => event_type == "RatingsUpdated",
            _ => false,
        })
        .count()
}
