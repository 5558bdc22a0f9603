//! Integration tests for the kicker-engine tournament service
//!
//! These tests drive the production event handler end to end:
//! - tournament start through schedule generation and event publication
//! - match finalization through rating application and event publication
//! - idempotent redelivery and administrative re-scoring
//! - scoring-rule evaluation carried on the published events

// Modules for organizing tests
mod fixtures;

use fixtures::{
    count_events_of_type, create_test_teams, finalize_notice, start_notice, start_tournament,
};
use kicker_engine::amqp::handlers::MessageHandler;
use kicker_engine::{MatchStore, RatingStorage};
use kicker_engine::types::{EngineMessage, MatchStatus};
use kicker_engine::utils::generate_match_id;
use kicker_engine::utils::generate_tournament_id;
use std::collections::HashSet;
use std::sync::atomic::Ordering;

#[tokio::test]
async fn test_tournament_start_generates_full_schedule() {
    let system = fixtures::create_test_system();

    let (tournament_id, fixtures) = start_tournament(&system, 4, false).await;

    // 4 teams, single leg: 6 fixtures over 3 rounds
    assert_eq!(fixtures.len(), 6);
    assert_eq!(fixtures.iter().map(|f| f.round).max(), Some(3));
    assert_eq!(count_events_of_type(&system.publisher, "FixturesScheduled"), 1);

    // Every fixture is persisted and scheduled
    let stored = system
        .matches
        .fixtures_for_tournament(&tournament_id)
        .unwrap();
    assert_eq!(stored.len(), 6);
    for record in &stored {
        assert_eq!(record.status, MatchStatus::Scheduled);
        assert_eq!(record.result_version, 0);
        assert!(record.fixture.table.is_none());
    }

    // Every unordered team pair appears exactly once
    let mut pairs = HashSet::new();
    for record in &stored {
        let mut pair = [record.fixture.home_team, record.fixture.away_team];
        pair.sort();
        assert!(pairs.insert(pair));
    }
    assert_eq!(pairs.len(), 6);

    assert_eq!(system.stats.tournaments_scheduled.load(Ordering::Relaxed), 1);
    assert_eq!(system.stats.fixtures_created.load(Ordering::Relaxed), 6);
}

#[tokio::test]
async fn test_double_round_robin_mirrors_schedule() {
    let system = fixtures::create_test_system();

    let (_, fixtures) = start_tournament(&system, 4, true).await;

    assert_eq!(fixtures.len(), 12);
    assert_eq!(fixtures.iter().map(|f| f.round).max(), Some(6));

    // Each ordered pairing appears exactly once: the return leg swaps sides
    let mut ordered = HashSet::new();
    for fixture in &fixtures {
        assert!(ordered.insert((fixture.home_team, fixture.away_team)));
    }
    assert_eq!(ordered.len(), 12);
}

#[tokio::test]
async fn test_start_notice_with_one_team_is_rejected() {
    let system = fixtures::create_test_system();

    let result = system
        .handler
        .handle_tournament_started(start_notice(
            generate_tournament_id(),
            create_test_teams(1),
            None,
        ))
        .await;

    assert!(result.is_err());
    assert_eq!(count_events_of_type(&system.publisher, "FixturesScheduled"), 0);
}

#[tokio::test]
async fn test_configured_legs_default_applies_when_notice_is_silent() {
    // Engine configured for double round-robin by default
    let system = fixtures::create_test_system_with(true);
    let tournament_id = generate_tournament_id();

    system
        .handler
        .handle_tournament_started(start_notice(tournament_id, create_test_teams(4), None))
        .await
        .unwrap();

    let stored = system
        .matches
        .fixtures_for_tournament(&tournament_id)
        .unwrap();
    assert_eq!(stored.len(), 12);

    // An explicit request still wins over the default
    let single_id = generate_tournament_id();
    system
        .handler
        .handle_tournament_started(start_notice(single_id, create_test_teams(4), Some(false)))
        .await
        .unwrap();
    assert_eq!(
        system.matches.fixtures_for_tournament(&single_id).unwrap().len(),
        6
    );
}

#[tokio::test]
async fn test_finalized_match_applies_ratings_and_publishes() {
    let system = fixtures::create_test_system();
    let (tournament_id, fixtures) = start_tournament(&system, 2, false).await;
    let fixture = &fixtures[0];

    system
        .handler
        .handle_match_finalized(finalize_notice(fixture.id, tournament_id, 10, 0))
        .await
        .unwrap();

    // Ratings moved by 16 for evenly matched fresh players
    let home_team = system.matches.get_team(&fixture.home_team).unwrap().unwrap();
    let away_team = system.matches.get_team(&fixture.away_team).unwrap().unwrap();
    let winner = system
        .ratings
        .get_rating(&home_team.players[0])
        .unwrap()
        .unwrap();
    let loser = system
        .ratings
        .get_rating(&away_team.players[0])
        .unwrap()
        .unwrap();
    assert_eq!(winner.rating, 1016);
    assert_eq!(loser.rating, 984);

    // One RatingsUpdated event carrying deltas and match points
    let events = system.publisher.get_published_events();
    let updated = events
        .iter()
        .find_map(|event| match event {
            EngineMessage::RatingsUpdated(updated) => Some(updated),
            _ => None,
        })
        .expect("RatingsUpdated must be published");

    assert_eq!(updated.match_id, fixture.id);
    assert_eq!(updated.result_version, 1);
    assert_eq!(updated.home_side_rating, 1000.0);
    assert_eq!(updated.changes.len(), 2);
    assert!(updated.changes.iter().any(|c| c.delta == 16));
    assert!(updated.changes.iter().any(|c| c.delta == -16));
    // 10-0 under default house rules: 3 (win) + 1 (threshold) + 1 (shutout)
    assert_eq!(updated.home_points, 5);
    assert_eq!(updated.away_points, 0);

    assert_eq!(system.stats.ratings_applied.load(Ordering::Relaxed), 1);
}

#[tokio::test]
async fn test_redelivered_finalization_is_idempotent() {
    let system = fixtures::create_test_system();
    let (tournament_id, fixtures) = start_tournament(&system, 2, false).await;
    let fixture = &fixtures[0];

    for _ in 0..3 {
        system
            .handler
            .handle_match_finalized(finalize_notice(fixture.id, tournament_id, 10, 4))
            .await
            .unwrap();
    }

    // Exactly one rating application and one published event
    assert_eq!(count_events_of_type(&system.publisher, "RatingsUpdated"), 1);
    assert_eq!(system.stats.ratings_applied.load(Ordering::Relaxed), 1);
    assert_eq!(system.stats.updates_skipped.load(Ordering::Relaxed), 2);

    let home_team = system.matches.get_team(&fixture.home_team).unwrap().unwrap();
    let entry = system
        .ratings
        .get_rating(&home_team.players[0])
        .unwrap()
        .unwrap();
    assert_eq!(entry.rating, 1016);
    assert_eq!(entry.matches_played, 1);
}

#[tokio::test]
async fn test_rescoring_applies_exactly_once_more() {
    let system = fixtures::create_test_system();
    let (tournament_id, fixtures) = start_tournament(&system, 2, false).await;
    let fixture = &fixtures[0];

    system
        .handler
        .handle_match_finalized(finalize_notice(fixture.id, tournament_id, 10, 4))
        .await
        .unwrap();

    // Administrators correct the score: new version, new application
    system
        .handler
        .handle_match_finalized(finalize_notice(fixture.id, tournament_id, 4, 10))
        .await
        .unwrap();

    assert_eq!(count_events_of_type(&system.publisher, "RatingsUpdated"), 2);

    let record = system.matches.fetch_match(&fixture.id).unwrap().unwrap();
    assert_eq!(record.result_version, 2);

    // 1016 favorite loses the re-scored match: expected ~0.546, -17
    let home_team = system.matches.get_team(&fixture.home_team).unwrap().unwrap();
    let entry = system
        .ratings
        .get_rating(&home_team.players[0])
        .unwrap()
        .unwrap();
    assert_eq!(entry.rating, 999);
    assert_eq!(entry.matches_played, 2);
}

#[tokio::test]
async fn test_finalizing_unknown_match_fails() {
    let system = fixtures::create_test_system();
    let (tournament_id, _) = start_tournament(&system, 2, false).await;

    let result = system
        .handler
        .handle_match_finalized(finalize_notice(
            generate_match_id(),
            tournament_id,
            5,
            5,
        ))
        .await;

    assert!(result.is_err());
    assert_eq!(count_events_of_type(&system.publisher, "RatingsUpdated"), 0);
}

#[tokio::test]
async fn test_draw_publishes_draw_points() {
    let system = fixtures::create_test_system();
    let (tournament_id, fixtures) = start_tournament(&system, 2, false).await;
    let fixture = &fixtures[0];

    system
        .handler
        .handle_match_finalized(finalize_notice(fixture.id, tournament_id, 4, 4))
        .await
        .unwrap();

    let events = system.publisher.get_published_events();
    let updated = events
        .iter()
        .find_map(|event| match event {
            EngineMessage::RatingsUpdated(updated) => Some(updated),
            _ => None,
        })
        .unwrap();

    // Equal fresh ratings draw: zero delta, both sides at threshold get 1+1
    assert!(updated.changes.iter().all(|c| c.delta == 0));
    assert_eq!(updated.home_points, 2);
    assert_eq!(updated.away_points, 2);
}

#[tokio::test]
async fn test_full_tournament_produces_consistent_standings_data() {
    let system = fixtures::create_test_system();
    let (tournament_id, fixtures) = start_tournament(&system, 4, false).await;

    // Home side wins every match 5-3
    for fixture in &fixtures {
        system
            .handler
            .handle_match_finalized(finalize_notice(fixture.id, tournament_id, 5, 3))
            .await
            .unwrap();
    }

    assert_eq!(count_events_of_type(&system.publisher, "RatingsUpdated"), 6);

    // Zero-sum conservation: total rating mass stays at the seeded level
    let all = system.ratings.get_all_ratings().unwrap();
    assert_eq!(all.len(), 4);
    let total: i64 = all.values().map(|e| e.rating as i64).sum();
    assert_eq!(total, 4000);

    // Each player played 3 matches
    assert!(all.values().all(|e| e.matches_played == 3));

    // Leaderboard is consistent with the stored ratings
    let board = system.ratings.leaderboard(None).unwrap();
    assert_eq!(board.len(), 4);
    assert!(board.windows(2).all(|w| w[0].rating >= w[1].rating));
}
