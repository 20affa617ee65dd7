use dogdash::constants::{spawn, timing};
use dogdash::error::{ConfigError, GameError};
use dogdash::events::RunEvent;
use dogdash::game::{Game, GameConfig};
use dogdash::stage::default_stages;
use dogdash::systems::difficulty::min_gap;
use dogdash::systems::{InputAction, Key, ObstacleTag, RunPhase, FORCED_SPAWN_X};
use pretty_assertions::assert_eq;
use speculoos::prelude::*;

mod common;

use common::STEP;

fn spawned_kinds(events: &[RunEvent]) -> Vec<ObstacleTag> {
    events
        .iter()
        .filter_map(|event| match event {
            RunEvent::ObstacleSpawned { kind, .. } => Some(*kind),
            _ => None,
        })
        .collect()
}

fn config_error(config: GameConfig) -> Option<ConfigError> {
    match Game::new(config) {
        Err(GameError::Config(error)) => Some(error),
        _ => None,
    }
}

#[test]
fn test_invalid_configuration() {
    let empty = GameConfig {
        stages: Vec::new(),
        ..GameConfig::default()
    };
    assert_that(&config_error(empty)).is_equal_to(Some(ConfigError::NoStages));

    let out_of_range = GameConfig {
        start_stage: 7,
        ..GameConfig::default()
    };
    assert_that(&config_error(out_of_range)).is_equal_to(Some(ConfigError::StartStageOutOfRange { index: 7, count: 3 }));

    let frozen = GameConfig {
        fixed_step: 0.0,
        ..GameConfig::default()
    };
    assert_that(&config_error(frozen)).is_equal_to(Some(ConfigError::InvalidTimestep(0.0)));

    let stalled = GameConfig {
        max_steps_per_frame: 0,
        ..GameConfig::default()
    };
    assert_that(&config_error(stalled)).is_equal_to(Some(ConfigError::NoStepsPerFrame));
}

#[test]
fn test_start_stage_is_respected() {
    let mut game = Game::new(GameConfig {
        start_stage: 2,
        ..GameConfig::seeded(common::TEST_SEED)
    })
    .expect("test configuration is valid");
    game.start();

    assert_that(&game.stage().id).is_equal_to(3);
    assert_that(&game.drain_events()).is_equal_to(vec![RunEvent::StageStarted { stage: 3 }]);
}

#[test]
fn test_opening_spawns_only_fences() {
    let mut game = common::seeded_game(default_stages());
    game.start();

    let mut events = Vec::new();
    for _ in 0..359 {
        game.step();
        events.extend(game.drain_events());
    }

    let kinds = spawned_kinds(&events);
    assert_that(&kinds.is_empty()).is_false();
    assert_that(&kinds.iter().all(|kind| *kind == ObstacleTag::Fence)).is_true();
}

#[test]
fn test_boss_warning_and_forced_spawn() {
    let mut game = common::seeded_game(vec![common::boss_stage(151.0)]);
    game.start();

    let events = common::step_until(&mut game, 600, |_, events| {
        events.iter().any(|event| matches!(event, RunEvent::BossWarning { .. }))
    });

    let duration = events
        .iter()
        .find_map(|event| match event {
            RunEvent::BossWarning { duration } => Some(*duration),
            _ => None,
        })
        .expect("boss warning fired");
    assert_that(&duration).is_greater_than_or_equal_to(spawn::WARNING_MIN);
    assert_that(&duration).is_less_than_or_equal_to(spawn::WARNING_MAX);
    assert_that(&spawned_kinds(&events).last()).is_equal_to(Some(&ObstacleTag::Boss));

    let snapshot = game.snapshot();
    assert_that(&snapshot.boss_mode).is_true();
    assert_that(&snapshot.warning.is_some()).is_true();
    let boss = snapshot
        .obstacles
        .iter()
        .find(|view| view.kind == ObstacleTag::Boss)
        .expect("boss on the field");
    assert_that(&boss.position.x).is_equal_to(FORCED_SPAWN_X);
    assert_that(&boss.aura).is_greater_than(0.0);
    assert_that(&boss.heads).is_equal_to(1);
}

#[test]
fn test_seeded_runs_are_deterministic() {
    let run = || {
        let mut game = common::seeded_game(default_stages());
        game.start();
        game.push_input(InputAction::KeyDown(Key::Right));
        let mut events = Vec::new();
        for _ in 0..1_200 {
            game.step();
            events.extend(game.drain_events());
        }
        (events, game.snapshot())
    };

    let (first_events, first_snapshot) = run();
    let (second_events, second_snapshot) = run();

    assert_eq!(first_events, second_events);
    assert_eq!(first_snapshot, second_snapshot);
}

#[test]
fn test_tick_clamps_frame_delta() {
    let mut game = common::seeded_game(default_stages());
    game.start();

    game.tick(0.5);

    let expected = (timing::MAX_FRAME_DELTA / STEP).floor() * STEP;
    assert_that(&game.run_state().elapsed).is_close_to(expected, 1e-5);
}

#[test]
fn test_exit_command() {
    let mut game = common::seeded_game(default_stages());
    game.push_input(InputAction::KeyDown(Key::Escape));

    assert_that(&game.step()).is_true();
}

#[test]
fn test_snapshot_tracks_player_and_progress() {
    let mut game = common::seeded_game(default_stages());
    game.start();
    for _ in 0..120 {
        game.step();
    }

    let snapshot = game.snapshot();

    assert_that(&snapshot.phase).is_equal_to(RunPhase::Playing);
    assert_that(&snapshot.stage_name.as_str()).is_equal_to("Park");
    assert_that(&snapshot.player.is_some()).is_true();
    assert_that(&snapshot.remaining_distance).is_less_than(900);
    assert_that(&snapshot.obstacles.windows(2).all(|pair| pair[0].serial < pair[1].serial)).is_true();
}

#[test]
fn test_timing_report_after_steps() {
    let mut game = common::seeded_game(default_stages());
    game.start();
    for _ in 0..10 {
        game.step();
    }

    let report = game.timing_report();

    assert_that(&report.is_empty()).is_false();
    assert_that(&report[0].contains("SPS")).is_true();
}

#[test]
fn test_normal_spawns_keep_minimum_gap() {
    let mut game = common::seeded_game(vec![common::short_stage(1, 50_000.0)]);
    game.start();

    let mut checked = 0;
    for _ in 0..3_600 {
        if game.phase() != RunPhase::Playing {
            game.retry();
        }
        let elapsed = game.run_state().elapsed;

        game.step();
        let events = game.drain_events();
        let snapshot = game.snapshot();

        for event in &events {
            let RunEvent::ObstacleSpawned { serial, kind } = event else {
                continue;
            };
            if matches!(kind, ObstacleTag::Boss | ObstacleTag::Illusion) {
                continue;
            }
            let Some(spawned) = snapshot.obstacles.iter().find(|view| view.serial == *serial) else {
                continue;
            };
            let rightmost = snapshot
                .obstacles
                .iter()
                .filter(|view| view.serial < *serial)
                .map(|view| view.position.x + view.size.x)
                .fold(None, |acc: Option<f32>, right| Some(acc.map_or(right, |x| x.max(right))));

            if let Some(rightmost) = rightmost {
                let gap = min_gap(game.stage(), elapsed);
                assert!(
                    spawned.position.x >= rightmost + gap - 1e-3,
                    "serial {serial} at {} is closer than {gap} to {rightmost}",
                    spawned.position.x
                );
                checked += 1;
            }
        }
    }

    assert_that(&checked).is_greater_than(5);
}

#[test]
fn test_score_never_decreases_during_a_run() {
    let mut game = common::seeded_game(default_stages());
    game.start();
    game.push_input(InputAction::KeyDown(Key::Right));

    let mut previous = game.score();
    let mut samples = 0;
    for step in 0..2_400 {
        if step % 40 == 0 {
            game.push_input(InputAction::KeyDown(Key::Space));
        } else if step % 40 == 1 {
            game.push_input(InputAction::KeyUp(Key::Space));
        }

        game.step();
        if game.phase() != RunPhase::Playing {
            break;
        }

        let score = game.score();
        assert!(score >= previous, "score fell from {previous} to {score} at step {step}");
        previous = score;
        samples += 1;
    }

    assert_that(&samples).is_greater_than(0);
}
