use bevy_ecs::system::RunSystemOnce;
use dogdash::archetype::Breed;
use dogdash::constants::{field, motion};
use dogdash::stage::FeintCycle;
use dogdash::systems::{
    advance_obstacle, obstacle_motion_system, Behavior, Bob, Body, FeintState, Motion, Obstacle, ObstacleBundle,
    ObstacleKind, RunState,
};
use glam::Vec2;
use speculoos::prelude::*;

mod common;

const CYCLE: FeintCycle = FeintCycle {
    slow_secs: 0.28,
    dash_secs: 0.24,
    slow_mul: 0.55,
    dash_mul: 1.75,
};

fn enemy_at(serial: u64, x: f32, speed: f32) -> ObstacleBundle {
    ObstacleBundle {
        obstacle: Obstacle::new(serial, ObstacleKind::Enemy { breed: Breed::Corgi }),
        body: Body::grounded(x, Vec2::new(64.0, 44.0)),
        motion: Motion::new(speed, Behavior::Plain),
    }
}

#[test]
fn test_feint_multiplier_phases() {
    let mut state = FeintState::new(CYCLE);
    assert_that(&state.multiplier()).is_close_to(0.55, 1e-6);

    state.elapsed = 0.28 + 0.12;
    assert_that(&state.multiplier()).is_close_to(0.55 + 1.2 * 0.25, 1e-4);

    state.elapsed = 0.28 + 0.24 - 1e-4;
    assert_that(&state.multiplier()).is_close_to(1.75, 1e-2);

    // Next period starts slow again
    state.elapsed = 0.52 + 0.1;
    assert_that(&state.multiplier()).is_close_to(0.55, 1e-4);
}

#[test]
fn test_behavior_advance() {
    let mut plain = Behavior::Plain;
    assert_that(&plain.advance(300.0, 0.1)).is_equal_to(300.0);

    let mut final_boss = Behavior::Final;
    assert_that(&final_boss.advance(300.0, 0.1)).is_equal_to(300.0);

    let mut feint = Behavior::Feint(FeintState::new(CYCLE));
    assert_that(&feint.advance(100.0, 0.1)).is_close_to(55.0, 1e-3);
    match feint {
        Behavior::Feint(state) => assert_that(&state.elapsed).is_close_to(0.1, 1e-6),
        other => panic!("Behavior changed variant: {other:?}"),
    }
}

#[test]
fn test_advance_moves_left_and_animates() {
    let mut bundle = enemy_at(0, 500.0, 240.0);
    bundle.obstacle.phase = Some(0.0);

    advance_obstacle(&mut bundle.obstacle, &mut bundle.body, &mut bundle.motion, 0.5);

    assert_that(&bundle.body.position.x).is_close_to(380.0, 1e-3);
    assert_that(&bundle.obstacle.phase).is_equal_to(Some(motion::ANIM_RATE * 0.5));
    assert_that(&bundle.body.bottom()).is_close_to(field::GROUND_Y, 1e-4);
}

#[test]
fn test_bob_oscillates_around_rest() {
    let mut bundle = enemy_at(0, 500.0, 100.0);
    bundle.motion = bundle.motion.with_bob(20.0);
    bundle.obstacle.phase = Some(0.0);
    let rest = field::GROUND_Y - bundle.body.size.y;

    advance_obstacle(&mut bundle.obstacle, &mut bundle.body, &mut bundle.motion, 0.1);

    let expected = rest + Bob { amplitude: 20.0 }.offset(motion::ANIM_RATE * 0.1);
    assert_that(&bundle.body.position.y).is_close_to(expected, 1e-4);
    assert_that(&(bundle.body.position.y - rest).abs()).is_less_than_or_equal_to(20.0);
}

#[test]
fn test_zero_amplitude_means_no_bob() {
    let motion = Motion::new(100.0, Behavior::Plain).with_bob(0.0);
    assert_that(&motion.bob).is_none();
}

#[test]
fn test_motion_system_culls_and_recomputes_rightmost() {
    let mut world = common::create_test_world();
    world.insert_resource(dogdash::systems::DeltaTime { seconds: 0.1 });
    world.spawn(enemy_at(0, -170.0, 240.0));
    world.spawn(enemy_at(1, 300.0, 200.0));
    world.spawn(enemy_at(2, 600.0, 200.0));
    world.resource_mut::<RunState>().rightmost_x = Some(9_999.0);

    world
        .run_system_once(obstacle_motion_system)
        .expect("System should run successfully");

    let serials: Vec<u64> = world.query::<&Obstacle>().iter(&world).map(|o| o.serial).collect();
    assert_that(&serials.contains(&0)).is_false();
    assert_that(&serials.len()).is_equal_to(2);
    let rightmost = world.resource::<RunState>().rightmost_x.expect("live obstacles remain");
    assert_that(&rightmost).is_close_to(580.0 + 64.0, 1e-3);
}
