use bevy_ecs::system::RunSystemOnce;
use dogdash::constants::{field, physics};
use dogdash::events::{GameCommand, GameEvent};
use dogdash::systems::{
    integrate, player_control_system, player_physics_system, Body, HeldDirections, InputState, Jumper, PlayerControlled,
};
use speculoos::prelude::*;

mod common;

use common::STEP;

fn grounded_player() -> (Body, Jumper) {
    (Body::grounded(physics::PLAYER_START_X, physics::PLAYER_SIZE), Jumper::default())
}

#[test]
fn test_two_jump_charges() {
    let mut jumper = Jumper::default();

    assert_that(&jumper.try_jump()).is_true();
    assert_that(&jumper.try_jump()).is_true();
    assert_that(&jumper.try_jump()).is_false();
    assert_that(&jumper.jumps_left).is_equal_to(0);
    assert_that(&jumper.velocity.y).is_equal_to(physics::JUMP_VELOCITY);
}

#[test]
fn test_charges_restore_only_on_landing() {
    let (mut body, mut jumper) = grounded_player();
    jumper.try_jump();
    jumper.try_jump();

    integrate(&mut body, &mut jumper, STEP);
    assert_that(&jumper.grounded).is_false();
    assert_that(&jumper.jumps_left).is_equal_to(0);

    let mut steps = 0;
    while !jumper.grounded {
        integrate(&mut body, &mut jumper, STEP);
        steps += 1;
        assert_that(&steps).is_less_than(600);
    }

    assert_that(&jumper.jumps_left).is_equal_to(physics::MAX_JUMPS);
    assert_that(&body.bottom()).is_close_to(field::GROUND_Y, 1e-4);
    assert_that(&jumper.velocity.y).is_equal_to(0.0);
}

#[test]
fn test_standing_keeps_charges() {
    let (mut body, mut jumper) = grounded_player();
    jumper.jumps_left = 1;

    integrate(&mut body, &mut jumper, STEP);

    // Already on the ground, so there was no landing to restore charges
    assert_that(&jumper.grounded).is_true();
    assert_that(&jumper.jumps_left).is_equal_to(1);
}

#[test]
fn test_horizontal_clamp() {
    let (mut body, mut jumper) = grounded_player();

    jumper.velocity.x = -physics::MOVE_SPEED;
    integrate(&mut body, &mut jumper, 1.0);
    assert_that(&body.position.x).is_equal_to(physics::EDGE_MARGIN);

    jumper.velocity.x = physics::MOVE_SPEED;
    integrate(&mut body, &mut jumper, 5.0);
    assert_that(&body.position.x).is_equal_to(field::WIDTH - physics::PLAYER_SIZE.x - physics::EDGE_MARGIN);
}

#[test]
fn test_control_system_applies_axis_and_jump() {
    let mut world = common::create_test_world();
    let player = common::spawn_test_player(&mut world);
    world.insert_resource(InputState {
        held: HeldDirections::RIGHT,
        pointer: None,
    });
    common::send_game_event(&mut world, GameEvent::Command(GameCommand::Jump));

    world
        .run_system_once(player_control_system)
        .expect("System should run successfully");

    let jumper = *world.get::<Jumper>(player).expect("player has a jumper");
    assert_that(&jumper.velocity.x).is_equal_to(physics::MOVE_SPEED);
    assert_that(&jumper.velocity.y).is_equal_to(physics::JUMP_VELOCITY);
    assert_that(&jumper.jumps_left).is_equal_to(1);
}

#[test]
fn test_control_system_ignores_other_commands() {
    let mut world = common::create_test_world();
    let player = common::spawn_test_player(&mut world);
    common::send_game_event(&mut world, GameEvent::Command(GameCommand::TogglePause));

    world
        .run_system_once(player_control_system)
        .expect("System should run successfully");

    let jumper = *world.get::<Jumper>(player).expect("player has a jumper");
    assert_that(&jumper).is_equal_to(Jumper::default());
}

#[test]
fn test_physics_system_moves_player() {
    let mut world = common::create_test_world();
    let player = common::spawn_test_player(&mut world);
    world
        .get_mut::<Jumper>(player)
        .expect("player has a jumper")
        .velocity
        .x = -physics::MOVE_SPEED;

    world
        .run_system_once(player_physics_system)
        .expect("System should run successfully");

    let mut query = world.query_filtered::<&Body, bevy_ecs::query::With<PlayerControlled>>();
    let body = query.single(&world).expect("one player");
    assert_that(&body.position.x).is_close_to(physics::PLAYER_START_X - physics::MOVE_SPEED * STEP, 1e-4);
}
