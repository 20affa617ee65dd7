use bevy_ecs::{event::Events, system::RunSystemOnce};
use dogdash::events::{GameCommand, GameEvent};
use dogdash::systems::{
    input_system, process_input_actions, Bindings, HeldDirections, InputAction, InputQueue, InputState, Key,
};
use speculoos::prelude::*;

mod common;

fn jump() -> GameEvent {
    GameEvent::Command(GameCommand::Jump)
}

#[test]
fn test_commands_fire_on_press_edge_only() {
    let mut bindings = Bindings::default();
    let mut state = InputState::default();

    let events = process_input_actions(
        &mut bindings,
        &mut state,
        &[InputAction::KeyDown(Key::Space), InputAction::KeyDown(Key::Space)],
    );
    assert_that(&events.to_vec()).is_equal_to(vec![jump()]);

    let events = process_input_actions(
        &mut bindings,
        &mut state,
        &[InputAction::KeyUp(Key::Space), InputAction::KeyDown(Key::Space)],
    );
    assert_that(&events.to_vec()).is_equal_to(vec![jump()]);
}

#[test]
fn test_default_bindings() {
    let bindings = Bindings::default();
    let expected = [
        (Key::Up, GameCommand::Jump),
        (Key::W, GameCommand::Jump),
        (Key::Enter, GameCommand::Start),
        (Key::R, GameCommand::Retry),
        (Key::P, GameCommand::TogglePause),
        (Key::N, GameCommand::SingleStep),
        (Key::Escape, GameCommand::Exit),
    ];

    for (key, command) in expected {
        assert_that(&bindings.binding(key)).is_equal_to(Some(dogdash::systems::Binding::Command(command)));
    }
}

#[test]
fn test_opposite_directions_cancel() {
    let mut bindings = Bindings::default();
    let mut state = InputState::default();

    process_input_actions(&mut bindings, &mut state, &[InputAction::KeyDown(Key::Left)]);
    assert_that(&state.axis()).is_equal_to(-1.0);

    process_input_actions(&mut bindings, &mut state, &[InputAction::KeyDown(Key::D)]);
    assert_that(&state.held).is_equal_to(HeldDirections::LEFT | HeldDirections::RIGHT);
    assert_that(&state.axis()).is_equal_to(0.0);

    process_input_actions(&mut bindings, &mut state, &[InputAction::KeyUp(Key::Left)]);
    assert_that(&state.axis()).is_equal_to(1.0);
}

#[test]
fn test_two_keys_for_one_direction() {
    let mut bindings = Bindings::default();
    let mut state = InputState::default();

    process_input_actions(
        &mut bindings,
        &mut state,
        &[
            InputAction::KeyDown(Key::Left),
            InputAction::KeyDown(Key::A),
            InputAction::KeyUp(Key::Left),
        ],
    );

    assert_that(&state.held).is_equal_to(HeldDirections::LEFT);
}

#[test]
fn test_pointer_zones() {
    let mut state = InputState {
        held: HeldDirections::empty(),
        pointer: Some(100.0),
    };
    assert_that(&state.axis()).is_close_to(-0.35, 1e-6);

    state.pointer = Some(320.0);
    assert_that(&state.axis()).is_equal_to(0.0);

    state.pointer = Some(600.0);
    assert_that(&state.axis()).is_close_to(0.35, 1e-6);

    state.held = HeldDirections::RIGHT;
    assert_that(&state.axis()).is_equal_to(1.0);
}

#[test]
fn test_pointer_down_jumps_once_per_press() {
    let mut bindings = Bindings::default();
    let mut state = InputState::default();

    let events = process_input_actions(
        &mut bindings,
        &mut state,
        &[
            InputAction::PointerDown { x: 500.0 },
            InputAction::PointerDown { x: 510.0 },
            InputAction::PointerMove { x: 100.0 },
        ],
    );

    assert_that(&events.to_vec()).is_equal_to(vec![jump()]);
    assert_that(&state.pointer).is_equal_to(Some(100.0));

    process_input_actions(
        &mut bindings,
        &mut state,
        &[InputAction::PointerUp, InputAction::PointerMove { x: 300.0 }],
    );
    assert_that(&state.pointer).is_none();
}

#[test]
fn test_input_system_drains_queue() {
    let mut world = common::create_test_world();
    world.insert_resource(InputQueue(vec![
        InputAction::KeyDown(Key::Enter),
        InputAction::KeyDown(Key::Right),
    ]));

    world
        .run_system_once(input_system)
        .expect("System should run successfully");

    assert_that(&world.resource::<InputQueue>().0.is_empty()).is_true();
    assert_that(&world.resource::<InputState>().held).is_equal_to(HeldDirections::RIGHT);
    let events: Vec<GameEvent> = world.resource_mut::<Events<GameEvent>>().drain().collect();
    assert_that(&events).is_equal_to(vec![GameEvent::Command(GameCommand::Start)]);
}
