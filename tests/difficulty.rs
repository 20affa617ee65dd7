use dogdash::constants::difficulty::{INTERVAL_MAX, INTERVAL_MIN};
use dogdash::stage::default_stages;
use dogdash::systems::difficulty::{current_speed, distance_delta, friend_chance, min_gap, pair_chance, spawn_interval};
use speculoos::prelude::*;

#[test]
fn test_speed_ramps_until_window_then_holds() {
    let park = &default_stages()[0];

    assert_that(&current_speed(park, 0.0)).is_close_to(240.0, 1e-4);
    assert_that(&current_speed(park, 17.5)).is_close_to(240.0 * 1.175, 1e-3);
    assert_that(&current_speed(park, 35.0)).is_close_to(240.0 * 1.35, 1e-3);
    assert_that(&current_speed(park, 120.0)).is_close_to(240.0 * 1.35, 1e-3);
}

#[test]
fn test_speed_is_monotonic() {
    let street = &default_stages()[1];
    let mut previous = current_speed(street, 0.0);
    for i in 1..100 {
        let speed = current_speed(street, i as f32 * 0.5);
        assert_that(&speed).is_greater_than_or_equal_to(previous);
        previous = speed;
    }
}

#[test]
fn test_min_gap_tightens_to_stage_minimum() {
    let park = &default_stages()[0];

    assert_that(&min_gap(park, 0.0)).is_close_to(260.0, 1e-4);
    assert_that(&min_gap(park, 20.0)).is_close_to(215.0, 1e-3);
    assert_that(&min_gap(park, 40.0)).is_close_to(170.0, 1e-3);
    assert_that(&min_gap(park, 400.0)).is_close_to(170.0, 1e-3);
}

#[test]
fn test_spawn_interval_stays_in_bounds() {
    for density in [0.1, 0.5, 0.78, 1.06, 1.28, 5.0] {
        for step in 0..80 {
            let interval = spawn_interval(density, step as f32);
            assert_that(&interval).is_greater_than_or_equal_to(INTERVAL_MIN);
            assert_that(&interval).is_less_than_or_equal_to(INTERVAL_MAX);
        }
    }
}

#[test]
fn test_spawn_interval_shrinks_over_time() {
    let early = spawn_interval(1.06, 0.0);
    let late = spawn_interval(1.06, 35.0);

    assert_that(&early).is_close_to(0.62 / 1.06, 1e-4);
    assert_that(&late).is_close_to(0.62 / 1.06 * 0.72, 1e-4);
}

#[test]
fn test_distance_delta() {
    assert_that(&distance_delta(240.0, 1.0)).is_close_to(28.8, 1e-4);
    assert_that(&distance_delta(240.0, 0.0)).is_equal_to(0.0);
}

#[test]
fn test_variety_chances_clamp() {
    assert_that(&friend_chance(0.0)).is_close_to(0.03, 1e-6);
    assert_that(&friend_chance(18.0)).is_close_to(0.04, 1e-6);
    assert_that(&friend_chance(500.0)).is_close_to(0.07, 1e-6);

    assert_that(&pair_chance(0.0)).is_close_to(0.18, 1e-6);
    assert_that(&pair_chance(18.0)).is_close_to(0.28, 1e-6);
    assert_that(&pair_chance(500.0)).is_close_to(0.45, 1e-6);
}
