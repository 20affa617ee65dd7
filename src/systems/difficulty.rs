//! Pure functions of stage parameters and elapsed run time that drive scroll speed and spawn pacing.

use crate::constants::{difficulty::*, spawn};
use crate::stage::Stage;

/// Fraction of the speed ramp reached at `elapsed`, in `[0, 1]`.
fn ramp(elapsed: f32, window: f32) -> f32 {
    elapsed.clamp(0.0, window) / window
}

/// Scroll speed for the stage at the given elapsed time.
pub fn current_speed(stage: &Stage, elapsed: f32) -> f32 {
    stage.base_speed * (1.0 + ramp(elapsed, SPEED_RAMP_WINDOW) * SPEED_RAMP_MAX)
}

/// Minimum spacing between a new obstacle and the right-most existing one.
/// Tightens linearly from the stage's base gap to its minimum.
pub fn min_gap(stage: &Stage, elapsed: f32) -> f32 {
    let k = ramp(elapsed, GAP_TIGHTEN_WINDOW);
    stage.gap_base + (stage.gap_min - stage.gap_base) * k
}

/// Base interval between normal spawns, before jitter.
pub fn spawn_interval(density: f32, elapsed: f32) -> f32 {
    let tighten = 1.0 - ramp(elapsed, SPEED_RAMP_WINDOW) * INTERVAL_TIGHTEN;
    (BASE_SPAWN_INTERVAL / density * tighten).clamp(INTERVAL_MIN, INTERVAL_MAX)
}

/// Distance units covered in one step at the given scroll speed.
pub fn distance_delta(speed: f32, dt: f32) -> f32 {
    speed * dt * DISTANCE_PER_PIXEL
}

/// Probability that a normal spawn is a friend rather than an enemy.
pub fn friend_chance(elapsed: f32) -> f32 {
    (spawn::FRIEND_CHANCE_BASE + (elapsed - spawn::VARIETY_START) * spawn::FRIEND_CHANCE_GROWTH)
        .clamp(spawn::FRIEND_CHANCE_BASE, spawn::FRIEND_CHANCE_MAX)
}

/// Probability that a normal spawn queues a delayed follow-up enemy.
pub fn pair_chance(elapsed: f32) -> f32 {
    (spawn::PAIR_CHANCE_BASE + (elapsed - spawn::VARIETY_START) * spawn::PAIR_CHANCE_GROWTH)
        .clamp(spawn::PAIR_CHANCE_BASE, spawn::PAIR_CHANCE_MAX)
}
