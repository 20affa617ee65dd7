use bevy_ecs::system::{Res, ResMut};

use crate::constants::timing;
use crate::systems::{DeltaTime, FixedTimestep, RunState};

/// Derives the effective step length, applying slow motion, and counts down step timers.
pub fn begin_step_system(fixed: Res<FixedTimestep>, mut dt: ResMut<DeltaTime>, mut run: ResMut<RunState>) {
    let mut seconds = fixed.0;
    if run.slow_motion > 0.0 {
        run.slow_motion = (run.slow_motion - seconds).max(0.0);
        seconds *= timing::SLOW_MOTION_SCALE;
    }

    if let Some(warning) = run.warning.as_mut() {
        warning.remaining -= seconds;
    }
    if run.warning.is_some_and(|warning| warning.remaining <= 0.0) {
        run.warning = None;
    }

    dt.seconds = seconds;
}

/// Advances the run clock. Runs last so every system in a step sees the same elapsed time.
pub fn end_step_system(dt: Res<DeltaTime>, mut run: ResMut<RunState>) {
    run.elapsed += dt.seconds;
}
