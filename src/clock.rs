//! Frame timing: clamps host frame deltas and converts them into fixed simulation steps.

use tracing::trace;

use crate::constants::timing;
use crate::error::ConfigError;

/// Clamps a raw host frame delta into `[0, MAX_FRAME_DELTA]`.
///
/// Non-finite and negative deltas (clock skew, a tab returning from the background) become zero.
pub fn clamp_frame_delta(dt: f32) -> f32 {
    if !dt.is_finite() {
        return 0.0;
    }
    dt.clamp(0.0, timing::MAX_FRAME_DELTA)
}

/// Fixed-step accumulator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedStep {
    step: f32,
    max_steps: u32,
    accumulator: f32,
}

impl Default for FixedStep {
    fn default() -> Self {
        Self {
            step: timing::FIXED_STEP,
            max_steps: timing::MAX_STEPS_PER_FRAME,
            accumulator: 0.0,
        }
    }
}

impl FixedStep {
    pub fn new(step: f32, max_steps: u32) -> Result<Self, ConfigError> {
        if !step.is_finite() || step <= 0.0 {
            return Err(ConfigError::InvalidTimestep(step));
        }
        if max_steps == 0 {
            return Err(ConfigError::NoStepsPerFrame);
        }
        Ok(Self {
            step,
            max_steps,
            accumulator: 0.0,
        })
    }

    pub fn step(&self) -> f32 {
        self.step
    }

    /// Time banked toward the next step.
    pub fn pending(&self) -> f32 {
        self.accumulator
    }

    /// Banks a clamped frame delta and returns how many steps to run now.
    ///
    /// At most `max_steps` are returned; any backlog beyond that is dropped, keeping only the
    /// partial step.
    pub fn accumulate(&mut self, dt: f32) -> u32 {
        self.accumulator += clamp_frame_delta(dt);

        let mut steps = 0;
        while self.accumulator >= self.step && steps < self.max_steps {
            self.accumulator -= self.step;
            steps += 1;
        }

        if steps == self.max_steps && self.accumulator >= self.step {
            trace!(backlog = self.accumulator, "Dropping simulation backlog");
            self.accumulator %= self.step;
        }
        steps
    }

    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}
