//! This module contains all the tuning constants used by the simulation.
//!
//! Distances are in field pixels, times in seconds, speeds in pixels per second.

use std::time::Duration;

/// Target wall-clock time of a single rendered frame for the real-time driver.
pub const LOOP_TIME: Duration = Duration::from_nanos((1_000_000_000.0 / 60.0) as u64);

pub mod field {
    /// Width of the visible play field, in pixels.
    pub const WIDTH: f32 = 640.0;
    /// Height of the visible play field, in pixels.
    pub const HEIGHT: f32 = 360.0;
    /// Y coordinate of the ground line. Grounded bodies rest their bottom edge on it.
    pub const GROUND_Y: f32 = 310.0;
    /// Obstacles whose right edge is left of this x are removed.
    pub const CULL_X: f32 = -120.0;
}

pub mod physics {
    use glam::Vec2;

    pub const GRAVITY: f32 = 1650.0;
    pub const JUMP_VELOCITY: f32 = -560.0;
    pub const MOVE_SPEED: f32 = 320.0;
    pub const PLAYER_SIZE: Vec2 = Vec2::new(44.0, 44.0);
    /// Starting x of the player, a fifth of the way across the field.
    pub const PLAYER_START_X: f32 = super::field::WIDTH * 0.2;
    /// Horizontal clamp margin on both sides of the field.
    pub const EDGE_MARGIN: f32 = 20.0;
    /// Jump charges restored on landing (ground jump plus one air jump).
    pub const MAX_JUMPS: u8 = 2;
}

pub mod timing {
    /// Frame deltas are clamped to this before being accumulated.
    pub const MAX_FRAME_DELTA: f32 = 0.033;
    /// Length of one fixed simulation step.
    pub const FIXED_STEP: f32 = 1.0 / 120.0;
    /// Upper bound on simulation steps executed for a single frame.
    pub const MAX_STEPS_PER_FRAME: u32 = 8;

    pub const SLOW_MOTION_DURATION: f32 = 0.25;
    pub const SLOW_MOTION_SCALE: f32 = 0.55;

    pub const POPUP_LIFETIME: f32 = 0.85;
    /// Popups drift upward at this speed.
    pub const POPUP_RISE_SPEED: f32 = -28.0;
}

pub mod difficulty {
    /// Seconds over which the speed ramp reaches its maximum.
    pub const SPEED_RAMP_WINDOW: f32 = 35.0;
    /// Maximum extra fraction of base speed added by the ramp.
    pub const SPEED_RAMP_MAX: f32 = 0.35;
    /// Seconds over which the minimum gap tightens from base to minimum.
    pub const GAP_TIGHTEN_WINDOW: f32 = 40.0;

    pub const BASE_SPAWN_INTERVAL: f32 = 0.62;
    /// Fraction by which the spawn interval shrinks once fully ramped.
    pub const INTERVAL_TIGHTEN: f32 = 0.28;
    pub const INTERVAL_MIN: f32 = 0.26;
    pub const INTERVAL_MAX: f32 = 0.95;
    /// Lower bound for a rearmed spawn timer after jitter is applied.
    pub const TIMER_FLOOR: f32 = 0.15;

    /// Distance units gained per pixel scrolled.
    pub const DISTANCE_PER_PIXEL: f32 = 0.12;
}

pub mod spawn {
    use glam::Vec2;

    /// Delay before the first spawn after a run begins.
    pub const FIRST_SPAWN_DELAY: f32 = 0.30;
    /// Only fences appear before this much elapsed time.
    pub const FENCE_ONLY_SECONDS: f32 = 3.0;
    /// Friends and paired enemies start appearing at this elapsed time.
    pub const VARIETY_START: f32 = 8.0;

    pub const FRIEND_CHANCE_BASE: f32 = 0.03;
    pub const FRIEND_CHANCE_GROWTH: f32 = 0.001;
    pub const FRIEND_CHANCE_MAX: f32 = 0.07;

    pub const PAIR_CHANCE_BASE: f32 = 0.18;
    pub const PAIR_CHANCE_GROWTH: f32 = 0.01;
    pub const PAIR_CHANCE_MAX: f32 = 0.45;
    /// Delay before a queued follow-up enemy is released.
    pub const PAIR_DELAY: f32 = 0.18;

    /// Random range added to every rearmed spawn timer.
    pub const JITTER_MIN: f32 = -0.08;
    pub const JITTER_MAX: f32 = 0.10;

    /// New obstacles appear at least this far beyond the right edge.
    pub const SPAWN_MARGIN: f32 = 40.0;
    /// Bosses appear exactly this far beyond the right edge unless pushed further by the boss gap.
    pub const BOSS_MARGIN: f32 = 70.0;
    /// Minimum spacing between consecutive boss spawn positions.
    pub const BOSS_GAP: f32 = 240.0;
    pub const BOSS_INTERVAL: f32 = 0.70;
    /// Delay before the first boss follow-up once boss mode begins.
    pub const BOSS_FIRST_FOLLOWUP: f32 = 0.55;
    pub const WARNING_MIN: f32 = 1.0;
    pub const WARNING_MAX: f32 = 1.5;

    pub const FENCE_WIDTH: (f32, f32) = (26.0, 34.0);
    pub const FENCE_HEIGHT: (f32, f32) = (40.0, 58.0);
    pub const DOG_SIZE: Vec2 = Vec2::new(64.0, 44.0);
    pub const FRIEND_SIZE: Vec2 = Vec2::new(58.0, 40.0);
    /// Friends trail the scroll slightly.
    pub const FRIEND_SPEED_SCALE: f32 = 0.95;

    pub const MAX_ILLUSIONS: u8 = 2;
    pub const ILLUSION_OFFSET: f32 = 24.0;
    pub const ILLUSION_SPACING: f32 = 18.0;
    pub const ILLUSION_ALPHA: f32 = 0.35;
    pub const ILLUSION_SIZE_SCALE: f32 = 0.98;
    pub const ILLUSION_SPEED_SCALE: f32 = 1.02;
    pub const ILLUSION_BOB_SCALE: f32 = 1.25;
}

pub mod motion {
    /// Animation phase advance, in radians per second.
    pub const ANIM_RATE: f32 = 10.0;
    /// Bob oscillation frequency relative to the animation phase.
    pub const BOB_FREQUENCY: f32 = 0.9;
}

pub mod scoring {
    pub const PASS_FENCE: u32 = 5;
    pub const PASS_ENEMY: u32 = 8;
    pub const PASS_BOSS: u32 = 14;
    pub const PASS_FRIEND: u32 = 2;
    pub const NEAR_MISS: u32 = 4;
    pub const FRIEND_PET: u32 = 10;
    pub const DAILY_BONUS: u32 = 50;
    /// Near misses required in a single run to complete the daily mission.
    pub const DAILY_NEAR_MISS_GOAL: u32 = 3;
}

pub mod hitbox {
    use glam::Vec2;

    pub const PLAYER_INSET: f32 = 6.0;
    pub const FENCE_INSET: f32 = 2.0;
    /// Padding applied around both tight hitboxes for the near-miss test.
    pub const NEAR_MISS_PADDING: f32 = 8.0;
    /// Offset of a dog hitbox inside its sprite, as a fraction of the sprite size.
    pub const DOG_OFFSET: Vec2 = Vec2::new(0.10, 0.18);
    /// Size of a dog hitbox, as a fraction of the sprite size.
    pub const DOG_SCALE: Vec2 = Vec2::new(0.76, 0.72);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loop_time() {
        let expected_nanos = (1_000_000_000.0 / 60.0) as u64;
        assert_eq!(LOOP_TIME.as_nanos() as u64, expected_nanos);
    }

    #[test]
    fn test_player_start() {
        assert_eq!(physics::PLAYER_START_X, 128.0);
    }

    #[test]
    fn test_fixed_step_fits_frame_clamp() {
        assert!(timing::FIXED_STEP * timing::MAX_STEPS_PER_FRAME as f32 >= timing::MAX_FRAME_DELTA);
    }

    #[test]
    fn test_dog_hitbox_within_sprite() {
        let extent = hitbox::DOG_OFFSET + hitbox::DOG_SCALE;
        assert!(extent.x <= 1.0);
        assert!(extent.y <= 1.0);
    }

    #[test]
    fn test_spawn_interval_bounds() {
        assert!(difficulty::INTERVAL_MIN < difficulty::INTERVAL_MAX);
        assert!(difficulty::INTERVAL_MIN + spawn::JITTER_MIN > 0.0);
    }
}
