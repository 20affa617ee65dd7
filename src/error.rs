//! Centralized error types for the runner.
//!
//! Gameplay itself never fails: out-of-range inputs are clamped and impossible states are
//! reported as [`GameError`] events and logged. Errors surface from construction
//! (configuration) and from the host platform.

use bevy_ecs::event::Event;

/// Main error type for the runner.
///
/// This is the primary error type that should be used in public APIs.
#[derive(thiserror::Error, Debug, Event)]
pub enum GameError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),

    #[error("Invalid state: {0}")]
    InvalidState(String),
}

/// Problems with a [`GameConfig`](crate::game::GameConfig) or its stage table.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("At least one stage is required")]
    NoStages,

    #[error("Start stage {index} is out of range ({count} stages configured)")]
    StartStageOutOfRange { index: usize, count: usize },

    #[error("Stage {stage}: {field} must be positive and finite, got {value}")]
    NonPositive { stage: u32, field: &'static str, value: f32 },

    #[error("Stage {stage}: minimum gap {min} exceeds base gap {base}")]
    InvertedGap { stage: u32, base: f32, min: f32 },

    #[error("Stage id {0} appears more than once")]
    DuplicateStage(u32),

    #[error("Fixed timestep must be positive and finite, got {0}")]
    InvalidTimestep(f32),

    #[error("At least one simulation step per frame is required")]
    NoStepsPerFrame,
}

/// Platform-specific errors.
#[derive(thiserror::Error, Debug)]
pub enum PlatformError {
    #[error("Logging initialization failed: {0}")]
    LoggingInit(String),
}

/// Result type for game operations.
pub type GameResult<T> = Result<T, GameError>;
