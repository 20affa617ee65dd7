use bevy_ecs::prelude::*;

use crate::snapshot::RunSummary;
use crate::systems::ObstacleTag;

/// Discrete commands produced by the input layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameCommand {
    Exit,
    Jump,
    /// Leaves the title state and begins the first run.
    Start,
    /// Restarts after a failure or continues after a stage clear.
    Retry,
    TogglePause,
    /// Advances exactly one simulation step while paused.
    SingleStep,
}

#[derive(Event, Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameEvent {
    Command(GameCommand),
}

impl From<GameCommand> for GameEvent {
    fn from(command: GameCommand) -> Self {
        GameEvent::Command(command)
    }
}

/// Internal signal from the collision pass to the stage system.
#[derive(Event, Clone, Copy, Debug, PartialEq, Eq)]
pub enum StageTransition {
    /// The player touched a fatal obstacle.
    Collided { serial: u64 },
}

/// Triggered once whenever a run ends, by failure or by clearing a stage.
#[derive(Event, Clone, Debug, PartialEq)]
pub struct RunEnded(pub RunSummary);

/// Gameplay notifications for the presentation layer, drained with [`Game::drain_events`](crate::game::Game::drain_events).
#[derive(Event, Clone, Debug, PartialEq)]
pub enum RunEvent {
    StageStarted { stage: u32 },
    ObstacleSpawned { serial: u64, kind: ObstacleTag },
    Passed { serial: u64, points: u32 },
    NearMiss { serial: u64, count: u32 },
    FriendPetted { serial: u64 },
    BossWarning { duration: f32 },
    Popup { text: String },
    DailyMissionComplete,
    GameOver(RunSummary),
    StageCleared(RunSummary),
}
