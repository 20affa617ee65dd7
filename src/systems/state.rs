use bevy_ecs::{
    entity::Entity,
    event::{EventReader, EventWriter},
    observer::Trigger,
    query::{Or, With},
    resource::Resource,
    system::{Commands, Res, ResMut},
    world::World,
};
use glam::Vec2;
use strum_macros::Display;
use tracing::{debug, info};

use crate::constants::{field, physics};
use crate::events::{GameCommand, GameEvent, RunEnded, RunEvent, StageTransition};
use crate::persistence::PersistenceResource;
use crate::snapshot::{RunOutcome, RunSummary};
use crate::stage::StageSet;
use crate::systems::{
    spawn_popup, Body, DailyMission, GlobalState, Jumper, Obstacle, PlayerControlled, Popup, RunState, ScoreResource,
    SpawnScheduler,
};

/// High-level phase of the current run.
#[derive(Resource, Debug, Default, PartialEq, Eq, Clone, Copy, Display)]
pub enum RunPhase {
    /// Waiting for the first start command.
    #[default]
    Ready,
    Playing,
    /// The player collided with an obstacle.
    Failed,
    /// A stage other than the last was cleared.
    Cleared,
    /// The last stage was cleared.
    Complete,
}

impl RunPhase {
    pub fn is_playing(&self) -> bool {
        matches!(self, RunPhase::Playing)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, RunPhase::Failed | RunPhase::Cleared | RunPhase::Complete)
    }
}

#[derive(Resource, Debug, Default, PartialEq, Eq, Clone, Copy)]
pub enum PauseState {
    #[default]
    Inactive,
    /// Paused. `Some(n)` lets `n` more steps run before holding again.
    Active { remaining_steps: Option<u32> },
}

impl PauseState {
    pub fn active(&self) -> bool {
        matches!(
            self,
            PauseState::Active { remaining_steps: None } | PauseState::Active { remaining_steps: Some(0) }
        )
    }

    /// Counts down a single-step window.
    /// # Returns
    /// `true` if the window just closed and the game is holding again
    pub fn tick(&mut self) -> bool {
        match self {
            PauseState::Inactive | PauseState::Active { remaining_steps: None | Some(0) } => false,
            PauseState::Active { remaining_steps: Some(steps) } => {
                *steps -= 1;
                *steps == 0
            }
        }
    }
}

pub fn handle_pause_command(mut events: EventReader<GameEvent>, mut pause_state: ResMut<PauseState>) {
    for event in events.read() {
        match event {
            GameEvent::Command(GameCommand::TogglePause) => {
                *pause_state = match *pause_state {
                    PauseState::Active { .. } => {
                        info!("Game resumed");
                        PauseState::Inactive
                    }
                    PauseState::Inactive => {
                        info!("Game paused");
                        PauseState::Active { remaining_steps: None }
                    }
                }
            }
            GameEvent::Command(GameCommand::SingleStep) => {
                // Stepping only makes sense while holding
                if !pause_state.active() {
                    continue;
                }
                *pause_state = PauseState::Active {
                    remaining_steps: Some(1),
                };
            }
            _ => {}
        }
    }
}

pub fn manage_pause_state_system(mut pause_state: ResMut<PauseState>) {
    if pause_state.tick() {
        debug!("Single step finished");
    }
}

/// Handles run lifecycle commands. World-level resets are deferred to the end of the system.
pub fn run_command_system(
    mut commands: Commands,
    mut events: EventReader<GameEvent>,
    mut state: ResMut<GlobalState>,
) {
    for event in events.read() {
        match event {
            GameEvent::Command(GameCommand::Start) => commands.queue(begin_run),
            GameEvent::Command(GameCommand::Retry) => commands.queue(retry_run),
            GameEvent::Command(GameCommand::Exit) => {
                info!("Exit requested");
                state.exit = true;
            }
            _ => {}
        }
    }
}

/// Starts play from the title state. From a finished run this behaves like a retry.
pub fn begin_run(world: &mut World) {
    match *world.resource::<RunPhase>() {
        RunPhase::Ready => {
            let stage = world.resource::<StageSet>().current().id;
            info!(stage, "Run started");
            *world.resource_mut::<RunPhase>() = RunPhase::Playing;
            world.send_event(RunEvent::StageStarted { stage });
        }
        RunPhase::Playing => {}
        RunPhase::Failed | RunPhase::Cleared | RunPhase::Complete => retry_run(world),
    }
}

/// Restarts the current stage, or moves to the next one after a clear.
///
/// Score carries over only when advancing to a new stage.
pub fn retry_run(world: &mut World) {
    let phase = *world.resource::<RunPhase>();
    let keep_score = phase == RunPhase::Cleared && world.resource_mut::<StageSet>().advance();
    reset_stage(world, keep_score);

    let stage = world.resource::<StageSet>().current().id;
    info!(stage, keep_score, previous = %phase, "Stage restarted");
    *world.resource_mut::<RunPhase>() = RunPhase::Playing;
    world.send_event(RunEvent::StageStarted { stage });
}

/// Clears the field and resets every piece of per-run state.
pub fn reset_stage(world: &mut World, keep_score: bool) {
    let doomed: Vec<Entity> = world
        .query_filtered::<Entity, Or<(With<Obstacle>, With<Popup>)>>()
        .iter(world)
        .collect();
    for entity in doomed {
        world.despawn(entity);
    }

    let restarted = RunState::restarted(world.resource::<RunState>());
    world.insert_resource(restarted);
    world.insert_resource(SpawnScheduler::default());
    if !keep_score {
        world.insert_resource(ScoreResource(0));
    }
    // Re-read so a new day re-arms the mission
    let completed = world.resource::<PersistenceResource>().get().daily_mission_done();
    world.insert_resource(DailyMission { completed });

    let mut players = world.query_filtered::<(&mut Body, &mut Jumper), With<PlayerControlled>>();
    for (mut body, mut jumper) in players.iter_mut(world) {
        *body = Body::grounded(physics::PLAYER_START_X, body.size);
        *jumper = Jumper::default();
    }
}

/// Ends the run on a collision or when the distance goal is reached.
#[allow(clippy::too_many_arguments)]
pub fn stage_system(
    mut commands: Commands,
    mut phase: ResMut<RunPhase>,
    mut transitions: EventReader<StageTransition>,
    run: Res<RunState>,
    stages: Res<StageSet>,
    score: Res<ScoreResource>,
    mut events: EventWriter<RunEvent>,
) {
    if !phase.is_playing() {
        transitions.clear();
        return;
    }

    let stage = stages.current();
    let collided = transitions
        .read()
        .map(|transition| match transition {
            StageTransition::Collided { serial } => *serial,
        })
        .min();

    let outcome = if let Some(serial) = collided {
        info!(serial, score = score.0, elapsed = run.elapsed, "Game over");
        RunOutcome::Failed
    } else if stage.remaining(run.distance) == 0 {
        if stages.is_last() {
            RunOutcome::Complete
        } else {
            RunOutcome::Cleared
        }
    } else {
        return;
    };

    let summary = RunSummary::new(stage, &run, score.0, outcome);
    *phase = match outcome {
        RunOutcome::Failed => {
            events.write(RunEvent::GameOver(summary.clone()));
            RunPhase::Failed
        }
        RunOutcome::Cleared | RunOutcome::Complete => {
            info!(stage = stage.id, score = score.0, rank = %summary.rank, "Stage cleared");
            events.write(RunEvent::StageCleared(summary.clone()));
            spawn_popup(
                &mut commands,
                &mut events,
                "Stage clear!",
                Vec2::new(field::WIDTH * 0.5, 150.0),
            );
            if outcome == RunOutcome::Complete {
                RunPhase::Complete
            } else {
                RunPhase::Cleared
            }
        }
    };
    commands.trigger(RunEnded(summary));
}

/// Reports a finished run to persistence.
pub fn record_run_end_observer(trigger: Trigger<RunEnded>, persistence: Res<PersistenceResource>) {
    let RunEnded(summary) = trigger.event();
    let persistence = persistence.get();
    persistence.submit_score(summary.score);
    if summary.outcome.is_clear() {
        persistence.record_stage_cleared(summary.stage_id);
    }
    debug!(score = summary.score, best = persistence.best_score(), "Run recorded");
}
