//! The simulation driver: owns the ECS world and runs fixed steps.

use std::time::{Duration, Instant};

use bevy_ecs::event::{EventRegistry, Events};
use bevy_ecs::schedule::{ExecutorKind, IntoScheduleConfigs, Schedule, SystemSet};
use bevy_ecs::system::Res;
use bevy_ecs::world::World;
use tracing::{debug, info, warn};

use crate::clock::FixedStep;
use crate::constants::timing;
use crate::error::{GameError, GameResult};
use crate::events::{GameEvent, RunEvent, StageTransition};
use crate::formatter;
use crate::persistence::{NoopPersistence, Persistence, PersistenceResource};
use crate::platform;
use crate::snapshot::RenderSnapshot;
use crate::stage::{default_stages, Stage, StageSet};
use crate::systems::input::InputAction;
use crate::systems::{
    self, profile, Bindings, DailyMission, DeltaTime, FixedTimestep, GameRng, GlobalState, InputQueue, InputState,
    PauseState, PlayerBundle, RunPhase, RunState, ScoreResource, SpawnScheduler, SystemId, SystemTimings, Timing,
};

/// System sets making up one fixed step, in order.
#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
enum GameplaySet {
    /// Host input and lifecycle commands. Always runs.
    Input,
    /// Movement, spawning, and collision.
    Update,
    /// Consequences of the update: popups, missions, and stage transitions.
    Respond,
}

/// Runtime options for a [`Game`].
#[derive(Debug, Clone)]
pub struct GameConfig {
    /// Seed for reproducible runs. `None` draws one from the thread generator.
    pub seed: Option<u64>,
    pub stages: Vec<Stage>,
    /// Index into `stages` to begin at.
    pub start_stage: usize,
    pub fixed_step: f32,
    pub max_steps_per_frame: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            seed: None,
            stages: default_stages(),
            start_stage: 0,
            fixed_step: timing::FIXED_STEP,
            max_steps_per_frame: timing::MAX_STEPS_PER_FRAME,
        }
    }
}

impl GameConfig {
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::default()
        }
    }
}

/// Core simulation built on the Bevy ECS architecture.
///
/// The `World` holds the player, obstacles, popups, and run resources; the `Schedule` runs one
/// fixed step. Hosts feed raw frame deltas to [`Game::tick`], push input with
/// [`Game::push_input`], and read results through [`Game::drain_events`] and
/// [`Game::snapshot`].
pub struct Game {
    pub world: World,
    pub schedule: Schedule,
    stepper: FixedStep,
    events: Vec<RunEvent>,
}

impl Game {
    pub fn new(config: GameConfig) -> GameResult<Game> {
        Self::with_persistence(config, NoopPersistence)
    }

    /// # Errors
    ///
    /// Returns `GameError::Config` if the stage table or timestep settings are invalid.
    pub fn with_persistence(config: GameConfig, persistence: impl Persistence + 'static) -> GameResult<Game> {
        info!(seed = ?config.seed, stages = config.stages.len(), "Starting game initialization");
        let stepper = FixedStep::new(config.fixed_step, config.max_steps_per_frame)?;
        let stages = StageSet::new(config.stages, config.start_stage)?;

        let mut world = World::default();
        let mut schedule = Schedule::default();
        schedule.set_executor_kind(ExecutorKind::SingleThreaded);

        Self::setup_ecs(&mut world);
        Self::insert_resources(&mut world, stages, config.seed, config.fixed_step, persistence);
        world.spawn(PlayerBundle::default());
        Self::configure_schedule(&mut schedule);

        debug!("Game initialization completed");
        Ok(Game {
            world,
            schedule,
            stepper,
            events: Vec::new(),
        })
    }

    fn setup_ecs(world: &mut World) {
        EventRegistry::register_event::<GameError>(world);
        EventRegistry::register_event::<GameEvent>(world);
        EventRegistry::register_event::<RunEvent>(world);
        EventRegistry::register_event::<StageTransition>(world);

        world.add_observer(systems::record_run_end_observer);
    }

    fn insert_resources(
        world: &mut World,
        stages: StageSet,
        seed: Option<u64>,
        fixed_step: f32,
        persistence: impl Persistence + 'static,
    ) {
        world.insert_resource(DailyMission {
            completed: persistence.daily_mission_done(),
        });
        world.insert_resource(PersistenceResource::new(persistence));
        world.insert_resource(stages);
        world.insert_resource(GameRng(platform::rng(seed)));
        world.insert_resource(GlobalState { exit: false });
        world.insert_resource(ScoreResource(0));
        world.insert_resource(RunState::default());
        world.insert_resource(RunPhase::default());
        world.insert_resource(PauseState::default());
        world.insert_resource(SpawnScheduler::default());
        world.insert_resource(FixedTimestep(fixed_step));
        world.insert_resource(DeltaTime::default());
        world.insert_resource(Bindings::default());
        world.insert_resource(InputState::default());
        world.insert_resource(InputQueue::default());
        world.insert_resource(SystemTimings::default());
        world.insert_resource(Timing::default());
    }

    fn configure_schedule(schedule: &mut Schedule) {
        let input_system = profile(SystemId::Input, systems::input_system);
        let command_system = profile(SystemId::Commands, systems::run_command_system);
        let pause_system = profile(SystemId::Commands, systems::handle_pause_command);
        let begin_step_system = profile(SystemId::Clock, systems::begin_step_system);
        let player_control_system = profile(SystemId::PlayerControls, systems::player_control_system);
        let player_physics_system = profile(SystemId::PlayerPhysics, systems::player_physics_system);
        let obstacle_motion_system = profile(SystemId::ObstacleMotion, systems::obstacle_motion_system);
        let spawn_queue_system = profile(SystemId::SpawnQueue, systems::spawn_queue_system);
        let spawn_system = profile(SystemId::Spawn, systems::spawn_system);
        let collision_system = profile(SystemId::Collision, systems::collision_system);
        let popup_motion_system = profile(SystemId::Popups, systems::popup_motion_system);
        let time_to_live_system = profile(SystemId::TimeToLive, systems::time_to_live_system);
        let daily_mission_system = profile(SystemId::Mission, systems::daily_mission_system);
        let stage_system = profile(SystemId::Stage, systems::stage_system);
        let end_step_system = profile(SystemId::Clock, systems::end_step_system);
        let manage_pause_state_system = profile(SystemId::PauseManager, systems::manage_pause_state_system);

        let gameplay_active =
            |phase: Res<RunPhase>, paused: Res<PauseState>| phase.is_playing() && !paused.active();

        schedule
            .add_systems((
                (input_system, command_system, pause_system)
                    .chain()
                    .in_set(GameplaySet::Input),
                (
                    begin_step_system,
                    player_control_system,
                    player_physics_system,
                    obstacle_motion_system,
                    spawn_queue_system,
                    spawn_system,
                    collision_system,
                )
                    .chain()
                    .in_set(GameplaySet::Update),
                (
                    popup_motion_system,
                    time_to_live_system,
                    daily_mission_system,
                    stage_system,
                    end_step_system,
                )
                    .chain()
                    .in_set(GameplaySet::Respond),
                manage_pause_state_system.after(GameplaySet::Respond),
            ))
            .configure_sets(
                (
                    GameplaySet::Input,
                    GameplaySet::Update.run_if(gameplay_active),
                    GameplaySet::Respond.run_if(gameplay_active),
                )
                    .chain(),
            );
    }

    /// Queues a host input action for the next step.
    pub fn push_input(&mut self, action: InputAction) {
        self.world.resource_mut::<InputQueue>().0.push(action);
    }

    /// Begins play from the title state, or retries from a finished run.
    pub fn start(&mut self) {
        systems::begin_run(&mut self.world);
        self.flush_events();
    }

    /// Restarts the current stage, or advances after a clear.
    pub fn retry(&mut self) {
        systems::retry_run(&mut self.world);
        self.flush_events();
    }

    /// Advances the simulation by a raw host frame delta.
    ///
    /// The delta is clamped, then consumed in fixed steps (at most `max_steps_per_frame`).
    ///
    /// # Returns
    ///
    /// `true` if the game should terminate (exit command received), `false` to continue
    pub fn tick(&mut self, dt: f32) -> bool {
        let steps = self.stepper.accumulate(dt);
        for _ in 0..steps {
            if self.step() {
                return true;
            }
        }
        self.exit_requested()
    }

    /// Runs exactly one fixed step, regardless of banked time.
    pub fn step(&mut self) -> bool {
        formatter::increment_step();

        let start = Instant::now();
        self.schedule.run(&mut self.world);
        let total_duration = start.elapsed();

        if let (Some(timings), Some(timing)) =
            (self.world.get_resource::<SystemTimings>(), self.world.get_resource::<Timing>())
        {
            let step = timing.increment_step();
            timings.add_total_timing(total_duration, step);

            let budget = Duration::from_secs_f32(self.stepper.step());
            if total_duration > budget {
                let slowest = timings
                    .slowest_systems()
                    .iter()
                    .map(|(id, duration)| format!("{id} ({duration:.2?})"))
                    .collect::<Vec<String>>()
                    .join(", ");
                warn!(
                    total = format!("{:.3?}", total_duration),
                    step,
                    systems = slowest,
                    budget = format!("{:.3?}", budget),
                    "Step took longer than its simulated duration"
                );
            }
        }

        self.flush_events();
        self.exit_requested()
    }

    /// Collects outward events from the step and ages the internal event buffers.
    fn flush_events(&mut self) {
        if let Some(mut events) = self.world.get_resource_mut::<Events<RunEvent>>() {
            self.events.extend(events.drain());
        }
        if let Some(mut errors) = self.world.get_resource_mut::<Events<GameError>>() {
            for error in errors.drain() {
                warn!(error = %error, "Step reported an error");
            }
        }
        if let Some(mut commands) = self.world.get_resource_mut::<Events<GameEvent>>() {
            commands.update();
        }
        if let Some(mut transitions) = self.world.get_resource_mut::<Events<StageTransition>>() {
            transitions.update();
        }
    }

    fn exit_requested(&self) -> bool {
        self.world.get_resource::<GlobalState>().is_some_and(|state| state.exit)
    }

    /// Takes every [`RunEvent`] produced since the last call.
    pub fn drain_events(&mut self) -> Vec<RunEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn snapshot(&mut self) -> RenderSnapshot {
        RenderSnapshot::capture(&mut self.world)
    }

    pub fn phase(&self) -> RunPhase {
        *self.world.resource::<RunPhase>()
    }

    pub fn score(&self) -> u32 {
        self.world.resource::<ScoreResource>().0
    }

    pub fn run_state(&self) -> &RunState {
        self.world.resource::<RunState>()
    }

    pub fn stage(&self) -> &Stage {
        self.world.resource::<StageSet>().current()
    }

    pub fn pause_state(&self) -> PauseState {
        *self.world.resource::<PauseState>()
    }

    /// Aligned per-system timing lines for diagnostics.
    pub fn timing_report(&self) -> Vec<String> {
        match (
            self.world.get_resource::<SystemTimings>(),
            self.world.get_resource::<Timing>(),
        ) {
            (Some(timings), Some(timing)) => timings.format_timing_display(timing.current_step()).into_vec(),
            _ => Vec::new(),
        }
    }
}
