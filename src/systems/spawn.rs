use bevy_ecs::{
    event::EventWriter,
    resource::Resource,
    system::{Commands, Res, ResMut},
};
use glam::Vec2;
use rand::Rng;
use smallvec::SmallVec;
use strum_macros::Display;
use tracing::{debug, info, trace};

use crate::constants::{difficulty::TIMER_FLOOR, field, spawn};
use crate::events::RunEvent;
use crate::persistence::PersistenceResource;
use crate::stage::StageSet;
use crate::systems::difficulty::{distance_delta, friend_chance, pair_chance, spawn_interval};
use crate::systems::factory::{ObstacleFactory, FORCED_SPAWN_X};
use crate::systems::{spawn_popup, DeltaTime, GameRng, ObstacleBundle, RunPhase, RunState, Warning};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum SpawnMode {
    Normal,
    /// Only bosses spawn. Entered once per stage and never left.
    Boss,
}

/// A follow-up enemy waiting on simulated time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DelayedSpawn {
    pub remaining: f32,
}

/// What a scheduler update produced.
#[derive(Debug, Default)]
pub struct SpawnOutcome {
    pub spawned: SmallVec<[ObstacleBundle; 4]>,
    /// Set on the step boss mode begins, with the warning banner duration.
    pub boss_warning: Option<f32>,
}

#[derive(Resource, Debug, Clone, PartialEq)]
pub struct SpawnScheduler {
    pub mode: SpawnMode,
    /// Time until the next scheduled spawn.
    pub timer: f32,
    queue: SmallVec<[DelayedSpawn; 4]>,
}

impl Default for SpawnScheduler {
    fn default() -> Self {
        Self {
            mode: SpawnMode::Normal,
            timer: spawn::FIRST_SPAWN_DELAY,
            queue: SmallVec::new(),
        }
    }
}

impl SpawnScheduler {
    pub fn queued(&self) -> &[DelayedSpawn] {
        &self.queue
    }

    pub fn enqueue(&mut self, delay: f32) {
        self.queue.push(DelayedSpawn { remaining: delay });
    }

    /// Counts the delayed queue down, building an enemy for every entry that comes due.
    pub fn release_due<R: Rng>(&mut self, factory: &mut ObstacleFactory<R>, dt: f32) -> SmallVec<[ObstacleBundle; 4]> {
        let mut released = SmallVec::new();
        self.queue.retain(|entry| {
            entry.remaining -= dt;
            if entry.remaining <= 0.0 {
                released.push(factory.enemy());
                false
            } else {
                true
            }
        });
        released
    }

    /// Accrues distance, checks the boss trigger and runs the spawn timer for the current mode.
    pub fn update<R: Rng>(&mut self, factory: &mut ObstacleFactory<R>, dt: f32) -> SpawnOutcome {
        let speed = factory.speed();
        factory.run_mut().distance += distance_delta(speed, dt);

        let mut outcome = SpawnOutcome::default();
        self.check_boss_trigger(factory, &mut outcome);

        self.timer -= dt;
        if self.timer > 0.0 {
            return outcome;
        }

        match self.mode {
            SpawnMode::Boss => {
                let x = factory.next_boss_x();
                outcome.spawned.extend(factory.boss(x));
                self.timer = spawn::BOSS_INTERVAL + Self::jitter(factory.rng());
            }
            SpawnMode::Normal => {
                let elapsed = factory.run().elapsed;
                let bundle = if elapsed < spawn::FENCE_ONLY_SECONDS {
                    factory.fence()
                } else if factory.rng().random::<f32>() < friend_chance(elapsed) {
                    factory.friend()
                } else {
                    factory.enemy()
                };
                outcome.spawned.push(bundle);

                if elapsed >= spawn::VARIETY_START && factory.rng().random::<f32>() < pair_chance(elapsed) {
                    trace!(elapsed, "Follow-up enemy queued");
                    self.enqueue(spawn::PAIR_DELAY);
                }

                let interval = spawn_interval(factory.stage().density, elapsed);
                self.timer = (interval + Self::jitter(factory.rng())).max(TIMER_FLOOR);
            }
        }

        outcome
    }

    fn check_boss_trigger<R: Rng>(&mut self, factory: &mut ObstacleFactory<R>, outcome: &mut SpawnOutcome) {
        if factory.run().boss_triggered {
            return;
        }
        let Some(threshold) = factory.stage().boss_threshold() else {
            return;
        };
        let remaining = factory.stage().remaining(factory.run().distance);
        if remaining as f32 > threshold {
            return;
        }

        let duration = factory.rng().random_range(spawn::WARNING_MIN..spawn::WARNING_MAX);
        {
            let run = factory.run_mut();
            run.boss_triggered = true;
            run.boss_mode = true;
            run.warning = Some(Warning {
                remaining: duration,
                duration,
            });
        }
        self.mode = SpawnMode::Boss;
        self.queue.clear();

        if !factory.run().boss_spawned {
            factory.run_mut().boss_spawned = true;
            outcome.spawned.extend(factory.boss(FORCED_SPAWN_X));
        }

        self.timer = spawn::BOSS_FIRST_FOLLOWUP;
        outcome.boss_warning = Some(duration);
        info!(remaining, threshold, warning = duration, "Boss mode triggered");
    }

    fn jitter<R: Rng>(rng: &mut R) -> f32 {
        rng.random_range(spawn::JITTER_MIN..spawn::JITTER_MAX)
    }
}

fn publish(commands: &mut Commands, events: &mut EventWriter<RunEvent>, spawned: impl IntoIterator<Item = ObstacleBundle>) {
    for bundle in spawned {
        debug!(
            serial = bundle.obstacle.serial,
            kind = %bundle.obstacle.kind.tag(),
            x = bundle.body.position.x,
            "Obstacle spawned"
        );
        events.write(RunEvent::ObstacleSpawned {
            serial: bundle.obstacle.serial,
            kind: bundle.obstacle.kind.tag(),
        });
        commands.spawn(bundle);
    }
}

/// Releases queued follow-up enemies. Entries due after the run has ended are dropped.
#[allow(clippy::too_many_arguments)]
pub fn spawn_queue_system(
    mut commands: Commands,
    dt: Res<DeltaTime>,
    phase: Res<RunPhase>,
    stages: Res<StageSet>,
    persistence: Res<PersistenceResource>,
    mut run: ResMut<RunState>,
    mut rng: ResMut<GameRng>,
    mut scheduler: ResMut<SpawnScheduler>,
    mut events: EventWriter<RunEvent>,
) {
    if scheduler.queued().is_empty() {
        return;
    }
    if !phase.is_playing() {
        scheduler.queue.clear();
        return;
    }

    let mut factory = ObstacleFactory::new(&mut run, &mut rng.0, stages.current(), persistence.get());
    let released = scheduler.release_due(&mut factory, dt.seconds);
    publish(&mut commands, &mut events, released);
}

/// Drives the [`SpawnScheduler`] for one step.
#[allow(clippy::too_many_arguments)]
pub fn spawn_system(
    mut commands: Commands,
    dt: Res<DeltaTime>,
    stages: Res<StageSet>,
    persistence: Res<PersistenceResource>,
    mut run: ResMut<RunState>,
    mut rng: ResMut<GameRng>,
    mut scheduler: ResMut<SpawnScheduler>,
    mut events: EventWriter<RunEvent>,
) {
    let mut factory = ObstacleFactory::new(&mut run, &mut rng.0, stages.current(), persistence.get());
    let outcome = scheduler.update(&mut factory, dt.seconds);

    if let Some(duration) = outcome.boss_warning {
        events.write(RunEvent::BossWarning { duration });
        spawn_popup(
            &mut commands,
            &mut events,
            "Boss incoming!",
            Vec2::new(field::WIDTH * 0.5, 110.0),
        );
    }
    publish(&mut commands, &mut events, outcome.spawned);
}
