//! Builds fully initialized obstacles and keeps the run's placement bookkeeping in sync.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;
use smallvec::SmallVec;

use crate::archetype::{BossLook, Breed, Category};
use crate::constants::{field, spawn};
use crate::persistence::Persistence;
use crate::stage::{BossArchetype, BossBehavior, Stage};
use crate::systems::difficulty::{current_speed, min_gap};
use crate::systems::{Behavior, Body, FeintState, Motion, Obstacle, ObstacleBundle, ObstacleKind, RunState};

/// X at which bosses appear, regardless of what else is on the field.
pub const FORCED_SPAWN_X: f32 = field::WIDTH + spawn::BOSS_MARGIN;

pub struct ObstacleFactory<'a, R: Rng> {
    run: &'a mut RunState,
    rng: &'a mut R,
    stage: &'a Stage,
    persistence: &'a dyn Persistence,
}

impl<'a, R: Rng> ObstacleFactory<'a, R> {
    pub fn new(run: &'a mut RunState, rng: &'a mut R, stage: &'a Stage, persistence: &'a dyn Persistence) -> Self {
        Self {
            run,
            rng,
            stage,
            persistence,
        }
    }

    pub fn run(&self) -> &RunState {
        &*self.run
    }

    pub fn run_mut(&mut self) -> &mut RunState {
        &mut *self.run
    }

    pub fn rng(&mut self) -> &mut R {
        &mut *self.rng
    }

    pub fn stage(&self) -> &Stage {
        self.stage
    }

    /// Scroll speed at the current elapsed time.
    pub fn speed(&self) -> f32 {
        current_speed(self.stage, self.run.elapsed)
    }

    /// Default placement: off the right edge and at least the current minimum gap past the right-most obstacle.
    pub fn spawn_x(&self) -> f32 {
        let clear_of_field = field::WIDTH + spawn::SPAWN_MARGIN;
        match self.run.rightmost_x {
            Some(rightmost) => clear_of_field.max(rightmost + min_gap(self.stage, self.run.elapsed)),
            None => clear_of_field,
        }
    }

    /// Placement for a boss-mode follow-up: anchored to the previous boss, never nearer than the forced x.
    pub fn next_boss_x(&self) -> f32 {
        match self.run.last_boss_x {
            Some(last) => FORCED_SPAWN_X.max(last + spawn::BOSS_GAP),
            None => FORCED_SPAWN_X,
        }
    }

    pub fn fence(&mut self) -> ObstacleBundle {
        let size = Vec2::new(
            self.rng.random_range(spawn::FENCE_WIDTH.0..spawn::FENCE_WIDTH.1),
            self.rng.random_range(spawn::FENCE_HEIGHT.0..spawn::FENCE_HEIGHT.1),
        );
        let wobble = self.rng.random_range(0.0..TAU);
        let body = Body::grounded(self.spawn_x(), size);
        let motion = Motion::new(self.speed(), Behavior::Plain);
        self.finish(Obstacle::new(0, ObstacleKind::Fence { wobble }), body, motion)
    }

    pub fn enemy(&mut self) -> ObstacleBundle {
        let breed = Breed::pick(&mut *self.rng, self.run.elapsed);
        let body = Body::grounded(self.spawn_x(), spawn::DOG_SIZE);
        let motion = Motion::new(self.speed(), Behavior::Plain);
        self.persistence.record_encountered(breed.category());
        let obstacle = self.animated(ObstacleKind::Enemy { breed });
        self.finish(obstacle, body, motion)
    }

    pub fn friend(&mut self) -> ObstacleBundle {
        let breed = Breed::pick(&mut *self.rng, self.run.elapsed);
        let body = Body::grounded(self.spawn_x(), spawn::FRIEND_SIZE);
        let motion = Motion::new(self.speed() * spawn::FRIEND_SPEED_SCALE, Behavior::Plain);
        self.persistence.record_encountered(Category::Friend);
        let obstacle = self.animated(ObstacleKind::Friend { breed });
        self.finish(obstacle, body, motion)
    }

    /// Builds the stage boss at `x`, plus its illusions for a final boss.
    /// Returns nothing when the stage has no boss configured.
    pub fn boss(&mut self, x: f32) -> SmallVec<[ObstacleBundle; 3]> {
        let mut built = SmallVec::new();
        let Some(spec) = self.stage.boss else {
            return built;
        };

        let look = match spec.archetype {
            BossArchetype::PooledDog => BossLook::Dog(Breed::pick(&mut *self.rng, self.run.elapsed)),
            BossArchetype::Statue => BossLook::Statue,
            BossArchetype::Cerberus { heads } => BossLook::Cerberus { heads },
        };
        let behavior = match spec.behavior {
            BossBehavior::Plain => Behavior::Plain,
            BossBehavior::Feint(cycle) => Behavior::Feint(FeintState::new(cycle)),
            BossBehavior::Final => Behavior::Final,
        };

        let size = (spawn::DOG_SIZE * spec.size_mul).round();
        let speed = self.speed() * spec.speed_mul;
        let body = Body::grounded(x, size);
        let motion = Motion::new(speed, behavior).with_bob(spec.bob_amplitude);

        self.persistence.record_encountered(look.category());
        self.run.last_boss_x = Some(x);
        let obstacle = self.animated(ObstacleKind::Boss { look, aura: spec.aura });
        built.push(self.finish(obstacle, body, motion));

        if matches!(spec.behavior, BossBehavior::Final) {
            for i in 0..spec.illusions.min(spawn::MAX_ILLUSIONS) {
                let offset = spawn::ILLUSION_OFFSET + spawn::ILLUSION_SPACING * f32::from(i);
                let body = Body::grounded(x + offset, (spawn::DOG_SIZE * spec.size_mul * spawn::ILLUSION_SIZE_SCALE).round());
                let motion = Motion::new(speed * spawn::ILLUSION_SPEED_SCALE, Behavior::Plain)
                    .with_bob(spec.bob_amplitude * spawn::ILLUSION_BOB_SCALE);

                self.persistence.record_encountered(look.category());
                let mut obstacle = self.animated(ObstacleKind::Illusion { look });
                obstacle.alpha = spawn::ILLUSION_ALPHA;
                built.push(self.finish(obstacle, body, motion));
            }
        }

        built
    }

    fn animated(&mut self, kind: ObstacleKind) -> Obstacle {
        let mut obstacle = Obstacle::new(0, kind);
        obstacle.phase = Some(self.rng.random_range(0.0..TAU));
        obstacle
    }

    /// Assigns the serial and records the obstacle's right edge.
    fn finish(&mut self, mut obstacle: Obstacle, body: Body, motion: Motion) -> ObstacleBundle {
        obstacle.serial = self.run.allocate_serial();
        self.run.occupy(body.right());
        ObstacleBundle { obstacle, body, motion }
    }
}
