use bevy_ecs::{
    component::Component,
    entity::Entity,
    system::{Commands, Query, Res, ResMut},
};
use tracing::trace;

use crate::constants::{field, motion};
use crate::stage::FeintCycle;
use crate::systems::{Body, DeltaTime, Obstacle, RunState};

/// Position within a feint cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeintState {
    pub cycle: FeintCycle,
    pub elapsed: f32,
}

impl FeintState {
    pub fn new(cycle: FeintCycle) -> Self {
        Self { cycle, elapsed: 0.0 }
    }

    /// Speed multiplier at the current point of the cycle.
    pub fn multiplier(&self) -> f32 {
        let FeintCycle {
            slow_secs,
            dash_secs,
            slow_mul,
            dash_mul,
        } = self.cycle;
        let t = self.elapsed % self.cycle.period();
        if t <= slow_secs {
            return slow_mul;
        }
        let k = ((t - slow_secs) / dash_secs).min(1.0);
        slow_mul + (dash_mul - slow_mul) * k * k
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Behavior {
    /// Keeps the speed it spawned with.
    Plain,
    Feint(FeintState),
    /// Held at base speed every step.
    Final,
}

impl Behavior {
    /// Advances internal timers and returns the horizontal speed for this step.
    pub fn advance(&mut self, base_speed: f32, dt: f32) -> f32 {
        match self {
            Behavior::Plain | Behavior::Final => base_speed,
            Behavior::Feint(state) => {
                state.elapsed += dt;
                base_speed * state.multiplier()
            }
        }
    }
}

/// Vertical sine oscillation around the resting y.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bob {
    pub amplitude: f32,
}

impl Bob {
    pub fn offset(&self, phase: f32) -> f32 {
        (phase * motion::BOB_FREQUENCY).sin() * self.amplitude
    }
}

/// Leftward movement of an obstacle.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Motion {
    /// Speed fixed at spawn time.
    pub base_speed: f32,
    /// Speed applied during the last step.
    pub speed: f32,
    pub behavior: Behavior,
    pub bob: Option<Bob>,
}

impl Motion {
    pub fn new(speed: f32, behavior: Behavior) -> Self {
        Self {
            base_speed: speed,
            speed,
            behavior,
            bob: None,
        }
    }

    pub fn with_bob(mut self, amplitude: f32) -> Self {
        self.bob = (amplitude != 0.0).then_some(Bob { amplitude });
        self
    }
}

/// Moves a single obstacle forward by `dt`.
pub fn advance_obstacle(obstacle: &mut Obstacle, body: &mut Body, motion: &mut Motion, dt: f32) {
    motion.speed = motion.behavior.advance(motion.base_speed, dt);
    body.position.x -= motion.speed * dt;

    if let Some(phase) = obstacle.phase.as_mut() {
        *phase += motion::ANIM_RATE * dt;
    }

    if let Some(bob) = motion.bob {
        let rest = field::GROUND_Y - body.size.y;
        body.position.y = rest + bob.offset(obstacle.phase.unwrap_or(0.0));
    }
}

/// Moves every obstacle, culls the ones that left the field and recomputes the right-most edge.
pub fn obstacle_motion_system(
    mut commands: Commands,
    dt: Res<DeltaTime>,
    mut run: ResMut<RunState>,
    mut obstacles: Query<(Entity, &mut Obstacle, &mut Body, &mut Motion)>,
) {
    let mut rightmost: Option<f32> = None;

    for (entity, mut obstacle, mut body, mut motion) in obstacles.iter_mut() {
        advance_obstacle(&mut obstacle, &mut body, &mut motion, dt.seconds);

        if body.right() < field::CULL_X {
            trace!(serial = obstacle.serial, kind = %obstacle.kind.tag(), "Obstacle culled");
            commands.entity(entity).despawn();
            continue;
        }

        rightmost = Some(rightmost.map_or(body.right(), |x| x.max(body.right())));
    }

    run.rightmost_x = rightmost;
}
