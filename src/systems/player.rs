use bevy_ecs::{
    event::{EventReader, EventWriter},
    query::With,
    system::{Query, Res},
};
use tracing::trace;

use crate::constants::{field, physics};
use crate::error::GameError;
use crate::events::{GameCommand, GameEvent};
use crate::systems::{Body, DeltaTime, InputState, Jumper, PlayerControlled};

/// Applies held horizontal intent and jump commands to the player.
///
/// Horizontal velocity is set directly from input every step; there is no inertia.
pub fn player_control_system(
    mut events: EventReader<GameEvent>,
    input: Res<InputState>,
    mut players: Query<&mut Jumper, With<PlayerControlled>>,
    mut errors: EventWriter<GameError>,
) {
    let mut jumper = match players.single_mut() {
        Ok(jumper) => jumper,
        Err(e) => {
            errors.write(GameError::InvalidState(format!(
                "No/multiple entities queried for player jumper: {e:?}"
            )));
            return;
        }
    };

    jumper.velocity.x = input.axis() * physics::MOVE_SPEED;

    for event in events.read() {
        if let GameEvent::Command(GameCommand::Jump) = event {
            if jumper.try_jump() {
                trace!(jumps_left = jumper.jumps_left, "Jump");
            }
        }
    }
}

/// Integrates one step of player motion: horizontal clamp, gravity, and landing.
pub fn integrate(body: &mut Body, jumper: &mut Jumper, dt: f32) {
    let max_x = field::WIDTH - body.size.x - physics::EDGE_MARGIN;
    body.position.x = (body.position.x + jumper.velocity.x * dt).clamp(physics::EDGE_MARGIN, max_x);

    jumper.velocity.y += physics::GRAVITY * dt;
    body.position.y += jumper.velocity.y * dt;

    let rest = field::GROUND_Y - body.size.y;
    if body.position.y >= rest {
        body.position.y = rest;
        jumper.velocity.y = 0.0;
        if !jumper.grounded {
            jumper.jumps_left = physics::MAX_JUMPS;
        }
        jumper.grounded = true;
    } else {
        jumper.grounded = false;
    }
}

pub fn player_physics_system(dt: Res<DeltaTime>, mut players: Query<(&mut Body, &mut Jumper), With<PlayerControlled>>) {
    for (mut body, mut jumper) in players.iter_mut() {
        integrate(&mut body, &mut jumper, dt.seconds);
    }
}
