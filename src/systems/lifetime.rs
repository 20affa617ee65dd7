use bevy_ecs::{
    bundle::Bundle,
    component::Component,
    entity::Entity,
    event::EventWriter,
    system::{Commands, Query, Res},
};
use glam::Vec2;

use crate::constants::timing;
use crate::events::RunEvent;
use crate::systems::{DeltaTime, Popup};

/// Component for entities that should be automatically deleted after an amount of simulated time
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct TimeToLive {
    pub remaining: f32,
    pub lifetime: f32,
}

impl TimeToLive {
    pub fn new(seconds: f32) -> Self {
        Self {
            remaining: seconds,
            lifetime: seconds,
        }
    }

    /// Fraction of the lifetime still left, in `[0, 1]`.
    pub fn fraction(&self) -> f32 {
        if self.lifetime <= 0.0 {
            return 0.0;
        }
        (self.remaining / self.lifetime).clamp(0.0, 1.0)
    }
}

#[derive(Bundle)]
pub struct PopupBundle {
    pub popup: Popup,
    pub ttl: TimeToLive,
}

impl PopupBundle {
    pub fn new(text: impl Into<String>, position: Vec2) -> Self {
        Self {
            popup: Popup {
                text: text.into(),
                position,
            },
            ttl: TimeToLive::new(timing::POPUP_LIFETIME),
        }
    }
}

/// Spawns a floating popup and mirrors its text onto the event stream.
pub fn spawn_popup(commands: &mut Commands, events: &mut EventWriter<RunEvent>, text: impl Into<String>, position: Vec2) {
    let text = text.into();
    events.write(RunEvent::Popup { text: text.clone() });
    commands.spawn(PopupBundle::new(text, position));
}

/// Decrements every [`TimeToLive`] and despawns expired entities
pub fn time_to_live_system(mut commands: Commands, dt: Res<DeltaTime>, mut query: Query<(Entity, &mut TimeToLive)>) {
    for (entity, mut ttl) in query.iter_mut() {
        if ttl.remaining <= dt.seconds {
            commands.entity(entity).despawn();
        } else {
            ttl.remaining -= dt.seconds;
        }
    }
}

/// Floats popups upward.
pub fn popup_motion_system(dt: Res<DeltaTime>, mut popups: Query<&mut Popup>) {
    for mut popup in popups.iter_mut() {
        popup.position.y += timing::POPUP_RISE_SPEED * dt.seconds;
    }
}
