use bevy_ecs::{
    entity::Entity,
    event::EventWriter,
    query::{With, Without},
    system::{Commands, Query, ResMut},
};
use glam::Vec2;
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::constants::{hitbox, scoring, timing};
use crate::error::GameError;
use crate::events::{RunEvent, StageTransition};
use crate::systems::{spawn_popup, Body, Obstacle, ObstacleKind, PlayerControlled, RunState, ScoreResource};

/// Axis-aligned rectangle anchored at its top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub min: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(min: Vec2, size: Vec2) -> Self {
        Self { min, size }
    }

    pub fn max(&self) -> Vec2 {
        self.min + self.size
    }

    pub fn center(&self) -> Vec2 {
        self.min + self.size * 0.5
    }

    /// Strict overlap; touching edges do not count.
    pub fn overlaps(&self, other: &Rect) -> bool {
        let (a_max, b_max) = (self.max(), other.max());
        self.min.x < b_max.x && a_max.x > other.min.x && self.min.y < b_max.y && a_max.y > other.min.y
    }

    /// Grows the rectangle by `amount` on every side. Negative values shrink it.
    pub fn expand(&self, amount: f32) -> Rect {
        Rect::new(self.min - Vec2::splat(amount), (self.size + Vec2::splat(amount * 2.0)).max(Vec2::ZERO))
    }
}

/// The player's tight hitbox.
pub fn player_hitbox(body: &Body) -> Rect {
    body.rect().expand(-hitbox::PLAYER_INSET)
}

/// An obstacle's tight hitbox. Dogs use the central portion of their sprite, fences a small inset.
pub fn obstacle_hitbox(kind: &ObstacleKind, body: &Body) -> Rect {
    if kind.is_dog_shaped() {
        Rect::new(body.position + body.size * hitbox::DOG_OFFSET, body.size * hitbox::DOG_SCALE)
    } else {
        body.rect().expand(-hitbox::FENCE_INSET)
    }
}

/// Points awarded once the obstacle is behind the player.
pub fn pass_points(kind: &ObstacleKind) -> u32 {
    match kind {
        ObstacleKind::Fence { .. } => scoring::PASS_FENCE,
        ObstacleKind::Enemy { .. } | ObstacleKind::Illusion { .. } => scoring::PASS_ENEMY,
        ObstacleKind::Boss { .. } => scoring::PASS_BOSS,
        ObstacleKind::Friend { .. } => scoring::PASS_FRIEND,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    /// Touching a friend is rewarded and removes it.
    Friend,
    Fatal,
}

/// What happened between the player and one obstacle during a step.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Contact {
    pub passed: Option<u32>,
    pub near_miss: bool,
    pub hit: Option<Hit>,
}

/// Judges one obstacle against the player and flips its one-shot flags.
///
/// Pass scoring, near-miss and hit tests run in that order. Every obstacle except an illusion is
/// tested for hits on every step, whether or not its near miss has been settled.
pub fn evaluate(player: &Body, obstacle: &mut Obstacle, body: &Body) -> Contact {
    let mut contact = Contact::default();
    let illusion = matches!(obstacle.kind, ObstacleKind::Illusion { .. });

    if !obstacle.passed && body.right() < player.position.x {
        obstacle.passed = true;
        contact.passed = Some(pass_points(&obstacle.kind));
    }

    if illusion {
        return contact;
    }

    let player_box = player_hitbox(player);
    let obstacle_box = obstacle_hitbox(&obstacle.kind, body);
    let tight = player_box.overlaps(&obstacle_box);

    if !obstacle.near_miss_resolved && !tight {
        let padded = player_box
            .expand(hitbox::NEAR_MISS_PADDING)
            .overlaps(&obstacle_box.expand(hitbox::NEAR_MISS_PADDING));
        let straddling = body.position.x < player.right() && body.right() > player.position.x;
        let receding = obstacle_box.center().x < player_box.center().x;

        if padded && straddling && receding {
            obstacle.near_miss_resolved = true;
            contact.near_miss = true;
        }
    }

    if tight {
        contact.hit = Some(match obstacle.kind {
            ObstacleKind::Friend { .. } => Hit::Friend,
            _ => Hit::Fatal,
        });
    }

    contact
}

/// Scores passes and near misses, handles friend pickups, and reports the first fatal hit.
///
/// Obstacles are judged in creation order and judging stops at the first fatal hit.
pub fn collision_system(
    mut commands: Commands,
    mut score: ResMut<ScoreResource>,
    mut run: ResMut<RunState>,
    player: Query<&Body, With<PlayerControlled>>,
    mut obstacles: Query<(Entity, &mut Obstacle, &Body), Without<PlayerControlled>>,
    mut events: EventWriter<RunEvent>,
    mut transitions: EventWriter<StageTransition>,
    mut errors: EventWriter<GameError>,
) {
    let player = match player.single() {
        Ok(body) => *body,
        Err(e) => {
            errors.write(GameError::InvalidState(format!(
                "No/multiple entities queried for player body: {e:?}"
            )));
            return;
        }
    };

    let mut order: SmallVec<[(u64, Entity); 32]> = obstacles
        .iter()
        .map(|(entity, obstacle, _)| (obstacle.serial, entity))
        .collect();
    order.sort_unstable_by_key(|(serial, _)| *serial);

    let popup_anchor = Vec2::new(player.position.x + player.size.x / 2.0, player.position.y - 8.0);

    for (serial, entity) in order {
        let Ok((_, mut obstacle, body)) = obstacles.get_mut(entity) else {
            continue;
        };
        let contact = evaluate(&player, &mut obstacle, body);

        if let Some(points) = contact.passed {
            score.0 += points;
            trace!(serial, points, "Obstacle passed");
            events.write(RunEvent::Passed { serial, points });
        }

        if contact.near_miss {
            run.near_misses += 1;
            score.0 += scoring::NEAR_MISS;
            debug!(serial, count = run.near_misses, "Near miss");
            events.write(RunEvent::NearMiss {
                serial,
                count: run.near_misses,
            });
            spawn_popup(&mut commands, &mut events, format!("Near miss! +{}", scoring::NEAR_MISS), popup_anchor);
        }

        match contact.hit {
            Some(Hit::Friend) => {
                score.0 += scoring::FRIEND_PET;
                run.slow_motion = timing::SLOW_MOTION_DURATION;
                debug!(serial, "Friend petted");
                events.write(RunEvent::FriendPetted { serial });
                spawn_popup(&mut commands, &mut events, format!("Good dog! +{}", scoring::FRIEND_PET), popup_anchor);
                commands.entity(entity).despawn();
            }
            Some(Hit::Fatal) => {
                debug!(serial, kind = %obstacle.kind.tag(), "Fatal collision");
                transitions.write(StageTransition::Collided { serial });
                break;
            }
            None => {}
        }
    }
}
