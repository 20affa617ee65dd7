use bevy_ecs::{bundle::Bundle, component::Component, resource::Resource};
use glam::Vec2;
use rand::rngs::SmallRng;
use strum_macros::{AsRefStr, Display, EnumIter};

use crate::archetype::{BossLook, Breed};
use crate::constants::{field, physics};
use crate::systems::collision::Rect;
use crate::systems::motion::Motion;

/// A tag component for the entity controlled by the player.
#[derive(Default, Component)]
pub struct PlayerControlled;

/// Axis-aligned body in field pixels, anchored at its top-left corner.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Body {
    pub position: Vec2,
    pub size: Vec2,
}

impl Body {
    pub fn new(position: Vec2, size: Vec2) -> Self {
        Self { position, size }
    }

    /// A body of the given size standing on the ground at `x`.
    pub fn grounded(x: f32, size: Vec2) -> Self {
        Self::new(Vec2::new(x, field::GROUND_Y - size.y), size)
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.position, self.size)
    }

    pub fn right(&self) -> f32 {
        self.position.x + self.size.x
    }

    pub fn bottom(&self) -> f32 {
        self.position.y + self.size.y
    }
}

/// Vertical state and jump charges of the player.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Jumper {
    pub velocity: Vec2,
    pub grounded: bool,
    pub jumps_left: u8,
}

impl Default for Jumper {
    fn default() -> Self {
        Self {
            velocity: Vec2::ZERO,
            grounded: true,
            jumps_left: physics::MAX_JUMPS,
        }
    }
}

impl Jumper {
    /// Spends a jump charge if one is left. Returns whether the jump happened.
    pub fn try_jump(&mut self) -> bool {
        if self.jumps_left == 0 {
            return false;
        }
        self.jumps_left -= 1;
        self.velocity.y = physics::JUMP_VELOCITY;
        self.grounded = false;
        true
    }
}

#[derive(Bundle)]
pub struct PlayerBundle {
    pub player: PlayerControlled,
    pub body: Body,
    pub jumper: Jumper,
}

impl Default for PlayerBundle {
    fn default() -> Self {
        Self {
            player: PlayerControlled,
            body: Body::grounded(physics::PLAYER_START_X, physics::PLAYER_SIZE),
            jumper: Jumper::default(),
        }
    }
}

/// Flat obstacle type used in events and views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum ObstacleTag {
    Fence,
    Enemy,
    Friend,
    Boss,
    Illusion,
}

/// What an obstacle is, carrying only the data its kind needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ObstacleKind {
    Fence { wobble: f32 },
    Enemy { breed: Breed },
    Friend { breed: Breed },
    Boss { look: BossLook, aura: f32 },
    /// Harmless decoy flanking a final boss.
    Illusion { look: BossLook },
}

impl ObstacleKind {
    pub fn tag(&self) -> ObstacleTag {
        match self {
            ObstacleKind::Fence { .. } => ObstacleTag::Fence,
            ObstacleKind::Enemy { .. } => ObstacleTag::Enemy,
            ObstacleKind::Friend { .. } => ObstacleTag::Friend,
            ObstacleKind::Boss { .. } => ObstacleTag::Boss,
            ObstacleKind::Illusion { .. } => ObstacleTag::Illusion,
        }
    }

    /// Whether the hitbox uses the dog proportions rather than the fence inset.
    pub fn is_dog_shaped(&self) -> bool {
        !matches!(self, ObstacleKind::Fence { .. })
    }
}

#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Obstacle {
    /// Monotonic creation order, unique for the lifetime of a game.
    pub serial: u64,
    pub kind: ObstacleKind,
    /// Set once the pass bonus has been awarded.
    pub passed: bool,
    /// Set once the near-miss outcome has been settled; a settled obstacle can no longer end the run.
    pub near_miss_resolved: bool,
    pub alpha: f32,
    /// Animation phase in radians, for kinds that animate.
    pub phase: Option<f32>,
}

impl Obstacle {
    pub fn new(serial: u64, kind: ObstacleKind) -> Self {
        Self {
            serial,
            kind,
            passed: false,
            near_miss_resolved: false,
            alpha: 1.0,
            phase: None,
        }
    }
}

#[derive(Bundle, Debug, Clone)]
pub struct ObstacleBundle {
    pub obstacle: Obstacle,
    pub body: Body,
    pub motion: Motion,
}

#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScoreResource(pub u32);

/// Raw length of one fixed step, before slow motion.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct FixedTimestep(pub f32);

/// Effective simulated time for the current step.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq)]
pub struct DeltaTime {
    pub seconds: f32,
}

#[derive(Resource, Debug, Default, Clone, Copy)]
pub struct GlobalState {
    pub exit: bool,
}

/// The game's only random source. Seeded for reproducible runs.
#[derive(Resource, Debug, Clone)]
pub struct GameRng(pub SmallRng);

/// Progress of the pre-boss warning banner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Warning {
    pub remaining: f32,
    pub duration: f32,
}

/// Mutable per-run bookkeeping. Reset wholesale whenever a stage (re)starts.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct RunState {
    pub elapsed: f32,
    pub distance: f32,
    pub boss_mode: bool,
    pub boss_triggered: bool,
    pub boss_spawned: bool,
    /// Spawn x of the most recent boss.
    pub last_boss_x: Option<f32>,
    /// Right edge of the right-most live obstacle.
    pub rightmost_x: Option<f32>,
    pub near_misses: u32,
    /// Remaining slow-motion time.
    pub slow_motion: f32,
    pub warning: Option<Warning>,
    next_serial: u64,
}

impl Default for RunState {
    fn default() -> Self {
        Self {
            elapsed: 0.0,
            distance: 0.0,
            boss_mode: false,
            boss_triggered: false,
            boss_spawned: false,
            last_boss_x: None,
            rightmost_x: None,
            near_misses: 0,
            slow_motion: 0.0,
            warning: None,
            next_serial: 0,
        }
    }
}

impl RunState {
    /// A fresh run that keeps numbering obstacles after `previous`.
    pub fn restarted(previous: &RunState) -> Self {
        Self {
            next_serial: previous.next_serial,
            ..Self::default()
        }
    }

    pub fn allocate_serial(&mut self) -> u64 {
        let serial = self.next_serial;
        self.next_serial += 1;
        serial
    }

    /// Raises the right-most edge to cover a newly placed obstacle.
    pub fn occupy(&mut self, right: f32) {
        self.rightmost_x = Some(self.rightmost_x.map_or(right, |x| x.max(right)));
    }
}

/// A floating text label. Paired with a [`TimeToLive`](crate::systems::TimeToLive).
#[derive(Component, Debug, Clone, PartialEq)]
pub struct Popup {
    pub text: String,
    pub position: Vec2,
}

#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DailyMission {
    pub completed: bool,
}
