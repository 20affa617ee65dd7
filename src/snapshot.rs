//! Read-only views of the simulation for renderers and result screens.

use std::fmt;

use bevy_ecs::{query::With, world::World};
use glam::Vec2;
use strum_macros::{Display, EnumIter};
use thousands::Separable;

use crate::archetype::{Appearance, BossLook};
use crate::stage::{Stage, StageSet};
use crate::systems::{
    Body, Obstacle, ObstacleKind, ObstacleTag, PlayerControlled, Popup, RunPhase, RunState, ScoreResource, TimeToLive,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunOutcome {
    Failed,
    Cleared,
    /// The last stage was cleared.
    Complete,
}

impl RunOutcome {
    pub fn is_clear(&self) -> bool {
        !matches!(self, RunOutcome::Failed)
    }
}

/// Result grade awarded from the final score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumIter)]
pub enum Rank {
    D,
    C,
    B,
    A,
    S,
    SS,
    SSS,
}

impl Rank {
    pub fn from_score(score: u32) -> Rank {
        match score {
            1500.. => Rank::SSS,
            1100.. => Rank::SS,
            800.. => Rank::S,
            550.. => Rank::A,
            300.. => Rank::B,
            160.. => Rank::C,
            _ => Rank::D,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Rank::SSS => "Walk Deity",
            Rank::SS => "King of Dogs",
            Rank::S => "Walk Master",
            Rank::A => "Good Walk",
            Rank::B => "Getting Used to Dogs",
            Rank::C => "Park Regular",
            Rank::D => "Tangled Leash",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub stage_id: u32,
    pub stage_name: String,
    pub outcome: RunOutcome,
    pub score: u32,
    pub elapsed: f32,
    pub remaining: u32,
    pub rank: Rank,
}

impl RunSummary {
    pub fn new(stage: &Stage, run: &RunState, score: u32, outcome: RunOutcome) -> Self {
        Self {
            stage_id: stage.id,
            stage_name: stage.name.clone(),
            outcome,
            score,
            elapsed: run.elapsed,
            remaining: stage.remaining(run.distance),
            rank: Rank::from_score(score),
        }
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let result = match self.outcome {
            RunOutcome::Failed => "GAME OVER",
            RunOutcome::Cleared | RunOutcome::Complete => "CLEAR",
        };
        write!(
            f,
            "Stage {} ({}) {result}: score {} in {:.1}s, {}m left, rank {} ({})",
            self.stage_id,
            self.stage_name,
            self.score.separate_with_commas(),
            self.elapsed,
            self.remaining.separate_with_commas(),
            self.rank,
            self.rank.title()
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObstacleView {
    pub serial: u64,
    pub kind: ObstacleTag,
    pub position: Vec2,
    pub size: Vec2,
    pub alpha: f32,
    pub phase: Option<f32>,
    /// Drawing details for dog-shaped obstacles.
    pub appearance: Option<Appearance>,
    pub heads: u8,
    pub aura: f32,
}

impl ObstacleView {
    fn new(obstacle: &Obstacle, body: &Body) -> Self {
        let (appearance, heads, aura) = match obstacle.kind {
            ObstacleKind::Fence { .. } => (None, 0, 0.0),
            ObstacleKind::Enemy { breed } | ObstacleKind::Friend { breed } => (Some(breed.appearance()), 1, 0.0),
            ObstacleKind::Boss { look, aura } => (Some(look.appearance()), look_heads(look), aura),
            ObstacleKind::Illusion { look } => (Some(look.appearance()), look_heads(look), 0.0),
        };
        Self {
            serial: obstacle.serial,
            kind: obstacle.kind.tag(),
            position: body.position,
            size: body.size,
            alpha: obstacle.alpha,
            phase: obstacle.phase,
            appearance,
            heads,
            aura,
        }
    }
}

fn look_heads(look: BossLook) -> u8 {
    match look {
        BossLook::Cerberus { heads } => heads,
        _ => 1,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PopupView {
    pub text: String,
    pub position: Vec2,
    /// Fraction of the popup's life remaining, for fading.
    pub life: f32,
}

/// Everything a renderer needs for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderSnapshot {
    pub phase: RunPhase,
    pub stage_id: u32,
    pub stage_name: String,
    /// Obstacles in creation order.
    pub obstacles: Vec<ObstacleView>,
    pub player: Option<Body>,
    pub popups: Vec<PopupView>,
    pub boss_mode: bool,
    pub remaining_distance: u32,
    pub elapsed: f32,
    pub score: u32,
    /// Progress through the boss warning banner in `[0, 1]`, while it is showing.
    pub warning: Option<f32>,
}

impl RenderSnapshot {
    pub fn capture(world: &mut World) -> Self {
        let mut obstacles: Vec<ObstacleView> = world
            .query::<(&Obstacle, &Body)>()
            .iter(world)
            .map(|(obstacle, body)| ObstacleView::new(obstacle, body))
            .collect();
        obstacles.sort_unstable_by_key(|view| view.serial);

        let player = world
            .query_filtered::<&Body, With<PlayerControlled>>()
            .iter(world)
            .next()
            .copied();

        let popups = world
            .query::<(&Popup, &TimeToLive)>()
            .iter(world)
            .map(|(popup, ttl)| PopupView {
                text: popup.text.clone(),
                position: popup.position,
                life: ttl.fraction(),
            })
            .collect();

        let run = world.resource::<RunState>();
        let stage = world.resource::<StageSet>().current();
        Self {
            phase: *world.resource::<RunPhase>(),
            stage_id: stage.id,
            stage_name: stage.name.clone(),
            obstacles,
            player,
            popups,
            boss_mode: run.boss_mode,
            remaining_distance: stage.remaining(run.distance),
            elapsed: run.elapsed,
            score: world.resource::<ScoreResource>().0,
            warning: run
                .warning
                .map(|warning| 1.0 - (warning.remaining / warning.duration).clamp(0.0, 1.0)),
        }
    }
}
