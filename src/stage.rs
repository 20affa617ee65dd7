//! Stage definitions and the ordered stage table the game progresses through.

use std::collections::HashSet;

use bevy_ecs::resource::Resource;

use crate::error::ConfigError;

/// Timing of a feinting boss: it creeps at `slow_mul` for `slow_secs`, then accelerates
/// quadratically towards `dash_mul` over `dash_secs`, then repeats.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeintCycle {
    pub slow_secs: f32,
    pub dash_secs: f32,
    pub slow_mul: f32,
    pub dash_mul: f32,
}

impl FeintCycle {
    pub fn period(&self) -> f32 {
        self.slow_secs + self.dash_secs
    }
}

/// How a boss is dressed when it spawns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BossArchetype {
    /// An oversized dog drawn from the current breed pool.
    PooledDog,
    Statue,
    Cerberus { heads: u8 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BossBehavior {
    /// Constant speed.
    Plain,
    Feint(FeintCycle),
    /// Constant speed, optionally flanked by illusions.
    Final,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BossSpec {
    pub archetype: BossArchetype,
    pub behavior: BossBehavior,
    pub size_mul: f32,
    pub speed_mul: f32,
    pub bob_amplitude: f32,
    pub aura: f32,
    /// Decoys spawned alongside a final boss.
    pub illusions: u8,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stage {
    pub id: u32,
    pub name: String,
    /// Distance units required to clear the stage.
    pub distance_goal: f32,
    pub base_speed: f32,
    pub density: f32,
    pub gap_base: f32,
    pub gap_min: f32,
    /// Boss mode begins once the remaining distance drops to this value.
    pub boss_trigger: Option<f32>,
    pub boss: Option<BossSpec>,
}

impl Stage {
    /// Remaining distance, rounded up and never negative.
    pub fn remaining(&self, distance: f32) -> u32 {
        (self.distance_goal - distance).ceil().max(0.0) as u32
    }

    /// The boss threshold, only when both a threshold and a boss are configured.
    pub fn boss_threshold(&self) -> Option<f32> {
        self.boss_trigger.filter(|_| self.boss.is_some())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = |field: &'static str, value: f32| {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(ConfigError::NonPositive {
                    stage: self.id,
                    field,
                    value,
                })
            }
        };

        positive("distance goal", self.distance_goal)?;
        positive("base speed", self.base_speed)?;
        positive("density", self.density)?;
        positive("base gap", self.gap_base)?;
        positive("minimum gap", self.gap_min)?;
        if self.gap_min > self.gap_base {
            return Err(ConfigError::InvertedGap {
                stage: self.id,
                base: self.gap_base,
                min: self.gap_min,
            });
        }

        if let Some(boss) = &self.boss {
            positive("boss size multiplier", boss.size_mul)?;
            positive("boss speed multiplier", boss.speed_mul)?;
            if let BossBehavior::Feint(cycle) = boss.behavior {
                positive("feint slow duration", cycle.slow_secs)?;
                positive("feint dash duration", cycle.dash_secs)?;
            }
        }
        Ok(())
    }
}

/// The three stages the game ships with.
pub fn default_stages() -> Vec<Stage> {
    vec![
        Stage {
            id: 1,
            name: "Park".into(),
            distance_goal: 900.0,
            base_speed: 240.0,
            density: 0.78,
            gap_base: 260.0,
            gap_min: 170.0,
            boss_trigger: Some(150.0),
            boss: Some(BossSpec {
                archetype: BossArchetype::PooledDog,
                behavior: BossBehavior::Plain,
                size_mul: 3.10,
                speed_mul: 1.0,
                bob_amplitude: 0.0,
                aura: 0.14,
                illusions: 0,
            }),
        },
        Stage {
            id: 2,
            name: "Shopping Street".into(),
            distance_goal: 1000.0,
            base_speed: 300.0,
            density: 1.06,
            gap_base: 225.0,
            gap_min: 135.0,
            boss_trigger: Some(150.0),
            boss: Some(BossSpec {
                archetype: BossArchetype::Statue,
                behavior: BossBehavior::Feint(FeintCycle {
                    slow_secs: 0.28,
                    dash_secs: 0.24,
                    slow_mul: 0.55,
                    dash_mul: 1.75,
                }),
                size_mul: 1.85,
                speed_mul: 1.05,
                bob_amplitude: 26.0,
                aura: 0.10,
                illusions: 0,
            }),
        },
        Stage {
            id: 3,
            name: "Dog Cafe".into(),
            distance_goal: 1100.0,
            base_speed: 370.0,
            density: 1.28,
            gap_base: 205.0,
            gap_min: 112.0,
            boss_trigger: Some(150.0),
            boss: Some(BossSpec {
                archetype: BossArchetype::Cerberus { heads: 3 },
                behavior: BossBehavior::Final,
                size_mul: 1.70,
                speed_mul: 1.55,
                bob_amplitude: 28.0,
                aura: 0.28,
                illusions: 2,
            }),
        },
    ]
}

/// The ordered stage table and the index of the stage currently being played.
#[derive(Resource, Debug, Clone)]
pub struct StageSet {
    stages: Vec<Stage>,
    current: usize,
}

impl StageSet {
    pub fn new(stages: Vec<Stage>, start: usize) -> Result<Self, ConfigError> {
        if stages.is_empty() {
            return Err(ConfigError::NoStages);
        }
        if start >= stages.len() {
            return Err(ConfigError::StartStageOutOfRange {
                index: start,
                count: stages.len(),
            });
        }

        let mut seen = HashSet::new();
        for stage in &stages {
            stage.validate()?;
            if !seen.insert(stage.id) {
                return Err(ConfigError::DuplicateStage(stage.id));
            }
        }

        Ok(Self { stages, current: start })
    }

    pub fn current(&self) -> &Stage {
        &self.stages[self.current]
    }

    pub fn index(&self) -> usize {
        self.current
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn is_last(&self) -> bool {
        self.current + 1 == self.stages.len()
    }

    /// Moves to the next stage, returning `false` if already on the last one.
    pub fn advance(&mut self) -> bool {
        if self.is_last() {
            return false;
        }
        self.current += 1;
        true
    }
}
