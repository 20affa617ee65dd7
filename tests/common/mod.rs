#![allow(dead_code)]

use bevy_ecs::{
    entity::Entity,
    event::{EventRegistry, Events},
    world::World,
};
use dogdash::{
    error::GameError,
    events::{GameEvent, RunEvent, StageTransition},
    game::{Game, GameConfig},
    persistence::{NoopPersistence, PersistenceResource},
    stage::{default_stages, Stage, StageSet},
    systems::{
        Bindings, DailyMission, DeltaTime, FixedTimestep, GameRng, GlobalState, InputQueue, InputState, PauseState,
        PlayerBundle, RunPhase, RunState, ScoreResource, SpawnScheduler,
    },
};
use rand::{rngs::SmallRng, SeedableRng};

pub const TEST_SEED: u64 = 0x00D0_6DA5;
pub const STEP: f32 = 1.0 / 120.0;

/// A world with every resource and event the gameplay systems expect, in the `Playing` phase.
pub fn create_test_world() -> World {
    let mut world = World::new();

    EventRegistry::register_event::<GameError>(&mut world);
    EventRegistry::register_event::<GameEvent>(&mut world);
    EventRegistry::register_event::<RunEvent>(&mut world);
    EventRegistry::register_event::<StageTransition>(&mut world);

    world.insert_resource(PersistenceResource::new(NoopPersistence));
    world.insert_resource(StageSet::new(default_stages(), 0).expect("default stages are valid"));
    world.insert_resource(GameRng(SmallRng::seed_from_u64(TEST_SEED)));
    world.insert_resource(GlobalState { exit: false });
    world.insert_resource(ScoreResource(0));
    world.insert_resource(RunState::default());
    world.insert_resource(RunPhase::Playing);
    world.insert_resource(PauseState::default());
    world.insert_resource(SpawnScheduler::default());
    world.insert_resource(FixedTimestep(STEP));
    world.insert_resource(DeltaTime { seconds: STEP });
    world.insert_resource(Bindings::default());
    world.insert_resource(InputState::default());
    world.insert_resource(InputQueue::default());
    world.insert_resource(DailyMission::default());

    world
}

pub fn spawn_test_player(world: &mut World) -> Entity {
    world.spawn(PlayerBundle::default()).id()
}

pub fn send_game_event(world: &mut World, event: GameEvent) {
    world.resource_mut::<Events<GameEvent>>().send(event);
}

pub fn run_events(world: &mut World) -> Vec<RunEvent> {
    world.resource_mut::<Events<RunEvent>>().drain().collect()
}

/// A stage with no boss and a short distance goal.
pub fn short_stage(id: u32, goal: f32) -> Stage {
    Stage {
        id,
        name: format!("Test {id}"),
        distance_goal: goal,
        boss_trigger: None,
        boss: None,
        ..default_stages()[0].clone()
    }
}

/// The first stage with its distance goal shortened, keeping its boss.
pub fn boss_stage(goal: f32) -> Stage {
    Stage {
        distance_goal: goal,
        ..default_stages()[0].clone()
    }
}

pub fn seeded_game(stages: Vec<Stage>) -> Game {
    Game::new(GameConfig {
        stages,
        ..GameConfig::seeded(TEST_SEED)
    })
    .expect("test configuration is valid")
}

/// Steps until `predicate` holds or `limit` steps have run, returning every event produced.
pub fn step_until(game: &mut Game, limit: usize, mut predicate: impl FnMut(&Game, &[RunEvent]) -> bool) -> Vec<RunEvent> {
    let mut events = Vec::new();
    for _ in 0..limit {
        game.step();
        events.extend(game.drain_events());
        if predicate(game, &events) {
            break;
        }
    }
    events
}
