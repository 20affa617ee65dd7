use bevy_ecs::{
    event::EventWriter,
    query::With,
    system::{Commands, Query, Res, ResMut},
};
use glam::Vec2;
use tracing::info;

use crate::constants::scoring;
use crate::events::RunEvent;
use crate::persistence::PersistenceResource;
use crate::systems::{spawn_popup, Body, DailyMission, PlayerControlled, RunPhase, RunState, ScoreResource};

/// Awards the daily bonus the first time a run reaches the near-miss goal on a given day.
#[allow(clippy::too_many_arguments)]
pub fn daily_mission_system(
    mut commands: Commands,
    phase: Res<RunPhase>,
    run: Res<RunState>,
    persistence: Res<PersistenceResource>,
    mut mission: ResMut<DailyMission>,
    mut score: ResMut<ScoreResource>,
    mut events: EventWriter<RunEvent>,
    player: Query<&Body, With<PlayerControlled>>,
) {
    if mission.completed || !phase.is_playing() || run.near_misses < scoring::DAILY_NEAR_MISS_GOAL {
        return;
    }

    mission.completed = true;
    persistence.get().record_daily_complete();
    score.0 += scoring::DAILY_BONUS;
    info!(near_misses = run.near_misses, bonus = scoring::DAILY_BONUS, "Daily mission complete");
    events.write(RunEvent::DailyMissionComplete);

    let anchor = player
        .single()
        .map(|body| Vec2::new(body.position.x + body.size.x / 2.0, body.position.y - 10.0))
        .unwrap_or(Vec2::ZERO);
    spawn_popup(&mut commands, &mut events, format!("Daily clear! +{}", scoring::DAILY_BONUS), anchor);
}
