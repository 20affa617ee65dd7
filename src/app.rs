use std::time::{Duration, Instant};

use tracing::{debug, info, trace};

use crate::constants::LOOP_TIME;
use crate::error::GameResult;
use crate::events::RunEvent;
use crate::game::{Game, GameConfig};
use crate::platform;
use crate::snapshot::{RenderSnapshot, RunSummary};
use crate::systems::{InputAction, Key, ObstacleTag, RunPhase};

/// Horizontal look-ahead, in pixels, before the autopilot commits to a jump.
const AUTOPILOT_LEAD: f32 = 46.0;

/// A simple bot that jumps over whatever is about to reach the player.
#[derive(Debug, Default)]
struct Autopilot {
    holding_jump: bool,
}

impl Autopilot {
    fn plan(&mut self, snapshot: &RenderSnapshot) -> Option<InputAction> {
        if self.holding_jump {
            self.holding_jump = false;
            return Some(InputAction::KeyUp(Key::Space));
        }

        let player = snapshot.player?;
        let threat = snapshot.obstacles.iter().any(|obstacle| {
            !matches!(obstacle.kind, ObstacleTag::Friend | ObstacleTag::Illusion)
                && obstacle.position.x > player.position.x
                && obstacle.position.x - player.right() < AUTOPILOT_LEAD
        });

        if threat {
            self.holding_jump = true;
            return Some(InputAction::KeyDown(Key::Space));
        }
        None
    }
}

/// Headless real-time host: paces frames, drives the game, and reports results.
pub struct App {
    pub game: Game,
    last_tick: Instant,
    autopilot: Autopilot,
    deadline: Option<Instant>,
    /// Final summaries of every finished run, in order.
    pub results: Vec<RunSummary>,
}

impl App {
    /// # Errors
    ///
    /// Propagates configuration errors from `Game::new()`.
    pub fn new(config: GameConfig, run_for: Option<Duration>) -> GameResult<Self> {
        info!("Initializing headless application");
        let mut game = Game::new(config)?;
        game.start();

        Ok(App {
            game,
            last_tick: Instant::now(),
            autopilot: Autopilot::default(),
            deadline: run_for.map(|duration| Instant::now() + duration),
            results: Vec::new(),
        })
    }

    /// Executes a single frame with consistent pacing.
    ///
    /// # Returns
    ///
    /// `true` if the app should keep running, `false` once the game exits, the final stage is
    /// complete, or the time limit passes.
    pub fn run(&mut self) -> bool {
        let start = Instant::now();
        let dt = self.last_tick.elapsed().as_secs_f32();
        self.last_tick = start;

        let snapshot = self.game.snapshot();
        if let Some(action) = self.autopilot.plan(&snapshot) {
            trace!(?action, "Autopilot input");
            self.game.push_input(action);
        }

        let exit = self.game.tick(dt);
        self.report_events();

        match self.game.phase() {
            RunPhase::Complete => return false,
            RunPhase::Failed | RunPhase::Cleared => self.game.retry(),
            RunPhase::Ready | RunPhase::Playing => {}
        }

        if exit || self.deadline.is_some_and(|deadline| start >= deadline) {
            return false;
        }

        if start.elapsed() < LOOP_TIME {
            let time = LOOP_TIME.saturating_sub(start.elapsed());
            if time != Duration::ZERO {
                platform::sleep(time, true);
            }
        }

        true
    }

    fn report_events(&mut self) {
        for event in self.game.drain_events() {
            match event {
                RunEvent::StageStarted { stage } => info!(stage, "Stage started"),
                RunEvent::BossWarning { duration } => info!(duration, "Boss warning"),
                RunEvent::DailyMissionComplete => info!("Daily mission complete"),
                RunEvent::GameOver(summary) | RunEvent::StageCleared(summary) => {
                    info!("{summary}");
                    self.results.push(summary);
                }
                other => debug!(event = ?other, "Run event"),
            }
        }
    }
}
