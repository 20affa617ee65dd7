//! Hooks for state that outlives a run: the encounter log, cleared stages, the daily mission and the best score.
//!
//! The simulation only talks to the [`Persistence`] trait; hosts provide storage.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use bevy_ecs::resource::Resource;
use parking_lot::Mutex;
use time::{Date, OffsetDateTime};
use tracing::debug;

use crate::archetype::Category;

/// Storage seam for cross-run progress. Every method has a no-op default.
pub trait Persistence: Send + Sync {
    fn record_encountered(&self, _category: Category) {}

    fn record_stage_cleared(&self, _stage: u32) {}

    /// Whether today's daily mission has already been completed.
    fn daily_mission_done(&self) -> bool {
        false
    }

    fn record_daily_complete(&self) {}

    fn best_score(&self) -> u32 {
        0
    }

    /// Offers a final score; implementations keep the maximum.
    fn submit_score(&self, _score: u32) {}
}

impl<P: Persistence + ?Sized> Persistence for Arc<P> {
    fn record_encountered(&self, category: Category) {
        (**self).record_encountered(category)
    }

    fn record_stage_cleared(&self, stage: u32) {
        (**self).record_stage_cleared(stage)
    }

    fn daily_mission_done(&self) -> bool {
        (**self).daily_mission_done()
    }

    fn record_daily_complete(&self) {
        (**self).record_daily_complete()
    }

    fn best_score(&self) -> u32 {
        (**self).best_score()
    }

    fn submit_score(&self, score: u32) {
        (**self).submit_score(score)
    }
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopPersistence;

impl Persistence for NoopPersistence {}

#[derive(Debug, Default)]
struct Records {
    encountered: HashMap<Category, u32>,
    cleared: BTreeSet<u32>,
    daily: Option<Date>,
    best: u32,
}

/// Process-local persistence, keyed to the current UTC date for the daily mission.
#[derive(Debug, Default)]
pub struct MemoryPersistence {
    records: Mutex<Records>,
}

impl MemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn encounters(&self, category: Category) -> u32 {
        self.records.lock().encountered.get(&category).copied().unwrap_or(0)
    }

    pub fn cleared_stages(&self) -> Vec<u32> {
        self.records.lock().cleared.iter().copied().collect()
    }

    fn today() -> Date {
        OffsetDateTime::now_utc().date()
    }
}

impl Persistence for MemoryPersistence {
    fn record_encountered(&self, category: Category) {
        *self.records.lock().encountered.entry(category).or_insert(0) += 1;
    }

    fn record_stage_cleared(&self, stage: u32) {
        if self.records.lock().cleared.insert(stage) {
            debug!(stage, "Stage recorded as cleared");
        }
    }

    fn daily_mission_done(&self) -> bool {
        self.records.lock().daily == Some(Self::today())
    }

    fn record_daily_complete(&self) {
        self.records.lock().daily = Some(Self::today());
    }

    fn best_score(&self) -> u32 {
        self.records.lock().best
    }

    fn submit_score(&self, score: u32) {
        let mut records = self.records.lock();
        if score > records.best {
            debug!(previous = records.best, score, "New best score");
            records.best = score;
        }
    }
}

/// The world's handle on the configured persistence backend.
#[derive(Resource)]
pub struct PersistenceResource(pub Box<dyn Persistence>);

impl PersistenceResource {
    pub fn new(persistence: impl Persistence + 'static) -> Self {
        Self(Box::new(persistence))
    }

    pub fn get(&self) -> &dyn Persistence {
        self.0.as_ref()
    }
}
