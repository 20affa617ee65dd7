use bevy_ecs::system::IntoSystem;
use bevy_ecs::world::World;
use bevy_ecs::{resource::Resource, system::System};
use circular_buffer::CircularBuffer;
use num_width::NumberWidth;
use parking_lot::Mutex;
use smallvec::SmallVec;
use std::fmt::Display;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use strum::{EnumCount, IntoEnumIterator};
use strum_macros::{EnumCount, EnumIter, IntoStaticStr};
use thousands::Separable;

const MAX_SYSTEMS: usize = SystemId::COUNT;
/// The number of durations kept per system.
const TIMING_WINDOW_SIZE: usize = 30;

/// Rolling window of durations for one system. Steps the system did not run in count as zero.
#[derive(Debug, Default)]
pub struct TimingBuffer {
    buffer: CircularBuffer<TIMING_WINDOW_SIZE, Duration>,
    last_step: u64,
}

impl TimingBuffer {
    fn fill_skipped(&mut self, current_step: u64) {
        if current_step > self.last_step {
            let skipped = (current_step - self.last_step - 1).min(TIMING_WINDOW_SIZE as u64);
            for _ in 0..skipped {
                self.buffer.push_back(Duration::ZERO);
            }
        }
    }

    /// Records a duration for `current_step`. Out-of-order steps are ignored.
    pub fn add_timing(&mut self, duration: Duration, current_step: u64) {
        if current_step < self.last_step {
            return;
        }
        self.fill_skipped(current_step);
        self.buffer.push_back(duration);
        self.last_step = current_step;
    }

    pub fn most_recent(&self) -> Duration {
        self.buffer.back().copied().unwrap_or(Duration::ZERO)
    }

    /// Mean and standard deviation over the window, using Welford's algorithm.
    pub fn stats(&mut self, current_step: u64) -> (Duration, Duration) {
        if current_step > self.last_step {
            self.fill_skipped(current_step);
            self.last_step = current_step;
        }

        let mut count = 0u16;
        let mut mean = 0.0f64;
        let mut sum_squared_diff = 0.0f64;
        for duration in self.buffer.iter() {
            let secs = duration.as_secs_f64();
            count += 1;
            let diff = secs - mean;
            mean += diff / count as f64;
            sum_squared_diff += diff * (secs - mean);
        }

        if count == 0 {
            return (Duration::ZERO, Duration::ZERO);
        }
        let variance = if count > 1 {
            sum_squared_diff / (count - 1) as f64
        } else {
            0.0
        };
        (
            Duration::from_secs_f64(mean.max(0.0)),
            Duration::from_secs_f64(variance.max(0.0).sqrt()),
        )
    }
}

/// Counts completed fixed steps.
#[derive(Resource, Debug, Default)]
pub struct Timing {
    current_step: AtomicU64,
}

impl Timing {
    pub fn current_step(&self) -> u64 {
        self.current_step.load(Ordering::Relaxed)
    }

    /// Increments the step counter and returns the new value.
    pub fn increment_step(&self) -> u64 {
        self.current_step.fetch_add(1, Ordering::Relaxed) + 1
    }
}

#[derive(EnumCount, EnumIter, IntoStaticStr, Debug, PartialEq, Eq, Hash, Copy, Clone)]
pub enum SystemId {
    Total,
    Input,
    Commands,
    Clock,
    PlayerControls,
    PlayerPhysics,
    ObstacleMotion,
    SpawnQueue,
    Spawn,
    Collision,
    Popups,
    TimeToLive,
    Mission,
    Stage,
    PauseManager,
}

impl Display for SystemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", Into::<&'static str>::into(self).to_ascii_lowercase())
    }
}

#[derive(Resource, Debug)]
pub struct SystemTimings {
    pub timings: micromap::Map<SystemId, Mutex<TimingBuffer>, MAX_SYSTEMS>,
}

impl Default for SystemTimings {
    fn default() -> Self {
        let mut timings = micromap::Map::new();
        for id in SystemId::iter() {
            timings.insert(id, Mutex::new(TimingBuffer::default()));
        }
        Self { timings }
    }
}

impl SystemTimings {
    pub fn add_timing(&self, id: SystemId, duration: Duration, current_step: u64) {
        if let Some(buffer) = self.timings.get(&id) {
            buffer.lock().add_timing(duration, current_step);
        }
    }

    /// Records the time taken by a whole step, including schedule overhead.
    pub fn add_total_timing(&self, duration: Duration, current_step: u64) {
        self.add_timing(SystemId::Total, duration, current_step);
    }

    pub fn stats(&self, current_step: u64) -> micromap::Map<SystemId, (Duration, Duration), MAX_SYSTEMS> {
        let mut stats = micromap::Map::new();
        for (id, buffer) in self.timings.iter() {
            stats.insert(*id, buffer.lock().stats(current_step));
        }
        stats
    }

    /// Aligned report lines: steps per second first, then the most expensive systems.
    pub fn format_timing_display(&self, current_step: u64) -> SmallVec<[String; SystemId::COUNT]> {
        let stats = self.stats(current_step);
        let (total_avg, total_std) = stats
            .get(&SystemId::Total)
            .copied()
            .unwrap_or((Duration::ZERO, Duration::ZERO));

        let steps_per_second = match 1.0 / total_avg.as_secs_f64() {
            f if !f.is_finite() => "    - SPS".to_string(),
            f if f > 100.0 => format!("{:>5} SPS", (f as u64).separate_with_commas()),
            f if f < 10.0 => format!("{:.1} SPS", f),
            f => format!("{:5.0} SPS", f),
        };

        let mut rows = vec![(steps_per_second, total_avg, total_std)];
        let mut sorted: Vec<_> = stats.iter().filter(|(id, _)| **id != SystemId::Total).collect();
        sorted.sort_by(|a, b| b.1 .0.cmp(&a.1 .0));
        for (id, (avg, std_dev)) in sorted.iter().take(8) {
            rows.push((id.to_string(), *avg, *std_dev));
        }

        format_timing_display(rows)
    }

    /// Systems most likely responsible for a slow step.
    ///
    /// Anything over 2ms on the latest step is returned outright. Otherwise the slowest systems
    /// are accumulated until they cover 30% of the step, up to five.
    pub fn slowest_systems(&self) -> SmallVec<[(SystemId, Duration); 5]> {
        let mut recent: Vec<(SystemId, Duration)> = self
            .timings
            .iter()
            .filter(|(id, _)| **id != SystemId::Total)
            .map(|(id, buffer)| (*id, buffer.lock().most_recent()))
            .collect();
        let total: Duration = recent.iter().map(|(_, duration)| *duration).sum();
        recent.sort_by(|a, b| b.1.cmp(&a.1));

        let over_threshold: SmallVec<[(SystemId, Duration); 5]> = recent
            .iter()
            .filter(|(_, duration)| duration.as_millis() >= 2)
            .take(5)
            .copied()
            .collect();
        if !over_threshold.is_empty() {
            return over_threshold;
        }

        let threshold = total.as_nanos() as f64 * 0.3;
        let mut accumulated = 0u128;
        let mut result = SmallVec::new();
        for (id, duration) in recent.iter().take(5) {
            result.push((*id, *duration));
            accumulated += duration.as_nanos();
            if accumulated as f64 >= threshold {
                break;
            }
        }
        result
    }
}

/// Wraps a system so each run is timed into [`SystemTimings`].
pub fn profile<S, M>(id: SystemId, system: S) -> impl FnMut(&mut World)
where
    S: IntoSystem<(), (), M> + 'static,
{
    let mut system: S::System = IntoSystem::into_system(system);
    let mut is_initialized = false;
    move |world: &mut World| {
        if !is_initialized {
            system.initialize(world);
            is_initialized = true;
        }

        let start = std::time::Instant::now();
        system.run((), world);
        let duration = start.elapsed();

        if let (Some(timings), Some(timing)) = (world.get_resource::<SystemTimings>(), world.get_resource::<Timing>()) {
            timings.add_timing(id, duration, timing.current_step());
        }
    }
}

/// Splits a duration into integer part, three-digit fraction, and unit.
fn split_duration(duration: &Duration) -> (u64, u32, &'static str) {
    match duration {
        n if n >= &Duration::from_secs(1) => (n.as_secs(), n.subsec_millis(), "s"),
        n if n >= &Duration::from_millis(1) => (n.as_millis() as u64, (n.as_micros() % 1000) as u32, "ms"),
        n if n >= &Duration::from_micros(1) => (n.as_micros() as u64, (n.as_nanos() % 1000) as u32, "µs"),
        n => (n.as_nanos() as u64, 0, "ns"),
    }
}

/// Formats `(name, average, standard deviation)` rows with aligned columns.
pub fn format_timing_display(
    timing_data: impl IntoIterator<Item = (String, Duration, Duration)>,
) -> SmallVec<[String; SystemId::COUNT]> {
    struct Entry {
        name: String,
        avg: (u64, u32, &'static str),
        std: (u64, u32, &'static str),
    }

    let entries = timing_data
        .into_iter()
        .map(|(name, avg, std_dev)| Entry {
            name,
            avg: split_duration(&avg),
            std: split_duration(&std_dev),
        })
        .collect::<SmallVec<[Entry; 16]>>();
    if entries.is_empty() {
        return SmallVec::new();
    }

    let (avg_int_w, avg_dec_w, std_int_w, std_dec_w) =
        entries.iter().fold((0, 3, 0, 3), |(avg_int, avg_dec, std_int, std_dec), e| {
            (
                avg_int.max(e.avg.0.width() as usize),
                avg_dec.max(e.avg.1.width() as usize),
                std_int.max(e.std.0.width() as usize),
                std_dec.max(e.std.1.width() as usize),
            )
        });
    let name_w = entries.iter().map(|e| e.name.len()).max().unwrap_or(0);

    entries
        .iter()
        .map(|e| {
            format!(
                "{name:name_w$} : {avg_int:avg_int_w$}.{avg_dec:<avg_dec_w$}{avg_unit} ± {std_int:std_int_w$}.{std_dec:<std_dec_w$}{std_unit}",
                name = e.name,
                avg_int = e.avg.0,
                avg_dec = e.avg.1,
                avg_unit = e.avg.2,
                std_int = e.std.0,
                std_dec = e.std.1,
                std_unit = e.std.2,
            )
        })
        .collect()
}
