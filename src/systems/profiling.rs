use std::fmt::Display;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use bevy_ecs::resource::Resource;
use bevy_ecs::system::{IntoSystem, System};
use circular_buffer::CircularBuffer;
use num_width::NumberWidth;
use parking_lot::Mutex;
use smallvec::SmallVec;
use strum::{EnumCount, IntoEnumIterator};
use strum_macros::{EnumCount, EnumIter, IntoStaticStr};
use thousands::Separable;

/// The maximum number of systems that can be profiled. Must not be exceeded, or it will panic.
const MAX_SYSTEMS: usize = SystemId::COUNT;
/// The number of durations to keep in the circular buffer.
const TIMING_WINDOW_SIZE: usize = 30;

/// The scheduled simulation passes, one id per profiled system plus the
/// whole-tick total.
#[derive(EnumCount, EnumIter, IntoStaticStr, Debug, PartialEq, Eq, Hash, Copy, Clone)]
pub enum SystemId {
    Total,
    Timers,
    PlayerMovement,
    Start,
    Ghosts,
    Consume,
    Collisions,
    Win,
}

impl Display for SystemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", Into::<&'static str>::into(self).to_ascii_lowercase())
    }
}

/// A timing buffer that tracks durations and automatically inserts zero
/// durations for skipped ticks.
#[derive(Debug, Default)]
pub struct TimingBuffer {
    buffer: CircularBuffer<TIMING_WINDOW_SIZE, Duration>,
    /// The last tick when this buffer was updated.
    last_tick: u64,
}

impl TimingBuffer {
    /// Adds a timing duration for the current tick.
    ///
    /// # Panics
    ///
    /// Panics if `current_tick` is less than `last_tick`, indicating time went backwards.
    pub fn add_timing(&mut self, duration: Duration, current_tick: u64) {
        if current_tick < self.last_tick {
            panic!(
                "Time went backwards: current_tick ({}) < last_tick ({})",
                current_tick, self.last_tick
            );
        }

        // Zero-fill any skipped ticks (but not the current tick).
        if current_tick > self.last_tick {
            let skipped_ticks = current_tick - self.last_tick - 1;
            for _ in 0..skipped_ticks {
                self.buffer.push_back(Duration::ZERO);
            }
        }

        self.buffer.push_back(duration);
        self.last_tick = current_tick;
    }

    /// Gets the most recent timing from the buffer.
    pub fn most_recent(&self) -> Duration {
        self.buffer.back().copied().unwrap_or(Duration::ZERO)
    }

    /// Mean and standard deviation over the window, via Welford's algorithm.
    pub fn stats(&mut self, current_tick: u64) -> (Duration, Duration) {
        if current_tick > self.last_tick {
            let skipped_ticks = current_tick - self.last_tick - 1;
            for _ in 0..skipped_ticks {
                self.buffer.push_back(Duration::ZERO);
            }
            self.last_tick = current_tick;
        }

        let mut sample_count = 0u16;
        let mut running_mean = 0.0;
        let mut sum_squared_diff = 0.0;

        for duration in self.buffer.iter() {
            let duration_secs = duration.as_secs_f32();
            sample_count += 1;

            let diff_from_mean = duration_secs - running_mean;
            running_mean += diff_from_mean / sample_count as f32;

            let diff_from_new_mean = duration_secs - running_mean;
            sum_squared_diff += diff_from_mean * diff_from_new_mean;
        }

        if sample_count > 0 {
            let variance = if sample_count > 1 {
                sum_squared_diff / (sample_count - 1) as f32
            } else {
                0.0
            };

            (
                Duration::from_secs_f32(running_mean),
                Duration::from_secs_f32(variance.sqrt()),
            )
        } else {
            (Duration::ZERO, Duration::ZERO)
        }
    }
}

/// A resource that tracks the current tick using an atomic counter.
#[derive(Resource, Debug, Default)]
pub struct Timing {
    current_tick: AtomicU64,
}

impl Timing {
    pub fn current_tick(&self) -> u64 {
        self.current_tick.load(Ordering::Relaxed)
    }

    /// Increments the tick counter and returns the new value.
    pub fn increment_tick(&self) -> u64 {
        self.current_tick.fetch_add(1, Ordering::Relaxed) + 1
    }
}

/// Per-system timing windows for the whole schedule.
#[derive(Resource, Debug)]
pub struct SystemTimings {
    /// Statically sized map of system ids to timing buffers.
    timings: micromap::Map<SystemId, Mutex<TimingBuffer>, MAX_SYSTEMS>,
}

impl Default for SystemTimings {
    fn default() -> Self {
        let mut timings = micromap::Map::new();

        // Pre-populate with all SystemId variants to avoid runtime allocations.
        for id in SystemId::iter() {
            timings.insert(id, Mutex::new(TimingBuffer::default()));
        }

        Self { timings }
    }
}

impl SystemTimings {
    pub fn add_timing(&self, id: SystemId, duration: Duration, current_tick: u64) {
        let buffer = self
            .timings
            .get(&id)
            .expect("SystemId not found in pre-populated map - this is a bug");
        buffer.lock().add_timing(duration, current_tick);
    }

    /// Records the whole-tick duration, including the scheduler itself.
    pub fn add_total_timing(&self, duration: Duration, current_tick: u64) {
        self.add_timing(SystemId::Total, duration, current_tick);
    }

    pub fn stats(&self, current_tick: u64) -> micromap::Map<SystemId, (Duration, Duration), MAX_SYSTEMS> {
        let mut stats = micromap::Map::new();

        for id in SystemId::iter() {
            let buffer = self
                .timings
                .get(&id)
                .expect("SystemId not found in pre-populated map - this is a bug");

            let (average, standard_deviation) = buffer.lock().stats(current_tick);
            stats.insert(id, (average, standard_deviation));
        }

        stats
    }

    /// Renders an aligned per-system timing table, headed by the effective
    /// tick rate, systems sorted most expensive first.
    pub fn format_timing_display(&self, current_tick: u64) -> SmallVec<[String; SystemId::COUNT]> {
        let stats = self.stats(current_tick);

        let (total_avg, total_std) = stats
            .get(&SystemId::Total)
            .copied()
            .unwrap_or((Duration::ZERO, Duration::ZERO));

        let effective_rate = match 1.0 / total_avg.as_secs_f64() {
            f if f > 100.0 => format!("{:>5} TPS", (f as u32).separate_with_commas()),
            f if f < 10.0 => format!("{:.1} TPS", f),
            f => format!("{:5.0} TPS", f),
        };

        let mut timing_data = vec![(effective_rate, total_avg, total_std)];

        let mut sorted_stats: Vec<_> = stats.iter().filter(|(id, _)| **id != SystemId::Total).collect();
        sorted_stats.sort_by(|a, b| b.1 .0.cmp(&a.1 .0));

        for (id, (avg, std_dev)) in sorted_stats {
            timing_data.push((id.to_string(), *avg, *std_dev));
        }

        format_timing_rows(timing_data)
    }

    /// Returns the systems most likely responsible for a slow tick.
    ///
    /// Systems that took 2ms or more on the latest tick are reported
    /// outright. Failing that, the most expensive systems are accumulated
    /// until they cover 30% of the tick, capped at 5 entries.
    pub fn get_slowest_systems(&self) -> SmallVec<[(SystemId, Duration); 5]> {
        let mut system_timings: Vec<(SystemId, Duration)> = Vec::new();
        let mut total_duration = Duration::ZERO;

        for id in SystemId::iter() {
            if id == SystemId::Total {
                continue;
            }

            if let Some(buffer) = self.timings.get(&id) {
                let recent = buffer.lock().most_recent();
                system_timings.push((id, recent));
                total_duration += recent;
            }
        }

        system_timings.sort_by(|a, b| b.1.cmp(&a.1));

        let over_threshold: SmallVec<[(SystemId, Duration); 5]> = system_timings
            .iter()
            .filter(|(_, duration)| duration.as_millis() >= 2)
            .copied()
            .collect();

        if !over_threshold.is_empty() {
            return over_threshold;
        }

        let threshold = total_duration.as_nanos() as f64 * 0.3;
        let mut accumulated = 0u128;
        let mut result = SmallVec::new();

        for (id, duration) in system_timings.iter().take(5) {
            result.push((*id, *duration));
            accumulated += duration.as_nanos();

            if accumulated as f64 >= threshold {
                break;
            }
        }

        result
    }
}

/// Wraps a system so its wall time is recorded under `id` each run.
pub fn profile<S, M>(id: SystemId, system: S) -> impl FnMut(&mut bevy_ecs::world::World)
where
    S: IntoSystem<(), (), M> + 'static,
{
    let mut system: S::System = IntoSystem::into_system(system);
    let mut is_initialized = false;
    move |world: &mut bevy_ecs::world::World| {
        if !is_initialized {
            system.initialize(world);
            is_initialized = true;
        }

        let start = std::time::Instant::now();
        system.run((), world);
        let duration = start.elapsed();

        if let (Some(timings), Some(timing)) = (world.get_resource::<SystemTimings>(), world.get_resource::<Timing>()) {
            let current_tick = timing.current_tick();
            timings.add_timing(id, duration, current_tick);
        }
    }
}

// Helper to split a duration into an integer, decimal, and unit
fn split_duration(duration: &Duration) -> (u64, u32, &'static str) {
    match duration {
        n if n >= &Duration::from_secs(1) => {
            let secs = n.as_secs();
            let decimal = n.as_millis() as u64 % 1000;
            (secs, decimal as u32, "s")
        }
        n if n >= &Duration::from_millis(1) => {
            let ms = n.as_millis() as u64;
            let decimal = n.as_micros() as u64 % 1000;
            (ms, decimal as u32, "ms")
        }
        n if n >= &Duration::from_micros(1) => {
            let us = n.as_micros() as u64;
            let decimal = n.as_nanos() as u64 % 1000;
            (us, decimal as u32, "µs")
        }
        n => {
            let ns = n.as_nanos() as u64;
            (ns, 0, "ns")
        }
    }
}

/// Formats timing rows into strings with aligned columns.
fn format_timing_rows(
    timing_data: impl IntoIterator<Item = (String, Duration, Duration)>,
) -> SmallVec<[String; SystemId::COUNT]> {
    struct Row {
        name: String,
        avg_int: u64,
        avg_decimal: u32,
        avg_unit: &'static str,
        std_int: u64,
        std_decimal: u32,
        std_unit: &'static str,
    }

    let rows = timing_data
        .into_iter()
        .map(|(name, avg, std_dev)| {
            let (avg_int, avg_decimal, avg_unit) = split_duration(&avg);
            let (std_int, std_decimal, std_unit) = split_duration(&std_dev);

            Row {
                name,
                avg_int,
                avg_decimal,
                avg_unit,
                std_int,
                std_decimal,
                std_unit,
            }
        })
        .collect::<SmallVec<[Row; MAX_SYSTEMS]>>();

    if rows.is_empty() {
        return SmallVec::new();
    }

    let (avg_int_width, avg_decimal_width, std_int_width, std_decimal_width) =
        rows.iter()
            .fold((0, 3, 0, 3), |(avg_int_w, avg_dec_w, std_int_w, std_dec_w), r| {
                (
                    avg_int_w.max(r.avg_int.width() as usize),
                    avg_dec_w.max(r.avg_decimal.width() as usize),
                    std_int_w.max(r.std_int.width() as usize),
                    std_dec_w.max(r.std_decimal.width() as usize),
                )
            });

    let name_width = rows
        .iter()
        .map(|r| r.name.len())
        .chain(SystemId::iter().map(|id| id.to_string().len()))
        .max()
        .unwrap_or(0);

    rows.iter()
        .map(|r| {
            format!(
                "{name:name_width$} : {avg_int:avg_int_width$}.{avg_decimal:<avg_decimal_width$}{avg_unit} ± {std_int:std_int_width$}.{std_decimal:<std_decimal_width$}{std_unit}",
                name = r.name,
                avg_int = r.avg_int,
                avg_decimal = r.avg_decimal,
                avg_unit = r.avg_unit,
                std_int = r.std_int,
                std_decimal = r.std_decimal,
                std_unit = r.std_unit,
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn skipped_ticks_are_zero_filled() {
        let mut buffer = TimingBuffer::default();
        buffer.add_timing(Duration::from_millis(10), 1);
        buffer.add_timing(Duration::from_millis(10), 4);

        // Ticks 2 and 3 were zero-filled, pulling the mean well below 10ms.
        let (mean, _) = buffer.stats(4);
        assert!(mean > Duration::from_millis(3) && mean < Duration::from_millis(7));
    }

    #[test]
    fn most_recent_returns_last_entry() {
        let mut buffer = TimingBuffer::default();
        assert_eq!(buffer.most_recent(), Duration::ZERO);
        buffer.add_timing(Duration::from_micros(250), 1);
        buffer.add_timing(Duration::from_micros(750), 2);
        assert_eq!(buffer.most_recent(), Duration::from_micros(750));
    }

    #[test]
    fn slow_systems_report_over_threshold_entries() {
        let timings = SystemTimings::default();
        timings.add_timing(SystemId::Ghosts, Duration::from_millis(3), 1);
        timings.add_timing(SystemId::Consume, Duration::from_micros(40), 1);

        let slowest = timings.get_slowest_systems();
        assert_eq!(slowest.len(), 1);
        assert_eq!(slowest[0].0, SystemId::Ghosts);
    }

    #[test]
    fn timing_table_lists_every_system() {
        let timings = SystemTimings::default();
        timings.add_total_timing(Duration::from_millis(2), 1);
        let rows = timings.format_timing_display(1);
        // One header row plus one row per system other than Total.
        assert_eq!(rows.len(), SystemId::COUNT);
    }
}
