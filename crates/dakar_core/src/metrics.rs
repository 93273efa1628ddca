//! Run counters and logging setup.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

/// Counters for ticks, kills and generations across a run.
pub struct Metrics {
    tick_count: AtomicU64,
    kill_count: AtomicU64,
    generation_count: AtomicU64,
    alive_count: AtomicU64,
    start_time: Instant,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    #[must_use]
    pub fn new() -> Self {
        Self {
            tick_count: AtomicU64::new(0),
            kill_count: AtomicU64::new(0),
            generation_count: AtomicU64::new(0),
            alive_count: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Records a completed tick.
    pub fn record_tick(&self, duration: Duration, alive: usize, leader_distance: f64) {
        self.tick_count.fetch_add(1, Ordering::Relaxed);
        self.alive_count.store(alive as u64, Ordering::Relaxed);

        // Heartbeat every 1000 ticks
        let tick = self.tick_count.load(Ordering::Relaxed);
        if tick.is_multiple_of(1000) {
            tracing::info!(
                tick = tick,
                alive = alive,
                leader_distance = leader_distance,
                duration_us = duration.as_micros() as u64,
                "Simulation tick"
            );
        }
    }

    pub fn record_kills(&self, kills: usize) {
        self.kill_count.fetch_add(kills as u64, Ordering::Relaxed);
    }

    pub fn record_generation(&self) {
        self.generation_count.fetch_add(1, Ordering::Relaxed);
    }

    #[must_use]
    pub fn tick_count(&self) -> u64 {
        self.tick_count.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn kill_count(&self) -> u64 {
        self.kill_count.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn generation_count(&self) -> u64 {
        self.generation_count.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn alive_count(&self) -> u64 {
        self.alive_count.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

/// Installs the global fmt subscriber. `RUST_LOG` overrides `default_level`.
/// A second call is a no-op.
pub fn init_logging(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing::subscriber::set_global_default(
        tracing_subscriber::FmtSubscriber::builder()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .finish(),
    )
    .ok();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_new() {
        let metrics = Metrics::new();
        assert_eq!(metrics.tick_count(), 0);
        assert_eq!(metrics.kill_count(), 0);
    }

    #[test]
    fn test_record_tick() {
        let metrics = Metrics::new();
        metrics.record_tick(Duration::from_millis(16), 20, 3.5);
        assert_eq!(metrics.tick_count(), 1);
        assert_eq!(metrics.alive_count(), 20);
    }

    #[test]
    fn test_kills_accumulate() {
        let metrics = Metrics::new();
        metrics.record_kills(3);
        metrics.record_kills(0);
        metrics.record_kills(2);
        metrics.record_generation();
        assert_eq!(metrics.kill_count(), 5);
        assert_eq!(metrics.generation_count(), 1);
    }

    #[test]
    fn test_init_logging_twice() {
        init_logging("warn");
        init_logging("warn");
    }
}
