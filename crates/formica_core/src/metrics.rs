//! Run statistics and structured logging setup.

use crate::entity::BodyKind;
use crate::world::WorldEvent;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

/// Per-run statistics collected by whoever drives the tick loop.
#[derive(Debug)]
pub struct Metrics {
    tick_count: u64,
    entity_count: usize,
    /// Emit an `info` summary every this many ticks; 0 disables it.
    report_every: u64,
    counters: BTreeMap<String, u64>,
    busy: Duration,
    start_time: Instant,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new(1000)
    }
}

impl Metrics {
    #[must_use]
    pub fn new(report_every: u64) -> Self {
        Self {
            tick_count: 0,
            entity_count: 0,
            report_every,
            counters: BTreeMap::new(),
            busy: Duration::ZERO,
            start_time: Instant::now(),
        }
    }

    /// Records a completed tick and the lifecycle events it produced.
    pub fn record_tick(&mut self, duration: Duration, entities: usize, events: &[WorldEvent]) {
        self.tick_count += 1;
        self.entity_count = entities;
        self.busy += duration;
        for event in events {
            let key = format!(
                "{}.{}",
                event.kind(),
                if event.is_added() { "added" } else { "removed" }
            );
            self.increment_counter(&key);
        }

        if self.report_every > 0 && self.tick_count % self.report_every == 0 {
            tracing::info!(
                tick = self.tick_count,
                entities,
                agents_added = self.counter(&format!("{}.added", BodyKind::Agent)),
                agents_removed = self.counter(&format!("{}.removed", BodyKind::Agent)),
                duration_us = duration.as_micros() as u64,
                "Simulation tick"
            );
        }
    }

    pub fn increment_counter(&mut self, name: &str) {
        *self.counters.entry(name.to_string()).or_insert(0) += 1;
    }

    #[must_use]
    pub fn counter(&self, name: &str) -> u64 {
        self.counters.get(name).copied().unwrap_or(0)
    }

    pub fn counters(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counters.iter().map(|(k, &v)| (k.as_str(), v))
    }

    #[must_use]
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.entity_count
    }

    /// Time spent inside recorded ticks.
    #[must_use]
    pub fn busy(&self) -> Duration {
        self.busy
    }

    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

/// Installs a global `fmt` subscriber filtered by `RUST_LOG` (default `info`).
///
/// Calling it again after a subscriber is installed has no effect.
pub fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing::subscriber::set_global_default(
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .finish(),
    )
    .ok();
}

#[cfg(test)]
mod tests {
    use super::*;
    use formica_data::{EntityId, Vec2};

    fn removed_agent() -> WorldEvent {
        WorldEvent::Removed {
            id: EntityId::new(0, 0),
            name: "ant-1".into(),
            kind: BodyKind::Agent,
            position: Vec2::ZERO,
        }
    }

    #[test]
    fn test_metrics_new() {
        let metrics = Metrics::new(10);
        assert_eq!(metrics.tick_count(), 0);
        assert_eq!(metrics.counters().count(), 0);
    }

    #[test]
    fn test_record_tick_counts_events() {
        let mut metrics = Metrics::new(0);
        metrics.record_tick(Duration::from_millis(2), 12, &[removed_agent()]);
        metrics.record_tick(Duration::from_millis(3), 11, &[removed_agent()]);
        assert_eq!(metrics.tick_count(), 2);
        assert_eq!(metrics.entity_count(), 11);
        assert_eq!(metrics.counter("agent.removed"), 2);
        assert_eq!(metrics.counter("agent.added"), 0);
        assert_eq!(metrics.busy(), Duration::from_millis(5));
    }

    #[test]
    fn test_init_logging_twice_is_harmless() {
        init_logging();
        init_logging();
    }
}
