//! Headless tick loop around a [`World`].

use crate::app::report::RunReport;
use crate::app::scenario;
use anyhow::{Context, Result};
use formica_core::config::SimConfig;
use formica_core::economy::Resource;
use formica_core::entity::{BodyKind, Entity};
use formica_core::metrics::Metrics;
use formica_core::world::World;
use formica_data::EntityId;
use std::time::Instant;

pub struct Simulation {
    world: World,
    nest: EntityId,
    food: Resource,
    metrics: Metrics,
    started_at: chrono::DateTime<chrono::Utc>,
}

impl Simulation {
    /// Builds the default scenario for `config`.
    pub fn from_config(config: &SimConfig) -> Result<Self> {
        let scenario = scenario::build(config).context("building scenario")?;
        Ok(Self {
            world: scenario.world,
            nest: scenario.nest,
            food: scenario.food,
            metrics: Metrics::default(),
            started_at: chrono::Utc::now(),
        })
    }

    #[must_use]
    pub fn with_report_every(mut self, ticks: u64) -> Self {
        self.metrics = Metrics::new(ticks);
        self
    }

    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    #[must_use]
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    #[must_use]
    pub fn nest(&self) -> EntityId {
        self.nest
    }

    /// Advances one tick and records it.
    pub fn step(&mut self) -> Result<()> {
        let start = Instant::now();
        let events = self
            .world
            .update()
            .with_context(|| format!("tick {}", self.world.tick() + 1))?;
        self.metrics
            .record_tick(start.elapsed(), self.world.entity_count(), &events);
        Ok(())
    }

    /// Runs up to `ticks` ticks.
    ///
    /// Stops early once the colony is extinct and its stockpile can no longer
    /// pay for a new member.
    pub fn run(&mut self, ticks: u64) -> Result<RunReport> {
        for _ in 0..ticks {
            if self.is_extinct() {
                tracing::info!(tick = self.world.tick(), "Colony extinct, stopping early");
                break;
            }
            self.step()?;
        }
        self.world.log_entities();
        Ok(self.report())
    }

    fn count(&self, kind: BodyKind) -> usize {
        self.world.iter().filter(|(_, e)| e.kind() == kind).count()
    }

    fn is_extinct(&self) -> bool {
        if self.count(BodyKind::Agent) > 0 {
            return false;
        }
        match self.world.get(self.nest).and_then(Entity::as_colony) {
            Some(colony) => !colony.stockpile.covers(&colony.spawn_cost),
            None => true,
        }
    }

    /// Snapshot of the current run state.
    #[must_use]
    pub fn report(&self) -> RunReport {
        let colony = self.world.get(self.nest).and_then(Entity::as_colony);
        let config = self.world.config();
        RunReport {
            started_at: self.started_at.to_rfc3339(),
            fingerprint: config.fingerprint(),
            seed: config.world.seed.unwrap_or(0),
            ticks: self.world.tick(),
            population: colony.map_or(0, |c| c.living_population(&self.world)),
            spawned: colony.map_or(0, |c| c.population().len()),
            deaths: self.metrics.counter(&format!("{}.removed", BodyKind::Agent)),
            stockpile: colony.map_or(0, |c| u64::from(c.stockpile.quantity(&self.food))),
            piles_remaining: self.count(BodyKind::Pile),
            pheromones: self.count(BodyKind::Pheromone),
            elapsed_ms: self.metrics.elapsed().as_millis() as u64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> SimConfig {
        let mut config = SimConfig::default();
        config.world.width = 80.0;
        config.world.height = 80.0;
        config.world.subdivisions = 8;
        config.world.seed = Some(5);
        config.scenario.piles = 8;
        config.scenario.pile_distance = 10.0;
        config.scenario.obstacles = 4;
        config
    }

    #[test]
    fn test_step_advances_tick_and_metrics() {
        let mut sim = Simulation::from_config(&small_config()).unwrap();
        sim.step().unwrap();
        sim.step().unwrap();
        assert_eq!(sim.world().tick(), 2);
        assert_eq!(sim.metrics().tick_count(), 2);
    }

    #[test]
    fn test_run_report_counts_population() {
        let config = small_config();
        let mut sim = Simulation::from_config(&config).unwrap().with_report_every(0);
        let report = sim.run(20).unwrap();
        assert_eq!(report.ticks, 20);
        assert_eq!(report.seed, 5);
        assert_eq!(report.spawned, config.colony.initial_members);
        assert_eq!(report.fingerprint, config.fingerprint());
        assert!(report.population <= report.spawned);
        assert_eq!(report.population, sim.count(BodyKind::Agent));
        assert!(report.pheromones > 0);
    }

    #[test]
    fn test_extinct_colony_stops_early() {
        let mut config = small_config();
        config.colony.initial_members = 0;
        config.colony.initial_stockpile = 0;
        let mut sim = Simulation::from_config(&config).unwrap();
        let report = sim.run(50).unwrap();
        assert_eq!(report.ticks, 0);
        assert!(report.is_extinct());
    }
}
