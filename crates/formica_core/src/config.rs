//! Configuration management for simulation parameters.
//!
//! Strongly-typed configuration structures that map to a `formica.toml`
//! file. Every section and field has a default, so a file only needs to list
//! what it overrides.
//!
//! ## Example `formica.toml`
//!
//! ```toml
//! [world]
//! width = 200.0
//! height = 200.0
//! subdivisions = 20
//! seed = 42
//!
//! [agent]
//! max_speed = 1.2
//! starvation_rate = 0.05
//!
//! [perception]
//! precision = 24
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

/// World-level parameters: extent, partition resolution and RNG seed.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct WorldConfig {
    pub width: f64,
    pub height: f64,
    /// Regions per axis; the partition and boundary grid are `subdivisions²`.
    pub subdivisions: usize,
    pub seed: Option<u64>,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 200.0,
            height: 200.0,
            subdivisions: 20,
            seed: None,
        }
    }
}

/// Per-agent physiology and behavior thresholds.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AgentConfig {
    pub max_health: f64,
    pub max_speed: f64,
    pub speed: f64,
    /// Health lost per tick; restored in full when delivering to the nest.
    pub starvation_rate: f64,
    pub collider_radius: f64,
    /// Perception radius in units of region size.
    pub perception_regions: f64,
    pub pickup_range: f64,
    /// Distance at which a pursued target counts as reached.
    pub target_threshold: f64,
    /// Ticks between two scent markers.
    pub emit_delay: u32,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_health: 100.0,
            max_speed: 2.0,
            speed: 1.0,
            starvation_rate: 0.02,
            collider_radius: 0.5,
            perception_regions: 1.5,
            pickup_range: 2.0,
            target_threshold: 1.5,
            emit_delay: 5,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct PerceptionConfig {
    /// Number of angular bins in a perception map.
    pub precision: usize,
    /// Logistic steepness, scaled by the perception radius.
    pub falloff_steepness: f64,
}

impl Default for PerceptionConfig {
    fn default() -> Self {
        Self {
            precision: 24,
            falloff_steepness: 10.0,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SteeringConfig {
    /// Half-angle in radians of the random deflection cone.
    pub wander_cone: f64,
    /// Weight of the previous heading in the smoothed result, in `[0, 1)`.
    pub memory: f64,
    pub map_weight: f64,
    pub random_weight: f64,
    pub feeler_distance: f64,
    pub feeler_radius: f64,
    pub avoidance_weight: f64,
}

impl Default for SteeringConfig {
    fn default() -> Self {
        Self {
            wander_cone: 0.35,
            memory: 0.6,
            map_weight: 1.0,
            random_weight: 0.5,
            feeler_distance: 3.0,
            feeler_radius: 0.5,
            avoidance_weight: 50.0,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct PheromoneConfig {
    /// Lifetime of a scent marker in ticks.
    pub lifespan: u64,
}

impl Default for PheromoneConfig {
    fn default() -> Self {
        Self {
            lifespan: 600,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ColonyConfig {
    pub resource_key: String,
    pub resource_name: String,
    pub spawn_cost: u32,
    pub initial_stockpile: u32,
    pub initial_members: usize,
    pub spawn_radius: f64,
    pub auto_spawn_interval: u64,
    pub nest_radius: f64,
}

impl Default for ColonyConfig {
    fn default() -> Self {
        Self {
            resource_key: "food".to_string(),
            resource_name: "Food".to_string(),
            spawn_cost: 10,
            initial_stockpile: 100,
            initial_members: 10,
            spawn_radius: 2.0,
            auto_spawn_interval: 50,
            nest_radius: 2.0,
        }
    }
}

/// Initial world layout used by the headless runner.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ScenarioConfig {
    pub piles: usize,
    pub pile_quantity: u32,
    /// Piles are scattered around a ring of this radius centred on the nest.
    pub pile_distance: f64,
    pub obstacles: usize,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            piles: 40,
            pile_quantity: 5,
            pile_distance: 30.0,
            obstacles: 12,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct SimConfig {
    pub world: WorldConfig,
    pub agent: AgentConfig,
    pub perception: PerceptionConfig,
    pub steering: SteeringConfig,
    pub pheromone: PheromoneConfig,
    pub colony: ColonyConfig,
    pub scenario: ScenarioConfig,
}

impl SimConfig {
    /// Validates all configuration parameters.
    ///
    /// Returns `Ok(())` if all parameters are valid, or `Err` with a
    /// description of the first validation failure.
    pub fn validate(&self) -> anyhow::Result<()> {
        // World
        anyhow::ensure!(
            self.world.width > 0.0 && self.world.width.is_finite(),
            "World width must be positive"
        );
        anyhow::ensure!(
            self.world.height > 0.0 && self.world.height.is_finite(),
            "World height must be positive"
        );
        anyhow::ensure!(self.world.subdivisions > 0, "Subdivisions must be positive");
        anyhow::ensure!(
            self.world.subdivisions <= 1024,
            "Subdivisions too large (max 1024)"
        );

        // Agent
        anyhow::ensure!(self.agent.max_health > 0.0, "Max health must be positive");
        anyhow::ensure!(self.agent.max_speed >= 0.0, "Max speed must be non-negative");
        anyhow::ensure!(
            self.agent.speed >= 0.0 && self.agent.speed <= self.agent.max_speed,
            "Speed must be in [0, max_speed]"
        );
        anyhow::ensure!(
            self.agent.starvation_rate >= 0.0,
            "Starvation rate must be non-negative"
        );
        anyhow::ensure!(
            self.agent.collider_radius > 0.0,
            "Agent collider radius must be positive"
        );
        anyhow::ensure!(
            self.agent.perception_regions > 0.0,
            "Perception range must be positive"
        );
        anyhow::ensure!(self.agent.pickup_range >= 0.0, "Pickup range must be non-negative");
        anyhow::ensure!(
            self.agent.target_threshold > 0.0,
            "Target threshold must be positive"
        );
        anyhow::ensure!(
            self.agent.target_threshold <= self.agent.pickup_range,
            "Target threshold must not exceed pickup range"
        );

        // Perception & steering
        anyhow::ensure!(self.perception.precision > 0, "Perception precision must be positive");
        anyhow::ensure!(
            self.perception.falloff_steepness > 0.0,
            "Falloff steepness must be positive"
        );
        anyhow::ensure!(
            self.steering.memory >= 0.0 && self.steering.memory < 1.0,
            "Steering memory must be in [0.0, 1.0)"
        );
        anyhow::ensure!(
            self.steering.wander_cone >= 0.0 && self.steering.wander_cone <= std::f64::consts::PI,
            "Wander cone must be in [0, π]"
        );
        anyhow::ensure!(
            self.steering.feeler_radius > 0.0,
            "Feeler radius must be positive"
        );

        // Pheromones & colony
        anyhow::ensure!(self.pheromone.lifespan > 0, "Pheromone lifespan must be positive");
        anyhow::ensure!(
            !self.colony.resource_key.is_empty(),
            "Colony resource key must not be empty"
        );
        anyhow::ensure!(self.colony.nest_radius > 0.0, "Nest radius must be positive");
        anyhow::ensure!(
            self.colony.spawn_radius >= 0.0,
            "Spawn radius must be non-negative"
        );

        Ok(())
    }

    /// Parses and validates a TOML document.
    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let config = toml::from_str::<Self>(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a config file, falling back to defaults when it does not exist.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        use anyhow::Context;
        let path = path.as_ref();
        if !path.exists() {
            tracing::info!(path = %path.display(), "Config file not found, using defaults");
            let config = Self::default();
            config.validate()?;
            return Ok(config);
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Self::from_toml(&content).with_context(|| format!("parsing {}", path.display()))
    }

    /// Side length of one partition region (the larger of the two axes).
    #[must_use]
    pub fn region_size(&self) -> f64 {
        (self.world.width / self.world.subdivisions as f64)
            .max(self.world.height / self.world.subdivisions as f64)
    }

    #[must_use]
    pub fn perception_radius(&self) -> f64 {
        self.agent.perception_regions * self.region_size()
    }

    /// Stable hash of the parameters that influence simulation behavior.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(format!("{:?}", self.world).as_bytes());
        hasher.update(format!("{:?}", self.agent).as_bytes());
        hasher.update(format!("{:?}", self.perception).as_bytes());
        hasher.update(format!("{:?}", self.steering).as_bytes());
        hasher.update(format!("{:?}", self.pheromone).as_bytes());
        hasher.update(format!("{:?}", self.colony).as_bytes());
        hex::encode(hasher.finalize())
    }
}
