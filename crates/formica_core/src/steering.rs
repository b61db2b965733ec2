//! Steering policies turning a perception map into a movement direction.

use crate::config::SteeringConfig;
use crate::perception::PerceptionMap;
use formica_data::Vec2;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use std::fmt;

/// Strategy choosing where an agent moves next.
///
/// Directions are in the agent's local frame: `Vec2::X` is straight ahead.
/// A zero vector means "stay put".
pub trait SteeringPolicy: fmt::Debug {
    fn steer(&mut self, map: &PerceptionMap, rng: &mut ChaCha8Rng) -> Vec2;

    /// Whether the map should include obstacle feelers before steering.
    fn avoids_obstacles(&self) -> bool {
        false
    }
}

/// Heads along the map's weighted mean direction.
#[derive(Debug, Clone, Copy, Default)]
pub struct StraightLine;

impl SteeringPolicy for StraightLine {
    fn steer(&mut self, map: &PerceptionMap, _rng: &mut ChaCha8Rng) -> Vec2 {
        map.mean_direction()
    }
}

/// Random exploration biased by scent, smoothed over time.
///
/// Each step picks a random deflection within `cone` of straight ahead,
/// blends it with the map's mean direction, then mixes the result with the
/// previous output: `out = memory · previous + (1 − memory) · blended`.
#[derive(Debug, Clone)]
pub struct Wander {
    pub cone: f64,
    pub memory: f64,
    pub map_weight: f64,
    pub random_weight: f64,
    previous: Vec2,
}

impl Wander {
    #[must_use]
    pub fn new(cone: f64, memory: f64, map_weight: f64, random_weight: f64) -> Self {
        Self {
            cone: cone.abs(),
            memory: memory.clamp(0.0, 1.0),
            map_weight,
            random_weight,
            previous: Vec2::X,
        }
    }

    #[must_use]
    pub fn from_config(config: &SteeringConfig) -> Self {
        Self::new(
            config.wander_cone,
            config.memory,
            config.map_weight,
            config.random_weight,
        )
    }

    /// Last direction returned by [`SteeringPolicy::steer`].
    #[must_use]
    pub fn previous(&self) -> Vec2 {
        self.previous
    }
}

impl SteeringPolicy for Wander {
    fn steer(&mut self, map: &PerceptionMap, rng: &mut ChaCha8Rng) -> Vec2 {
        let deflection = if self.cone > 0.0 {
            rng.gen_range(-self.cone..=self.cone)
        } else {
            0.0
        };
        let blended = Vec2::from_angle(deflection) * self.random_weight
            + map.mean_direction() * self.map_weight;
        let smoothed = self.previous * self.memory + blended.normalized() * (1.0 - self.memory);

        let out = if smoothed.length_squared() > f64::EPSILON {
            smoothed.normalized()
        } else {
            Vec2::from_angle(deflection)
        };
        self.previous = out;
        out
    }

    fn avoids_obstacles(&self) -> bool {
        true
    }
}
