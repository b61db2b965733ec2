//! Directional scent perception.
//!
//! A [`PerceptionMap`] is a histogram over `precision` equally spaced
//! bearings in the observer's local frame (bearing 0 is straight ahead).
//! It is rebuilt from nearby scent markers every time an agent steers.

use crate::entity::{BodyKind, Scent};
use crate::error::Result;
use crate::world::{ColliderHit, World};
use formica_data::{polygon_vertices, Transform, Vec2};
use std::f64::consts::{FRAC_PI_4, PI, TAU};

/// Bearings, relative to the heading, checked for obstacles.
const FEELER_BEARINGS: [f64; 3] = [-FRAC_PI_4, 0.0, FRAC_PI_4];

#[derive(Debug, Clone, PartialEq)]
pub struct PerceptionMap {
    directions: Vec<Vec2>,
    weights: Vec<f64>,
    step: f64,
}

impl PerceptionMap {
    /// An all-zero map with `precision` bins.
    ///
    /// # Errors
    /// Degenerate geometry when `precision` is zero.
    pub fn new(precision: usize) -> Result<Self> {
        let directions = polygon_vertices(Vec2::ZERO, 1.0, precision, 0.0)?;
        Ok(Self {
            weights: vec![0.0; directions.len()],
            step: TAU / directions.len() as f64,
            directions,
        })
    }

    #[must_use]
    pub fn precision(&self) -> usize {
        self.directions.len()
    }

    /// Unit direction of bin `bin` in the local frame.
    #[must_use]
    pub fn direction(&self, bin: usize) -> Vec2 {
        self.directions[bin % self.directions.len()]
    }

    #[must_use]
    pub fn weight(&self, bin: usize) -> f64 {
        self.weights[bin % self.weights.len()]
    }

    pub fn bins(&self) -> impl Iterator<Item = (Vec2, f64)> + '_ {
        self.directions.iter().copied().zip(self.weights.iter().copied())
    }

    #[must_use]
    pub fn total_weight(&self) -> f64 {
        self.weights.iter().sum()
    }

    /// Bin whose centre is nearest to `bearing` (radians, any range).
    #[must_use]
    pub fn bin_for_bearing(&self, bearing: f64) -> usize {
        if !bearing.is_finite() {
            return 0;
        }
        let turns = bearing.rem_euclid(TAU) / self.step;
        (turns.round() as usize) % self.precision()
    }

    /// Adds `weight` to the bin covering `bearing`. Non-positive weights are ignored.
    pub fn accumulate(&mut self, bearing: f64, weight: f64) {
        if weight > 0.0 && weight.is_finite() {
            let bin = self.bin_for_bearing(bearing);
            self.weights[bin] += weight;
        }
    }

    /// Adds `weight` directly to `bin`.
    pub fn boost(&mut self, bin: usize, weight: f64) {
        let n = self.weights.len();
        self.weights[bin % n] += weight;
    }

    /// Weighted mean of the bin directions, normalized.
    ///
    /// Zero when the map is empty or the weights cancel out.
    #[must_use]
    pub fn mean_direction(&self) -> Vec2 {
        self.bins()
            .fold(Vec2::ZERO, |acc, (dir, w)| acc + dir * w)
            .normalized()
    }
}

/// Wraps an angle into `[-π, π)`.
#[must_use]
pub fn wrap_angle(angle: f64) -> f64 {
    (angle + PI).rem_euclid(TAU) - PI
}

/// Logistic weight for a marker at `distance`, centred at half the radius.
///
/// Close markers weigh nearly 1, markers at the edge of perception nearly 0.
#[must_use]
pub fn distance_falloff(distance: f64, radius: f64, steepness: f64) -> f64 {
    if radius <= 0.0 {
        return 0.0;
    }
    let k = steepness / radius;
    1.0 / (1.0 + (k * (distance - radius / 2.0)).exp())
}

/// 1 for a marker dead ahead, decaying linearly to 0 directly behind.
#[must_use]
pub fn alignment(bearing: f64) -> f64 {
    (1.0 - wrap_angle(bearing).abs() / PI).max(0.0)
}

/// Builds the perception map of `scent` markers around `observer`.
///
/// With `avoid_obstacles` set, three short circle casts look ahead of the
/// observer and every blocked bearing adds a large weight to the opposite bin.
pub fn sense(
    world: &World,
    observer: &Transform,
    scent: Scent,
    radius: f64,
    avoid_obstacles: bool,
) -> Result<PerceptionMap> {
    let config = world.config();
    let mut map = PerceptionMap::new(config.perception.precision)?;
    let origin = observer.position;
    let steepness = config.perception.falloff_steepness;

    let markers = world.query_radius_where(origin, radius, |e| {
        e.as_pheromone().is_some_and(|p| p.kind == scent)
    });
    for id in markers {
        let Some(marker) = world.get(id) else {
            continue;
        };
        let offset = marker.transform.position - origin;
        let distance = offset.length();
        if distance <= f64::EPSILON {
            continue;
        }
        let bearing = wrap_angle(offset.angle() - observer.rotation());
        map.accumulate(bearing, distance_falloff(distance, radius, steepness) * alignment(bearing));
    }

    if avoid_obstacles {
        feel_obstacles(world, observer, &mut map)?;
    }
    Ok(map)
}

fn feel_obstacles(world: &World, observer: &Transform, map: &mut PerceptionMap) -> Result<()> {
    let steering = &world.config().steering;
    for bearing in FEELER_BEARINGS {
        let ahead = observer.forward().rotated(bearing) * steering.feeler_distance;
        let feeler = observer.position + ahead;
        let blocked = world
            .circle_cast(feeler, steering.feeler_radius)?
            .into_iter()
            .any(|hit| match hit {
                ColliderHit::Boundary => true,
                ColliderHit::Entity(id) => {
                    world.get(id).is_some_and(|e| e.kind() == BodyKind::Static)
                }
            });
        if blocked {
            map.boost(map.bin_for_bearing(bearing + PI), steering.avoidance_weight);
        }
    }
    Ok(())
}
