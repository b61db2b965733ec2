//! 2D vector math used by every geometric part of the simulation.

use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};
use thiserror::Error;

/// Errors raised by geometry helpers when asked for a shape that cannot exist.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("degenerate polygon: {sides} sides produce no vertices")]
    EmptyPolygon { sides: usize },
    #[error("degenerate {shape}: extents {x} x {y}")]
    DegenerateExtent { shape: &'static str, x: f64, y: f64 },
    #[error("occupancy grid needs at least one cell per axis")]
    EmptyGrid,
}

/// A position or direction in world space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };
    pub const ONE: Self = Self { x: 1.0, y: 1.0 };
    pub const X: Self = Self { x: 1.0, y: 0.0 };
    pub const Y: Self = Self { x: 0.0, y: 1.0 };

    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub const fn splat(v: f64) -> Self {
        Self { x: v, y: v }
    }

    /// Unit vector pointing at `angle` radians from the +x axis.
    #[must_use]
    pub fn from_angle(angle: f64) -> Self {
        Self::new(angle.cos(), angle.sin())
    }

    #[must_use]
    pub fn dot(self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y
    }

    #[must_use]
    pub fn length_squared(self) -> f64 {
        self.dot(self)
    }

    #[must_use]
    pub fn length(self) -> f64 {
        self.length_squared().sqrt()
    }

    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        (other - self).length()
    }

    /// Returns the unit vector in the same direction. The zero vector stays zero.
    #[must_use]
    pub fn normalized(self) -> Self {
        let len = self.length();
        if len > f64::EPSILON {
            Self::new(self.x / len, self.y / len)
        } else {
            Self::ZERO
        }
    }

    /// Counter-clockwise rotation by `angle` radians.
    #[must_use]
    pub fn rotated(self, angle: f64) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self::new(self.x * cos - self.y * sin, self.x * sin + self.y * cos)
    }

    /// Angle from the +x axis in (-π, π].
    #[must_use]
    pub fn angle(self) -> f64 {
        self.y.atan2(self.x)
    }

    #[must_use]
    pub fn perpendicular(self) -> Self {
        Self::new(-self.y, self.x)
    }

    #[must_use]
    pub fn component_mul(self, other: Self) -> Self {
        Self::new(self.x * other.x, self.y * other.y)
    }

    #[must_use]
    pub fn max_element(self) -> f64 {
        self.x.max(self.y)
    }

    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Vec2 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl SubAssign for Vec2 {
    fn sub_assign(&mut self, rhs: Self) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl Mul<f64> for Vec2 {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Vec2 {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

impl From<(f64, f64)> for Vec2 {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

/// Unit vector pointing from `from` towards `to`.
#[must_use]
pub fn direction(from: Vec2, to: Vec2) -> Vec2 {
    (to - from).normalized()
}

#[must_use]
pub fn distance(a: Vec2, b: Vec2) -> f64 {
    a.distance(b)
}

/// Vertices of a regular polygon inscribed in a circle of `radius`.
///
/// The first vertex sits at `rotation` radians, the rest follow
/// counter-clockwise at equal angular spacing.
pub fn polygon_vertices(
    center: Vec2,
    radius: f64,
    sides: usize,
    rotation: f64,
) -> Result<Vec<Vec2>, GeometryError> {
    if sides == 0 {
        return Err(GeometryError::EmptyPolygon { sides });
    }
    let step = TAU / sides as f64;
    Ok((0..sides)
        .map(|i| center + Vec2::from_angle(rotation + step * i as f64) * radius)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_normalized_zero_stays_zero() {
        assert_eq!(Vec2::ZERO.normalized(), Vec2::ZERO);
        let n = Vec2::new(3.0, 4.0).normalized();
        assert!((n.length() - 1.0).abs() < EPS);
    }

    #[test]
    fn test_rotated_quarter_turn() {
        let r = Vec2::X.rotated(std::f64::consts::FRAC_PI_2);
        assert!(r.x.abs() < EPS);
        assert!((r.y - 1.0).abs() < EPS);
    }

    #[test]
    fn test_direction_and_distance() {
        let a = Vec2::new(1.0, 1.0);
        let b = Vec2::new(4.0, 5.0);
        assert!((distance(a, b) - 5.0).abs() < EPS);
        let d = direction(a, b);
        assert!((d.x - 0.6).abs() < EPS);
        assert!((d.y - 0.8).abs() < EPS);
    }

    #[test]
    fn test_polygon_vertices_square() {
        let verts = polygon_vertices(Vec2::ZERO, 1.0, 4, 0.0).unwrap();
        assert_eq!(verts.len(), 4);
        assert!((verts[1].y - 1.0).abs() < EPS);
        assert!((verts[2].x + 1.0).abs() < EPS);
    }

    #[test]
    fn test_polygon_vertices_degenerate() {
        assert_eq!(
            polygon_vertices(Vec2::ZERO, 1.0, 0, 0.0),
            Err(GeometryError::EmptyPolygon { sides: 0 })
        );
    }
}
