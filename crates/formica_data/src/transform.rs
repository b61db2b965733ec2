use crate::math::Vec2;
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

/// Folds an angle into the open interval (-2π, 2π), keeping its sign.
///
/// `8π` becomes `0`, `-3π` becomes `-π`.
#[must_use]
pub fn normalize_rotation(rotation: f64) -> f64 {
    if rotation.is_finite() {
        rotation % TAU
    } else {
        0.0
    }
}

/// Position, rotation and scale of an entity or of a collider relative to one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec2,
    rotation: f64,
    pub scale: Vec2,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            rotation: 0.0,
            scale: Vec2::ONE,
        }
    }
}

impl Transform {
    #[must_use]
    pub fn new(position: Vec2, rotation: f64, scale: Vec2) -> Self {
        Self {
            position,
            rotation: normalize_rotation(rotation),
            scale,
        }
    }

    #[must_use]
    pub fn at(position: Vec2) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_scale(mut self, scale: Vec2) -> Self {
        self.scale = scale;
        self
    }

    #[must_use]
    pub fn with_rotation(mut self, rotation: f64) -> Self {
        self.set_rotation(rotation);
        self
    }

    #[must_use]
    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    pub fn set_rotation(&mut self, rotation: f64) {
        self.rotation = normalize_rotation(rotation);
    }

    /// Unit vector along the current heading.
    #[must_use]
    pub fn forward(&self) -> Vec2 {
        Vec2::from_angle(self.rotation)
    }

    /// Converts a direction expressed relative to the heading into world space.
    #[must_use]
    pub fn local_to_world_direction(&self, local: Vec2) -> Vec2 {
        local.rotated(self.rotation)
    }

    /// Places `self`, interpreted as an offset from `parent`, into world space.
    #[must_use]
    pub fn compose(&self, parent: &Transform) -> Transform {
        Transform::new(
            parent.position + self.position.rotated(parent.rotation),
            parent.rotation + self.rotation,
            parent.scale.component_mul(self.scale),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_normalize_rotation_examples() {
        assert!(normalize_rotation(8.0 * PI).abs() < 1e-12);
        assert!((normalize_rotation(-3.0 * PI) + PI).abs() < 1e-12);
        assert!((normalize_rotation(PI) - PI).abs() < 1e-12);
        assert_eq!(normalize_rotation(f64::NAN), 0.0);
    }

    #[test]
    fn test_set_rotation_normalizes() {
        let mut t = Transform::default();
        t.set_rotation(5.0 * PI);
        assert!((t.rotation() - PI).abs() < 1e-12);
        t.set_rotation(-3.0 * PI);
        assert!((t.rotation() + PI).abs() < 1e-9);
    }

    #[test]
    fn test_compose_offsets_by_parent_rotation() {
        let parent = Transform::new(Vec2::new(10.0, 10.0), PI / 2.0, Vec2::splat(2.0));
        let local = Transform::at(Vec2::new(1.0, 0.0));
        let world = local.compose(&parent);
        assert!((world.position.x - 10.0).abs() < 1e-9);
        assert!((world.position.y - 11.0).abs() < 1e-9);
        assert_eq!(world.scale, Vec2::splat(2.0));
    }

    #[test]
    fn test_transform_serde_round_trip() {
        let t = Transform::new(Vec2::new(1.5, -2.0), 1.0, Vec2::new(2.0, 3.0));
        let json = serde_json::to_string(&t).unwrap();
        let back: Transform = serde_json::from_str(&json).unwrap();
        assert_eq!(t, back);
    }
}
