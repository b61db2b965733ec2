//! Collision geometry: circles, rectangles and occupancy grids.
//!
//! A [`Collider`] is stored relative to its owner's transform. Before any test
//! it is resolved into world space ([`ResolvedShape`]), and every pair of
//! resolved shapes is routed through [`collides`], one algorithm per pair of
//! [`ShapeKind`]s.
//!
//! # Conventions
//! - Touching shapes do not collide: every separation test treats equal
//!   interval bounds as separated, so circles collide iff
//!   `distance < r1 + r2`.
//! - A shape reaching outside an occupancy grid's area always collides with
//!   that grid.

mod grid;
mod sat;

pub use grid::OccupancyGrid;

use crate::error::Result;
use formica_data::{GeometryError, Transform, Vec2};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeKind {
    Circle,
    Rectangle,
    Grid,
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Circle => "circle",
            Self::Rectangle => "rectangle",
            Self::Grid => "grid",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    /// Radius is the larger scale component after composition with the parent.
    Circle,
    /// Half extents are the scale components after composition with the parent.
    Rectangle,
    /// World-anchored grid; ignores the parent transform.
    Grid(OccupancyGrid),
}

impl Shape {
    #[must_use]
    pub fn kind(&self) -> ShapeKind {
        match self {
            Self::Circle => ShapeKind::Circle,
            Self::Rectangle => ShapeKind::Rectangle,
            Self::Grid(_) => ShapeKind::Grid,
        }
    }
}

/// Collision shape attached to an entity (or to the world boundary).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collider {
    pub local: Transform,
    pub shape: Shape,
}

impl Collider {
    #[must_use]
    pub fn circle(radius: f64) -> Self {
        Self {
            local: Transform::default().with_scale(Vec2::splat(radius)),
            shape: Shape::Circle,
        }
    }

    #[must_use]
    pub fn rectangle(half_extents: Vec2) -> Self {
        Self {
            local: Transform::default().with_scale(half_extents),
            shape: Shape::Rectangle,
        }
    }

    #[must_use]
    pub fn grid(grid: OccupancyGrid) -> Self {
        Self {
            local: Transform::default(),
            shape: Shape::Grid(grid),
        }
    }

    #[must_use]
    pub fn with_offset(mut self, offset: Vec2) -> Self {
        self.local.position = offset;
        self
    }

    #[must_use]
    pub fn kind(&self) -> ShapeKind {
        self.shape.kind()
    }

    /// Places the collider in world space relative to its owner.
    pub fn resolve(&self, parent: &Transform) -> Result<ResolvedShape<'_>> {
        let world = self.local.compose(parent);
        match &self.shape {
            Shape::Circle => {
                Circle::new(world.position, world.scale.max_element()).map(ResolvedShape::Circle)
            }
            Shape::Rectangle => Rect::from_transform(&world).map(ResolvedShape::Rectangle),
            Shape::Grid(grid) => Ok(ResolvedShape::Grid(grid)),
        }
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    #[must_use]
    pub fn from_points(points: &[Vec2]) -> Self {
        let mut min = Vec2::splat(f64::INFINITY);
        let mut max = Vec2::splat(f64::NEG_INFINITY);
        for p in points {
            min = Vec2::new(min.x.min(p.x), min.y.min(p.y));
            max = Vec2::new(max.x.max(p.x), max.y.max(p.y));
        }
        Self { min, max }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub center: Vec2,
    pub radius: f64,
}

impl Circle {
    /// A zero radius is allowed and behaves as a point query.
    pub fn new(center: Vec2, radius: f64) -> Result<Self> {
        if !radius.is_finite() || radius < 0.0 || !center.is_finite() {
            return Err(GeometryError::DegenerateExtent {
                shape: "circle",
                x: radius,
                y: radius,
            }
            .into());
        }
        Ok(Self { center, radius })
    }

    #[must_use]
    pub fn bounding_box(&self) -> Aabb {
        Aabb {
            min: self.center - Vec2::splat(self.radius),
            max: self.center + Vec2::splat(self.radius),
        }
    }
}

/// Oriented rectangle given by its four corners in counter-clockwise order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub vertices: [Vec2; 4],
}

impl Rect {
    pub fn from_transform(world: &Transform) -> Result<Self> {
        let half = world.scale;
        if !(half.x > 0.0 && half.y > 0.0) || !half.is_finite() || !world.position.is_finite() {
            return Err(GeometryError::DegenerateExtent {
                shape: "rectangle",
                x: half.x,
                y: half.y,
            }
            .into());
        }
        let corners = [
            Vec2::new(-half.x, -half.y),
            Vec2::new(half.x, -half.y),
            Vec2::new(half.x, half.y),
            Vec2::new(-half.x, half.y),
        ];
        Ok(Self {
            vertices: corners.map(|c| world.position + c.rotated(world.rotation())),
        })
    }

    /// Axis-aligned rectangle spanning `min..max`; used for grid cells.
    #[must_use]
    pub fn axis_aligned(min: Vec2, max: Vec2) -> Self {
        Self {
            vertices: [min, Vec2::new(max.x, min.y), max, Vec2::new(min.x, max.y)],
        }
    }

    /// The two edge normals; the other two edges are parallel to these.
    #[must_use]
    pub fn axes(&self) -> [Vec2; 2] {
        let [a, b, _, d] = self.vertices;
        [(b - a).perpendicular().normalized(), (d - a).perpendicular().normalized()]
    }

    #[must_use]
    pub fn bounding_box(&self) -> Aabb {
        Aabb::from_points(&self.vertices)
    }
}

/// A collider placed in world space, ready for testing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResolvedShape<'a> {
    Circle(Circle),
    Rectangle(Rect),
    Grid(&'a OccupancyGrid),
}

impl ResolvedShape<'_> {
    #[must_use]
    pub fn kind(&self) -> ShapeKind {
        match self {
            Self::Circle(_) => ShapeKind::Circle,
            Self::Rectangle(_) => ShapeKind::Rectangle,
            Self::Grid(_) => ShapeKind::Grid,
        }
    }

    #[must_use]
    pub fn bounding_box(&self) -> Aabb {
        match self {
            Self::Circle(c) => c.bounding_box(),
            Self::Rectangle(r) => r.bounding_box(),
            Self::Grid(g) => g.bounds(),
        }
    }
}

/// Tests two world-space shapes for overlap.
///
/// Every `(ShapeKind, ShapeKind)` pair maps to exactly one algorithm; mixed
/// pairs reuse the same routine with the arguments swapped, which keeps the
/// test symmetric.
pub fn collides(a: &ResolvedShape<'_>, b: &ResolvedShape<'_>) -> bool {
    use ResolvedShape as S;
    match (a, b) {
        (S::Circle(a), S::Circle(b)) => sat::circle_circle(a, b),
        (S::Rectangle(a), S::Rectangle(b)) => sat::rect_rect(a, b),
        (S::Circle(c), S::Rectangle(r)) | (S::Rectangle(r), S::Circle(c)) => sat::circle_rect(c, r),
        (S::Grid(g), S::Circle(c)) | (S::Circle(c), S::Grid(g)) => g.collides_with(&S::Circle(*c)),
        (S::Grid(g), S::Rectangle(r)) | (S::Rectangle(r), S::Grid(g)) => {
            g.collides_with(&S::Rectangle(*r))
        }
        (S::Grid(a), S::Grid(b)) => a.overlaps_grid(b),
    }
}

/// Resolves both colliders against their parents and tests them.
pub fn colliders_collide(
    a: &Collider,
    a_parent: &Transform,
    b: &Collider,
    b_parent: &Transform,
) -> Result<bool> {
    let ra = a.resolve(a_parent)?;
    let rb = b.resolve(b_parent)?;
    Ok(collides(&ra, &rb))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_4;

    fn circle(x: f64, y: f64, r: f64) -> ResolvedShape<'static> {
        ResolvedShape::Circle(Circle::new(Vec2::new(x, y), r).unwrap())
    }

    fn rect(x: f64, y: f64, hx: f64, hy: f64, rot: f64) -> ResolvedShape<'static> {
        let t = Transform::new(Vec2::new(x, y), rot, Vec2::new(hx, hy));
        ResolvedShape::Rectangle(Rect::from_transform(&t).unwrap())
    }

    #[test]
    fn test_circle_circle_strict() {
        assert!(collides(&circle(0.0, 0.0, 1.0), &circle(1.5, 0.0, 1.0)));
        assert!(!collides(&circle(0.0, 0.0, 1.0), &circle(2.0, 0.0, 1.0)));
        assert!(!collides(&circle(0.0, 0.0, 1.0), &circle(3.0, 0.0, 1.0)));
    }

    #[test]
    fn test_rect_rect_overlap_and_separation() {
        assert!(collides(&rect(0.0, 0.0, 1.0, 1.0, 0.0), &rect(1.5, 0.0, 1.0, 1.0, 0.0)));
        assert!(!collides(&rect(0.0, 0.0, 1.0, 1.0, 0.0), &rect(3.0, 0.0, 1.0, 1.0, 0.0)));
    }

    #[test]
    fn test_rect_rect_rotated_diamond() {
        // A 45° square reaches sqrt(2) along x; its corner slips past an axis-aligned edge
        let diamond = rect(0.0, 0.0, 1.0, 1.0, FRAC_PI_4);
        assert!(collides(&diamond, &rect(2.3, 0.0, 1.0, 1.0, 0.0)));
        assert!(!collides(&diamond, &rect(2.5, 0.0, 1.0, 1.0, 0.0)));
        // Corner-to-corner gap that only the rotated axis can separate
        assert!(!collides(&diamond, &rect(2.2, 2.2, 1.0, 1.0, 0.0)));
    }

    #[test]
    fn test_circle_rect() {
        let r = rect(0.0, 0.0, 1.0, 1.0, 0.0);
        assert!(collides(&circle(1.5, 0.0, 0.6), &r));
        assert!(collides(&r, &circle(1.5, 0.0, 0.6)));
        assert!(!collides(&circle(2.0, 0.0, 0.9), &r));
        // Near a corner: inside the axis-aligned slab but outside the corner radius
        assert!(!collides(&circle(1.8, 1.8, 1.0), &r));
        assert!(collides(&circle(1.5, 1.5, 1.0), &r));
    }

    #[test]
    fn test_collider_resolve_uses_parent() {
        let parent = Transform::at(Vec2::new(5.0, 5.0)).with_scale(Vec2::splat(2.0));
        let c = Collider::circle(1.5).with_offset(Vec2::new(1.0, 0.0));
        match c.resolve(&parent).unwrap() {
            ResolvedShape::Circle(circle) => {
                assert_eq!(circle.center, Vec2::new(6.0, 5.0));
                assert_eq!(circle.radius, 3.0);
            }
            other => panic!("expected circle, got {:?}", other.kind()),
        }
    }

    #[test]
    fn test_degenerate_rectangle_is_error() {
        let r = Collider::rectangle(Vec2::new(0.0, 1.0));
        assert!(r.resolve(&Transform::default()).is_err());
    }

    #[test]
    fn test_shape_kind_display() {
        assert_eq!(ShapeKind::Rectangle.to_string(), "rectangle");
        assert_eq!(Collider::circle(1.0).kind(), ShapeKind::Circle);
    }
}
