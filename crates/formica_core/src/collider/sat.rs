//! Separating Axis Theorem tests for convex shapes.

use super::{Circle, Rect};
use formica_data::Vec2;

#[inline]
fn project(points: &[Vec2], axis: Vec2) -> (f64, f64) {
    points.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
        let d = p.dot(axis);
        (lo.min(d), hi.max(d))
    })
}

/// Equal bounds count as separated.
#[inline]
fn disjoint((a_lo, a_hi): (f64, f64), (b_lo, b_hi): (f64, f64)) -> bool {
    a_hi <= b_lo || b_hi <= a_lo
}

pub(super) fn circle_circle(a: &Circle, b: &Circle) -> bool {
    a.center.distance(b.center) < a.radius + b.radius
}

pub(super) fn rect_rect(a: &Rect, b: &Rect) -> bool {
    let [a0, a1] = a.axes();
    let [b0, b1] = b.axes();
    [a0, a1, b0, b1]
        .into_iter()
        .all(|axis| !disjoint(project(&a.vertices, axis), project(&b.vertices, axis)))
}

pub(super) fn circle_rect(c: &Circle, r: &Rect) -> bool {
    let closest = r
        .vertices
        .iter()
        .copied()
        .min_by(|p, q| {
            p.distance(c.center)
                .partial_cmp(&q.distance(c.center))
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .unwrap_or(c.center);
    let [r0, r1] = r.axes();
    let to_vertex = (closest - c.center).normalized();

    let mut axes = vec![r0, r1];
    // Center exactly on a corner yields no third axis; the rectangle axes decide
    if to_vertex != Vec2::ZERO {
        axes.push(to_vertex);
    }

    axes.into_iter().all(|axis| {
        let center = c.center.dot(axis);
        let circle = (center - c.radius, center + c.radius);
        !disjoint(project(&r.vertices, axis), circle)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use formica_data::Transform;

    #[test]
    fn test_project_square_on_diagonal() {
        let r = Rect::axis_aligned(Vec2::new(0.0, 0.0), Vec2::new(1.0, 1.0));
        let axis = Vec2::new(1.0, 1.0).normalized();
        let (lo, hi) = project(&r.vertices, axis);
        assert!(lo.abs() < 1e-12);
        assert!((hi - 2f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_touching_rectangles_do_not_collide() {
        let a = Rect::axis_aligned(Vec2::new(0.0, 0.0), Vec2::new(1.0, 1.0));
        let b = Rect::axis_aligned(Vec2::new(1.0, 0.0), Vec2::new(2.0, 1.0));
        assert!(!rect_rect(&a, &b));
        assert!(!rect_rect(&b, &a));
    }

    #[test]
    fn test_circle_centered_on_corner() {
        let r = Rect::from_transform(&Transform::default()).unwrap();
        let c = Circle::new(Vec2::new(1.0, 1.0), 0.1).unwrap();
        assert!(circle_rect(&c, &r));
    }
}
