//! Read-only spatial queries and boundary editing.

use super::World;
use crate::collider::{collides, Circle, Collider, OccupancyGrid, ResolvedShape};
use crate::entity::Entity;
use crate::error::Result;
use formica_data::{EntityId, Transform, Vec2};

/// One collider intersecting a cast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ColliderHit {
    /// The synthetic circle touches an occupied cell or leaves the world.
    Boundary,
    Entity(EntityId),
}

impl World {
    /// Region coordinates for `position`, clamped onto the partition.
    #[must_use]
    pub fn region_of(&self, position: Vec2) -> (usize, usize) {
        let size = self.region_extent();
        let max = self.subdivisions - 1;
        let axis = |coord: f64, extent: f64| -> usize {
            let cell = (coord / extent).floor();
            if cell.is_nan() || cell <= 0.0 {
                0
            } else {
                (cell as usize).min(max)
            }
        };
        (axis(position.x, size.x), axis(position.y, size.y))
    }

    pub(crate) fn region_index(&self, position: Vec2) -> usize {
        let (x, y) = self.region_of(position);
        y * self.subdivisions + x
    }

    fn region_extent(&self) -> Vec2 {
        let n = self.subdivisions as f64;
        Vec2::new(self.width / n, self.height / n)
    }

    /// Side length used to scale perception ranges.
    #[must_use]
    pub fn region_size(&self) -> f64 {
        self.region_extent().max_element()
    }

    /// Ids filed in region `(x, y)`; empty for coordinates off the grid.
    pub fn entities_in_region(&self, x: usize, y: usize) -> impl Iterator<Item = EntityId> + '_ {
        let bucket = (x < self.subdivisions && y < self.subdivisions)
            .then(|| &self.buckets[y * self.subdivisions + x]);
        bucket.into_iter().flat_map(|b| b.iter())
    }

    /// Registered entities whose position lies within `radius` of `center`.
    ///
    /// Only the regions overlapping the query square are scanned. The entity
    /// currently updating is never returned. Results are in ascending id order.
    #[must_use]
    pub fn query_radius(&self, center: Vec2, radius: f64) -> Vec<EntityId> {
        self.query_radius_where(center, radius, |_| true)
    }

    /// [`World::query_radius`] restricted to entities accepted by `filter`.
    pub fn query_radius_where(
        &self,
        center: Vec2,
        radius: f64,
        filter: impl Fn(&Entity) -> bool,
    ) -> Vec<EntityId> {
        if radius.is_nan() || radius < 0.0 || !center.is_finite() {
            return Vec::new();
        }
        let (x0, y0) = self.region_of(center - Vec2::splat(radius));
        let (x1, y1) = self.region_of(center + Vec2::splat(radius));
        let r2 = radius * radius;

        let mut found = Vec::new();
        for y in y0..=y1 {
            for x in x0..=x1 {
                for id in self.buckets[y * self.subdivisions + x].iter() {
                    let Some(entity) = self.get(id) else {
                        continue;
                    };
                    let d2 = (entity.transform.position - center).length_squared();
                    if d2 <= r2 && filter(entity) {
                        found.push(id);
                    }
                }
            }
        }
        found.sort_unstable();
        found
    }

    /// Closest entity accepted by `filter` within `radius`, with its distance.
    pub fn nearest_where(
        &self,
        center: Vec2,
        radius: f64,
        filter: impl Fn(&Entity) -> bool,
    ) -> Option<(EntityId, f64)> {
        self.query_radius_where(center, radius, filter)
            .into_iter()
            .filter_map(|id| Some((id, self.get(id)?.transform.position.distance(center))))
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }

    /// Every collider intersecting a circle at `center` with `radius`.
    ///
    /// The world boundary is reported first, followed by entity colliders in
    /// ascending id order. The entity currently updating is skipped.
    pub fn circle_cast(&self, center: Vec2, radius: f64) -> Result<Vec<ColliderHit>> {
        let cast = ResolvedShape::Circle(Circle::new(center, radius)?);
        let mut hits = Vec::new();
        if collides(&cast, &ResolvedShape::Grid(&self.boundary)) {
            hits.push(ColliderHit::Boundary);
        }
        for &id in &self.colliders {
            let Some(entity) = self.get(id) else {
                continue;
            };
            let Some(collider) = &entity.collider else {
                continue;
            };
            if collides(&cast, &collider.resolve(&entity.transform)?) {
                hits.push(ColliderHit::Entity(id));
            }
        }
        Ok(hits)
    }

    /// Tests a collider placed at `parent` against the world boundary only.
    pub fn collides_with_boundary(&self, collider: &Collider, parent: &Transform) -> Result<bool> {
        let shape = collider.resolve(parent)?;
        Ok(collides(&shape, &ResolvedShape::Grid(&self.boundary)))
    }

    #[must_use]
    pub fn boundary(&self) -> &OccupancyGrid {
        &self.boundary
    }

    /// Marks a boundary cell as blocked or free. Returns `false` off the grid.
    pub fn set_obstacle(&mut self, x: usize, y: usize, occupied: bool) -> bool {
        self.boundary.set(x, y, occupied)
    }

    /// Like [`World::set_obstacle`], addressing the cell containing `position`.
    pub fn set_obstacle_at(&mut self, position: Vec2, occupied: bool) -> bool {
        match self.boundary.cell_of(position) {
            Some((x, y)) => self.boundary.set(x, y, occupied),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;

    fn world() -> World {
        let mut config = SimConfig::default();
        config.world.width = 100.0;
        config.world.height = 50.0;
        config.world.subdivisions = 10;
        World::new(config).unwrap()
    }

    #[test]
    fn test_region_of_uses_floor_division_and_clamps() {
        let w = world();
        assert_eq!(w.region_of(Vec2::new(0.0, 0.0)), (0, 0));
        assert_eq!(w.region_of(Vec2::new(19.9, 5.0)), (1, 1));
        assert_eq!(w.region_of(Vec2::new(-3.0, 500.0)), (0, 9));
        assert_eq!(w.region_of(Vec2::new(f64::NAN, 100.0)), (0, 9));
        assert_eq!(w.region_size(), 10.0);
    }

    #[test]
    fn test_entities_in_region_off_grid_is_empty() {
        let w = world();
        assert_eq!(w.entities_in_region(10, 0).count(), 0);
    }

    #[test]
    fn test_query_radius_spans_regions() {
        let mut w = world();
        let near = w.insert(Entity::obstacle("a", Transform::at(Vec2::new(9.0, 2.5))));
        let across = w.insert(Entity::obstacle("b", Transform::at(Vec2::new(11.0, 2.5))));
        let far = w.insert(Entity::obstacle("c", Transform::at(Vec2::new(40.0, 40.0))));
        w.apply_entity_buffers();

        let found = w.query_radius(Vec2::new(10.0, 2.5), 2.0);
        assert_eq!(found, vec![near, across]);
        assert!(!found.contains(&far));
        assert_eq!(
            w.nearest_where(Vec2::new(10.5, 2.5), 5.0, |_| true).map(|(id, _)| id),
            Some(across)
        );
    }

    #[test]
    fn test_circle_cast_reports_boundary_outside_world() {
        let w = world();
        assert_eq!(w.circle_cast(Vec2::new(-1.0, 10.0), 0.5).unwrap(), vec![ColliderHit::Boundary]);
        assert!(w.circle_cast(Vec2::new(50.0, 25.0), 0.5).unwrap().is_empty());
    }

    #[test]
    fn test_circle_cast_hits_obstacle_cells() {
        let mut w = world();
        assert!(w.set_obstacle_at(Vec2::new(55.0, 25.0), true));
        assert_eq!(w.circle_cast(Vec2::new(55.0, 25.0), 0.1).unwrap(), vec![ColliderHit::Boundary]);
        assert!(w.set_obstacle(5, 5, false));
        assert!(w.circle_cast(Vec2::new(55.0, 25.0), 0.1).unwrap().is_empty());
        assert!(!w.set_obstacle(10, 0, true));
    }

    #[test]
    fn test_circle_cast_rejects_negative_radius() {
        let w = world();
        assert!(w.circle_cast(Vec2::new(5.0, 5.0), -1.0).is_err());
    }
}
