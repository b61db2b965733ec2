use super::{sat, Aabb, Rect, ResolvedShape};
use crate::error::Result;
use formica_data::{GeometryError, Vec2};
use serde::{Deserialize, Serialize};

/// Square occupancy matrix covering a `width` x `height` area anchored at the origin.
///
/// Cell `(x, y)` spans `[x * cell_w, (x + 1) * cell_w) × [y * cell_h, (y + 1) * cell_h)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OccupancyGrid {
    resolution: usize,
    width: f64,
    height: f64,
    cells: Vec<bool>,
}

impl OccupancyGrid {
    /// Creates an all-free grid with `resolution` cells per axis.
    pub fn new(resolution: usize, width: f64, height: f64) -> Result<Self> {
        if resolution == 0 {
            return Err(GeometryError::EmptyGrid.into());
        }
        if !(width > 0.0 && height > 0.0) || !width.is_finite() || !height.is_finite() {
            return Err(GeometryError::DegenerateExtent {
                shape: "grid",
                x: width,
                y: height,
            }
            .into());
        }
        Ok(Self {
            resolution,
            width,
            height,
            cells: vec![false; resolution * resolution],
        })
    }

    #[must_use]
    pub fn resolution(&self) -> usize {
        self.resolution
    }

    #[must_use]
    pub fn cell_size(&self) -> Vec2 {
        Vec2::new(
            self.width / self.resolution as f64,
            self.height / self.resolution as f64,
        )
    }

    #[must_use]
    pub fn bounds(&self) -> Aabb {
        Aabb {
            min: Vec2::ZERO,
            max: Vec2::new(self.width, self.height),
        }
    }

    #[inline]
    fn index(&self, x: usize, y: usize) -> usize {
        y * self.resolution + x
    }

    #[must_use]
    pub fn is_occupied(&self, x: usize, y: usize) -> bool {
        x < self.resolution && y < self.resolution && self.cells[self.index(x, y)]
    }

    /// Returns `false` when the cell lies outside the grid.
    pub fn set(&mut self, x: usize, y: usize, occupied: bool) -> bool {
        if x >= self.resolution || y >= self.resolution {
            return false;
        }
        let idx = self.index(x, y);
        self.cells[idx] = occupied;
        true
    }

    /// Grid cell containing `position`, or `None` outside the covered area.
    #[must_use]
    pub fn cell_of(&self, position: Vec2) -> Option<(usize, usize)> {
        if !self.contains(position) {
            return None;
        }
        let size = self.cell_size();
        let x = ((position.x / size.x).floor() as usize).min(self.resolution - 1);
        let y = ((position.y / size.y).floor() as usize).min(self.resolution - 1);
        Some((x, y))
    }

    #[must_use]
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= 0.0 && p.y >= 0.0 && p.x <= self.width && p.y <= self.height
    }

    #[must_use]
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    fn cell_rect(&self, x: usize, y: usize) -> Rect {
        let size = self.cell_size();
        let min = Vec2::new(x as f64 * size.x, y as f64 * size.y);
        Rect::axis_aligned(min, min + size)
    }

    /// Shape-versus-grid test.
    ///
    /// Anything reaching outside the covered area collides. Otherwise every
    /// occupied cell under the shape's bounding box is tested against the shape.
    pub(super) fn collides_with(&self, shape: &ResolvedShape<'_>) -> bool {
        let bbox = shape.bounding_box();
        if !(self.contains(bbox.min) && self.contains(bbox.max)) {
            return true;
        }
        let (Some((x0, y0)), Some((x1, y1))) = (self.cell_of(bbox.min), self.cell_of(bbox.max))
        else {
            return true;
        };

        for y in y0..=y1 {
            for x in x0..=x1 {
                if !self.is_occupied(x, y) {
                    continue;
                }
                let cell = self.cell_rect(x, y);
                let hit = match shape {
                    ResolvedShape::Circle(c) => sat::circle_rect(c, &cell),
                    ResolvedShape::Rectangle(r) => sat::rect_rect(r, &cell),
                    ResolvedShape::Grid(other) => other.overlaps_grid(self),
                };
                if hit {
                    return true;
                }
            }
        }
        false
    }

    /// Cell-by-cell comparison up to the smaller of the two resolutions.
    pub(super) fn overlaps_grid(&self, other: &OccupancyGrid) -> bool {
        let n = self.resolution.min(other.resolution);
        (0..n).any(|y| (0..n).any(|x| self.is_occupied(x, y) && other.is_occupied(x, y)))
    }
}
