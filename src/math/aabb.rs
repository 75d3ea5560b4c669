use super::vector::PhysVector2;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PhysAABB {
    pub min: PhysVector2,
    pub max: PhysVector2,
}

impl PhysAABB {
    pub fn new(min: PhysVector2, max: PhysVector2) -> Self {
        Self { min, max }
    }

    /// Smallest box containing every point. Returns a degenerate box at the origin for an empty slice.
    pub fn from_points(points: &[PhysVector2]) -> Self {
        let Some((first, rest)) = points.split_first() else {
            return Self::default();
        };

        let (mut min, mut max) = (*first, *first);
        for point in rest {
            min.x = min.x.min(point.x);
            min.y = min.y.min(point.y);
            max.x = max.x.max(point.x);
            max.y = max.y.max(point.y);
        }

        Self { min, max }
    }

    pub fn from_circle(center: PhysVector2, radius: f32) -> Self {
        let extent = PhysVector2::new(radius, radius);
        Self { min: center - extent, max: center + extent }
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    /// Strict overlap test; boxes that only share an edge do not intersect.
    pub fn intersects(&self, other: &Self) -> bool {
        !(self.max.x <= other.min.x
            || other.max.x <= self.min.x
            || self.max.y <= other.min.y
            || other.max.y <= self.min.y)
    }
}
