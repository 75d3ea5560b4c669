use core::fmt;
use std::f32::consts::PI;

use super::vector::PhysVector2;
use crate::error::{PhysError, Result};

/// Collision geometry of a body, in the body's local space.
///
/// Polygons must be convex; the rotation center of the owning body is the local origin.
/// Only the validating constructors can build one, so the cached area always matches.
#[derive(Clone, Debug, PartialEq)]
pub struct PhysShape {
    geometry: Geometry,
    area: f32,
}

#[derive(Clone, Debug, PartialEq)]
enum Geometry {
    Circle { radius: f32 },
    Polygon { vertices: Vec<PhysVector2> },
}

impl PhysShape {
    pub fn circle(radius: f32) -> Result<Self> {
        if !radius.is_finite() || radius <= 0.0 {
            return Err(PhysError::InvalidShape(format!("circle radius must be positive, got {radius}")));
        }

        Ok(Self { geometry: Geometry::Circle { radius }, area: radius * radius * PI })
    }

    /// Axis-aligned box centered on the local origin.
    pub fn rect(width: f32, height: f32) -> Result<Self> {
        if !(width.is_finite() && height.is_finite()) || width <= 0.0 || height <= 0.0 {
            return Err(PhysError::InvalidShape(format!("box size must be positive, got {width}x{height}")));
        }

        Self::polygon(create_box_vertices(width, height).to_vec())
    }

    pub fn polygon(vertices: Vec<PhysVector2>) -> Result<Self> {
        if vertices.len() < 3 {
            return Err(PhysError::InvalidShape(format!("polygon needs at least 3 vertices, got {}", vertices.len())));
        }
        if vertices.iter().any(|v| !v.is_finite()) {
            return Err(PhysError::InvalidShape("polygon vertices must be finite".to_string()));
        }
        if !is_convex(&vertices) {
            return Err(PhysError::InvalidShape("polygon must be convex".to_string()));
        }

        let area = signed_area(&vertices).abs();
        if area <= 0.0 {
            return Err(PhysError::InvalidShape("polygon has zero area".to_string()));
        }

        Ok(Self { geometry: Geometry::Polygon { vertices }, area })
    }

    /// Read-only view of the geometry for matching.
    pub fn kind(&self) -> ShapeKind<'_> {
        match &self.geometry {
            Geometry::Circle { radius } => ShapeKind::Circle { radius: *radius },
            Geometry::Polygon { vertices } => ShapeKind::Polygon { vertices },
        }
    }

    pub fn area(&self) -> f32 {
        self.area
    }

    pub fn radius(&self) -> Option<f32> {
        match &self.geometry {
            Geometry::Circle { radius } => Some(*radius),
            Geometry::Polygon { .. } => None,
        }
    }

    pub fn vertices(&self) -> Option<&[PhysVector2]> {
        match &self.geometry {
            Geometry::Circle { .. } => None,
            Geometry::Polygon { vertices } => Some(vertices),
        }
    }

    /// Moment of inertia about the local origin for a body of the given mass.
    pub fn inertia(&self, mass: f32) -> f32 {
        match &self.geometry {
            Geometry::Circle { radius } => 0.5 * mass * radius * radius,
            Geometry::Polygon { vertices } => {
                let (mut numerator, mut denominator) = (0.0, 0.0);
                for (i, a) in vertices.iter().enumerate() {
                    let b = vertices[(i + 1) % vertices.len()];
                    let cross = a.cross(b);
                    numerator += cross * (a.dot(*a) + a.dot(b) + b.dot(b));
                    denominator += cross;
                }

                if denominator == 0.0 {
                    return 0.0;
                }
                mass * numerator / (6.0 * denominator)
            }
        }
    }
}

/// Borrowed local-space geometry of a [`PhysShape`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ShapeKind<'a> {
    Circle { radius: f32 },
    Polygon { vertices: &'a [PhysVector2] },
}

/// A shape placed in world space, borrowed from its body for one collision query.
#[derive(Clone, Copy, Debug)]
pub enum WorldShape<'a> {
    Circle { center: PhysVector2, radius: f32 },
    Polygon { center: PhysVector2, vertices: &'a [PhysVector2] },
}

impl WorldShape<'_> {
    pub fn center(&self) -> PhysVector2 {
        match self {
            Self::Circle { center, .. } | Self::Polygon { center, .. } => *center,
        }
    }
}

impl fmt::Display for PhysShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.geometry {
            Geometry::Circle { radius } => write!(f, "Circle[r:{}]", radius),
            Geometry::Polygon { vertices } => write!(f, "Polygon[n:{} a:{}]", vertices.len(), self.area),
        }
    }
}

fn create_box_vertices(width: f32, height: f32) -> [PhysVector2; 4] {
    let left = -width / 2.0;
    let right = left + width;
    let bottom = -height / 2.0;
    let top = bottom + height;

    [
        PhysVector2::new(left, top),
        PhysVector2::new(right, top),
        PhysVector2::new(right, bottom),
        PhysVector2::new(left, bottom),
    ]
}

fn signed_area(vertices: &[PhysVector2]) -> f32 {
    let sum: f32 = vertices
        .iter()
        .enumerate()
        .map(|(i, a)| a.cross(vertices[(i + 1) % vertices.len()]))
        .sum();
    sum / 2.0
}

fn is_convex(vertices: &[PhysVector2]) -> bool {
    let n = vertices.len();
    let mut sign = 0.0_f32;
    for i in 0..n {
        let a = vertices[i];
        let b = vertices[(i + 1) % n];
        let c = vertices[(i + 2) % n];
        let turn = (b - a).cross(c - b);
        if turn == 0.0 {
            continue;
        }
        if sign == 0.0 {
            sign = turn.signum();
        } else if turn.signum() != sign {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn box_area_and_inertia_match_closed_form() {
        let shape = PhysShape::rect(40.0, 20.0).unwrap();
        assert_relative_eq!(shape.area(), 800.0);

        let mass = 800.0;
        let expected = mass * (40.0 * 40.0 + 20.0 * 20.0) / 12.0;
        assert_relative_eq!(shape.inertia(mass), expected, max_relative = 1e-5);
    }

    #[test]
    fn box_vertices_are_centered() {
        let shape = PhysShape::rect(4.0, 2.0).unwrap();
        let vertices = shape.vertices().unwrap();
        assert_eq!(vertices[0], PhysVector2::new(-2.0, 1.0));
        assert_eq!(vertices[2], PhysVector2::new(2.0, -1.0));
        assert_eq!(shape.radius(), None);
    }

    #[test]
    fn circle_area_and_inertia() {
        let shape = PhysShape::circle(2.0).unwrap();
        assert_relative_eq!(shape.area(), 4.0 * PI);
        assert_relative_eq!(shape.inertia(3.0), 6.0);
        assert!(shape.vertices().is_none());
    }

    #[test]
    fn inertia_ignores_winding() {
        let cw = PhysShape::rect(2.0, 2.0).unwrap();
        let mut reversed = cw.vertices().unwrap().to_vec();
        reversed.reverse();
        let ccw = PhysShape::polygon(reversed).unwrap();
        assert_relative_eq!(cw.inertia(1.0), ccw.inertia(1.0));
    }

    #[test]
    fn kind_reflects_validated_geometry() {
        let circle = PhysShape::circle(1.5).unwrap();
        assert_eq!(circle.kind(), ShapeKind::Circle { radius: 1.5 });
        assert_relative_eq!(circle.area(), 2.25 * PI);

        let triangle = vec![PhysVector2::ZERO, PhysVector2::new(2.0, 0.0), PhysVector2::new(0.0, 2.0)];
        let shape = PhysShape::polygon(triangle.clone()).unwrap();
        assert_eq!(shape.kind(), ShapeKind::Polygon { vertices: &triangle });
        assert_relative_eq!(shape.area(), 2.0);
        assert_eq!(shape.vertices(), Some(triangle.as_slice()));
    }

    #[test]
    fn rejects_degenerate_shapes() {
        assert!(PhysShape::circle(0.0).is_err());
        assert!(PhysShape::circle(f32::INFINITY).is_err());
        assert!(PhysShape::rect(-1.0, 1.0).is_err());
        assert!(PhysShape::polygon(vec![PhysVector2::ZERO, PhysVector2::UNIT_X]).is_err());
        let collinear = vec![PhysVector2::ZERO, PhysVector2::new(1.0, 0.0), PhysVector2::new(2.0, 0.0)];
        assert!(matches!(PhysShape::polygon(collinear), Err(PhysError::InvalidShape(_))));
    }

    #[test]
    fn rejects_concave_polygon() {
        let dart = vec![
            PhysVector2::new(0.0, 0.0),
            PhysVector2::new(2.0, 1.0),
            PhysVector2::new(0.0, 0.5),
            PhysVector2::new(-2.0, 1.0),
        ];
        assert!(PhysShape::polygon(dart).is_err());
    }
}
