//! Separating-axis intersection tests and contact point extraction.
//!
//! Every function here is pure: shapes come in already placed in world space
//! (see [`WorldShape`]) and results are returned by value.
//!
//! Axes that normalize to the zero vector (zero-length edges, a circle center
//! sitting exactly on a polygon vertex) are never tested and can never be chosen
//! as the collision normal.

use log::{debug, trace};

use super::{
    aabb::PhysAABB,
    manifold::ContactPoints,
    nearly_equal,
    shape::WorldShape,
    vector::PhysVector2,
    vector_nearly_equal,
};

/// Minimum translation needed to separate two overlapping shapes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Intersection {
    /// Unit normal pointing from the first shape toward the second.
    pub normal: PhysVector2,
    /// Penetration depth along `normal`, always positive.
    pub depth: f32,
}

impl Intersection {
    pub fn flipped(self) -> Self {
        Self { normal: -self.normal, depth: self.depth }
    }
}

/// Tracks the axis of least overlap while axes are tested one by one.
struct AxisSearch {
    normal: PhysVector2,
    depth: f32,
}

impl AxisSearch {
    fn new() -> Self {
        Self { normal: PhysVector2::ZERO, depth: f32::MAX }
    }

    /// Returns `false` if the projections are disjoint, which proves separation.
    fn test(&mut self, axis: PhysVector2, (min_a, max_a): (f32, f32), (min_b, max_b): (f32, f32)) -> bool {
        if min_a >= max_b || min_b >= max_a {
            return false;
        }

        let axis_depth = f32::min(max_b - min_a, max_a - min_b);
        if axis_depth < self.depth {
            self.depth = axis_depth;
            self.normal = axis;
        }

        true
    }

    /// Orients the winning axis along `direction` (first center to second center).
    fn finish(self, direction: PhysVector2) -> Option<Intersection> {
        if self.normal.is_zero() {
            debug!("every separating axis candidate was degenerate, reporting no collision");
            return None;
        }

        let normal = if direction.dot(self.normal) < 0.0 { -self.normal } else { self.normal };
        Some(Intersection { normal, depth: self.depth })
    }
}

pub fn intersect_aabb(a: &PhysAABB, b: &PhysAABB) -> bool {
    a.intersects(b)
}

pub fn intersect_circles(center_a: PhysVector2, radius_a: f32, center_b: PhysVector2, radius_b: f32) -> Option<Intersection> {
    let distance = center_a.distance(center_b);
    let radii = radius_a + radius_b;

    if distance >= radii {
        return None;
    }

    let normal = (center_b - center_a).normalize();
    if normal.is_zero() {
        debug!("coincident circle centers at {}, separating along +x", center_a);
        return Some(Intersection { normal: PhysVector2::UNIT_X, depth: radii });
    }

    Some(Intersection { normal, depth: radii - distance })
}

pub fn intersect_polygons(
    center_a: PhysVector2,
    vertices_a: &[PhysVector2],
    center_b: PhysVector2,
    vertices_b: &[PhysVector2],
) -> Option<Intersection> {
    let mut search = AxisSearch::new();

    for vertices in [vertices_a, vertices_b] {
        for axis in edge_axes(vertices) {
            let projection_a = project_vertices(axis, vertices_a);
            let projection_b = project_vertices(axis, vertices_b);

            if !search.test(axis, projection_a, projection_b) {
                return None;
            }
        }
    }

    search.finish(center_b - center_a)
}

/// The normal of the result points from the circle toward the polygon.
pub fn intersect_circle_polygon(
    circle_center: PhysVector2,
    radius: f32,
    polygon_center: PhysVector2,
    vertices: &[PhysVector2],
) -> Option<Intersection> {
    let mut search = AxisSearch::new();

    for axis in edge_axes(vertices) {
        let projection_a = project_vertices(axis, vertices);
        let projection_b = project_circle(circle_center, radius, axis);

        if !search.test(axis, projection_a, projection_b) {
            return None;
        }
    }

    if let Some(closest) = closest_vertex_index(circle_center, vertices) {
        let axis = (vertices[closest] - circle_center).normalize();
        if axis.is_zero() {
            trace!("circle center lies on vertex {}, skipping its axis", closest);
        } else {
            let projection_a = project_vertices(axis, vertices);
            let projection_b = project_circle(circle_center, radius, axis);

            if !search.test(axis, projection_a, projection_b) {
                return None;
            }
        }
    }

    search.finish(polygon_center - circle_center)
}

/// Narrow-phase dispatch. The normal of the result points from `a` toward `b`.
pub fn collide(a: &WorldShape<'_>, b: &WorldShape<'_>) -> Option<Intersection> {
    match (*a, *b) {
        (WorldShape::Circle { center: center_a, radius: radius_a }, WorldShape::Circle { center: center_b, radius: radius_b }) => {
            intersect_circles(center_a, radius_a, center_b, radius_b)
        }
        (WorldShape::Circle { center, radius }, WorldShape::Polygon { center: polygon_center, vertices }) => {
            intersect_circle_polygon(center, radius, polygon_center, vertices)
        }
        (WorldShape::Polygon { center: polygon_center, vertices }, WorldShape::Circle { center, radius }) => {
            intersect_circle_polygon(center, radius, polygon_center, vertices).map(Intersection::flipped)
        }
        (WorldShape::Polygon { center: center_a, vertices: vertices_a }, WorldShape::Polygon { center: center_b, vertices: vertices_b }) => {
            intersect_polygons(center_a, vertices_a, center_b, vertices_b)
        }
    }
}

pub fn find_contact_points(a: &WorldShape<'_>, b: &WorldShape<'_>) -> ContactPoints {
    match (*a, *b) {
        (WorldShape::Circle { center: center_a, radius }, WorldShape::Circle { center: center_b, .. }) => {
            ContactPoints::single(find_contact_point_circles(center_a, radius, center_b))
        }
        (WorldShape::Circle { center, .. }, WorldShape::Polygon { vertices, .. })
        | (WorldShape::Polygon { vertices, .. }, WorldShape::Circle { center, .. }) => {
            ContactPoints::single(find_contact_point_circle_polygon(center, vertices))
        }
        (WorldShape::Polygon { vertices: vertices_a, .. }, WorldShape::Polygon { vertices: vertices_b, .. }) => {
            find_contact_points_polygons(vertices_a, vertices_b)
        }
    }
}

fn edge_axes(vertices: &[PhysVector2]) -> impl Iterator<Item = PhysVector2> + '_ {
    (0..vertices.len()).filter_map(move |i| {
        let edge = vertices[(i + 1) % vertices.len()] - vertices[i];
        let axis = edge.perp().normalize();
        if axis.is_zero() {
            trace!("skipping zero-length edge {} as a separating axis", i);
            return None;
        }
        Some(axis)
    })
}

fn project_vertices(axis: PhysVector2, vertices: &[PhysVector2]) -> (f32, f32) {
    vertices.iter().fold((f32::MAX, f32::MIN), |(min, max), vertex| {
        let projection = vertex.dot(axis);
        (min.min(projection), max.max(projection))
    })
}

fn project_circle(center: PhysVector2, radius: f32, axis: PhysVector2) -> (f32, f32) {
    let direction_and_radius = axis.normalize() * radius;

    let a = (center + direction_and_radius).dot(axis);
    let b = (center - direction_and_radius).dot(axis);

    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Index of the vertex nearest to `point`; the lowest index wins ties.
fn closest_vertex_index(point: PhysVector2, vertices: &[PhysVector2]) -> Option<usize> {
    let mut result = None;
    let mut min_distance = f32::MAX;

    for (i, vertex) in vertices.iter().enumerate() {
        let distance = vertex.distance_squared(point);
        if distance < min_distance {
            min_distance = distance;
            result = Some(i);
        }
    }

    result
}

/// Squared distance from `point` to the segment `a`-`b`, with the closest point on the segment.
fn point_segment_distance_squared(point: PhysVector2, a: PhysVector2, b: PhysVector2) -> (f32, PhysVector2) {
    let ab = b - a;
    let ap = point - a;

    let ab_len_sq = ab.length_squared();
    let contact = if ab_len_sq == 0.0 {
        a
    } else {
        let d = ap.dot(ab) / ab_len_sq;
        if d <= 0.0 {
            a
        } else if d >= 1.0 {
            b
        } else {
            a + ab * d
        }
    };

    (point.distance_squared(contact), contact)
}

fn find_contact_point_circles(center_a: PhysVector2, radius_a: f32, center_b: PhysVector2) -> PhysVector2 {
    let direction = (center_b - center_a).normalize();
    let direction = if direction.is_zero() { PhysVector2::UNIT_X } else { direction };

    center_a + direction * radius_a
}

fn find_contact_point_circle_polygon(center: PhysVector2, vertices: &[PhysVector2]) -> PhysVector2 {
    let mut min_distance = f32::MAX;
    let mut contact = PhysVector2::ZERO;

    for i in 0..vertices.len() {
        let (va, vb) = (vertices[i], vertices[(i + 1) % vertices.len()]);
        let (distance, point) = point_segment_distance_squared(center, va, vb);

        if distance < min_distance {
            min_distance = distance;
            contact = point;
        }
    }

    contact
}

fn find_contact_points_polygons(vertices_a: &[PhysVector2], vertices_b: &[PhysVector2]) -> ContactPoints {
    let mut contacts = ContactPoints::default();
    let mut min_distance = f32::MAX;

    for (points, edges) in [(vertices_a, vertices_b), (vertices_b, vertices_a)] {
        for &point in points {
            for i in 0..edges.len() {
                let (va, vb) = (edges[i], edges[(i + 1) % edges.len()]);
                let (distance, contact) = point_segment_distance_squared(point, va, vb);

                if nearly_equal(distance, min_distance) {
                    if !vector_nearly_equal(contact, contacts.contact_one) {
                        contacts.contact_two = contact;
                        contacts.contact_count = 2;
                    }
                } else if distance < min_distance {
                    min_distance = distance;
                    contacts.contact_one = contact;
                    contacts.contact_count = 1;
                }
            }
        }
    }

    contacts
}
