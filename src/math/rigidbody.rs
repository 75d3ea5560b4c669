use core::fmt;
use std::sync::Arc;

use super::{
    aabb::PhysAABB,
    material::PhysMaterial,
    shape::{PhysShape, WorldShape},
    transform::PhysTransform,
    vector::PhysVector2,
};
use crate::error::Result;

/// A single simulated object.
///
/// Pose fields are private so that every mutation goes through a method that
/// invalidates the cached world-space vertices and bounding box.
#[derive(Clone, Debug)]
pub struct RigidBody {
    shape: PhysShape,
    material: Arc<PhysMaterial>,

    transformed_vertices: Vec<PhysVector2>,
    transform_update_required: bool,
    aabb: PhysAABB,
    aabb_update_required: bool,

    force: PhysVector2,
    pub linear_velocity: PhysVector2,
    pub rotational_velocity: f32,
    position: PhysVector2,
    rotation: f32,

    mass: f32,
    inverse_mass: f32,
    inertia: f32,
    inverse_inertia: f32,
    is_static: bool,
}

impl RigidBody {
    /// Static bodies get zero mass and zero inverse mass regardless of the material density.
    pub fn new(shape: PhysShape, material: Arc<PhysMaterial>, position: PhysVector2, is_static: bool) -> Self {
        let mass = if is_static { 0.0 } else { shape.area() * material.density() };
        let inertia = shape.inertia(mass);

        let transformed_vertices = shape.vertices().map(<[PhysVector2]>::to_vec).unwrap_or_default();

        Self {
            shape,
            material,
            transformed_vertices,
            transform_update_required: true,
            aabb: PhysAABB::default(),
            aabb_update_required: true,
            force: PhysVector2::ZERO,
            linear_velocity: PhysVector2::ZERO,
            rotational_velocity: 0.0,
            position,
            rotation: 0.0,
            mass,
            inverse_mass: invert(mass),
            inertia,
            inverse_inertia: invert(inertia),
            is_static,
        }
    }

    pub fn with_rotation(mut self, angle: f32) -> Self {
        self.rotate_to(angle);
        self
    }

    pub fn shape(&self) -> &PhysShape {
        &self.shape
    }

    pub fn material(&self) -> &PhysMaterial {
        &self.material
    }

    pub fn position(&self) -> PhysVector2 {
        self.position
    }

    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn force(&self) -> PhysVector2 {
        self.force
    }

    pub fn mass(&self) -> f32 {
        self.mass
    }

    pub fn inverse_mass(&self) -> f32 {
        self.inverse_mass
    }

    pub fn inertia(&self) -> f32 {
        self.inertia
    }

    pub fn inverse_inertia(&self) -> f32 {
        self.inverse_inertia
    }

    pub fn is_static(&self) -> bool {
        self.is_static
    }

    pub fn transform_update_required(&self) -> bool {
        self.transform_update_required
    }

    pub fn aabb_update_required(&self) -> bool {
        self.aabb_update_required
    }

    pub fn move_body(&mut self, amount: PhysVector2) {
        self.position += amount;
        self.invalidate();
    }

    pub fn move_to_body(&mut self, position: PhysVector2) {
        self.position = position;
        self.invalidate();
    }

    pub fn rotate(&mut self, amount: f32) {
        self.rotation += amount;
        self.invalidate();
    }

    pub fn rotate_to(&mut self, angle: f32) {
        self.rotation = angle;
        self.invalidate();
    }

    /// Accumulates a force for the next integration step.
    pub fn add_force(&mut self, force: PhysVector2) {
        self.force += force;
    }

    /// Instantaneous change of linear momentum. No effect on static or massless bodies.
    pub fn apply_impulse(&mut self, impulse: PhysVector2) {
        self.linear_velocity += impulse * self.inverse_mass;
    }

    /// World-space polygon vertices, recomputed only after a pose change. Empty for circles.
    pub fn transformed_vertices(&mut self) -> &[PhysVector2] {
        if self.transform_update_required {
            if let Some(vertices) = self.shape.vertices() {
                let transform = PhysTransform::new(self.position, self.rotation);
                for (out, vertex) in self.transformed_vertices.iter_mut().zip(vertices) {
                    *out = vertex.transform(&transform);
                }
            }
            self.transform_update_required = false;
        }

        &self.transformed_vertices
    }

    /// The body's geometry in world space, refreshing the vertex cache if needed.
    pub fn world_shape(&mut self) -> WorldShape<'_> {
        let center = self.position;
        match self.shape.radius() {
            Some(radius) => WorldShape::Circle { center, radius },
            None => WorldShape::Polygon { center, vertices: self.transformed_vertices() },
        }
    }

    pub fn aabb(&mut self) -> PhysAABB {
        if self.aabb_update_required {
            let aabb = match self.shape.radius() {
                Some(radius) => PhysAABB::from_circle(self.position, radius),
                None => PhysAABB::from_points(self.transformed_vertices()),
            };
            self.aabb = aabb;
            self.aabb_update_required = false;
        }

        self.aabb
    }

    /// Point-in-shape test against the current pose. Points on the boundary count as inside.
    pub fn contains_point(&mut self, point: PhysVector2) -> bool {
        match self.world_shape() {
            WorldShape::Circle { center, radius } => center.distance_squared(point) <= radius * radius,
            WorldShape::Polygon { vertices, .. } => {
                let mut sign = 0.0_f32;
                for (i, a) in vertices.iter().enumerate() {
                    let b = vertices[(i + 1) % vertices.len()];
                    let side = (b - *a).cross(point - *a);
                    if side == 0.0 {
                        continue;
                    }
                    if sign == 0.0 {
                        sign = side.signum();
                    } else if side.signum() != sign {
                        return false;
                    }
                }
                true
            }
        }
    }

    /// Explicit Euler sub-step of `delta_time / iterations` seconds.
    pub fn step(&mut self, delta_time: f32, iterations: usize, gravity: PhysVector2) {
        if self.is_static {
            self.force = PhysVector2::ZERO;
            return;
        }

        let time = delta_time / iterations.max(1) as f32;

        let acceleration = gravity + self.force * self.inverse_mass;
        self.linear_velocity += acceleration * time;
        self.position += self.linear_velocity * time;
        self.rotation += self.rotational_velocity * time;

        self.force = PhysVector2::ZERO;
        self.invalidate();
    }

    /// Scales velocities by `1 - k * time`, floored at zero.
    pub fn damp(&mut self, linear: f32, angular: f32, time: f32) {
        if self.is_static {
            return;
        }

        self.linear_velocity *= (1.0 - linear * time).max(0.0);
        self.rotational_velocity *= (1.0 - angular * time).max(0.0);
    }

    fn invalidate(&mut self) {
        self.transform_update_required = true;
        self.aabb_update_required = true;
    }
}

impl fmt::Display for RigidBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.shape, self.position)
    }
}

fn invert(value: f32) -> f32 {
    if value > 0.0 {
        1.0 / value
    } else {
        0.0
    }
}

pub fn create_circle_body(position: PhysVector2, material: Arc<PhysMaterial>, radius: f32, is_static: bool) -> Result<RigidBody> {
    let shape = PhysShape::circle(radius)?;
    Ok(RigidBody::new(shape, material, position, is_static))
}

pub fn create_rect_body(position: PhysVector2, material: Arc<PhysMaterial>, width: f32, height: f32, is_static: bool) -> Result<RigidBody> {
    let shape = PhysShape::rect(width, height)?;
    Ok(RigidBody::new(shape, material, position, is_static))
}
