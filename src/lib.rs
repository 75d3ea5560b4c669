//! A small 2D rigid-body engine: separating-axis collision detection between circles and
//! convex polygons, and a sequential impulse solver with rotation and friction.
//!
//! ```
//! use std::sync::Arc;
//! use phys2d::{create_rect_body, PhysMaterial, PhysVector2, PhysWorld};
//!
//! let mut world = PhysWorld::default();
//! let material = Arc::new(PhysMaterial::default());
//! world.add_body(create_rect_body(PhysVector2::new(400.0, 24.0), material.clone(), 768.0, 16.0, true)?);
//! let falling = world.add_body(create_rect_body(PhysVector2::new(350.0, 60.0), material, 40.0, 40.0, false)?);
//!
//! world.step(1.0 / 60.0, 8);
//! assert!(world.body(falling).is_some());
//! # Ok::<(), phys2d::PhysError>(())
//! ```

pub mod error;
pub mod math;
pub mod solver;
pub mod world;

pub use error::{PhysError, Result};
pub use math::{
    aabb::PhysAABB,
    manifold::{ContactPoints, PhysManifold},
    material::PhysMaterial,
    rigidbody::{create_circle_body, create_rect_body, RigidBody},
    shape::{PhysShape, ShapeKind, WorldShape},
    transform::PhysTransform,
    vector::PhysVector2,
};
pub use world::{BodyHandle, PhysWorld, StepStats, WorldSettings};
