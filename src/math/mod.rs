pub mod aabb;
pub mod collision;
pub mod manifold;
pub mod material;
pub mod rigidbody;
pub mod shape;
pub mod transform;
pub mod vector;

use vector::PhysVector2;

/// Tolerance used when comparing contact distances and contact positions.
pub const SMALL_VAL: f32 = 0.0005;

/// Clamps `value` into `[min, max]`. The bounds are swapped if given in the wrong order.
pub fn clamp<T: PartialOrd>(value: T, min: T, max: T) -> T {
    let (min, max) = if min > max { (max, min) } else { (min, max) };

    if value < min {
        return min;
    }

    if value > max {
        return max;
    }

    value
}

pub fn nearly_equal(a: f32, b: f32) -> bool {
    (a - b).abs() < SMALL_VAL
}

pub fn vector_nearly_equal(a: PhysVector2, b: PhysVector2) -> bool {
    a.distance_squared(b) < SMALL_VAL * SMALL_VAL
}
