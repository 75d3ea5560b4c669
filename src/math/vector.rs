use core::fmt;
use std::ops::{Add, AddAssign, Div, Mul, MulAssign, Neg, Sub, SubAssign};

use super::transform::PhysTransform;

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct PhysVector2 {
    pub x: f32,
    pub y: f32,
}

impl PhysVector2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };
    pub const UNIT_X: Self = Self { x: 1.0, y: 0.0 };
    pub const UNIT_Y: Self = Self { x: 0.0, y: 1.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn dot(self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y
    }

    /// Z component of the 3D cross product of the two vectors.
    pub fn cross(self, other: Self) -> f32 {
        self.x * other.y - self.y * other.x
    }

    /// Counter-clockwise perpendicular, `(-y, x)`.
    pub fn perp(self) -> Self {
        Self { x: -self.y, y: self.x }
    }

    pub fn length(self) -> f32 {
        self.length_squared().sqrt()
    }

    pub fn length_squared(self) -> f32 {
        self.x * self.x + self.y * self.y
    }

    pub fn distance(self, other: Self) -> f32 {
        (self - other).length()
    }

    pub fn distance_squared(self, other: Self) -> f32 {
        (self - other).length_squared()
    }

    /// Unit vector in the same direction, or [`PhysVector2::ZERO`] for a zero-length input.
    pub fn normalize(self) -> Self {
        let len_sq = self.length_squared();
        if len_sq == 0.0 {
            return Self::ZERO;
        }
        self * (1.0 / len_sq.sqrt())
    }

    pub fn is_zero(self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub fn transform(self, transform: &PhysTransform) -> Self {
        let rx = transform.comp_cos * self.x - transform.comp_sin * self.y;
        let ry = transform.comp_sin * self.x + transform.comp_cos * self.y;

        Self {
            x: rx + transform.position.x,
            y: ry + transform.position.y,
        }
    }

    pub fn floor(self) -> Self {
        Self { x: self.x.floor(), y: self.y.floor() }
    }
}

impl Add for PhysVector2 {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self { x: self.x + other.x, y: self.y + other.y }
    }
}

impl AddAssign for PhysVector2 {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl Sub for PhysVector2 {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self { x: self.x - other.x, y: self.y - other.y }
    }
}

impl SubAssign for PhysVector2 {
    fn sub_assign(&mut self, other: Self) {
        *self = *self - other;
    }
}

impl Mul<f32> for PhysVector2 {
    type Output = Self;

    fn mul(self, scalar: f32) -> Self {
        Self { x: self.x * scalar, y: self.y * scalar }
    }
}

impl Mul<PhysVector2> for f32 {
    type Output = PhysVector2;

    fn mul(self, vector: PhysVector2) -> PhysVector2 {
        vector * self
    }
}

impl MulAssign<f32> for PhysVector2 {
    fn mul_assign(&mut self, scalar: f32) {
        *self = *self * scalar;
    }
}

impl Div<f32> for PhysVector2 {
    type Output = Self;

    fn div(self, scalar: f32) -> Self {
        Self { x: self.x / scalar, y: self.y / scalar }
    }
}

impl Neg for PhysVector2 {
    type Output = Self;

    fn neg(self) -> Self {
        Self { x: -self.x, y: -self.y }
    }
}

impl fmt::Display for PhysVector2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Vector2[x:{} y:{}]", self.x, self.y)
    }
}
