use super::vector::PhysVector2;

/// Translation plus a rotation stored as its precomputed sine and cosine.
#[derive(Copy, Clone, Debug)]
pub struct PhysTransform {
    pub position: PhysVector2,
    pub comp_sin: f32,
    pub comp_cos: f32,
}

impl PhysTransform {
    pub fn new(position: PhysVector2, angle: f32) -> Self {
        Self { position, comp_sin: angle.sin(), comp_cos: angle.cos() }
    }
}

impl Default for PhysTransform {
    fn default() -> Self {
        ZERO_TRANSFORM
    }
}

pub const ZERO_TRANSFORM: PhysTransform = PhysTransform { position: PhysVector2::ZERO, comp_sin: 0.0, comp_cos: 1.0 };
