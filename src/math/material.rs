use crate::error::{PhysError, Result};

/// Surface and bulk properties shared between bodies.
///
/// Validated once at construction; bodies hold it behind an `Arc` and never mutate it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhysMaterial {
    density: f32,
    restitution: f32,
    static_friction: f32,
    dynamic_friction: f32,
}

impl PhysMaterial {
    /// A material using `friction` as both the static and the dynamic coefficient.
    pub fn new(density: f32, restitution: f32, friction: f32) -> Result<Self> {
        Self::with_friction(density, restitution, friction, friction)
    }

    pub fn with_friction(density: f32, restitution: f32, static_friction: f32, dynamic_friction: f32) -> Result<Self> {
        if !density.is_finite() || density < 0.0 {
            return Err(PhysError::InvalidDensity(density));
        }
        if !restitution.is_finite() || restitution < 0.0 {
            return Err(PhysError::InvalidRestitution(restitution));
        }
        for friction in [static_friction, dynamic_friction] {
            if !(0.0..=1.0).contains(&friction) {
                return Err(PhysError::InvalidFriction(friction));
            }
        }
        if dynamic_friction > static_friction {
            return Err(PhysError::FrictionOrder { static_friction, dynamic_friction });
        }

        Ok(Self { density, restitution, static_friction, dynamic_friction })
    }

    pub fn density(&self) -> f32 {
        self.density
    }

    pub fn restitution(&self) -> f32 {
        self.restitution
    }

    pub fn static_friction(&self) -> f32 {
        self.static_friction
    }

    pub fn dynamic_friction(&self) -> f32 {
        self.dynamic_friction
    }
}

impl Default for PhysMaterial {
    fn default() -> Self {
        Self { density: 1.0, restitution: 0.5, static_friction: 0.6, dynamic_friction: 0.4 }
    }
}
