use thiserror::Error;

/// Precondition violations reported by the engine. None of these are retried internally.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PhysError {
    #[error("density must be a finite value >= 0, got {0}")]
    InvalidDensity(f32),

    #[error("restitution must be a finite value >= 0, got {0}")]
    InvalidRestitution(f32),

    #[error("friction must be within [0, 1], got {0}")]
    InvalidFriction(f32),

    #[error("dynamic friction {dynamic_friction} exceeds static friction {static_friction}")]
    FrictionOrder { static_friction: f32, dynamic_friction: f32 },

    #[error("invalid shape: {0}")]
    InvalidShape(String),

    #[error("body index {index} out of range for world with {len} bodies")]
    IndexOutOfRange { index: usize, len: usize },
}

pub type Result<T> = std::result::Result<T, PhysError>;
