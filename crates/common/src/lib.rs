//! Shared types for the walkthrough engine: transforms, rays, config validation.
//!
//! # Conventions
//! - +Y is up.
//! - A transform's local forward axis is -Z and its local right axis is +X.

mod config;
mod ray;
mod types;

pub use config::{ConfigError, ensure_non_negative, ensure_positive};
pub use ray::{Ray, RayHit};
pub use types::Transform;
