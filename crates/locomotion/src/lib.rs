//! Locomotion: advances the viewer rig each frame against a static collision proxy.
//!
//! # Invariants
//! - Only `LocomotionEngine::advance` moves the rig.
//! - The rig's orientation is unchanged by `advance`; only position persists.
//! - A missing proxy or a missed ray is never an error.

pub mod engine;
pub mod rig;

pub use engine::{LocomotionConfig, LocomotionEngine, StepOutcome};
pub use rig::ViewerRig;
