//! Input modalities: two motion controllers or a head-gaze fallback.
//!
//! # Invariants
//! - The selector settles on exactly one modality per session and never reverts.
//! - The first commit wins; a late timeout or late connection is a no-op.
//! - Movement is only requested once a modality is decided.

pub mod controller;
pub mod gaze;
pub mod selector;

pub use controller::{CONTROLLER_COUNT, ControllerSignal, ControllerState, Controllers};
pub use gaze::{DwellGazeController, GazeConfig, GazeController, GazeMode};
pub use selector::{InputConfig, InputMode, InputModeSelector, ModeKind};
