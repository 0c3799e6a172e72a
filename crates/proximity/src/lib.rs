//! Proximity: named points of interest and the information panel they trigger.
//!
//! # Invariants
//! - At most one anchor is shown at a time.
//! - Registry iteration order is deterministic (BTreeMap).
//! - Within the threshold the nearest anchor wins; ties go to the first name in order.
//! - A missing registry or an anchor without a scene object is skipped, never an error.

mod locator;
mod panel;
mod registry;
mod trigger;

pub use locator::{AnchorLocator, SceneIndex};
pub use panel::{BODY_KEY, HeadlessPanel, InfoPanel, TITLE_KEY};
pub use registry::{AnchorInfo, AnchorRegistry};
pub use trigger::{ProximityChange, ProximityConfig, ProximityTrigger};

/// Errors from loading anchor data.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("anchor name must not be empty")]
    EmptyName,
    #[error("scene object {0:?} not found")]
    MissingObject(String),
}
