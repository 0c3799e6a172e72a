//! Developer tooling: read-only views of a running walkthrough session.
//!
//! # Invariants
//! - Inspection never mutates the session.

mod inspector;

pub use inspector::{RigInfo, SessionInspector, SessionSummary};
