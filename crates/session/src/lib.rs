//! Frame Driver: runs input, locomotion and proximity once per display refresh.
//!
//! # Invariants
//! - All engine state is mutated from the per-frame call (or host entry points
//!   between frames), never from loaders.
//! - Loaders only deliver results through the [`LoadInbox`]; the driver takes
//!   them at the start of the next frame.
//! - Presentation hooks fire once per transition, not once per frame.

mod config;
mod driver;
mod hooks;
mod inbox;
mod timing;

pub use config::WalkthroughConfig;
pub use driver::{FrameDriver, FrameReport, FrameState, Presentation};
pub use hooks::{NoopHooks, SessionHooks, Viewport};
pub use inbox::{LoadError, LoadInbox, LoadSender, LoadedAsset};
pub use timing::FrameTimer;
