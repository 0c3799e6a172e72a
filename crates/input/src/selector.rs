use std::time::Duration;

use serde::{Deserialize, Serialize};
use walkthrough_common::{ConfigError, Transform};

use crate::controller::Controllers;
use crate::gaze::{GazeController, GazeMode};

/// Timing for the modality decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// How long to wait for a controller before falling back to gaze.
    pub connect_timeout_ms: u64,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            connect_timeout_ms: 2000,
        }
    }
}

impl InputConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.connect_timeout_ms == 0 {
            return Err(ConfigError::NotPositive {
                field: "input.connect_timeout_ms",
                value: 0.0,
            });
        }
        Ok(())
    }
}

/// Selector state. `Controller` and `Gaze` are terminal.
#[derive(Debug)]
pub enum InputMode<G> {
    /// Waiting for a controller until `deadline` (session clock).
    Undecided { deadline: Duration },
    Controller,
    /// Gaze fallback, owning the gaze collaborator it created on commit.
    Gaze(G),
}

/// Field-less view of [`InputMode`] for logging and inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeKind {
    Undecided,
    Controller,
    Gaze,
}

impl std::fmt::Display for ModeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Undecided => "undecided",
            Self::Controller => "controller",
            Self::Gaze => "gaze",
        };
        f.write_str(s)
    }
}

/// One-shot decision between motion controllers and the gaze fallback.
///
/// `Undecided → Controller` on the first controller connection, or
/// `Undecided → Gaze` once the connect timeout elapses. Both transitions go
/// through a single guarded commit, so whichever event is processed first
/// wins and the other becomes a no-op.
#[derive(Debug)]
pub struct InputModeSelector<G> {
    mode: InputMode<G>,
}

impl<G: GazeController> InputModeSelector<G> {
    /// Start undecided; the timeout is measured from `session_start`.
    pub fn new(session_start: Duration, config: &InputConfig) -> Self {
        Self {
            mode: InputMode::Undecided {
                deadline: session_start + config.connect_timeout(),
            },
        }
    }

    pub fn mode(&self) -> &InputMode<G> {
        &self.mode
    }

    pub fn kind(&self) -> ModeKind {
        match self.mode {
            InputMode::Undecided { .. } => ModeKind::Undecided,
            InputMode::Controller => ModeKind::Controller,
            InputMode::Gaze(_) => ModeKind::Gaze,
        }
    }

    pub fn is_decided(&self) -> bool {
        self.kind() != ModeKind::Undecided
    }

    /// The gaze collaborator, once gaze mode is committed.
    pub fn gaze(&self) -> Option<&G> {
        match &self.mode {
            InputMode::Gaze(g) => Some(g),
            _ => None,
        }
    }

    /// A controller reported `connected`. Cancels the pending timeout.
    /// Returns true if this call decided the mode.
    pub fn on_controller_connected(&mut self) -> bool {
        self.commit(|| InputMode::Controller)
    }

    /// The connect timeout fired. `make_gaze` builds the fallback collaborator
    /// and is only invoked if this call decides the mode.
    pub fn on_timeout_elapsed(&mut self, make_gaze: impl FnOnce() -> G) -> bool {
        self.commit(|| InputMode::Gaze(make_gaze()))
    }

    /// Fire the timeout if `now` has reached the deadline while still undecided.
    pub fn poll(&mut self, now: Duration, make_gaze: impl FnOnce() -> G) -> bool {
        match self.mode {
            InputMode::Undecided { deadline } if now >= deadline => {
                self.on_timeout_elapsed(make_gaze)
            }
            _ => false,
        }
    }

    /// Whether the viewer is asking to move this frame.
    ///
    /// In gaze mode this advances the gaze collaborator by one frame.
    pub fn is_movement_requested(
        &mut self,
        controllers: &Controllers,
        head: &Transform,
        dt: f32,
    ) -> bool {
        match &mut self.mode {
            InputMode::Undecided { .. } => false,
            InputMode::Controller => controllers.any_select_pressed(),
            InputMode::Gaze(gaze) => {
                gaze.update(head, dt);
                gaze.mode() == GazeMode::Move
            }
        }
    }

    fn commit(&mut self, decide: impl FnOnce() -> InputMode<G>) -> bool {
        if self.is_decided() {
            return false;
        }
        self.mode = decide();
        tracing::debug!(mode = %self.kind(), "input mode committed");
        true
    }
}
