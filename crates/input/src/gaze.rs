use glam::Vec3;
use serde::{Deserialize, Serialize};
use walkthrough_common::{ConfigError, Transform, ensure_positive};

/// Mode reported by a gaze collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GazeMode {
    /// Head is moving; nothing is being selected.
    #[default]
    Idle,
    /// Head is steady; dwell time is accumulating.
    Gazing,
    /// Dwell complete; the viewer wants to walk where they look.
    Move,
}

/// Head-gaze input used when no motion controller shows up.
///
/// `update` is called once per frame with the head's world pose.
pub trait GazeController {
    fn update(&mut self, head: &Transform, dt: f32);
    fn mode(&self) -> GazeMode;
}

/// Dwell thresholds for [`DwellGazeController`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GazeConfig {
    /// Seconds of steady gaze before movement starts.
    pub dwell_secs: f32,
    /// Largest head rotation, in degrees, still counted as steady.
    pub steady_tolerance_deg: f32,
}

impl Default for GazeConfig {
    fn default() -> Self {
        Self {
            dwell_secs: 2.0,
            steady_tolerance_deg: 6.0,
        }
    }
}

impl GazeConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_positive("gaze.dwell_secs", self.dwell_secs)?;
        ensure_positive("gaze.steady_tolerance_deg", self.steady_tolerance_deg)
    }
}

/// Gaze fallback driven by head steadiness.
///
/// Holding the head within `steady_tolerance_deg` of where the dwell started
/// moves `Idle → Gazing → Move`. Turning further resets to `Idle` and starts a
/// new dwell from the new direction.
#[derive(Debug, Clone)]
pub struct DwellGazeController {
    config: GazeConfig,
    anchor: Option<Vec3>,
    dwell: f32,
    mode: GazeMode,
}

impl DwellGazeController {
    pub fn new(config: GazeConfig) -> Self {
        Self {
            config,
            anchor: None,
            dwell: 0.0,
            mode: GazeMode::Idle,
        }
    }

    /// Seconds the current direction has been held.
    pub fn dwell(&self) -> f32 {
        self.dwell
    }
}

impl Default for DwellGazeController {
    fn default() -> Self {
        Self::new(GazeConfig::default())
    }
}

impl GazeController for DwellGazeController {
    fn update(&mut self, head: &Transform, dt: f32) {
        let forward = head.forward();
        let steady = self.anchor.is_some_and(|anchor| {
            anchor.angle_between(forward).to_degrees() <= self.config.steady_tolerance_deg
        });

        let previous = self.mode;
        if steady {
            self.dwell += dt.max(0.0);
            self.mode = if self.dwell >= self.config.dwell_secs {
                GazeMode::Move
            } else {
                GazeMode::Gazing
            };
        } else {
            self.anchor = Some(forward);
            self.dwell = 0.0;
            self.mode = GazeMode::Idle;
        }

        if previous != self.mode {
            tracing::debug!(from = ?previous, to = ?self.mode, "gaze mode changed");
        }
    }

    fn mode(&self) -> GazeMode {
        self.mode
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Quat;

    fn looking(yaw_deg: f32) -> Transform {
        Transform::default().with_rotation(Quat::from_rotation_y(yaw_deg.to_radians()))
    }

    #[test]
    fn steady_head_reaches_move() {
        let mut gaze = DwellGazeController::default();
        let head = looking(0.0);
        gaze.update(&head, 0.1);
        assert_eq!(gaze.mode(), GazeMode::Idle);
        gaze.update(&head, 1.0);
        assert_eq!(gaze.mode(), GazeMode::Gazing);
        gaze.update(&head, 1.0);
        assert_eq!(gaze.mode(), GazeMode::Move);
    }

    #[test]
    fn small_drift_keeps_dwell() {
        let mut gaze = DwellGazeController::default();
        gaze.update(&looking(0.0), 0.0);
        gaze.update(&looking(3.0), 1.5);
        gaze.update(&looking(-3.0), 1.5);
        assert_eq!(gaze.mode(), GazeMode::Move);
    }

    #[test]
    fn turning_resets_to_idle() {
        let mut gaze = DwellGazeController::default();
        let head = looking(0.0);
        gaze.update(&head, 0.0);
        gaze.update(&head, 3.0);
        assert_eq!(gaze.mode(), GazeMode::Move);

        gaze.update(&looking(45.0), 0.016);
        assert_eq!(gaze.mode(), GazeMode::Idle);
        assert_eq!(gaze.dwell(), 0.0);
    }

    #[test]
    fn config_validation() {
        assert!(GazeConfig::default().validate().is_ok());
        let bad = GazeConfig {
            dwell_secs: 0.0,
            ..GazeConfig::default()
        };
        assert!(bad.validate().is_err());
    }
}
