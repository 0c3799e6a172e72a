use glam::Vec3;
use serde::{Deserialize, Serialize};
use walkthrough_collision::CollisionProxy;
use walkthrough_common::{ConfigError, Ray, RayHit, ensure_non_negative, ensure_positive};

use crate::rig::ViewerRig;

/// Horizontal components shorter than this give no usable heading.
const MIN_HEADING_LEN_SQ: f32 = 1e-6;

/// Locomotion tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocomotionConfig {
    /// Walking speed in units per second.
    pub speed: f32,
    /// Clearance kept between the rig and any proxy wall.
    pub wall_limit: f32,
    /// Height above the rig origin where wall rays start.
    pub eye_height: f32,
    /// Extra lift above the wall-ray origin for the downward floor probe.
    pub floor_probe_lift: f32,
}

impl Default for LocomotionConfig {
    fn default() -> Self {
        Self {
            speed: 2.0,
            wall_limit: 1.3,
            eye_height: 1.0,
            floor_probe_lift: 1.5,
        }
    }
}

impl LocomotionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_positive("locomotion.speed", self.speed)?;
        ensure_positive("locomotion.wall_limit", self.wall_limit)?;
        ensure_non_negative("locomotion.eye_height", self.eye_height)?;
        ensure_non_negative("locomotion.floor_probe_lift", self.floor_probe_lift)
    }
}

/// What one `advance` call did.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StepOutcome {
    /// No proxy was available; nothing was evaluated.
    pub skipped: bool,
    /// A wall inside `wall_limit` suppressed the forward step.
    pub blocked: bool,
    /// Distance travelled forward this call.
    pub forward: f32,
    /// Push applied away from a wall on the left.
    pub left_push: f32,
    /// Push applied away from a wall on the right.
    pub right_push: f32,
    /// Floor point the rig snapped to, if the probe hit.
    pub floor: Option<Vec3>,
}

/// Moves the viewer rig through the proxy geometry.
#[derive(Debug, Clone, Default)]
pub struct LocomotionEngine {
    config: LocomotionConfig,
}

impl LocomotionEngine {
    pub fn new(config: LocomotionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LocomotionConfig {
        &self.config
    }

    /// Advance the rig by `dt` seconds of forward walking.
    ///
    /// The heading is the head's gaze projected onto the horizontal plane. The
    /// forward step is taken whole or not at all: a wall closer than
    /// `wall_limit` ahead blocks it. Walls closer than `wall_limit` on either
    /// side push the rig out by exactly the deficit, and a floor found below
    /// snaps the rig onto it. The rig's own rotation is restored before
    /// returning.
    pub fn advance<P>(&self, rig: &mut ViewerRig, proxy: Option<&P>, dt: f32) -> StepOutcome
    where
        P: CollisionProxy + ?Sized,
    {
        let Some(proxy) = proxy else {
            tracing::trace!("no collision proxy yet, locomotion skipped");
            return StepOutcome {
                skipped: true,
                ..StepOutcome::default()
            };
        };
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        let cfg = &self.config;
        let mut outcome = StepOutcome::default();

        let saved_rotation = rig.dolly.rotation;
        rig.dolly.rotation = rig.head_world_rotation();

        let heading = horizontal(rig.dolly.forward());
        if let Some(heading) = heading {
            outcome.blocked = self.wall_within_limit(proxy, rig, heading).is_some();
            if !outcome.blocked {
                outcome.forward = dt * cfg.speed;
                rig.dolly.position += heading * outcome.forward;
            }
        }

        // Looking straight up or down leaves no gaze heading; the sideways
        // checks fall back to the rig's own yaw.
        let lateral_basis = heading.or_else(|| horizontal(saved_rotation * Vec3::NEG_Z));
        if let Some(basis) = lateral_basis {
            let right = basis.cross(Vec3::Y);

            // Both sides are measured from the post-step position before either push.
            let left_hit = self.wall_within_limit(proxy, rig, -right);
            let right_hit = self.wall_within_limit(proxy, rig, right);
            if let Some(hit) = left_hit {
                outcome.left_push = cfg.wall_limit - hit.distance;
            }
            if let Some(hit) = right_hit {
                outcome.right_push = cfg.wall_limit - hit.distance;
            }
            rig.dolly.position += right * (outcome.left_push - outcome.right_push);
        }

        let probe_origin = rig.dolly.position + Vec3::Y * (cfg.eye_height + cfg.floor_probe_lift);
        if let Some(floor) = Ray::new(probe_origin, Vec3::NEG_Y).and_then(|r| proxy.nearest(&r)) {
            rig.dolly.position = floor.point;
            outcome.floor = Some(floor.point);
        }

        rig.dolly.rotation = saved_rotation;

        tracing::trace!(
            blocked = outcome.blocked,
            forward = outcome.forward,
            left_push = outcome.left_push,
            right_push = outcome.right_push,
            floor = outcome.floor.is_some(),
            "rig advanced"
        );
        outcome
    }

    /// Nearest hit along `direction` from eye height, if it is inside the wall limit.
    fn wall_within_limit<P>(&self, proxy: &P, rig: &ViewerRig, direction: Vec3) -> Option<RayHit>
    where
        P: CollisionProxy + ?Sized,
    {
        let origin = rig.dolly.position + Vec3::Y * self.config.eye_height;
        let ray = Ray::new(origin, direction)?;
        proxy
            .nearest(&ray)
            .filter(|hit| hit.distance < self.config.wall_limit)
    }
}

/// Unit heading in the XZ plane, or `None` when `v` is (nearly) vertical.
fn horizontal(v: Vec3) -> Option<Vec3> {
    let flat = Vec3::new(v.x, 0.0, v.z);
    if flat.length_squared() < MIN_HEADING_LEN_SQ {
        None
    } else {
        Some(flat.normalize())
    }
}
