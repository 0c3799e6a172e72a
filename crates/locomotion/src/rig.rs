use glam::{Quat, Vec3};
use walkthrough_common::Transform;

/// Height of the tracked head above the dolly when the device reports nothing.
pub const DEFAULT_HEAD_HEIGHT: f32 = 1.6;

/// The movable viewer: an outer dolly carrying the tracked head.
///
/// `head` is local to `dolly`. Locomotion writes the dolly only; the head pose
/// comes from the device every frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewerRig {
    pub dolly: Transform,
    pub head: Transform,
}

impl Default for ViewerRig {
    fn default() -> Self {
        Self::at(Vec3::new(0.0, 0.0, 10.0))
    }
}

impl ViewerRig {
    /// Rig standing at `position` with the head at default height.
    pub fn at(position: Vec3) -> Self {
        Self {
            dolly: Transform::from_position(position),
            head: Transform::from_position(Vec3::new(0.0, DEFAULT_HEAD_HEIGHT, 0.0)),
        }
    }

    /// Replace the tracked head pose (local to the dolly).
    pub fn set_head_pose(&mut self, head: Transform) {
        self.head = head;
    }

    pub fn position(&self) -> Vec3 {
        self.dolly.position
    }

    pub fn head_world(&self) -> Transform {
        self.dolly.compose(&self.head)
    }

    pub fn head_world_rotation(&self) -> Quat {
        self.dolly.rotation * self.head.rotation
    }

    pub fn head_world_position(&self) -> Vec3 {
        self.dolly.transform_point(self.head.position)
    }
}
