use glam::{EulerRot, Quat, Vec3};
use std::f32::consts::FRAC_PI_2;

use super::angles::wrap_angle;

const DEGENERATE_HORIZONTAL: f32 = 1e-6;

/// First-person orientation as yaw and pitch.
///
/// `yaw` rotates about world +Y, zero faces -Z. `pitch` is the polar angle of the
/// facing direction measured from +Y: `0` looks straight up, `PI / 2` is level
/// and `PI` looks straight down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orientation {
    pub yaw: f32,
    pub pitch: f32,
}

impl Orientation {
    pub const LEVEL: Orientation = Orientation {
        yaw: 0.0,
        pitch: FRAC_PI_2,
    };

    pub fn new(yaw: f32, pitch: f32) -> Self {
        Self { yaw, pitch }
    }

    /// Recover yaw and pitch from a roll-free rotation.
    pub fn from_quat(rotation: Quat) -> Self {
        let (yaw, elevation, _roll) = rotation.to_euler(EulerRot::YXZ);
        Self {
            yaw: wrap_angle(yaw),
            pitch: FRAC_PI_2 - elevation,
        }
    }

    /// Build the rotation: yaw about +Y first, then elevation about the local X axis.
    /// Roll stays zero whatever the pitch.
    pub fn to_quat(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.yaw, FRAC_PI_2 - self.pitch, 0.0)
    }

    /// Unit vector the orientation faces.
    pub fn direction(&self) -> Vec3 {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        Vec3::new(-sin_yaw * sin_pitch, cos_pitch, -cos_yaw * sin_pitch)
    }

    /// Inverse of [`Orientation::direction`]. Straight up or down has no defined
    /// yaw; zero is returned for it.
    pub fn from_direction(direction: Vec3) -> Self {
        let dir = direction.normalize_or_zero();
        let pitch = dir.y.clamp(-1.0, 1.0).acos();
        let horizontal = dir.x.hypot(dir.z);
        let yaw = if horizontal < DEGENERATE_HORIZONTAL {
            0.0
        } else {
            wrap_angle((-dir.x).atan2(-dir.z))
        };
        Self { yaw, pitch }
    }

    /// Facing direction projected onto the horizontal plane.
    pub fn horizontal_forward(&self) -> Vec3 {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        Vec3::new(-sin_yaw, 0.0, -cos_yaw)
    }

    pub fn right(&self) -> Vec3 {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        Vec3::new(cos_yaw, 0.0, -sin_yaw)
    }
}

impl Default for Orientation {
    fn default() -> Self {
        Self::LEVEL
    }
}
