use glam::{Quat, Vec3};
use std::cell::RefCell;
use std::rc::Rc;

use crate::math::Orientation;

/// Orientation target shared between the caller and the controls
pub type SharedObject = Rc<RefCell<Object3D>>;

/// Minimal scene object: a position and a rotation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Object3D {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Object3D {
    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    /// Object at `position` facing the given orientation
    pub fn looking(position: Vec3, orientation: Orientation) -> Self {
        Self {
            position,
            rotation: orientation.to_quat(),
        }
    }

    pub fn shared(self) -> SharedObject {
        Rc::new(RefCell::new(self))
    }

    pub fn orientation(&self) -> Orientation {
        Orientation::from_quat(self.rotation)
    }
}

impl Default for Object3D {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}
