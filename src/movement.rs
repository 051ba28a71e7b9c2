use winit::event::KeyEvent;
use winit::keyboard::{KeyCode, PhysicalKey};

use crate::core::controls::PointerLockControls;
use crate::traits::PointerSurface;

/// Held movement keys
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MovementState {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
}

impl MovementState {
    const fn to_direction(positive: bool, negative: bool) -> f32 {
        match (positive, negative) {
            (true, false) => 1.0,
            (false, true) => -1.0,
            _ => 0.0,
        }
    }

    /// (forward, right) axes in [-1, 1]
    pub const fn axes(&self) -> (f32, f32) {
        (
            Self::to_direction(self.forward, self.backward),
            Self::to_direction(self.right, self.left),
        )
    }

    pub fn is_moving(&self) -> bool {
        self.axes() != (0.0, 0.0)
    }

    /// Record a key change. Returns false for keys that do not move.
    pub fn set_key(&mut self, keycode: KeyCode, pressed: bool) -> bool {
        match keycode {
            KeyCode::KeyW | KeyCode::ArrowUp => self.forward = pressed,
            KeyCode::KeyS | KeyCode::ArrowDown => self.backward = pressed,
            KeyCode::KeyA | KeyCode::ArrowLeft => self.left = pressed,
            KeyCode::KeyD | KeyCode::ArrowRight => self.right = pressed,
            _ => return false,
        }
        true
    }

    pub fn process_keyboard(&mut self, event: &KeyEvent) -> bool {
        match event.physical_key {
            PhysicalKey::Code(keycode) => self.set_key(keycode, event.state.is_pressed()),
            PhysicalKey::Unidentified(_) => false,
        }
    }

    /// Release every key, e.g. when capture is lost mid-press
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Move the controlled object for `delta` seconds at `speed` units per second
    pub fn apply<S: PointerSurface>(
        &self,
        controls: &mut PointerLockControls<S>,
        speed: f32,
        delta: f32,
    ) {
        let (forward, right) = self.axes();
        let step = speed * delta;
        if forward != 0.0 {
            controls.move_forward(forward * step);
        }
        if right != 0.0 {
            controls.move_right(right * step);
        }
    }
}
