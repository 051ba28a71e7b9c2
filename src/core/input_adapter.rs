use log::debug;
use std::sync::Arc;
use winit::event::{DeviceEvent, ElementState, KeyEvent, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{CursorGrabMode, Window};

use crate::error::CaptureError;
use crate::traits::{CaptureResponse, PointerSurface, SurfaceEvent};

/// Adapter that bridges a Winit window to the PointerSurface trait.
///
/// Winit answers grab requests synchronously, so requests resolve as
/// `Granted` or `Denied`. Focus loss and Escape drop the grab the way a browser
/// drops pointer lock, and are reported as an external capture change.
#[derive(Debug, Clone)]
pub struct WinitSurface {
    window: Arc<Window>,
    captured: bool,
}

impl WinitSurface {
    pub fn new(window: Arc<Window>) -> Self {
        Self {
            window,
            captured: false,
        }
    }

    pub fn window(&self) -> &Arc<Window> {
        &self.window
    }

    /// Translate a window event into a surface event, releasing the grab on
    /// focus loss or Escape
    pub fn process_window_event(&mut self, event: &WindowEvent) -> Option<SurfaceEvent> {
        if self.captured && releases_capture(event) {
            self.release_grab();
            return Some(SurfaceEvent::CaptureChange { captured: false });
        }
        None
    }

    /// Translate raw device motion while the cursor is grabbed
    pub fn process_device_event(&self, event: &DeviceEvent) -> Option<SurfaceEvent> {
        if !self.captured {
            return None;
        }
        pointer_motion(event)
    }

    fn release_grab(&mut self) {
        if let Err(e) = self.window.set_cursor_grab(CursorGrabMode::None) {
            debug!("cursor release failed: {}", e);
        }
        self.window.set_cursor_visible(true);
        self.captured = false;
    }
}

impl PointerSurface for WinitSurface {
    fn request_pointer_lock(&mut self) -> CaptureResponse {
        // Locked is unsupported on some platforms, Confined on others
        let grab = self
            .window
            .set_cursor_grab(CursorGrabMode::Locked)
            .or_else(|_| self.window.set_cursor_grab(CursorGrabMode::Confined));
        match grab {
            Ok(()) => {
                self.window.set_cursor_visible(false);
                self.captured = true;
                CaptureResponse::Granted
            }
            Err(e) => CaptureResponse::Denied(CaptureError::new(e.to_string())),
        }
    }

    fn exit_pointer_lock(&mut self) -> CaptureResponse {
        self.release_grab();
        CaptureResponse::Granted
    }

    fn has_pointer_capture(&self) -> bool {
        self.captured
    }
}

/// Whether the platform would drop pointer capture on this event
pub fn releases_capture(event: &WindowEvent) -> bool {
    match event {
        WindowEvent::Focused(false) => true,
        WindowEvent::KeyboardInput { event, .. } => is_escape_press(event),
        _ => false,
    }
}

fn is_escape_press(event: &KeyEvent) -> bool {
    event.state == ElementState::Pressed
        && event.physical_key == PhysicalKey::Code(KeyCode::Escape)
}

/// Raw relative mouse motion, unaffected by cursor acceleration or clamping
pub fn pointer_motion(event: &DeviceEvent) -> Option<SurfaceEvent> {
    match event {
        DeviceEvent::MouseMotion { delta: (dx, dy) } => Some(SurfaceEvent::PointerMotion {
            dx: *dx as f32,
            dy: *dy as f32,
        }),
        _ => None,
    }
}
