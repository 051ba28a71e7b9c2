use glam::Vec3;
use log::{debug, warn};
use std::rc::Rc;

use super::events::{ControlsEvent, EventDispatcher, EventKind, ListenerId};
use super::object::SharedObject;
use crate::config::{self, ControlsConfig};
use crate::error::{CaptureError, ControlsError};
use crate::math::{clamp_polar, wrap_angle, Orientation, POINTER_RADIANS_PER_PIXEL};
use crate::traits::{CaptureResponse, PointerSurface, SurfaceEvent};

/// Lock bookkeeping. Callers only ever see `is_locked()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LockPhase {
    Unlocked,
    /// Capture requested, grant not yet observed
    Pending,
    Locked,
    /// Release requested, confirmation not yet observed
    PendingRelease,
}

/// First-person camera controls driven by exclusive pointer capture.
///
/// The host feeds [`SurfaceEvent`]s from its event loop into
/// [`PointerLockControls::handle_event`]. While locked, raw pointer motion turns
/// into yaw and pitch on the shared target. `lock` and `unlock` only issue
/// requests to the surface; their outcome is reported through the `lock`,
/// `unlock` and `error` events, whether the surface answers synchronously or
/// through a later notification.
///
/// Listeners run while the controls are mutably borrowed, so they cannot call
/// back into the controls. They may freely borrow the shared target.
pub struct PointerLockControls<S: PointerSurface> {
    object: SharedObject,
    surface: S,
    min_polar_angle: f32,
    max_polar_angle: f32,
    pointer_speed: f32,
    orientation: Orientation,
    phase: LockPhase,
    connected: bool,
    disposed: bool,
    events: EventDispatcher<ControlsEvent>,
}

impl<S: PointerSurface> PointerLockControls<S> {
    /// Create controls for `object`, connected to `surface`, with default bounds.
    /// The object's rotation is read but not written.
    pub fn new(object: SharedObject, surface: S) -> Self {
        let defaults = ControlsConfig::default();
        let orientation = object.borrow().orientation();
        let mut controls = Self {
            object,
            surface,
            min_polar_angle: defaults.min_polar_angle,
            max_polar_angle: defaults.max_polar_angle,
            pointer_speed: defaults.pointer_speed,
            orientation,
            phase: LockPhase::Unlocked,
            connected: false,
            disposed: false,
            events: EventDispatcher::new(),
        };
        controls.connect_unchecked();
        controls
    }

    pub fn with_config(
        object: SharedObject,
        surface: S,
        config: &ControlsConfig,
    ) -> Result<Self, ControlsError> {
        config.validate()?;
        let mut controls = Self::new(object, surface);
        controls.min_polar_angle = config.min_polar_angle;
        controls.max_polar_angle = config.max_polar_angle;
        controls.pointer_speed = config.pointer_speed;
        Ok(controls)
    }

    // === Lifecycle ===

    /// Start handling surface events. Idempotent.
    pub fn connect(&mut self) -> Result<(), ControlsError> {
        if self.disposed {
            return Err(ControlsError::Disposed);
        }
        self.connect_unchecked();
        Ok(())
    }

    fn connect_unchecked(&mut self) {
        if self.connected {
            return;
        }
        self.connected = true;
        // Notifications missed while disconnected are not replayed; adopt the surface's state
        if matches!(self.phase, LockPhase::PendingRelease)
            || self.surface.has_pointer_capture() != self.is_locked()
        {
            self.phase = if self.surface.has_pointer_capture() {
                LockPhase::Locked
            } else {
                LockPhase::Unlocked
            };
        }
        debug!("pointer lock controls connected (locked: {})", self.is_locked());
    }

    /// Stop handling surface events. The target is not mutated by the controls
    /// after this returns. An in-flight lock request is abandoned.
    pub fn disconnect(&mut self) {
        if !self.connected {
            return;
        }
        self.connected = false;
        if self.phase == LockPhase::Pending {
            self.phase = LockPhase::Unlocked;
        }
        debug!("pointer lock controls disconnected");
    }

    /// Disconnect, release any held capture and drop all listeners. Idempotent.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disconnect();
        if self.phase != LockPhase::Unlocked || self.surface.has_pointer_capture() {
            // Liveness is already off, so the release resolves without events
            let _ = self.surface.exit_pointer_lock();
        }
        self.phase = LockPhase::Unlocked;
        self.events.clear();
        self.disposed = true;
        debug!("pointer lock controls disposed");
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn is_locked(&self) -> bool {
        matches!(self.phase, LockPhase::Locked | LockPhase::PendingRelease)
    }

    fn is_live(&self) -> bool {
        self.connected && !self.disposed
    }

    // === Capture requests ===

    /// Request exclusive pointer capture. The outcome arrives as a `lock` or
    /// `error` event.
    pub fn lock(&mut self) -> Result<(), ControlsError> {
        if self.disposed {
            return Err(ControlsError::Disposed);
        }
        if !self.connected {
            return Err(ControlsError::NotConnected);
        }
        if self.phase != LockPhase::Unlocked {
            debug!("lock ignored: capture already held or in flight ({:?})", self.phase);
            return Ok(());
        }

        self.orientation = self.object.borrow().orientation();
        self.phase = LockPhase::Pending;
        match self.surface.request_pointer_lock() {
            CaptureResponse::Granted => self.on_capture_change(true),
            CaptureResponse::Pending => debug!("pointer lock requested, awaiting grant"),
            CaptureResponse::Denied(err) => {
                self.phase = LockPhase::Unlocked;
                self.report_error(err);
            }
        }
        Ok(())
    }

    /// Request release of pointer capture. The outcome arrives as an `unlock`
    /// or `error` event.
    pub fn unlock(&mut self) -> Result<(), ControlsError> {
        if self.disposed {
            return Err(ControlsError::Disposed);
        }
        if !self.connected {
            return Err(ControlsError::NotConnected);
        }
        match self.phase {
            LockPhase::Locked => {
                self.phase = LockPhase::PendingRelease;
                match self.surface.exit_pointer_lock() {
                    CaptureResponse::Granted => self.on_capture_change(false),
                    CaptureResponse::Pending => debug!("pointer release requested, awaiting confirmation"),
                    CaptureResponse::Denied(err) => {
                        self.phase = LockPhase::Locked;
                        self.report_error(err);
                    }
                }
            }
            LockPhase::Pending => {
                // Withdraw the request; the surface replaces it with a release
                self.phase = LockPhase::Unlocked;
                let _ = self.surface.exit_pointer_lock();
                debug!("pending pointer lock withdrawn");
            }
            LockPhase::Unlocked | LockPhase::PendingRelease => {}
        }
        Ok(())
    }

    // === Surface event handlers ===

    /// Route one host event to its handler
    pub fn handle_event(&mut self, event: &SurfaceEvent) {
        match event {
            SurfaceEvent::PointerMotion { dx, dy } => self.on_pointer_motion(*dx, *dy),
            SurfaceEvent::CaptureChange { captured } => self.on_capture_change(*captured),
            SurfaceEvent::CaptureError { reason } => self.on_capture_error(reason),
        }
    }

    /// Single state-transition handler for every capture change, requested or external
    pub fn on_capture_change(&mut self, captured: bool) {
        if !self.is_live() {
            return;
        }
        match (captured, self.phase) {
            (true, LockPhase::Unlocked | LockPhase::Pending) => {
                self.phase = LockPhase::Locked;
                debug!("pointer locked");
                self.events.dispatch(&ControlsEvent::Lock);
            }
            (false, LockPhase::Locked | LockPhase::PendingRelease) => {
                self.phase = LockPhase::Unlocked;
                debug!("pointer unlocked");
                self.events.dispatch(&ControlsEvent::Unlock);
            }
            (false, LockPhase::Pending) => {
                self.phase = LockPhase::Unlocked;
                self.report_error(CaptureError::new(
                    "pointer capture ended before it was granted",
                ));
            }
            (true, LockPhase::Locked | LockPhase::PendingRelease)
            | (false, LockPhase::Unlocked) => {}
        }
    }

    pub fn on_capture_error(&mut self, reason: &str) {
        if !self.is_live() {
            return;
        }
        match self.phase {
            LockPhase::Pending => self.phase = LockPhase::Unlocked,
            LockPhase::PendingRelease => self.phase = LockPhase::Locked,
            LockPhase::Locked | LockPhase::Unlocked => {}
        }
        self.report_error(CaptureError::new(reason));
    }

    /// Apply raw pointer motion in pixels. Ignored unless locked and connected.
    pub fn on_pointer_motion(&mut self, dx: f32, dy: f32) {
        if !self.is_live() || !self.is_locked() {
            return;
        }

        let scale = self.pointer_speed * POINTER_RADIANS_PER_PIXEL;
        let yaw = wrap_angle(self.orientation.yaw - dx * scale);
        // Pitch is a polar angle: pointer moving up (negative dy) lowers it and looks up
        let pitch = clamp_polar(
            self.orientation.pitch + dy * scale,
            self.min_polar_angle,
            self.max_polar_angle,
        );
        self.orientation = Orientation::new(yaw, pitch);
        self.object.borrow_mut().rotation = self.orientation.to_quat();

        self.events.dispatch(&ControlsEvent::Change);
    }

    fn report_error(&mut self, err: CaptureError) {
        warn!("{}", err);
        self.events.dispatch(&ControlsEvent::Error(err));
    }

    // === Queries and movement ===

    /// Shared handle to the controlled object
    pub fn object(&self) -> SharedObject {
        Rc::clone(&self.object)
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Accumulated yaw and pitch
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn yaw(&self) -> f32 {
        self.orientation.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.orientation.pitch
    }

    /// Write the object's facing unit vector into `out` and return it
    pub fn get_direction(&self, out: &mut Vec3) -> Vec3 {
        *out = self.object.borrow().rotation * Vec3::NEG_Z;
        *out
    }

    /// Move along the facing direction projected onto the horizontal plane
    pub fn move_forward(&mut self, distance: f32) {
        let mut object = self.object.borrow_mut();
        let right = object.rotation * Vec3::X;
        let forward = Vec3::Y.cross(right);
        object.position += forward * distance;
    }

    pub fn move_right(&mut self, distance: f32) {
        let mut object = self.object.borrow_mut();
        let right = object.rotation * Vec3::X;
        object.position += right * distance;
    }

    // === Configuration ===

    pub fn min_polar_angle(&self) -> f32 {
        self.min_polar_angle
    }

    pub fn max_polar_angle(&self) -> f32 {
        self.max_polar_angle
    }

    pub fn pointer_speed(&self) -> f32 {
        self.pointer_speed
    }

    pub fn set_min_polar_angle(&mut self, angle: f32) -> Result<(), ControlsError> {
        self.set_polar_angles(angle, self.max_polar_angle)
    }

    pub fn set_max_polar_angle(&mut self, angle: f32) -> Result<(), ControlsError> {
        self.set_polar_angles(self.min_polar_angle, angle)
    }

    /// Set both pitch bounds at once. Leaves the old bounds in place on error.
    pub fn set_polar_angles(&mut self, min: f32, max: f32) -> Result<(), ControlsError> {
        config::validate_polar_angles(min, max)?;
        self.min_polar_angle = min;
        self.max_polar_angle = max;
        Ok(())
    }

    pub fn set_pointer_speed(&mut self, speed: f32) -> Result<(), ControlsError> {
        config::validate_pointer_speed(speed)?;
        self.pointer_speed = speed;
        Ok(())
    }

    pub fn apply_config(&mut self, config: &ControlsConfig) -> Result<(), ControlsError> {
        config.validate()?;
        self.min_polar_angle = config.min_polar_angle;
        self.max_polar_angle = config.max_polar_angle;
        self.pointer_speed = config.pointer_speed;
        Ok(())
    }

    pub fn config(&self) -> ControlsConfig {
        ControlsConfig {
            min_polar_angle: self.min_polar_angle,
            max_polar_angle: self.max_polar_angle,
            pointer_speed: self.pointer_speed,
        }
    }

    // === Events ===

    pub fn add_event_listener<F>(&mut self, kind: EventKind, listener: F) -> ListenerId
    where
        F: FnMut(&ControlsEvent) + 'static,
    {
        self.events.add_listener(kind, listener)
    }

    pub fn remove_event_listener(&mut self, id: ListenerId) -> bool {
        self.events.remove_listener(id)
    }

    pub fn has_event_listener(&self, kind: EventKind) -> bool {
        self.events.has_listener(kind)
    }
}

impl<S: PointerSurface> Drop for PointerLockControls<S> {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::headless::HeadlessSurface;
    use crate::core::object::Object3D;
    use std::cell::RefCell;
    use std::f32::consts::{FRAC_PI_2, PI};

    fn controls_with(surface: HeadlessSurface) -> PointerLockControls<HeadlessSurface> {
        PointerLockControls::new(Object3D::default().shared(), surface)
    }

    fn record(
        controls: &mut PointerLockControls<HeadlessSurface>,
        kind: EventKind,
    ) -> Rc<RefCell<Vec<ControlsEvent>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = log.clone();
        controls.add_event_listener(kind, move |event| sink.borrow_mut().push(event.clone()));
        log
    }

    #[test]
    fn test_new_is_connected_and_unlocked() {
        let controls = controls_with(HeadlessSurface::immediate());
        assert!(controls.is_connected());
        assert!(!controls.is_locked());
        assert_eq!(controls.min_polar_angle(), 0.0);
        assert_eq!(controls.max_polar_angle(), PI);
        assert_eq!(controls.pointer_speed(), 1.0);
    }

    #[test]
    fn test_new_does_not_touch_rotation() {
        let object = Object3D::looking(Vec3::ZERO, Orientation::new(0.3, 1.2)).shared();
        let before = object.borrow().rotation;
        let controls = PointerLockControls::new(object.clone(), HeadlessSurface::immediate());
        assert_eq!(object.borrow().rotation, before);
        assert!((controls.yaw() - 0.3).abs() < 1e-5);
        assert!((controls.pitch() - 1.2).abs() < 1e-5);
    }

    #[test]
    fn test_pending_phase_is_not_locked() {
        let mut controls = controls_with(HeadlessSurface::deferred());
        controls.lock().unwrap();
        assert!(!controls.is_locked());
        controls.on_pointer_motion(100.0, 0.0);
        assert_eq!(controls.yaw(), 0.0);
    }

    #[test]
    fn test_pending_release_still_applies_motion() {
        let mut controls = controls_with(HeadlessSurface::deferred());
        controls.lock().unwrap();
        controls.on_capture_change(true);
        controls.unlock().unwrap();
        assert!(controls.is_locked());

        controls.on_pointer_motion(10.0, 0.0);
        assert!((controls.yaw() + 0.02).abs() < 1e-5);
    }

    #[test]
    fn test_capture_released_before_grant_reports_error() {
        let mut controls = controls_with(HeadlessSurface::deferred());
        let errors = record(&mut controls, EventKind::Error);
        let unlocks = record(&mut controls, EventKind::Unlock);

        controls.lock().unwrap();
        controls.on_capture_change(false);

        assert!(!controls.is_locked());
        assert_eq!(errors.borrow().len(), 1);
        assert!(unlocks.borrow().is_empty());
    }

    #[test]
    fn test_failed_release_keeps_lock() {
        let mut controls = controls_with(HeadlessSurface::deferred());
        controls.lock().unwrap();
        controls.on_capture_change(true);
        controls.unlock().unwrap();
        controls.on_capture_error("release refused");
        assert!(controls.is_locked());
    }

    #[test]
    fn test_unlock_withdraws_pending_request() {
        let mut controls = controls_with(HeadlessSurface::deferred());
        let locks = record(&mut controls, EventKind::Lock);
        controls.lock().unwrap();
        controls.unlock().unwrap();

        assert_eq!(controls.surface().exit_requests(), 1);
        // Release resolves as captured = false while already unlocked
        if let Some(event) = controls.surface_mut().resolve_pending() {
            controls.handle_event(&event);
        }
        assert!(!controls.is_locked());
        assert!(locks.borrow().is_empty());
    }

    #[test]
    fn test_duplicate_grant_emits_single_lock() {
        let mut controls = controls_with(HeadlessSurface::immediate());
        let locks = record(&mut controls, EventKind::Lock);
        controls.lock().unwrap();
        controls.lock().unwrap();
        controls.on_capture_change(true);
        assert_eq!(locks.borrow().len(), 1);
        assert_eq!(controls.surface().lock_requests(), 1);
    }

    #[test]
    fn test_lock_reseeds_from_object() {
        let object = Object3D::default().shared();
        let mut controls = PointerLockControls::new(object.clone(), HeadlessSurface::immediate());
        object.borrow_mut().rotation = Orientation::new(1.0, 1.0).to_quat();

        controls.lock().unwrap();
        assert!((controls.yaw() - 1.0).abs() < 1e-5);
        assert!((controls.pitch() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_motion_emits_change() {
        let mut controls = controls_with(HeadlessSurface::immediate());
        let changes = record(&mut controls, EventKind::Change);
        controls.on_pointer_motion(5.0, 5.0);
        assert!(changes.borrow().is_empty());

        controls.lock().unwrap();
        controls.on_pointer_motion(5.0, 5.0);
        assert_eq!(changes.borrow().len(), 1);
    }

    #[test]
    fn test_pitch_sign_convention() {
        let mut controls = controls_with(HeadlessSurface::immediate());
        controls.lock().unwrap();
        // Pointer moving up (negative dy) raises the view
        controls.on_pointer_motion(0.0, -100.0);
        assert!((controls.pitch() - (FRAC_PI_2 - 0.2)).abs() < 1e-5);
        let mut dir = Vec3::ZERO;
        controls.get_direction(&mut dir);
        assert!(dir.y > 0.0);

        controls.on_pointer_motion(0.0, 200.0);
        controls.get_direction(&mut dir);
        assert!(dir.y < 0.0);
    }

    #[test]
    fn test_connect_after_dispose_fails() {
        let mut controls = controls_with(HeadlessSurface::immediate());
        controls.dispose();
        assert_eq!(controls.connect(), Err(ControlsError::Disposed));
        assert_eq!(controls.unlock(), Err(ControlsError::Disposed));
    }

    #[test]
    fn test_lock_while_disconnected_fails() {
        let mut controls = controls_with(HeadlessSurface::immediate());
        controls.disconnect();
        assert_eq!(controls.lock(), Err(ControlsError::NotConnected));
        controls.connect().unwrap();
        assert!(controls.lock().is_ok());
    }

    #[test]
    fn test_connect_is_idempotent() {
        let mut controls = controls_with(HeadlessSurface::immediate());
        controls.connect().unwrap();
        controls.connect().unwrap();
        assert!(controls.is_connected());
    }

    #[test]
    fn test_reconnect_adopts_surface_state() {
        let mut controls = controls_with(HeadlessSurface::immediate());
        controls.lock().unwrap();
        controls.disconnect();
        controls.surface_mut().lose_capture();
        controls.connect().unwrap();
        assert!(!controls.is_locked());
    }

    #[test]
    fn test_dispose_releases_capture_silently() {
        let mut controls = controls_with(HeadlessSurface::immediate());
        let unlocks = record(&mut controls, EventKind::Unlock);
        controls.lock().unwrap();
        controls.dispose();

        assert!(!controls.surface().has_pointer_capture());
        assert!(!controls.is_locked());
        assert!(unlocks.borrow().is_empty());
        assert!(!controls.has_event_listener(EventKind::Unlock));

        controls.dispose();
        assert!(controls.is_disposed());
    }

    #[test]
    fn test_setters_validate() {
        let mut controls = controls_with(HeadlessSurface::immediate());
        assert_eq!(
            controls.set_min_polar_angle(3.5),
            Err(ControlsError::PolarAngleOutOfRange(3.5))
        );
        controls.set_max_polar_angle(1.0).unwrap();
        assert_eq!(
            controls.set_min_polar_angle(2.0),
            Err(ControlsError::InvalidPolarRange { min: 2.0, max: 1.0 })
        );
        assert_eq!(controls.min_polar_angle(), 0.0);
        assert_eq!(
            controls.set_pointer_speed(-0.5),
            Err(ControlsError::InvalidPointerSpeed(-0.5))
        );
        assert_eq!(controls.pointer_speed(), 1.0);
    }

    #[test]
    fn test_with_config_rejects_invalid() {
        let config = ControlsConfig {
            pointer_speed: -1.0,
            ..Default::default()
        };
        let result =
            PointerLockControls::with_config(Object3D::default().shared(), HeadlessSurface::immediate(), &config);
        assert!(matches!(result, Err(ControlsError::InvalidPointerSpeed(_))));
    }

    #[test]
    fn test_moves_do_not_rotate() {
        let object = Object3D::looking(Vec3::ZERO, Orientation::new(0.7, 0.4)).shared();
        let mut controls = PointerLockControls::new(object.clone(), HeadlessSurface::immediate());
        let rotation = object.borrow().rotation;

        controls.move_forward(3.0);
        controls.move_right(-2.0);

        assert_eq!(object.borrow().rotation, rotation);
        assert!(object.borrow().position.y.abs() < 1e-5);
    }

    #[test]
    fn test_forward_speed_independent_of_pitch() {
        for pitch in [0.1f32, 0.8, FRAC_PI_2, 2.5, 3.0] {
            let object = Object3D::looking(Vec3::ZERO, Orientation::new(0.0, pitch)).shared();
            let mut controls = PointerLockControls::new(object.clone(), HeadlessSurface::immediate());
            controls.move_forward(2.0);
            let position = object.borrow().position;
            assert!((position - Vec3::new(0.0, 0.0, -2.0)).length() < 1e-4, "pitch {}", pitch);
        }
    }
}
