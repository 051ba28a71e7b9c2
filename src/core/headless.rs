use crate::error::CaptureError;
use crate::traits::{CaptureResponse, PointerSurface, SurfaceEvent};

/// How a [`HeadlessSurface`] answers capture requests
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureMode {
    /// Grant and release synchronously
    Immediate,
    /// Queue requests until the host resolves them
    Deferred,
    /// Refuse every lock request with the given reason
    Deny(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PendingRequest {
    Lock,
    Release,
}

/// Scriptable surface for tests, benchmarks and windowless hosts.
///
/// In deferred mode the outcome of a request is produced by the host as a
/// [`SurfaceEvent`] to feed back into the controls, mirroring a platform that
/// answers capture requests asynchronously.
#[derive(Debug, Clone)]
pub struct HeadlessSurface {
    mode: CaptureMode,
    captured: bool,
    pending: Option<PendingRequest>,
    lock_requests: usize,
    exit_requests: usize,
}

impl HeadlessSurface {
    pub fn new(mode: CaptureMode) -> Self {
        Self {
            mode,
            captured: false,
            pending: None,
            lock_requests: 0,
            exit_requests: 0,
        }
    }

    pub fn immediate() -> Self {
        Self::new(CaptureMode::Immediate)
    }

    pub fn deferred() -> Self {
        Self::new(CaptureMode::Deferred)
    }

    pub fn denying(reason: impl Into<String>) -> Self {
        Self::new(CaptureMode::Deny(reason.into()))
    }

    pub fn set_mode(&mut self, mode: CaptureMode) {
        self.mode = mode;
    }

    pub fn mode(&self) -> &CaptureMode {
        &self.mode
    }

    pub fn lock_requests(&self) -> usize {
        self.lock_requests
    }

    pub fn exit_requests(&self) -> usize {
        self.exit_requests
    }

    pub fn has_pending_request(&self) -> bool {
        self.pending.is_some()
    }

    /// Complete the queued request and return the notification it produces
    pub fn resolve_pending(&mut self) -> Option<SurfaceEvent> {
        let request = self.pending.take()?;
        self.captured = request == PendingRequest::Lock;
        Some(SurfaceEvent::CaptureChange {
            captured: self.captured,
        })
    }

    /// Fail the queued request and return the error notification
    pub fn fail_pending(&mut self, reason: impl Into<String>) -> Option<SurfaceEvent> {
        self.pending.take()?;
        Some(SurfaceEvent::CaptureError {
            reason: reason.into(),
        })
    }

    /// Drop capture as the platform would on focus loss or Escape
    pub fn lose_capture(&mut self) -> Option<SurfaceEvent> {
        if !self.captured {
            return None;
        }
        self.captured = false;
        self.pending = None;
        Some(SurfaceEvent::CaptureChange { captured: false })
    }
}

impl Default for HeadlessSurface {
    fn default() -> Self {
        Self::immediate()
    }
}

impl PointerSurface for HeadlessSurface {
    fn request_pointer_lock(&mut self) -> CaptureResponse {
        self.lock_requests += 1;
        match &self.mode {
            CaptureMode::Immediate => {
                self.captured = true;
                CaptureResponse::Granted
            }
            CaptureMode::Deferred => {
                self.pending = Some(PendingRequest::Lock);
                CaptureResponse::Pending
            }
            CaptureMode::Deny(reason) => CaptureResponse::Denied(CaptureError::new(reason.clone())),
        }
    }

    fn exit_pointer_lock(&mut self) -> CaptureResponse {
        self.exit_requests += 1;
        match self.mode {
            CaptureMode::Deferred => {
                self.pending = Some(PendingRequest::Release);
                CaptureResponse::Pending
            }
            CaptureMode::Immediate | CaptureMode::Deny(_) => {
                self.captured = false;
                CaptureResponse::Granted
            }
        }
    }

    fn has_pointer_capture(&self) -> bool {
        self.captured
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_immediate_mode() {
        let mut surface = HeadlessSurface::immediate();
        assert_eq!(surface.request_pointer_lock(), CaptureResponse::Granted);
        assert!(surface.has_pointer_capture());
        assert_eq!(surface.exit_pointer_lock(), CaptureResponse::Granted);
        assert!(!surface.has_pointer_capture());
        assert_eq!(surface.lock_requests(), 1);
        assert_eq!(surface.exit_requests(), 1);
    }

    #[test]
    fn test_deferred_mode_resolves_later() {
        let mut surface = HeadlessSurface::deferred();
        assert_eq!(surface.request_pointer_lock(), CaptureResponse::Pending);
        assert!(!surface.has_pointer_capture());
        assert!(surface.has_pending_request());

        assert_eq!(
            surface.resolve_pending(),
            Some(SurfaceEvent::CaptureChange { captured: true })
        );
        assert!(surface.has_pointer_capture());
        assert_eq!(surface.resolve_pending(), None);

        assert_eq!(surface.exit_pointer_lock(), CaptureResponse::Pending);
        assert_eq!(
            surface.resolve_pending(),
            Some(SurfaceEvent::CaptureChange { captured: false })
        );
    }

    #[test]
    fn test_fail_pending() {
        let mut surface = HeadlessSurface::deferred();
        surface.request_pointer_lock();
        assert_eq!(
            surface.fail_pending("busy"),
            Some(SurfaceEvent::CaptureError {
                reason: "busy".to_string()
            })
        );
        assert!(!surface.has_pending_request());
        assert!(!surface.has_pointer_capture());
    }

    #[test]
    fn test_deny_mode() {
        let mut surface = HeadlessSurface::denying("no focus");
        match surface.request_pointer_lock() {
            CaptureResponse::Denied(err) => assert_eq!(err.reason, "no focus"),
            other => panic!("unexpected response {:?}", other),
        }
        assert!(!surface.has_pointer_capture());
    }

    #[test]
    fn test_lose_capture_only_when_captured() {
        let mut surface = HeadlessSurface::immediate();
        assert_eq!(surface.lose_capture(), None);
        surface.request_pointer_lock();
        assert_eq!(
            surface.lose_capture(),
            Some(SurfaceEvent::CaptureChange { captured: false })
        );
        assert!(!surface.has_pointer_capture());
    }
}
