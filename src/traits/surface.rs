use crate::error::CaptureError;

/// Immediate answer of a surface to a capture or release request
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureResponse {
    /// Resolved synchronously; the capture state already changed
    Granted,
    /// Resolution arrives later as a `SurfaceEvent::CaptureChange` or `CaptureError`
    Pending,
    /// Refused synchronously
    Denied(CaptureError),
}

/// Input delivered by the host's event loop for a surface
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceEvent {
    /// Raw relative pointer motion in pixels
    PointerMotion { dx: f32, dy: f32 },
    /// The surface gained or lost exclusive pointer capture
    CaptureChange { captured: bool },
    /// An asynchronous capture request failed
    CaptureError { reason: String },
}

/// Attachment surface - the element that owns exclusive pointer capture
pub trait PointerSurface {
    /// Ask for exclusive pointer capture
    fn request_pointer_lock(&mut self) -> CaptureResponse;

    /// Ask to release pointer capture
    fn exit_pointer_lock(&mut self) -> CaptureResponse;

    /// Whether this surface currently holds the capture
    fn has_pointer_capture(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    // Mock surface that grants everything synchronously
    struct MockSurface {
        captured: bool,
        requests: usize,
    }

    impl PointerSurface for MockSurface {
        fn request_pointer_lock(&mut self) -> CaptureResponse {
            self.requests += 1;
            self.captured = true;
            CaptureResponse::Granted
        }

        fn exit_pointer_lock(&mut self) -> CaptureResponse {
            self.captured = false;
            CaptureResponse::Granted
        }

        fn has_pointer_capture(&self) -> bool {
            self.captured
        }
    }

    #[test]
    fn test_mock_surface_capture_cycle() {
        let mut surface = MockSurface {
            captured: false,
            requests: 0,
        };

        assert!(!surface.has_pointer_capture());
        assert_eq!(surface.request_pointer_lock(), CaptureResponse::Granted);
        assert!(surface.has_pointer_capture());
        assert_eq!(surface.exit_pointer_lock(), CaptureResponse::Granted);
        assert!(!surface.has_pointer_capture());
        assert_eq!(surface.requests, 1);
    }

    #[test]
    fn test_surface_as_trait_object() {
        let mut surface: Box<dyn PointerSurface> = Box::new(MockSurface {
            captured: false,
            requests: 0,
        });
        surface.request_pointer_lock();
        assert!(surface.has_pointer_capture());
    }

    #[test]
    fn test_denied_response_carries_reason() {
        let response = CaptureResponse::Denied(CaptureError::new("not focused"));
        match response {
            CaptureResponse::Denied(err) => assert_eq!(err.reason, "not focused"),
            other => panic!("unexpected response {:?}", other),
        }
    }

    #[test]
    fn test_surface_event_debug() {
        let event = SurfaceEvent::PointerMotion { dx: 1.0, dy: -2.0 };
        let debug_str = format!("{:?}", event);
        assert!(debug_str.contains("PointerMotion"));
    }
}
