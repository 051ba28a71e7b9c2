use thiserror::Error;

/// Errors returned directly by controller operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ControlsError {
    #[error("invalid polar range: min {min} is greater than max {max}")]
    InvalidPolarRange { min: f32, max: f32 },

    #[error("polar angle {0} is outside [0, pi]")]
    PolarAngleOutOfRange(f32),

    #[error("invalid pointer speed {0}: must be finite and non-negative")]
    InvalidPointerSpeed(f32),

    #[error("controls have been disposed")]
    Disposed,

    #[error("controls are not connected to their surface")]
    NotConnected,
}

/// Capture request failure reported through the `error` event.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("pointer capture failed: {reason}")]
pub struct CaptureError {
    pub reason: String,
}

impl CaptureError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}
