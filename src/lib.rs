pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod math;
pub mod movement;
pub mod traits;

// Re-export the controller surface for convenience
pub use config::ControlsConfig;
pub use crate::core::controls::PointerLockControls;
pub use crate::core::events::{ControlsEvent, EventDispatcher, EventKind, ListenerId};
pub use crate::core::headless::{CaptureMode, HeadlessSurface};
pub use crate::core::object::{Object3D, SharedObject};
pub use error::{CaptureError, ControlsError};
pub use traits::{CaptureResponse, PointerSurface, SurfaceEvent};
