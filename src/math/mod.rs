mod angles;
mod orientation;

pub use angles::{clamp_polar, wrap_angle, POINTER_RADIANS_PER_PIXEL};
pub use orientation::Orientation;
