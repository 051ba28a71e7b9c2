use std::f32::consts::{PI, TAU};

/// Radians of rotation per pixel of raw pointer motion at `pointer_speed == 1.0`.
pub const POINTER_RADIANS_PER_PIXEL: f32 = 0.002;

/// Wrap an angle into `[-PI, PI)`.
pub fn wrap_angle(angle: f32) -> f32 {
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    // rem_euclid can round up to TAU for inputs just below a multiple of it
    if wrapped >= PI {
        wrapped - TAU
    } else {
        wrapped
    }
}

/// Clamp a polar angle into `[min, max]`.
///
/// Callers guarantee `min <= max`; the controller validates bounds on assignment.
pub fn clamp_polar(polar: f32, min: f32, max: f32) -> f32 {
    polar.max(min).min(max)
}
