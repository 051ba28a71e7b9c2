// config.rs - Controls configuration and validation
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;
use std::path::Path;

use crate::error::ControlsError;

/// Tunable parameters of the pointer-lock controls
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlsConfig {
    /// Lower pitch bound in radians (0 = straight up)
    pub min_polar_angle: f32,
    /// Upper pitch bound in radians (PI = straight down)
    pub max_polar_angle: f32,
    /// Multiplier on raw pointer motion
    pub pointer_speed: f32,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            min_polar_angle: 0.0,
            max_polar_angle: PI,
            pointer_speed: 1.0,
        }
    }
}

impl ControlsConfig {
    pub fn validate(&self) -> Result<(), ControlsError> {
        validate_polar_angles(self.min_polar_angle, self.max_polar_angle)?;
        validate_pointer_speed(self.pointer_speed)
    }

    /// Parse and validate a JSON document; missing fields take their defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).context("Failed to parse controls config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read controls config: {}", path.display()))?;
        Self::from_json_str(&json)
            .with_context(|| format!("Invalid controls config: {}", path.display()))
    }
}

pub(crate) fn validate_polar_angle(angle: f32) -> Result<(), ControlsError> {
    if !angle.is_finite() || !(0.0..=PI).contains(&angle) {
        return Err(ControlsError::PolarAngleOutOfRange(angle));
    }
    Ok(())
}

pub(crate) fn validate_polar_angles(min: f32, max: f32) -> Result<(), ControlsError> {
    validate_polar_angle(min)?;
    validate_polar_angle(max)?;
    if min > max {
        return Err(ControlsError::InvalidPolarRange { min, max });
    }
    Ok(())
}

pub(crate) fn validate_pointer_speed(speed: f32) -> Result<(), ControlsError> {
    if !speed.is_finite() || speed < 0.0 {
        return Err(ControlsError::InvalidPointerSpeed(speed));
    }
    Ok(())
}
