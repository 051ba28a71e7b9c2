// cli.rs - Command-line interface configuration
use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use crate::config::ControlsConfig;

#[derive(Parser, Debug, Clone)]
#[command(name = "pointer-lock-demo")]
#[command(about = "Pointer-lock first-person camera demo", long_about = None)]
pub struct Cli {
    /// JSON file with controls configuration
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override the pointer speed multiplier
    #[arg(long = "pointer-speed")]
    pub pointer_speed: Option<f32>,

    /// Override the minimum polar angle (radians)
    #[arg(long = "min-polar")]
    pub min_polar: Option<f32>,

    /// Override the maximum polar angle (radians)
    #[arg(long = "max-polar")]
    pub max_polar: Option<f32>,

    /// Movement speed in units per second
    #[arg(long = "move-speed", default_value_t = 5.0)]
    pub move_speed: f32,
}

impl Cli {
    /// Controls configuration from the config file (or defaults) with CLI overrides applied
    pub fn controls_config(&self) -> Result<ControlsConfig> {
        let mut config = match &self.config {
            Some(path) => ControlsConfig::load(path)?,
            None => ControlsConfig::default(),
        };
        if let Some(speed) = self.pointer_speed {
            config.pointer_speed = speed;
        }
        if let Some(min) = self.min_polar {
            config.min_polar_angle = min;
        }
        if let Some(max) = self.max_polar {
            config.max_polar_angle = max;
        }
        config.validate()?;
        Ok(config)
    }
}
