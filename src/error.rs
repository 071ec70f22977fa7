use std::path::PathBuf;

use thiserror::Error;

/// Setup-time configuration problems. Each one disables the subsystem it belongs to.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("body mass must be positive, got {0}")]
    NonPositiveMass(f32),
    #[error("body radius must not be negative, got {0}")]
    NegativeRadius(f32),
    #[error("aim clamp box is empty on the {axis} axis (min {min}, max {max})")]
    EmptyClampBox { axis: char, min: f32, max: f32 },
    #[error("aim `{name}` must be a finite, non-negative number, got {value}")]
    InvalidAimRate { name: &'static str, value: f32 },
    #[error("trajectory step count must be at least 1")]
    ZeroStepCount,
    #[error("timestep must be positive and finite, got {0}")]
    InvalidTimestep(f32),
    #[error("drag coefficient must be a non-negative number, got {0}")]
    NegativeDrag(f32),
    #[error("dilation min scale must be in (0, 1], got {0}")]
    InvalidMinScale(f32),
    #[error("dilation rate `{name}` must be a non-negative number, got {value}")]
    NegativeRate { name: &'static str, value: f32 },
    #[error("missing required reference: {0}")]
    MissingReference(&'static str),
}

/// Failures while reading a level file.
#[derive(Debug, Error)]
pub enum LevelError {
    #[error("failed to read level {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse level")]
    Parse(#[from] serde_json::Error),
}
