use glam::Vec2;
use serde::Deserialize;

use crate::error::ConfigError;
use crate::query::{CollisionLayer, LayerMask};

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct AimSettings {
    /// Aim vector at session start.
    pub initial: Vec2,
    /// Lower corner of the clamp box.
    pub min: Vec2,
    /// Upper corner of the clamp box.
    pub max: Vec2,
    /// Per-tick ramp growth factor `k` while an axis is held.
    pub ramp_rate: f32,
    /// Scale from ramped input to aim units per second.
    pub gain: f32,
}

impl Default for AimSettings {
    fn default() -> Self {
        Self {
            initial: Vec2::ONE,
            min: Vec2::splat(0.1),
            max: Vec2::new(3.0, 3.0),
            ramp_rate: 0.025,
            gain: 0.25,
        }
    }
}

impl AimSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.max.x > self.min.x) {
            return Err(ConfigError::EmptyClampBox {
                axis: 'x',
                min: self.min.x,
                max: self.max.x,
            });
        }
        if !(self.max.y > self.min.y) {
            return Err(ConfigError::EmptyClampBox {
                axis: 'y',
                min: self.min.y,
                max: self.max.y,
            });
        }
        // Ramp multipliers never drop below 1.
        for (name, value) in [("ramp_rate", self.ramp_rate), ("gain", self.gain)] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::InvalidAimRate { name, value });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct TrajectorySettings {
    /// Number of points in the preview polyline, including the start.
    pub step_count: usize,
    /// Simulated seconds per preview step.
    pub timestep: f32,
    pub gravity: Vec2,
    /// Linear damping coefficient applied as `v /= 1 + drag * dt`.
    pub drag: f32,
}

impl Default for TrajectorySettings {
    fn default() -> Self {
        Self {
            step_count: 75,
            timestep: 0.02,
            gravity: Vec2::new(0.0, -9.81),
            drag: 0.0,
        }
    }
}

impl TrajectorySettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.step_count == 0 {
            return Err(ConfigError::ZeroStepCount);
        }
        if !(self.timestep.is_finite() && self.timestep > 0.0) {
            return Err(ConfigError::InvalidTimestep(self.timestep));
        }
        if !(self.drag >= 0.0) {
            return Err(ConfigError::NegativeDrag(self.drag));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct SlowdownSettings {
    /// True speed above which a hazard ahead starts slow motion.
    pub threshold_speed: f32,
    /// How far ahead along the true velocity the hazard probe looks.
    pub max_sweep_distance: f32,
    pub min_scale: f32,
    /// Scale lost per second while a hazard is ahead.
    pub decrease_rate: f32,
    /// Scale regained per second otherwise.
    pub increase_rate: f32,
}

impl Default for SlowdownSettings {
    fn default() -> Self {
        Self {
            threshold_speed: 4.0,
            max_sweep_distance: 1.5,
            min_scale: 0.125,
            decrease_rate: 25.0,
            increase_rate: 50.0,
        }
    }
}

impl SlowdownSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.min_scale > 0.0 && self.min_scale <= 1.0) {
            return Err(ConfigError::InvalidMinScale(self.min_scale));
        }
        if !(self.decrease_rate >= 0.0) {
            return Err(ConfigError::NegativeRate {
                name: "decrease_rate",
                value: self.decrease_rate,
            });
        }
        if !(self.increase_rate >= 0.0) {
            return Err(ConfigError::NegativeRate {
                name: "increase_rate",
                value: self.increase_rate,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct AudioSettings {
    /// How quickly voices glide toward the published time scale.
    pub glide_rate: f32,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self { glide_rate: 2.5 }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct KickSettings {
    pub aim: AimSettings,
    pub trajectory: TrajectorySettings,
    pub slowdown: SlowdownSettings,
    pub audio: AudioSettings,
    /// Impulse per unit of aim applied on kick.
    pub kick_multiplier: f32,
    /// Fixed ticks between the kick request and the impulse (the swing).
    pub kick_windup_ticks: u32,
    /// True speed under which the preview comes back after a kick.
    pub rearm_speed: f32,
    /// Layers the preview bounces off and the slowdown probe looks for.
    pub hazard_layers: Vec<CollisionLayer>,
    /// Layers holding force emitters.
    pub force_layers: Vec<CollisionLayer>,
}

impl Default for KickSettings {
    fn default() -> Self {
        Self {
            aim: AimSettings::default(),
            trajectory: TrajectorySettings::default(),
            slowdown: SlowdownSettings::default(),
            audio: AudioSettings::default(),
            kick_multiplier: 4.0,
            kick_windup_ticks: 6,
            rearm_speed: 0.5,
            hazard_layers: vec![
                CollisionLayer::Ground,
                CollisionLayer::Obstacle,
                CollisionLayer::Hazard,
            ],
            force_layers: vec![CollisionLayer::Fan],
        }
    }
}

impl KickSettings {
    pub fn hazard_mask(&self) -> LayerMask {
        LayerMask::from_layers(&self.hazard_layers)
    }

    pub fn force_mask(&self) -> LayerMask {
        LayerMask::from_layers(&self.force_layers)
    }
}
