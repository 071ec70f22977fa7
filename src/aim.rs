use glam::Vec2;

use crate::error::ConfigError;
use crate::settings::AimSettings;

/// Turns held directional input into the kick aim vector.
///
/// Each axis keeps its own ramp multiplier that grows while the axis is held, so a
/// long press accelerates. Letting go of an axis resets its ramp but keeps the aim.
#[derive(Debug, Clone)]
pub struct AimAccumulator {
    aim: Vec2,
    ramp: Vec2,
    min: Vec2,
    max: Vec2,
    ramp_rate: f32,
    gain: f32,
}

impl AimAccumulator {
    pub fn new(settings: &AimSettings) -> Result<Self, ConfigError> {
        settings.validate()?;
        Ok(Self {
            aim: settings.initial.clamp(settings.min, settings.max),
            ramp: Vec2::ONE,
            min: settings.min,
            max: settings.max,
            ramp_rate: settings.ramp_rate,
            gain: settings.gain,
        })
    }

    pub fn aim(&self) -> Vec2 {
        self.aim
    }

    pub fn ramp(&self) -> Vec2 {
        self.ramp
    }

    pub fn update(&mut self, input: Vec2, dt: f32) -> Vec2 {
        self.aim.x = self.step_axis(input.x, 0, dt);
        self.aim.y = self.step_axis(input.y, 1, dt);
        self.aim = self.aim.clamp(self.min, self.max);
        self.aim
    }

    fn step_axis(&mut self, input: f32, axis: usize, dt: f32) -> f32 {
        if input == 0.0 {
            self.ramp[axis] = 1.0;
            return self.aim[axis];
        }
        self.ramp[axis] *= 1.0 + self.ramp_rate * input.abs();
        self.aim[axis] + input * self.ramp[axis] * dt * self.gain
    }
}
