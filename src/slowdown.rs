use glam::Vec2;

use crate::error::ConfigError;
use crate::query::{Circle, CollisionQuery, LayerMask};
use crate::settings::SlowdownSettings;

/// Looks ahead of the true body along its velocity for a hazard.
///
/// A zero velocity has no direction, so it never reports a hazard.
pub fn probe_hazard(
    collisions: &dyn CollisionQuery,
    pos: Vec2,
    vel: Vec2,
    max_distance: f32,
    mask: LayerMask,
) -> bool {
    let dir = vel.normalize_or_zero();
    if dir == Vec2::ZERO || max_distance <= 0.0 {
        return false;
    }
    collisions
        .sweep(Circle::new(pos, 0.0), dir * max_distance, mask)
        .is_some()
}

/// Time dilation control loop.
///
/// Drops quickly toward `min_scale` while a fast body is about to hit a hazard, and
/// climbs back to 1 at its own rate otherwise.
#[derive(Debug, Clone)]
pub struct SlowdownController {
    settings: SlowdownSettings,
    scale: f32,
}

impl SlowdownController {
    pub fn new(settings: SlowdownSettings) -> Result<Self, ConfigError> {
        settings.validate()?;
        Ok(Self {
            settings,
            scale: 1.0,
        })
    }

    pub fn settings(&self) -> &SlowdownSettings {
        &self.settings
    }

    pub fn time_scale(&self) -> f32 {
        self.scale
    }

    pub fn is_slowed(&self) -> bool {
        self.scale < 1.0
    }

    pub fn update(&mut self, true_vel: Vec2, hazard_ahead: bool, dt: f32) -> f32 {
        if hazard_ahead && true_vel.length() > self.settings.threshold_speed {
            self.scale -= self.settings.decrease_rate * dt;
        } else if self.scale < 1.0 {
            self.scale += self.settings.increase_rate * dt;
        }
        self.scale = self.scale.clamp(self.settings.min_scale, 1.0);
        self.scale
    }
}
