use std::sync::{Arc, Mutex};

/// Receives the dilation scalar once per tick (the game's global clock).
pub trait TimeScaleSink {
    fn set_time_scale(&mut self, scale: f32);
}

/// Global time scale shared between the kicker, the physics loop and anything else
/// that reads it mid-tick. Writes go through the mutex.
#[derive(Debug, Clone)]
pub struct SharedTimeScale(Arc<Mutex<f32>>);

impl Default for SharedTimeScale {
    fn default() -> Self {
        Self(Arc::new(Mutex::new(1.0)))
    }
}

impl SharedTimeScale {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> f32 {
        *self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Real-time seconds a fixed step of `dt` takes at the current scale.
    pub fn real_step(&self, dt: f32) -> f32 {
        dt / self.get()
    }
}

impl TimeScaleSink for SharedTimeScale {
    fn set_time_scale(&mut self, scale: f32) {
        *self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = scale;
    }
}
