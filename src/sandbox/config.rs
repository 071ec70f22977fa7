use std::env;

// Runtime knobs for the sandbox (not gameplay tuning, that lives in the level file).

pub fn level_path() -> String {
    env::var("LEVEL_PATH").unwrap_or_else(|_| "levels/default_level.json".to_string())
}

/// Fixed steps to run before exiting.
pub fn sandbox_ticks() -> u32 {
    env::var("SANDBOX_TICKS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(600)
}

/// Pace ticks against the wall clock instead of running flat out.
pub fn sandbox_realtime() -> bool {
    env::var("SANDBOX_REALTIME")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(true)
}

/// Ticks spent aiming before the scripted kick.
pub const AIM_TICKS: u32 = 40;
pub const LOG_EVERY_TICKS: u32 = 10;
