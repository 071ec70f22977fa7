pub mod aim;
pub mod audio;
pub mod clock;
pub mod error;
pub mod input;
pub mod kicker;
pub mod map;
pub mod physics;
pub mod query;
pub mod scheduler;
pub mod settings;
pub mod slowdown;
pub mod trajectory;

pub use aim::AimAccumulator;
pub use audio::{AudioRateSync, VoiceBank};
pub use clock::{SharedTimeScale, TimeScaleSink};
pub use error::{ConfigError, LevelError};
pub use input::{InputBus, PlayerAction};
pub use kicker::{Kicker, PathRenderer, PolylineBuffer, Services, TickReport};
pub use map::GameLevel;
pub use physics::{Ball, Body, LevelWorld};
pub use query::{CollisionQuery, ForceFieldQuery};
pub use settings::KickSettings;
pub use slowdown::SlowdownController;
pub use trajectory::TrajectorySimulator;
