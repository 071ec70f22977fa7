use std::path::Path;

use serde::Deserialize;
use tracing::info;

use crate::error::LevelError;
use crate::query::{CollisionLayer, SurfaceMaterial};
use crate::settings::KickSettings;

/// Static collider in world units, y up.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MapObject {
    Circle {
        x: f32,
        y: f32,
        radius: f32,
        #[serde(default)]
        material: Option<SurfaceMaterial>,
        layers: Vec<CollisionLayer>,
    },
    /// Axis-aligned box with its lower-left corner at (x, y).
    Rect {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        #[serde(default)]
        material: Option<SurfaceMaterial>,
        layers: Vec<CollisionLayer>,
    },
}

impl MapObject {
    pub fn layers(&self) -> &[CollisionLayer] {
        match self {
            MapObject::Circle { layers, .. } | MapObject::Rect { layers, .. } => layers,
        }
    }

    pub fn material(&self) -> Option<SurfaceMaterial> {
        match self {
            MapObject::Circle { material, .. } | MapObject::Rect { material, .. } => *material,
        }
    }
}

fn fan_layers() -> Vec<CollisionLayer> {
    vec![CollisionLayer::Fan]
}

/// A fan and the box its air stream covers. The box is centered on (x, y) and turns
/// with the fan; the stream blows along the fan's local -Y.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FanDef {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    #[serde(default)]
    pub angle_deg: f32,
    pub blow_force: f32,
    #[serde(default)]
    pub oscillating: bool,
    /// Sweeps per second between the two limits.
    #[serde(default)]
    pub osc_speed: f32,
    #[serde(default)]
    pub min_angle: f32,
    #[serde(default)]
    pub max_angle: f32,
    #[serde(default = "fan_layers")]
    pub layers: Vec<CollisionLayer>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BallDef {
    pub spawn_x: f32,
    pub spawn_y: f32,
    pub radius: f32,
    pub mass: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GameLevel {
    pub name: String,
    pub objects: Vec<MapObject>,
    #[serde(default)]
    pub fans: Vec<FanDef>,
    pub ball: BallDef,
    #[serde(default)]
    pub kick: KickSettings,
}

impl GameLevel {
    pub fn from_json(data: &str) -> Result<Self, LevelError> {
        Ok(serde_json::from_str(data)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, LevelError> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path).map_err(|source| LevelError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let level = Self::from_json(&data)?;
        info!(
            name = %level.name,
            objects = level.objects.len(),
            fans = level.fans.len(),
            "level loaded"
        );
        Ok(level)
    }
}
