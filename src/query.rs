use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Layer tag carried by every collider and fan.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionLayer {
    Ground,
    Obstacle,
    Hazard,
    Fan,
}

impl CollisionLayer {
    fn bit(self) -> u32 {
        1 << (self as u32)
    }
}

/// Set of layers a query is allowed to see.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct LayerMask(u32);

impl LayerMask {
    pub const NONE: LayerMask = LayerMask(0);

    pub fn from_layers(layers: &[CollisionLayer]) -> Self {
        Self(layers.iter().fold(0, |bits, l| bits | l.bit()))
    }

    pub fn contains(self, layer: CollisionLayer) -> bool {
        self.0 & layer.bit() != 0
    }

    /// True if any of the given tags is inside the mask.
    pub fn matches(self, layers: &[CollisionLayer]) -> bool {
        layers.iter().any(|l| self.contains(*l))
    }
}

/// Bounciness and friction of a collidable surface.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SurfaceMaterial {
    pub restitution: f32,
    pub friction: f32,
}

impl SurfaceMaterial {
    pub const NONE: SurfaceMaterial = SurfaceMaterial {
        restitution: 0.0,
        friction: 0.0,
    };

    pub fn new(restitution: f32, friction: f32) -> Self {
        Self {
            restitution: restitution.clamp(0.0, 1.0),
            friction: friction.clamp(0.0, 1.0),
        }
    }
}

/// Circle shape used for sweeps and overlaps.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Circle {
    pub center: Vec2,
    pub radius: f32,
}

impl Circle {
    pub fn new(center: Vec2, radius: f32) -> Self {
        Self { center, radius }
    }
}

/// First obstruction found by a sweep.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SweepHit {
    /// Contact point on the surface.
    pub point: Vec2,
    /// Unit surface normal pointing out of the collider.
    pub normal: Vec2,
    /// Distance travelled along the sweep before contact.
    pub distance: f32,
    pub material: Option<SurfaceMaterial>,
}

impl SweepHit {
    /// Material of the hit surface, or zero restitution and friction when absent.
    pub fn material_or_default(&self) -> SurfaceMaterial {
        self.material.unwrap_or(SurfaceMaterial::NONE)
    }
}

/// Stable index of a collider inside whatever world answers the query.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ColliderId(pub usize);

pub trait CollisionQuery {
    /// Moves `shape` along `motion` and returns the first collider in `mask` it touches.
    fn sweep(&self, shape: Circle, motion: Vec2, mask: LayerMask) -> Option<SweepHit>;

    /// Every collider in `mask` intersecting `shape` where it stands.
    fn overlap(&self, shape: Circle, mask: LayerMask) -> Vec<ColliderId>;
}

/// A directional force source, such as a fan.
pub trait ForceEmitter {
    fn position(&self) -> Vec2;
    /// Orientation in radians, counter-clockwise.
    fn rotation(&self) -> f32;
    fn force_vector(&self) -> Vec2;
}

pub trait ForceFieldQuery {
    /// Emitters whose field touches `shape` anywhere along `motion`.
    fn sweep_emitters(&self, shape: Circle, motion: Vec2, mask: LayerMask)
    -> Vec<&dyn ForceEmitter>;

    /// Emitters whose field overlaps `shape` where it stands.
    fn overlap_emitters(&self, shape: Circle, mask: LayerMask) -> Vec<&dyn ForceEmitter>;
}

/// Query service that never reports anything. Useful when a level has no fans.
#[derive(Clone, Copy, Debug, Default)]
pub struct EmptyWorld;

impl CollisionQuery for EmptyWorld {
    fn sweep(&self, _shape: Circle, _motion: Vec2, _mask: LayerMask) -> Option<SweepHit> {
        None
    }

    fn overlap(&self, _shape: Circle, _mask: LayerMask) -> Vec<ColliderId> {
        Vec::new()
    }
}

impl ForceFieldQuery for EmptyWorld {
    fn sweep_emitters(
        &self,
        _shape: Circle,
        _motion: Vec2,
        _mask: LayerMask,
    ) -> Vec<&dyn ForceEmitter> {
        Vec::new()
    }

    fn overlap_emitters(&self, _shape: Circle, _mask: LayerMask) -> Vec<&dyn ForceEmitter> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_matches_only_listed_layers() {
        let mask = LayerMask::from_layers(&[CollisionLayer::Ground, CollisionLayer::Hazard]);
        assert!(mask.contains(CollisionLayer::Ground));
        assert!(mask.contains(CollisionLayer::Hazard));
        assert!(!mask.contains(CollisionLayer::Fan));
        assert!(mask.matches(&[CollisionLayer::Fan, CollisionLayer::Hazard]));
        assert!(!LayerMask::NONE.matches(&[CollisionLayer::Ground]));
    }

    #[test]
    fn missing_material_defaults_to_zero() {
        let hit = SweepHit {
            point: Vec2::ZERO,
            normal: Vec2::Y,
            distance: 0.0,
            material: None,
        };
        assert_eq!(hit.material_or_default(), SurfaceMaterial::NONE);
    }

    #[test]
    fn material_is_clamped_into_unit_range() {
        let m = SurfaceMaterial::new(1.5, -0.2);
        assert_eq!(m.restitution, 1.0);
        assert_eq!(m.friction, 0.0);
    }
}
