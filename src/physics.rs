use glam::Vec2;

use crate::map::{FanDef, GameLevel, MapObject};
use crate::query::{
    Circle, ColliderId, CollisionLayer, CollisionQuery, ForceEmitter, ForceFieldQuery, LayerMask,
    SurfaceMaterial, SweepHit,
};
use crate::trajectory::{self, MIN_SEGMENT, Step, TrajectoryParams};

/// The true, authoritative body the kick is applied to.
pub trait Body {
    fn pos(&self) -> Vec2;
    fn pos_mut(&mut self) -> &mut Vec2;
    fn vel(&self) -> Vec2;
    fn vel_mut(&mut self) -> &mut Vec2;
    fn radius(&self) -> f32;
    fn mass(&self) -> f32;

    /// Instantaneous change of momentum. Ignored for massless bodies.
    fn apply_impulse(&mut self, impulse: Vec2) {
        let mass = self.mass();
        if mass > 0.0 {
            *self.vel_mut() += impulse / mass;
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ball {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub mass: f32,
}

impl Ball {
    pub fn spawn(level: &GameLevel) -> Self {
        Self {
            pos: Vec2::new(level.ball.spawn_x, level.ball.spawn_y),
            vel: Vec2::ZERO,
            radius: level.ball.radius,
            mass: level.ball.mass,
        }
    }
}

impl Body for Ball {
    fn pos(&self) -> Vec2 {
        self.pos
    }
    fn pos_mut(&mut self) -> &mut Vec2 {
        &mut self.pos
    }
    fn vel(&self) -> Vec2 {
        self.vel
    }
    fn vel_mut(&mut self) -> &mut Vec2 {
        &mut self.vel
    }
    fn radius(&self) -> f32 {
        self.radius
    }
    fn mass(&self) -> f32 {
        self.mass
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Shape {
    Circle { center: Vec2, radius: f32 },
    Rect { min: Vec2, max: Vec2 },
}

#[derive(Debug, Clone)]
struct Collider {
    shape: Shape,
    material: Option<SurfaceMaterial>,
    layers: Vec<CollisionLayer>,
}

impl From<&MapObject> for Collider {
    fn from(obj: &MapObject) -> Self {
        let shape = match obj {
            MapObject::Circle { x, y, radius, .. } => Shape::Circle {
                center: Vec2::new(*x, *y),
                radius: *radius,
            },
            MapObject::Rect { x, y, w, h, .. } => Shape::Rect {
                min: Vec2::new(*x, *y),
                max: Vec2::new(x + w, y + h),
            },
        };
        Self {
            shape,
            material: obj.material(),
            layers: obj.layers().to_vec(),
        }
    }
}

/// A fan placed in the world, with its current oscillation state.
#[derive(Debug, Clone)]
pub struct Fan {
    def: FanDef,
    angle_deg: f32,
    timer: f32,
    toward_max: bool,
}

impl Fan {
    pub fn new(def: FanDef) -> Self {
        Self {
            angle_deg: def.angle_deg,
            timer: 0.0,
            toward_max: true,
            def,
        }
    }

    pub fn angle_deg(&self) -> f32 {
        self.angle_deg
    }

    /// Advances the sweep between `min_angle` and `max_angle`, easing at both ends.
    pub fn tick(&mut self, dt: f32) {
        if !self.def.oscillating {
            return;
        }
        self.timer += dt * self.def.osc_speed;
        let t = smoothstep(self.timer.clamp(0.0, 1.0));
        let (from, to) = if self.toward_max {
            (self.def.min_angle, self.def.max_angle)
        } else {
            (self.def.max_angle, self.def.min_angle)
        };
        self.angle_deg = from + (to - from) * t;

        if self.timer >= 1.0 {
            self.toward_max = !self.toward_max;
            self.timer = 0.0;
        }
    }

    fn half_extents(&self) -> Vec2 {
        Vec2::new(self.def.w, self.def.h) * 0.5
    }

    fn to_local(&self, v: Vec2) -> Vec2 {
        Vec2::from_angle(-self.rotation()).rotate(v - self.position())
    }

    fn touches(&self, shape: Circle, motion: Vec2) -> bool {
        let start = self.to_local(shape.center);
        let end = self.to_local(shape.center + motion);
        let half = self.half_extents();
        swept_circle_touches_box(start, end - start, shape.radius, -half, half)
    }
}

impl ForceEmitter for Fan {
    fn position(&self) -> Vec2 {
        Vec2::new(self.def.x, self.def.y)
    }

    fn rotation(&self) -> f32 {
        self.angle_deg.to_radians()
    }

    fn force_vector(&self) -> Vec2 {
        let up = Vec2::from_angle(self.rotation()).rotate(Vec2::Y);
        -up * self.def.blow_force
    }
}

fn smoothstep(t: f32) -> f32 {
    t * t * (3.0 - 2.0 * t)
}

/// Static colliders and fans of one level.
#[derive(Debug, Clone)]
pub struct LevelWorld {
    colliders: Vec<Collider>,
    fans: Vec<Fan>,
}

impl LevelWorld {
    pub fn new(level: &GameLevel) -> Self {
        Self {
            colliders: level.objects.iter().map(Collider::from).collect(),
            fans: level.fans.iter().cloned().map(Fan::new).collect(),
        }
    }

    pub fn fans(&self) -> &[Fan] {
        &self.fans
    }

    /// Moves oscillating fans forward by one tick.
    pub fn tick(&mut self, dt: f32) {
        for fan in &mut self.fans {
            fan.tick(dt);
        }
    }

    fn fans_in(&self, mask: LayerMask) -> impl Iterator<Item = &Fan> {
        self.fans.iter().filter(move |f| mask.matches(&f.def.layers))
    }
}

impl CollisionQuery for LevelWorld {
    fn sweep(&self, shape: Circle, motion: Vec2, mask: LayerMask) -> Option<SweepHit> {
        let length = motion.length();
        let mut best: Option<(f32, Vec2, Vec2, Option<SurfaceMaterial>)> = None;

        for c in self.colliders.iter().filter(|c| mask.matches(&c.layers)) {
            let contact = match start_overlap(shape, c.shape) {
                Some((point, normal)) => Some((0.0, point, normal)),
                None if length > MIN_SEGMENT => sweep_shape(shape, motion, c.shape),
                None => None,
            };
            if let Some((s, point, normal)) = contact {
                if best.is_none_or(|(b, ..)| s < b) {
                    best = Some((s, point, normal, c.material));
                }
            }
        }

        best.map(|(s, point, normal, material)| SweepHit {
            point,
            normal,
            distance: s * length,
            material,
        })
    }

    fn overlap(&self, shape: Circle, mask: LayerMask) -> Vec<ColliderId> {
        self.colliders
            .iter()
            .enumerate()
            .filter(|(_, c)| mask.matches(&c.layers) && start_overlap(shape, c.shape).is_some())
            .map(|(i, _)| ColliderId(i))
            .collect()
    }
}

impl ForceFieldQuery for LevelWorld {
    fn sweep_emitters(
        &self,
        shape: Circle,
        motion: Vec2,
        mask: LayerMask,
    ) -> Vec<&dyn ForceEmitter> {
        self.fans_in(mask)
            .filter(|f| f.touches(shape, motion))
            .map(|f| f as &dyn ForceEmitter)
            .collect()
    }

    fn overlap_emitters(&self, shape: Circle, mask: LayerMask) -> Vec<&dyn ForceEmitter> {
        self.sweep_emitters(shape, Vec2::ZERO, mask)
    }
}

/// One authoritative step for `body`, using the same integrator as the preview so
/// the preview stays a faithful prediction. `params` must be built for this body.
/// Returns the surface it bounced off, if any.
pub fn integrate_body(
    body: &mut impl Body,
    params: &TrajectoryParams,
    collisions: &dyn CollisionQuery,
    forces: &dyn ForceFieldQuery,
) -> Option<SweepHit> {
    let mut pos = body.pos();
    let mut vel = body.vel();
    let outcome = trajectory::step(params, &mut pos, &mut vel, collisions, forces);
    *body.pos_mut() = pos;
    *body.vel_mut() = vel;
    match outcome {
        Step::Bounced(hit) => Some(hit),
        Step::Rest | Step::Moved => None,
    }
}

/// Contact point and normal if `shape` already intersects the collider.
fn start_overlap(shape: Circle, collider: Shape) -> Option<(Vec2, Vec2)> {
    let p = shape.center;
    let r = shape.radius;
    match collider {
        Shape::Circle { center, radius } => {
            let delta = p - center;
            let dist = delta.length();
            if dist >= radius + r {
                return None;
            }
            let n = if dist > MIN_SEGMENT {
                delta / dist
            } else {
                Vec2::Y
            };
            Some((center + n * radius, n))
        }
        Shape::Rect { min, max } => {
            let closest = p.clamp(min, max);
            let delta = p - closest;
            let inside = p.x > min.x && p.x < max.x && p.y > min.y && p.y < max.y;
            if !inside && delta.length_squared() >= r * r {
                return None;
            }
            if !inside && delta.length_squared() > MIN_SEGMENT * MIN_SEGMENT {
                return Some((closest, delta.normalize()));
            }

            // Center is inside the box: push out through the nearest face.
            let left = p.x - min.x;
            let right = max.x - p.x;
            let bottom = p.y - min.y;
            let top = max.y - p.y;
            let nearest = left.min(right).min(bottom).min(top);
            let (n, point) = if nearest == top {
                (Vec2::Y, Vec2::new(p.x, max.y))
            } else if nearest == bottom {
                (Vec2::NEG_Y, Vec2::new(p.x, min.y))
            } else if nearest == left {
                (Vec2::NEG_X, Vec2::new(min.x, p.y))
            } else {
                (Vec2::X, Vec2::new(max.x, p.y))
            };
            Some((point, n))
        }
    }
}

/// First contact of a non-overlapping moving circle: (fraction of motion, point, normal).
fn sweep_shape(shape: Circle, motion: Vec2, collider: Shape) -> Option<(f32, Vec2, Vec2)> {
    let p = shape.center;
    let r = shape.radius;
    match collider {
        Shape::Circle { center, radius } => {
            let s = segment_vs_circle(p, motion, center, radius + r)?;
            let n = (p + motion * s - center).normalize_or_zero();
            Some((s, center + n * radius, n))
        }
        Shape::Rect { min, max } => {
            let (s, face_normal) = segment_vs_aabb(p, motion, min - r, max + r)?;
            let centroid = p + motion * s;

            let corner_x = if centroid.x < min.x {
                Some(min.x)
            } else if centroid.x > max.x {
                Some(max.x)
            } else {
                None
            };
            let corner_y = if centroid.y < min.y {
                Some(min.y)
            } else if centroid.y > max.y {
                Some(max.y)
            } else {
                None
            };

            if let (Some(x), Some(y), true) = (corner_x, corner_y, r > 0.0) {
                let corner = Vec2::new(x, y);
                let s = segment_vs_circle(p, motion, corner, r)?;
                let n = (p + motion * s - corner).normalize_or_zero();
                return Some((s, corner, n));
            }

            let n = if face_normal == Vec2::ZERO {
                -motion.normalize_or_zero()
            } else {
                face_normal
            };
            Some((s, centroid - n * r, n))
        }
    }
}

/// Entry fraction along `motion` into the box, with the normal of the face crossed.
/// A segment that starts strictly inside reports fraction 0 and a zero normal.
fn segment_vs_aabb(p: Vec2, motion: Vec2, min: Vec2, max: Vec2) -> Option<(f32, Vec2)> {
    let mut enter = 0.0_f32;
    let mut exit = 1.0_f32;
    let mut normal = Vec2::ZERO;

    for axis in 0..2 {
        let (o, d, lo, hi) = (p[axis], motion[axis], min[axis], max[axis]);
        if d == 0.0 {
            if o < lo || o > hi {
                return None;
            }
            continue;
        }
        let (mut t0, mut t1) = ((lo - o) / d, (hi - o) / d);
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
        }
        if t0 >= enter {
            enter = t0;
            normal = Vec2::ZERO;
            normal[axis] = -d.signum();
        }
        exit = exit.min(t1);
        if enter > exit {
            return None;
        }
    }
    // touching the boundary while heading out
    if exit <= 0.0 {
        return None;
    }
    Some((enter, normal))
}

/// First fraction along `motion` where the point enters the circle.
fn segment_vs_circle(p: Vec2, motion: Vec2, center: Vec2, radius: f32) -> Option<f32> {
    let f = p - center;
    let a = motion.length_squared();
    let c = f.length_squared() - radius * radius;
    if c < 0.0 {
        return Some(0.0);
    }
    let b = f.dot(motion);
    if a <= 0.0 || b >= 0.0 {
        return None;
    }
    let disc = b * b - a * c;
    if disc < 0.0 {
        return None;
    }
    let s = (-b - disc.sqrt()) / a;
    (0.0..=1.0).contains(&s).then_some(s)
}

fn circle_touches_box(p: Vec2, r: f32, min: Vec2, max: Vec2) -> bool {
    (p - p.clamp(min, max)).length_squared() <= r * r
}

fn segment_point_distance(p: Vec2, motion: Vec2, point: Vec2) -> f32 {
    let a = motion.length_squared();
    let t = if a > 0.0 {
        ((point - p).dot(motion) / a).clamp(0.0, 1.0)
    } else {
        0.0
    };
    (p + motion * t).distance(point)
}

/// Whether a circle moving along `motion` touches the box at any point of its path.
fn swept_circle_touches_box(p: Vec2, motion: Vec2, r: f32, min: Vec2, max: Vec2) -> bool {
    if circle_touches_box(p, r, min, max) || circle_touches_box(p + motion, r, min, max) {
        return true;
    }
    let wide = Vec2::new(r, 0.0);
    let tall = Vec2::new(0.0, r);
    if segment_vs_aabb(p, motion, min - wide, max + wide).is_some()
        || segment_vs_aabb(p, motion, min - tall, max + tall).is_some()
    {
        return true;
    }
    [
        min,
        max,
        Vec2::new(min.x, max.y),
        Vec2::new(max.x, min.y),
    ]
    .into_iter()
    .any(|corner| segment_point_distance(p, motion, corner) <= r)
}
