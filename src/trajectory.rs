use glam::Vec2;

use crate::error::ConfigError;
use crate::query::{Circle, CollisionQuery, ForceFieldQuery, LayerMask, SurfaceMaterial, SweepHit};
use crate::settings::TrajectorySettings;

/// Displacements shorter than this count as "not moving".
pub const MIN_SEGMENT: f32 = 1e-6;

/// Gap left between the body and a surface after a bounce.
pub const CONTACT_SKIN: f32 = 1e-3;

/// Validated inputs for [`simulate`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrajectoryParams {
    step_count: usize,
    dt: f32,
    gravity: Vec2,
    drag: f32,
    radius: f32,
    mass: f32,
    hazard_mask: LayerMask,
    force_mask: LayerMask,
}

impl TrajectoryParams {
    pub fn new(
        settings: &TrajectorySettings,
        radius: f32,
        mass: f32,
        hazard_mask: LayerMask,
        force_mask: LayerMask,
    ) -> Result<Self, ConfigError> {
        settings.validate()?;
        if !(mass > 0.0) {
            return Err(ConfigError::NonPositiveMass(mass));
        }
        if radius < 0.0 {
            return Err(ConfigError::NegativeRadius(radius));
        }
        Ok(Self {
            step_count: settings.step_count,
            dt: settings.timestep,
            gravity: settings.gravity,
            drag: settings.drag,
            radius,
            mass,
            hazard_mask,
            force_mask,
        })
    }

    pub fn step_count(&self) -> usize {
        self.step_count
    }

    pub fn mass(&self) -> f32 {
        self.mass
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    fn drag_factor(&self) -> f32 {
        1.0 + self.drag * self.dt
    }
}

/// Velocity after bouncing off a surface with unit `normal`.
pub fn bounce_velocity(vel: Vec2, normal: Vec2, material: SurfaceMaterial, drag_factor: f32) -> Vec2 {
    let v_normal = vel.dot(normal) * normal;
    let v_tangent = vel - v_normal;

    let restitution = material.restitution.clamp(0.0, 1.0);
    let friction_factor = (1.0 - material.friction).clamp(0.0, 1.0);

    let bounced = v_tangent * friction_factor - v_normal * restitution;
    bounced / drag_factor
}

/// Result of advancing a body by one fixed step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    /// Displacement fell below [`MIN_SEGMENT`]; the body did not move.
    Rest,
    Moved,
    Bounced(SweepHit),
}

/// One fixed step shared by the preview and the authoritative body: gravity, fans
/// along the path, drag, then at most one bounce.
pub fn step(
    params: &TrajectoryParams,
    pos: &mut Vec2,
    vel: &mut Vec2,
    collisions: &dyn CollisionQuery,
    forces: &dyn ForceFieldQuery,
) -> Step {
    let drag_factor = params.drag_factor();

    *vel += params.gravity * params.dt;
    *vel = apply_fan_forces(params, *pos, *vel, forces);
    *vel /= drag_factor;

    let motion = *vel * params.dt;
    if motion.length() <= MIN_SEGMENT {
        return Step::Rest;
    }

    let body = Circle::new(*pos, params.radius);
    match collisions.sweep(body, motion, params.hazard_mask) {
        Some(hit) => {
            *vel = bounce_velocity(*vel, hit.normal, hit.material_or_default(), drag_factor);
            *pos = hit.point + hit.normal * (params.radius + CONTACT_SKIN);
            Step::Bounced(hit)
        }
        None => {
            *pos += motion;
            Step::Moved
        }
    }
}

/// Runs the preview and writes exactly `params.step_count()` points into `out`.
pub fn simulate(
    params: &TrajectoryParams,
    start_pos: Vec2,
    start_vel: Vec2,
    collisions: &dyn CollisionQuery,
    forces: &dyn ForceFieldQuery,
    out: &mut Vec<Vec2>,
) {
    out.clear();
    out.reserve(params.step_count);
    out.push(start_pos);

    let mut pos = start_pos;
    let mut vel = start_vel;
    let mut stopped = false;

    for _ in 1..params.step_count {
        if stopped {
            out.push(pos);
            continue;
        }
        match step(params, &mut pos, &mut vel, collisions, forces) {
            Step::Rest => {
                out.push(pos);
                stopped = true;
            }
            Step::Moved => out.push(pos),
            // the contact point, not where the body ends up
            Step::Bounced(hit) => out.push(hit.point),
        }
    }
}

fn apply_fan_forces(
    params: &TrajectoryParams,
    pos: Vec2,
    mut vel: Vec2,
    forces: &dyn ForceFieldQuery,
) -> Vec2 {
    let body = Circle::new(pos, params.radius);
    let motion = vel * params.dt;
    let emitters = if motion.length() > MIN_SEGMENT {
        forces.sweep_emitters(body, motion, params.force_mask)
    } else {
        forces.overlap_emitters(body, params.force_mask)
    };

    for emitter in emitters {
        vel += emitter.force_vector() / params.mass * params.dt;
    }
    vel
}

/// Owns the preview buffer so it is reused across ticks.
#[derive(Debug, Clone)]
pub struct TrajectorySimulator {
    params: TrajectoryParams,
    points: Vec<Vec2>,
}

impl TrajectorySimulator {
    pub fn new(params: TrajectoryParams) -> Self {
        Self {
            points: Vec::with_capacity(params.step_count),
            params,
        }
    }

    pub fn params(&self) -> &TrajectoryParams {
        &self.params
    }

    pub fn simulate(
        &mut self,
        start_pos: Vec2,
        start_vel: Vec2,
        collisions: &dyn CollisionQuery,
        forces: &dyn ForceFieldQuery,
    ) -> &[Vec2] {
        simulate(
            &self.params,
            start_pos,
            start_vel,
            collisions,
            forces,
            &mut self.points,
        );
        &self.points
    }

    /// Points from the last run.
    pub fn points(&self) -> &[Vec2] {
        &self.points
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{ColliderId, CollisionLayer, EmptyWorld, ForceEmitter};
    use std::cell::RefCell;

    fn params(step_count: usize, dt: f32, gravity: Vec2, drag: f32) -> TrajectoryParams {
        TrajectoryParams::new(
            &TrajectorySettings {
                step_count,
                timestep: dt,
                gravity,
                drag,
            },
            0.0,
            1.0,
            LayerMask::from_layers(&[CollisionLayer::Ground]),
            LayerMask::from_layers(&[CollisionLayer::Fan]),
        )
        .unwrap()
    }

    /// Answers sweeps from a fixed script, then reports no hit.
    struct ScriptedCollisions {
        script: RefCell<Vec<Option<SweepHit>>>,
        calls: RefCell<usize>,
    }

    impl ScriptedCollisions {
        fn new(mut hits: Vec<Option<SweepHit>>) -> Self {
            hits.reverse();
            Self {
                script: RefCell::new(hits),
                calls: RefCell::new(0),
            }
        }
    }

    impl CollisionQuery for ScriptedCollisions {
        fn sweep(&self, _shape: Circle, _motion: Vec2, _mask: LayerMask) -> Option<SweepHit> {
            *self.calls.borrow_mut() += 1;
            self.script.borrow_mut().pop().flatten()
        }

        fn overlap(&self, _shape: Circle, _mask: LayerMask) -> Vec<ColliderId> {
            Vec::new()
        }
    }

    struct ConstantFan(Vec2);

    impl ForceEmitter for ConstantFan {
        fn position(&self) -> Vec2 {
            Vec2::ZERO
        }
        fn rotation(&self) -> f32 {
            0.0
        }
        fn force_vector(&self) -> Vec2 {
            self.0
        }
    }

    /// Every query sees every fan.
    struct EverywhereFans(Vec<ConstantFan>);

    impl ForceFieldQuery for EverywhereFans {
        fn sweep_emitters(
            &self,
            _shape: Circle,
            _motion: Vec2,
            _mask: LayerMask,
        ) -> Vec<&dyn ForceEmitter> {
            self.0.iter().map(|f| f as &dyn ForceEmitter).collect()
        }

        fn overlap_emitters(&self, _shape: Circle, _mask: LayerMask) -> Vec<&dyn ForceEmitter> {
            self.0.iter().map(|f| f as &dyn ForceEmitter).collect()
        }
    }

    #[test]
    fn always_returns_step_count_points() {
        for n in [1, 2, 3, 10, 75, 200] {
            let p = params(n, 0.02, Vec2::new(0.0, -9.81), 0.1);
            let mut out = Vec::new();
            simulate(&p, Vec2::ZERO, Vec2::new(3.0, 4.0), &EmptyWorld, &EmptyWorld, &mut out);
            assert_eq!(out.len(), n);
            assert_eq!(out[0], Vec2::ZERO);
        }
    }

    #[test]
    fn free_flight_matches_semi_implicit_euler() {
        let p = params(4, 0.1, Vec2::new(0.0, -10.0), 0.0);
        let mut out = Vec::new();
        simulate(&p, Vec2::ZERO, Vec2::new(1.0, 0.0), &EmptyWorld, &EmptyWorld, &mut out);
        let expected = [
            Vec2::new(0.0, 0.0),
            Vec2::new(0.1, -0.1),
            Vec2::new(0.2, -0.3),
            Vec2::new(0.3, -0.6),
        ];
        for (got, want) in out.iter().zip(expected) {
            assert!(got.abs_diff_eq(want, 1e-5), "{got} != {want}");
        }
    }

    #[test]
    fn resting_body_stops_and_repeats_last_point() {
        let p = params(6, 0.1, Vec2::ZERO, 0.0);
        let collisions = ScriptedCollisions::new(Vec::new());
        let mut out = Vec::new();
        simulate(&p, Vec2::new(2.0, 3.0), Vec2::ZERO, &collisions, &EmptyWorld, &mut out);
        assert_eq!(out, vec![Vec2::new(2.0, 3.0); 6]);
        // Zero-length segments never sweep.
        assert_eq!(*collisions.calls.borrow(), 0);
    }

    #[test]
    fn motion_dying_mid_run_repeats_the_last_moved_point() {
        // Drag divides the velocity by 100 every step.
        let p = params(7, 1.0, Vec2::ZERO, 99.0);
        let collisions = ScriptedCollisions::new(Vec::new());
        let start = Vec2::new(2.0, 3.0);
        let mut out = Vec::new();
        simulate(&p, start, Vec2::new(10.0, 0.0), &collisions, &EmptyWorld, &mut out);

        assert_eq!(out.len(), 7);
        assert!(out[1].abs_diff_eq(Vec2::new(2.1, 3.0), 1e-5), "{}", out[1]);
        assert!(out[3].abs_diff_eq(Vec2::new(2.10101, 3.0), 1e-5), "{}", out[3]);
        assert_ne!(out[3], start);
        for point in &out[4..] {
            assert_eq!(*point, out[3]);
        }
        // Three moving steps swept; nothing after the stop.
        assert_eq!(*collisions.calls.borrow(), 3);
    }

    #[test]
    fn hit_appends_contact_point_and_bounces() {
        let p = params(3, 0.1, Vec2::ZERO, 0.0);
        let hit = SweepHit {
            point: Vec2::new(0.5, 0.0),
            normal: Vec2::Y,
            distance: 0.5,
            material: Some(SurfaceMaterial::new(0.5, 0.0)),
        };
        let collisions = ScriptedCollisions::new(vec![Some(hit)]);
        let mut out = Vec::new();
        simulate(
            &p,
            Vec2::new(0.0, 0.5),
            Vec2::new(10.0, -10.0),
            &collisions,
            &EmptyWorld,
            &mut out,
        );
        assert_eq!(out[1], Vec2::new(0.5, 0.0));
        // Second step leaves from just above the contact with (10, 5).
        let expected = Vec2::new(0.5, CONTACT_SKIN) + Vec2::new(10.0, 5.0) * 0.1;
        assert!(out[2].abs_diff_eq(expected, 1e-5), "{}", out[2]);
    }

    #[test]
    fn fans_push_along_their_force() {
        let p = params(3, 0.5, Vec2::ZERO, 0.0);
        let fans = EverywhereFans(vec![ConstantFan(Vec2::new(2.0, 0.0)), ConstantFan(Vec2::new(0.0, 4.0))]);
        let mut out = Vec::new();
        simulate(&p, Vec2::ZERO, Vec2::ZERO, &EmptyWorld, &fans, &mut out);
        // At rest the overlap form is used; both fans add force / mass * dt.
        assert!(out[1].abs_diff_eq(Vec2::new(0.5, 1.0), 1e-6), "{}", out[1]);
        assert!(out[2].abs_diff_eq(Vec2::new(1.5, 3.0), 1e-6), "{}", out[2]);
    }

    #[test]
    fn drag_damps_each_step() {
        let p = params(2, 0.1, Vec2::ZERO, 1.0);
        let mut out = Vec::new();
        simulate(&p, Vec2::ZERO, Vec2::new(11.0, 0.0), &EmptyWorld, &EmptyWorld, &mut out);
        assert!((out[1].x - 1.0).abs() < 1e-5);
    }

    #[test]
    fn bounce_never_gains_energy() {
        let normal = Vec2::Y;
        let vel = Vec2::new(3.0, -4.0);
        let out = bounce_velocity(vel, normal, SurfaceMaterial::new(0.6, 0.3), 1.0);
        assert!(out.x.abs() <= vel.x.abs());
        assert!(out.y.abs() < vel.y.abs());
        assert!(out.y > 0.0);
        assert!((out.x - 2.1).abs() < 1e-6);
        assert!((out.y - 2.4).abs() < 1e-6);
    }

    #[test]
    fn full_friction_kills_tangential_motion() {
        let out = bounce_velocity(Vec2::new(5.0, -1.0), Vec2::Y, SurfaceMaterial::new(1.0, 1.0), 1.0);
        assert_eq!(out, Vec2::new(0.0, 1.0));
    }

    #[test]
    fn same_inputs_same_polyline() {
        let p = params(75, 0.02, Vec2::new(0.0, -9.81), 0.3);
        let script = || {
            ScriptedCollisions::new(vec![
                None,
                None,
                Some(SweepHit {
                    point: Vec2::new(0.1, -0.05),
                    normal: Vec2::new(0.6, 0.8),
                    distance: 0.1,
                    material: None,
                }),
            ])
        };
        let fans = EverywhereFans(vec![ConstantFan(Vec2::new(1.0, 0.5))]);
        let mut a = Vec::new();
        let mut b = Vec::new();
        simulate(&p, Vec2::ZERO, Vec2::new(2.0, 1.0), &script(), &fans, &mut a);
        simulate(&p, Vec2::ZERO, Vec2::new(2.0, 1.0), &script(), &fans, &mut b);
        assert_eq!(a, b);
    }

    #[test]
    fn non_positive_mass_is_rejected() {
        let err = TrajectoryParams::new(
            &TrajectorySettings::default(),
            0.1,
            0.0,
            LayerMask::NONE,
            LayerMask::NONE,
        );
        assert_eq!(err, Err(ConfigError::NonPositiveMass(0.0)));
    }
}
