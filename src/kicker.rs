use std::cell::Cell;
use std::rc::Rc;

use glam::Vec2;
use tracing::{debug, error, info, warn};

use crate::aim::AimAccumulator;
use crate::audio::AudioRateSync;
use crate::clock::TimeScaleSink;
use crate::error::ConfigError;
use crate::input::{InputBus, PlayerAction, Subscription};
use crate::physics::Body;
use crate::query::{CollisionQuery, ForceFieldQuery, LayerMask};
use crate::scheduler::TickScheduler;
use crate::settings::KickSettings;
use crate::slowdown::{SlowdownController, probe_hazard};
use crate::trajectory::{TrajectoryParams, TrajectorySimulator};

/// Draws the preview polyline.
pub trait PathRenderer {
    fn set_points(&mut self, points: &[Vec2]);
    fn set_visible(&mut self, visible: bool);
}

/// Renderer that just keeps the last polyline it was given.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolylineBuffer {
    points: Vec<Vec2>,
    visible: bool,
}

impl PolylineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }
}

impl PathRenderer for PolylineBuffer {
    fn set_points(&mut self, points: &[Vec2]) {
        self.points.clear();
        self.points.extend_from_slice(points);
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }
}

/// Everything the kicker talks to during a tick.
pub struct Services<'a> {
    pub collisions: &'a dyn CollisionQuery,
    pub forces: &'a dyn ForceFieldQuery,
    pub clock: &'a mut dyn TimeScaleSink,
    pub audio: &'a mut dyn AudioRateSync,
    pub renderer: &'a mut dyn PathRenderer,
}

/// What happened during one [`Kicker::fixed_update`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReport {
    /// Aim after this tick's input, if aiming is available.
    pub aim: Option<Vec2>,
    /// Last point of the preview, if one was simulated.
    pub preview_end: Option<Vec2>,
    pub hazard_ahead: bool,
    pub time_scale: f32,
    pub kicked: bool,
    /// The player asked for the level to restart.
    pub reload_requested: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KickerAction {
    CommitKick,
    Rearm,
}

struct KickerStatus {
    speed: f32,
}

#[derive(Default)]
struct InputLinks {
    direction: Rc<Cell<Vec2>>,
    kick: Rc<Cell<bool>>,
    reload: Rc<Cell<bool>>,
}

pub struct Kicker {
    settings: KickSettings,
    aim: Option<AimAccumulator>,
    preview: Option<TrajectorySimulator>,
    slowdown: Option<SlowdownController>,
    hazard_mask: LayerMask,
    armed: bool,
    preview_visible: bool,
    rendered_visible: Option<bool>,
    links: InputLinks,
    subscriptions: Vec<Subscription>,
    scheduler: TickScheduler<KickerStatus, KickerAction>,
}

fn enabled<T>(subsystem: &'static str, built: Result<T, ConfigError>) -> Option<T> {
    match built {
        Ok(value) => Some(value),
        Err(e) => {
            error!(subsystem, error = %e, "invalid configuration");
            warn!(subsystem, "subsystem disabled");
            None
        }
    }
}

fn build_slowdown(settings: &KickSettings) -> Result<SlowdownController, ConfigError> {
    if settings.hazard_layers.is_empty() {
        return Err(ConfigError::MissingReference("hazard_layers"));
    }
    SlowdownController::new(settings.slowdown.clone())
}

impl Kicker {
    /// Validates every subsystem against `body`. A subsystem with bad configuration
    /// is logged and left out; the rest keep working.
    pub fn new(settings: KickSettings, body: &impl Body) -> Self {
        let aim = enabled("aim", AimAccumulator::new(&settings.aim));
        let preview = enabled(
            "trajectory_preview",
            TrajectoryParams::new(
                &settings.trajectory,
                body.radius(),
                body.mass(),
                settings.hazard_mask(),
                settings.force_mask(),
            )
            .map(TrajectorySimulator::new),
        );
        let slowdown = enabled("slowdown", build_slowdown(&settings));

        Self {
            hazard_mask: settings.hazard_mask(),
            aim,
            preview,
            slowdown,
            armed: true,
            preview_visible: true,
            rendered_visible: None,
            links: InputLinks::default(),
            subscriptions: Vec::new(),
            scheduler: TickScheduler::new(),
            settings,
        }
    }

    pub fn settings(&self) -> &KickSettings {
        &self.settings
    }

    pub fn aim(&self) -> Option<Vec2> {
        self.aim.as_ref().map(AimAccumulator::aim)
    }

    pub fn time_scale(&self) -> f32 {
        self.slowdown
            .as_ref()
            .map_or(1.0, SlowdownController::time_scale)
    }

    /// Points of the last simulated preview.
    pub fn preview_points(&self) -> &[Vec2] {
        match &self.preview {
            Some(sim) => sim.points(),
            None => &[],
        }
    }

    pub fn preview_visible(&self) -> bool {
        self.preview_visible && self.preview.is_some() && self.aim.is_some()
    }

    /// Ready to take a kick request.
    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn is_active(&self) -> bool {
        !self.subscriptions.is_empty()
    }

    pub fn activate(&mut self, bus: &mut InputBus) {
        if self.is_active() {
            return;
        }
        let direction = self.links.direction.clone();
        direction.set(bus.direction());
        self.subscriptions
            .push(bus.subscribe_direction(move |d| direction.set(d)));

        let kick = self.links.kick.clone();
        self.subscriptions
            .push(bus.subscribe_button(PlayerAction::Kick, move || kick.set(true)));

        let reload = self.links.reload.clone();
        self.subscriptions
            .push(bus.subscribe_button(PlayerAction::Reload, move || reload.set(true)));

        debug!("kicker activated");
    }

    /// Unsubscribes and drops any kick in progress.
    pub fn deactivate(&mut self, bus: &mut InputBus) {
        for sub in self.subscriptions.drain(..) {
            bus.unsubscribe(sub);
        }
        self.links.direction.set(Vec2::ZERO);
        self.links.reload.set(false);
        self.reset();
        debug!("kicker deactivated");
    }

    pub fn fixed_update(
        &mut self,
        body: &mut impl Body,
        svc: &mut Services<'_>,
        dt: f32,
    ) -> TickReport {
        let mut report = TickReport {
            aim: self.aim(),
            preview_end: None,
            hazard_ahead: false,
            time_scale: self.time_scale(),
            kicked: false,
            reload_requested: false,
        };
        if !self.is_active() {
            // An idle kicker keeps publishing so a reset scale reaches the clock.
            self.publish_time_scale(svc, report.time_scale, dt);
            return report;
        }

        if self.links.reload.take() {
            info!("reload requested");
            self.reset();
            report.reload_requested = true;
        }

        let input = self.links.direction.get();
        report.aim = self.aim.as_mut().map(|a| a.update(input, dt));

        if self.links.kick.take() {
            self.request_kick();
        }

        let status = KickerStatus {
            speed: body.vel().length(),
        };
        for action in self.scheduler.poll(&status) {
            match action {
                KickerAction::CommitKick => report.kicked = self.commit_kick(body, report.aim),
                KickerAction::Rearm => {
                    self.armed = true;
                    self.preview_visible = true;
                    debug!("kicker re-armed");
                }
            }
        }

        if self.preview_visible {
            if let (Some(aim), Some(sim)) = (report.aim, self.preview.as_mut()) {
                let start_vel = body.vel() + aim * self.settings.kick_multiplier / sim.params().mass();
                let points = sim.simulate(body.pos(), start_vel, svc.collisions, svc.forces);
                report.preview_end = points.last().copied();
            }
        }

        if let Some(slowdown) = self.slowdown.as_mut() {
            let reach = slowdown.settings().max_sweep_distance;
            report.hazard_ahead =
                probe_hazard(svc.collisions, body.pos(), body.vel(), reach, self.hazard_mask);

            let was_slowed = slowdown.is_slowed();
            report.time_scale = slowdown.update(body.vel(), report.hazard_ahead, dt);
            if was_slowed != slowdown.is_slowed() {
                debug!(time_scale = report.time_scale, slowed = !was_slowed, "dilation changed");
            }
        }
        self.publish_time_scale(svc, report.time_scale, dt);

        let visible = self.preview_visible();
        if self.rendered_visible != Some(visible) {
            svc.renderer.set_visible(visible);
            self.rendered_visible = Some(visible);
        }
        if visible {
            svc.renderer.set_points(self.preview_points());
        }

        report
    }

    fn publish_time_scale(&self, svc: &mut Services<'_>, scale: f32, dt: f32) {
        if self.slowdown.is_some() {
            svc.clock.set_time_scale(scale);
            svc.audio.publish_time_scale(scale, dt);
        }
    }

    fn request_kick(&mut self) {
        if !self.armed {
            debug!("kick request ignored, kicker not armed");
            return;
        }
        self.armed = false;
        self.scheduler
            .after_ticks(self.settings.kick_windup_ticks, KickerAction::CommitKick);
        debug!(windup_ticks = self.settings.kick_windup_ticks, "kick requested");
    }

    fn commit_kick(&mut self, body: &mut impl Body, aim: Option<Vec2>) -> bool {
        let Some(aim) = aim else {
            warn!("kick dropped, no aim available");
            self.armed = true;
            return false;
        };
        let impulse = aim * self.settings.kick_multiplier;
        body.apply_impulse(impulse);
        self.preview_visible = false;
        info!(impulse = ?impulse, velocity = ?body.vel(), "kick committed");

        let rearm_speed = self.settings.rearm_speed;
        self.scheduler
            .when(move |s: &KickerStatus| s.speed <= rearm_speed, KickerAction::Rearm);
        true
    }

    /// Back to aiming: pending actions dropped, aim and dilation restarted.
    fn reset(&mut self) {
        self.scheduler.cancel_all();
        self.links.kick.set(false);
        self.armed = true;
        self.preview_visible = true;
        if self.aim.is_some() {
            self.aim = AimAccumulator::new(&self.settings.aim).ok();
        }
        if self.slowdown.is_some() {
            self.slowdown = build_slowdown(&self.settings).ok();
        }
    }
}
