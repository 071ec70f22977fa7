// Shared level builders and a fixed-step harness for the kick scenarios.
#![allow(dead_code)]

use glam::Vec2;
use kick_the_bucket::audio::VoiceBank;
use kick_the_bucket::clock::SharedTimeScale;
use kick_the_bucket::input::InputBus;
use kick_the_bucket::kicker::{Kicker, PolylineBuffer, Services, TickReport};
use kick_the_bucket::map::GameLevel;
use kick_the_bucket::physics::{Ball, LevelWorld, integrate_body};
use kick_the_bucket::query::SweepHit;
use kick_the_bucket::trajectory::TrajectoryParams;

// A 20 wide floor whose top face sits at y = -1.
pub fn floor_level(restitution: f32, friction: f32) -> GameLevel {
    let json = format!(
        r#"{{
            "name": "floor",
            "objects": [
                {{ "rect": {{ "x": -10, "y": -2, "w": 20, "h": 1,
                    "material": {{ "restitution": {restitution}, "friction": {friction} }},
                    "layers": ["ground"] }} }}
            ],
            "ball": {{ "spawn_x": 0, "spawn_y": 0, "radius": 0.0, "mass": 1.0 }}
        }}"#
    );
    GameLevel::from_json(&json).expect("floor level")
}

// No gravity, ball at the origin, a hazard block straight ahead at x = 3.
pub fn corridor_level() -> GameLevel {
    GameLevel::from_json(
        r#"{
            "name": "corridor",
            "objects": [
                { "rect": { "x": 3, "y": -1, "w": 1, "h": 2,
                    "material": { "restitution": 0.5, "friction": 0.0 },
                    "layers": ["hazard"] } }
            ],
            "ball": { "spawn_x": 0, "spawn_y": 0, "radius": 0.1, "mass": 1.0 },
            "kick": {
                "kick_windup_ticks": 0,
                "aim": { "initial": [3.0, 0.1] },
                "trajectory": { "gravity": [0.0, 0.0] }
            }
        }"#,
    )
    .expect("corridor level")
}

// Everything a host game would wire around one kicker.
pub struct Harness {
    pub level: GameLevel,
    pub world: LevelWorld,
    pub ball: Ball,
    pub params: TrajectoryParams,
    pub bus: InputBus,
    pub kicker: Kicker,
    pub clock: SharedTimeScale,
    pub voices: VoiceBank,
    pub renderer: PolylineBuffer,
}

impl Harness {
    pub fn new(level: GameLevel) -> Self {
        let world = LevelWorld::new(&level);
        let ball = Ball::spawn(&level);
        let params = TrajectoryParams::new(
            &level.kick.trajectory,
            ball.radius,
            ball.mass,
            level.kick.hazard_mask(),
            level.kick.force_mask(),
        )
        .expect("ball params");
        let mut bus = InputBus::new();
        let mut kicker = Kicker::new(level.kick.clone(), &ball);
        kicker.activate(&mut bus);
        let mut voices = VoiceBank::new(&level.kick.audio);
        voices.start_voice();

        Self {
            level,
            world,
            ball,
            params,
            bus,
            kicker,
            clock: SharedTimeScale::new(),
            voices,
            renderer: PolylineBuffer::new(),
        }
    }

    pub fn dt(&self) -> f32 {
        self.level.kick.trajectory.timestep
    }

    // Kicker tick only; the ball stays where it is.
    pub fn update_kicker(&mut self) -> TickReport {
        let dt = self.dt();
        let mut svc = Services {
            collisions: &self.world,
            forces: &self.world,
            clock: &mut self.clock,
            audio: &mut self.voices,
            renderer: &mut self.renderer,
        };
        self.kicker.fixed_update(&mut self.ball, &mut svc, dt)
    }

    pub fn step_ball(&mut self) -> Option<SweepHit> {
        integrate_body(&mut self.ball, &self.params, &self.world, &self.world)
    }

    // Full tick the way the sandbox runs it.
    pub fn step(&mut self) -> TickReport {
        let report = self.update_kicker();
        self.step_ball();
        report
    }

    // Where the preview would draw the ball after this step.
    pub fn step_ball_as_drawn(&mut self) -> Vec2 {
        match self.step_ball() {
            Some(hit) => hit.point,
            None => self.ball.pos,
        }
    }
}
