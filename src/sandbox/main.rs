use std::time::{Duration, Instant};

use glam::Vec2;
use tracing::{error, info, warn};

use kick_the_bucket::audio::VoiceBank;
use kick_the_bucket::clock::SharedTimeScale;
use kick_the_bucket::input::{InputBus, PlayerAction};
use kick_the_bucket::kicker::{Kicker, PolylineBuffer, Services, TickReport};
use kick_the_bucket::map::GameLevel;
use kick_the_bucket::physics::{Ball, LevelWorld, integrate_body};
use kick_the_bucket::trajectory::TrajectoryParams;

mod config;

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    init_tracing();

    let path = config::level_path();
    let level = GameLevel::load(&path)?;
    info!(%path, ticks = config::sandbox_ticks(), "starting sandbox");

    let ball = run(level, config::sandbox_ticks(), config::sandbox_realtime()).await?;
    info!(pos = ?ball.pos, vel = ?ball.vel, "sandbox finished");
    Ok(())
}

/// Scripted player: aim up and right, let go, kick.
fn drive_input(tick: u32, bus: &mut InputBus) {
    match tick {
        0 => bus.set_direction(Vec2::new(1.0, 0.5)),
        t if t == config::AIM_TICKS => bus.set_direction(Vec2::ZERO),
        t if t == config::AIM_TICKS + 1 => bus.emit(PlayerAction::Kick),
        _ => {}
    }
}

async fn run(level: GameLevel, ticks: u32, realtime: bool) -> anyhow::Result<Ball> {
    let dt = level.kick.trajectory.timestep;
    let mut world = LevelWorld::new(&level);
    let mut ball = Ball::spawn(&level);
    // The true ball steps with the same integrator the preview uses.
    let params = match TrajectoryParams::new(
        &level.kick.trajectory,
        ball.radius,
        ball.mass,
        level.kick.hazard_mask(),
        level.kick.force_mask(),
    ) {
        Ok(params) => Some(params),
        Err(e) => {
            error!(error = %e, "invalid ball configuration, ball stays put");
            None
        }
    };
    let mut bus = InputBus::new();
    let mut kicker = Kicker::new(level.kick.clone(), &ball);
    kicker.activate(&mut bus);

    let mut clock = SharedTimeScale::new();
    let mut voices = VoiceBank::new(&level.kick.audio);
    voices.start_voice();
    let mut renderer = PolylineBuffer::new();

    let mut last = Instant::now();
    for tick in 0..ticks {
        drive_input(tick, &mut bus);
        world.tick(dt);

        let report = {
            let mut svc = Services {
                collisions: &world,
                forces: &world,
                clock: &mut clock,
                audio: &mut voices,
                renderer: &mut renderer,
            };
            kicker.fixed_update(&mut ball, &mut svc, dt)
        };
        if report.reload_requested {
            ball = Ball::spawn(&level);
        }

        if let Some(params) = &params {
            step_ball(tick, &mut ball, params, &world);
        }

        log_tick(tick, &report, &ball);

        if realtime {
            let step = Duration::try_from_secs_f32(clock.real_step(dt)).unwrap_or(Duration::ZERO);
            let elapsed = last.elapsed();
            if elapsed < step {
                tokio::time::sleep(step - elapsed).await;
            }
            last = Instant::now();
        }
    }

    Ok(ball)
}

fn step_ball(tick: u32, ball: &mut Ball, params: &TrajectoryParams, world: &LevelWorld) {
    if let Some(hit) = integrate_body(ball, params, world, world) {
        if hit.distance == 0.0 {
            warn!(tick, pos = ?ball.pos, "ball started the step inside a collider");
        }
    }
}

fn log_tick(tick: u32, report: &TickReport, ball: &Ball) {
    if report.kicked {
        info!(tick, vel = ?ball.vel, "ball kicked");
    }
    if tick % config::LOG_EVERY_TICKS == 0 || report.hazard_ahead {
        info!(
            tick,
            pos = ?ball.pos,
            aim = ?report.aim,
            preview_end = ?report.preview_end,
            time_scale = report.time_scale,
            hazard_ahead = report.hazard_ahead,
            "tick"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level_with_mass(mass: f32) -> GameLevel {
        GameLevel::from_json(&format!(
            r#"{{
                "name": "drop",
                "objects": [],
                "ball": {{ "spawn_x": 0, "spawn_y": 2, "radius": 0.25, "mass": {mass} }}
            }}"#
        ))
        .expect("level json")
    }

    #[tokio::test]
    async fn massless_ball_keeps_the_sandbox_running() {
        let ball = run(level_with_mass(0.0), 30, false)
            .await
            .expect("sandbox run");
        assert_eq!(ball.pos, Vec2::new(0.0, 2.0));
        assert_eq!(ball.vel, Vec2::ZERO);
    }

    #[tokio::test]
    async fn valid_ball_falls_under_gravity() {
        let ball = run(level_with_mass(1.0), 30, false)
            .await
            .expect("sandbox run");
        assert!(ball.pos.y < 2.0);
    }
}
