#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(coverage_nightly, coverage(off))]

//! Headless soak runner: drives a session with scripted random input for a
//! bounded wall-clock time, printing per-system timing tables as it goes.

use std::env;
use std::time::{Duration, Instant};

use anyhow::Context;
use cman::app::{App, InputSource};
use cman::config::Config;
use cman::events::GameCommand;
use cman::game::Game;
use cman::level::{EmbeddedLevels, LevelId};
use cman::logging;
use cman::map::direction::Direction;
use cman::map::Grid;
use cman::render::{RenderTarget, Rgb};
use cman::systems::profiling::{SystemTimings, Timing};
use cman::systems::state::SessionState;
use glam::{UVec2, Vec2};
use rand::rngs::SmallRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use tracing::info;

/// Scripted input that holds a random direction for a handful of frames
/// before re-rolling.
struct RandomWalk {
    rng: SmallRng,
    current: Direction,
    frames_left: u32,
}

impl RandomWalk {
    fn new(mut rng: SmallRng) -> RandomWalk {
        let current = *Direction::DIRECTIONS.choose(&mut rng).expect("DIRECTIONS is non-empty");
        RandomWalk {
            rng,
            current,
            frames_left: 0,
        }
    }
}

impl InputSource for RandomWalk {
    fn desired_direction(&mut self) -> Option<Direction> {
        if self.frames_left == 0 {
            self.current = *Direction::DIRECTIONS.choose(&mut self.rng).expect("DIRECTIONS is non-empty");
            self.frames_left = self.rng.random_range(4..30);
        }
        self.frames_left -= 1;
        Some(self.current)
    }

    fn poll_command(&mut self) -> Option<GameCommand> {
        None
    }

    fn clear(&mut self) {
        self.frames_left = 0;
    }
}

/// Render target that discards every draw call.
#[derive(Default)]
struct NullTarget;

impl RenderTarget for NullTarget {
    fn resize_to_grid(&mut self, _size: UVec2) {}

    fn draw_grid(&mut self, _grid: &Grid) {}

    fn draw_actor(&mut self, _position: Vec2, _color: Rgb) {}

    fn text(&mut self, _message: &str) {}
}

fn main() -> anyhow::Result<()> {
    logging::init();

    let config = Config::from_env();

    let start = match env::var("CMAN_LEVEL") {
        Ok(raw) => raw.parse::<LevelId>().context("CMAN_LEVEL must be a level number")?,
        Err(_) => EmbeddedLevels::first_available().unwrap_or(config.default_level),
    };

    let seed = env::var("CMAN_SEED").ok().and_then(|raw| raw.parse::<u64>().ok());
    let mut seed_rng = match seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_os_rng(),
    };
    let walk_rng = SmallRng::from_rng(&mut seed_rng);

    let runtime = env::var("CMAN_SOAK_SECS")
        .ok()
        .and_then(|raw| raw.parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or(Duration::from_secs(30));

    info!(level = %start, seed = ?seed, runtime = ?runtime, "Starting soak run");

    let game = Game::new(config, Box::new(EmbeddedLevels), start, seed_rng)?;
    let mut app = App::new(game, RandomWalk::new(walk_rng), NullTarget);

    let started = Instant::now();
    let mut last_report = Instant::now();
    let report_interval = Duration::from_secs(5);

    while started.elapsed() < runtime {
        if !app.run() {
            break;
        }

        let (finished, waiting) = {
            let session = app.game.world.resource::<SessionState>();
            (session.over || session.levels_exhausted, session.waiting_for_next)
        };
        if finished {
            info!(status = %app.game.status_line(), "Session finished before the deadline");
            break;
        }
        if waiting {
            app.game.apply_command(GameCommand::AdvanceLevel);
        }

        if last_report.elapsed() >= report_interval {
            let current_tick = app.game.world.resource::<Timing>().current_tick();
            for line in app
                .game
                .world
                .resource::<SystemTimings>()
                .format_timing_display(current_tick)
            {
                println!("{line}");
            }
            println!("{}", app.game.status_line());
            last_report = Instant::now();
        }
    }

    let ticks = app.game.world.resource::<Timing>().current_tick();
    info!(ticks, status = %app.game.status_line(), "Soak run complete");
    Ok(())
}
